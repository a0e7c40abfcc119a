//! Packet layout schema for DMA FIFO channel words.
//!
//! A [`Schema`] lists, per direction, the packets a transfer carries in
//! order and derives one immutable [`PacketCodec`](dmapack_codec::PacketCodec)
//! per packet. Schemas are built in code or loaded from a JSON layout
//! document ([`LayoutDocument`]).

pub mod config;
pub mod error;
pub mod layout;
pub mod schema;

pub use config::LoadConfig;
pub use error::{Result, SchemaError};
pub use layout::{ChannelLayout, LayoutDocument, PacketLayout, DEFAULT_PWM_PERIOD};
pub use schema::Schema;
