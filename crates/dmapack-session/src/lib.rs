//! Channel table and transfer orchestration.
//!
//! A [`TransferSession`] owns the [`ChannelTable`] for one hardware session.
//! Reads decode every word of a read transfer into the table; writes encode
//! the table's write channels into one word per write packet. The FIFO
//! itself is any [`WordFifo`](dmapack_transport::WordFifo).

pub mod config;
pub mod error;
pub mod session;
pub mod table;

pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use session::TransferSession;
pub use table::ChannelTable;
