//! Schema-driven packing of engineering-unit channels into 64-bit DMA FIFO words.
//!
//! Each word moved through a host/FPGA DMA FIFO is a densely packed record of
//! boolean flags, PWM duty cycles, fixed-point values and scaled analog
//! samples. dmapack converts between those words and named channel values.
//!
//! # Crate Structure
//!
//! - [`codec`]: per-channel and per-packet bit layout and numeric conversion
//! - [`schema`]: ordered read/write packets, loaded from JSON layouts
//! - [`session`]: channel table and transfer orchestration
//! - [`transport`]: FIFO abstraction, loopback and socket bridges
//!
//! ```
//! use dmapack::codec::{ChannelKind, Direction, PacketDescriptor};
//! use dmapack::schema::Schema;
//! use dmapack::session::{SessionConfig, TransferSession};
//!
//! let schema = Schema::new(
//!     vec![],
//!     vec![PacketDescriptor::with_ordinal_lanes(
//!         Direction::Write,
//!         1,
//!         [
//!             ("Start", ChannelKind::Boolean),
//!             ("Setpoint", ChannelKind::ScaledInt16 { scale: 10.0 }),
//!         ],
//!     )],
//! )?;
//! let mut session = TransferSession::new(schema, SessionConfig::default());
//! session.set_channel("Start", true)?;
//! session.set_channel("Setpoint", 5.0)?;
//! assert_eq!(session.pack_transfer()?, vec![0x8000_4000_0000_0000]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Re-export codec types.
pub mod codec {
    pub use dmapack_codec::*;
}

/// Re-export schema types.
pub mod schema {
    pub use dmapack_schema::*;
}

/// Re-export session types.
pub mod session {
    pub use dmapack_session::*;
}

/// Re-export transport types.
pub mod transport {
    pub use dmapack_transport::*;
}
