//! Transport layer module for IEC 62056-21 readout
//!
//! This crate provides the chunk stream abstraction plus two transports:
//! a serial pull stream and a push-to-pull bridge for notification links.

pub mod error;
pub mod notify;
pub mod serial;
pub mod stop;
pub mod stream;

pub use error::{Iec21Error, Iec21Result};
pub use notify::{NotifyHandle, NotifySettings, NotifyTransport, MAX_NOTIFY_PAYLOAD};
pub use serial::{SerialSettings, SerialTransport};
pub use stop::StopToken;
pub use stream::{ChunkStream, TransportLayer};
