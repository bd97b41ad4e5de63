//! Error re-exports for the client layer

pub use iec21_core::error::{Iec21Error, Iec21Result};
