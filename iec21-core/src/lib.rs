//! Core types and utilities for IEC 62056-21 mode C readout
//!
//! This crate provides the data model, error handling, and session events
//! used throughout the readout engine.

pub mod dataset;
pub mod error;
pub mod event;
pub mod reading;

pub use dataset::{Dataset, DatasetRecord};
pub use error::{Iec21Error, Iec21Result};
pub use event::SessionEvent;
pub use reading::{derive_meter_id, ChecksumStatus, Reading};
