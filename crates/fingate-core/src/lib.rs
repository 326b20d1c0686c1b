//! Core types shared across the Fingate door-controller workspace.
//!
//! This crate holds the error taxonomy, the domain value types exchanged
//! between tasks (fingerprint outcomes, door commands, door status, display
//! events), and the timing/configuration defaults inherited from the
//! deployed hardware. It has no I/O of its own; every other crate in the
//! workspace depends on it.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::{DoorConfig, SessionConfig};
pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
