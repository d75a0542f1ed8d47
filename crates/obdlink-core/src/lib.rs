//! obdlink-core: Core traits, types, and error definitions for obdlink.
//!
//! This crate defines the adapter-agnostic abstractions the protocol engines
//! build on. Dashboard applications and loggers depend on these types without
//! pulling in a specific adapter driver or transport.
//!
//! # Key types
//!
//! - [`Transport`] -- byte-level communication channel to an adapter
//! - [`Measurement`] -- a decoded physical value for one PID
//! - [`ScanEvent`] -- asynchronous notifications for the presentation layer
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod events;
pub mod transport;
pub mod types;

// Re-export key types at crate root for ergonomic `use obdlink_core::*`.
pub use error::{Error, Result};
pub use events::ScanEvent;
pub use transport::Transport;
pub use types::*;
