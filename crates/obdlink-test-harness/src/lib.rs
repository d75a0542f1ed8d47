//! Test harness for OBD-II protocol engines.
//!
//! Provides [`MockTransport`], a scripted in-memory transport that stands in
//! for a real ELM327 adapter. Tests pre-load command/response pairs and the
//! engine under test exchanges them exactly as it would over serial or TCP.

pub mod mock_transport;

pub use mock_transport::MockTransport;
