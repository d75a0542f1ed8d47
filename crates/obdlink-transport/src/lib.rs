//! Transport implementations for obdlink.
//!
//! This crate provides concrete implementations of the
//! [`Transport`](obdlink_core::Transport) trait from `obdlink-core` for the
//! connection types ELM327 adapters actually ship with:
//!
//! - [`SerialTransport`]: USB virtual COM ports and Bluetooth RFCOMM
//!   channels bound as TTYs (`/dev/rfcomm0`, `COM5`)
//! - [`TcpTransport`]: WiFi adapters exposing a raw TCP socket
//!   (conventionally `192.168.0.10:35000`)
//!
//! # Example
//!
//! ```no_run
//! use obdlink_transport::TcpTransport;
//! use obdlink_core::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> obdlink_core::Result<()> {
//! // Connect to a WiFi ELM327 clone
//! let mut transport = TcpTransport::connect("192.168.0.10:35000").await?;
//!
//! // Probe the adapter battery voltage
//! transport.send(b"ATRV\r").await?;
//!
//! // Receive the response
//! let mut buf = [0u8; 256];
//! let n = transport.receive(&mut buf, Duration::from_secs(1)).await?;
//! # Ok(())
//! # }
//! ```

pub mod serial;
pub mod tcp;

pub use serial::SerialTransport;
pub use tcp::TcpTransport;
