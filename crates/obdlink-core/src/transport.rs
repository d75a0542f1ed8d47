//! Transport trait for adapter communication.
//!
//! The [`Transport`] trait abstracts over the physical link to an ELM327
//! adapter. Implementations exist for serial ports (USB clones, Bluetooth
//! RFCOMM channels bound as TTYs), TCP sockets (WiFi adapters), and mock
//! transports for testing.
//!
//! The protocol engine in `obdlink-elm327` operates on a `Transport` rather
//! than directly on a socket, enabling both real adapter control and
//! deterministic unit testing with `MockTransport` from the
//! `obdlink-test-harness` crate.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte-level transport to an adapter.
///
/// Implementations handle buffering and error recovery at the physical
/// layer. Protocol-level concerns (`\r` framing, prompt stripping, PID
/// decoding) are handled by the engine that consumes this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes to the adapter.
    ///
    /// Implementations should not return until all bytes have been written
    /// to the underlying transport (serial TX buffer, TCP socket, etc.).
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive bytes from the adapter into the provided buffer.
    ///
    /// Returns the number of bytes actually read. Waits up to `timeout`
    /// for data to arrive; returns [`Error::Timeout`](crate::error::Error::Timeout)
    /// if nothing is received within the deadline.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Close the transport connection.
    ///
    /// After calling `close()`, subsequent `send()` and `receive()` calls
    /// should return [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;
}
