//! Serial port transport for adapter communication.
//!
//! This module provides [`SerialTransport`], which implements the
//! [`Transport`] trait for USB ELM327 clones presenting as virtual COM
//! ports, and for Bluetooth adapters whose RFCOMM channel has been bound to
//! a TTY (e.g. `rfcomm bind 0 <addr>` on Linux, an outgoing COM port on
//! Windows).
//!
//! ELM327 devices are fixed at 8 data bits, no parity, 1 stop bit; only the
//! baud rate varies between clones (38400 is the classic default, 115200 on
//! newer firmware), so that is the only knob exposed here.
//!
//! # Example
//!
//! ```no_run
//! use obdlink_transport::SerialTransport;
//! use obdlink_core::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> obdlink_core::Result<()> {
//! let mut transport = SerialTransport::open("/dev/rfcomm0", 38_400).await?;
//!
//! transport.send(b"ATRV\r").await?;
//!
//! let mut buf = [0u8; 256];
//! let n = transport.receive(&mut buf, Duration::from_secs(1)).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use obdlink_core::error::{Error, Result};
use obdlink_core::transport::Transport;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{SerialPortBuilderExt, SerialStream};

/// Serial port transport for adapter communication.
///
/// Implements the [`Transport`] trait for USB virtual COM ports and
/// RFCOMM-bound Bluetooth channels.
pub struct SerialTransport {
    /// The underlying serial port stream, `None` after `close()`.
    port: Option<SerialStream>,
    /// Port path for logging/debugging.
    port_name: String,
}

impl SerialTransport {
    /// Open a serial port at the given baud rate (8N1, no flow control).
    ///
    /// # Arguments
    ///
    /// * `port` - Serial port path (e.g. `/dev/rfcomm0`, `/dev/ttyUSB0`, `COM5`)
    /// * `baud_rate` - Baud rate; 38400 for most clones, 115200 for v1.5+
    pub async fn open(port: &str, baud_rate: u32) -> Result<Self> {
        tracing::debug!(port = %port, baud_rate, "opening serial port");

        let serial_stream = tokio_serial::new(port, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .stop_bits(tokio_serial::StopBits::One)
            .parity(tokio_serial::Parity::None)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| {
                tracing::error!(port = %port, error = %e, "failed to open serial port");
                Error::Transport(format!("failed to open serial port {}: {}", port, e))
            })?;

        tracing::info!(port = %port, baud_rate, "serial port opened");

        Ok(Self {
            port: Some(serial_stream),
            port_name: port.to_string(),
        })
    }

    /// Get the path of the serial port.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        tracing::trace!(port = %self.port_name, bytes = data.len(), data = ?data, "sending");

        port.write_all(data).await.map_err(|e| {
            tracing::error!(port = %self.port_name, error = %e, "failed to send");
            map_io_error(e)
        })?;

        // Flush so the command reaches the adapter immediately; the ELM327
        // does nothing until it sees the trailing carriage return.
        port.flush().await.map_err(|e| {
            tracing::error!(port = %self.port_name, error = %e, "failed to flush serial port");
            Error::Io(e)
        })?;

        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        let result = tokio::time::timeout(timeout, port.read(buf)).await;

        match result {
            Ok(Ok(n)) => {
                tracing::trace!(port = %self.port_name, bytes = n, data = ?&buf[..n], "received");
                Ok(n)
            }
            Ok(Err(e)) => {
                tracing::error!(port = %self.port_name, error = %e, "failed to receive");
                Err(map_io_error(e))
            }
            Err(_) => {
                tracing::trace!(
                    port = %self.port_name,
                    timeout_ms = timeout.as_millis(),
                    "timeout waiting for data"
                );
                Err(Error::Timeout)
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut port) = self.port.take() {
            tracing::debug!(port = %self.port_name, "closing serial port");

            if let Err(e) = port.flush().await {
                tracing::warn!(
                    port = %self.port_name,
                    error = %e,
                    "failed to flush before closing (continuing anyway)"
                );
            }

            tracing::info!(port = %self.port_name, "serial port closed");
        }

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        if self.port.is_some() {
            tracing::debug!(port = %self.port_name, "SerialTransport dropped, closing port");
        }
    }
}

/// Map a data-path I/O error to the appropriate [`Error`] variant.
fn map_io_error(e: std::io::Error) -> Error {
    match e.kind() {
        std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::NotConnected => Error::ConnectionLost,
        _ => Error::Io(e),
    }
}
