//! Mock transport for deterministic testing of the scan engine.
//!
//! [`MockTransport`] implements the [`Transport`] trait with pre-loaded
//! command/response pairs. This lets you test command encoding, response
//! framing and PID decoding without an adapter or a vehicle.
//!
//! # Example
//!
//! ```
//! use obdlink_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! // When the engine sends an RPM request, reply like an ELM327 would.
//! mock.expect(b"010C\r", b"41 0C 1A F8\r\r>");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;

use obdlink_core::error::{Error, Result};
use obdlink_core::transport::Transport;

/// A pre-loaded command/response pair.
#[derive(Debug, Clone)]
struct Expectation {
    /// The exact bytes we expect to be sent, terminator included.
    command: Vec<u8>,
    /// The raw adapter reply, usually one or more `\r`-terminated lines
    /// plus the `>` prompt.
    response: Vec<u8>,
}

/// A mock [`Transport`] for testing the scan engine without hardware.
///
/// Expectations are consumed in order: when `send()` matches the front of
/// the queue, that expectation is consumed and its response becomes
/// available to `receive()`. A send that does not match the front, or
/// arrives after the queue is drained, returns an error *without* consuming
/// anything; a free-running scan rotation keeps sending after the scripted
/// exchanges run out, and those extra sends must not eat expectations meant
/// for later.
#[derive(Debug)]
pub struct MockTransport {
    expectations: VecDeque<Expectation>,
    /// The response pending for the next `receive()` call.
    pending_response: Option<Vec<u8>>,
    /// How many bytes of the pending response have been read so far.
    response_cursor: usize,
    connected: bool,
    /// Log of all bytes sent through this transport.
    sent_log: Vec<Vec<u8>>,
}

impl MockTransport {
    /// Create a new mock transport in the connected state.
    pub fn new() -> Self {
        MockTransport {
            expectations: VecDeque::new(),
            pending_response: None,
            response_cursor: 0,
            connected: true,
            sent_log: Vec::new(),
        }
    }

    /// Add an expected command/response pair.
    ///
    /// When `send()` is called with bytes matching `command`, the subsequent
    /// `receive()` calls will drain `response`.
    pub fn expect(&mut self, command: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            command: command.to_vec(),
            response: response.to_vec(),
        });
    }

    /// All data sent through this transport, one element per `send()` call.
    pub fn sent_data(&self) -> &[Vec<u8>] {
        &self.sent_log
    }

    /// Number of expectations not yet consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// Force the connected state.
    ///
    /// When set to `false`, subsequent `send()` and `receive()` calls return
    /// [`Error::NotConnected`].
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        self.sent_log.push(data.to_vec());

        match self.expectations.front() {
            Some(expectation) if data == expectation.command.as_slice() => {}
            Some(expectation) => {
                return Err(Error::Protocol(format!(
                    "unexpected send: expected {:02X?}, got {:02X?}",
                    expectation.command, data
                )))
            }
            None => {
                return Err(Error::Protocol(
                    "no more expectations in mock transport".into(),
                ))
            }
        }

        if let Some(expectation) = self.expectations.pop_front() {
            self.pending_response = Some(expectation.response);
            self.response_cursor = 0;
        }
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        if let Some(ref response) = self.pending_response {
            let remaining = &response[self.response_cursor..];
            if remaining.is_empty() {
                self.pending_response = None;
                self.response_cursor = 0;
                return Err(Error::Timeout);
            }
            let n = remaining.len().min(buf.len());
            buf[..n].copy_from_slice(&remaining[..n]);
            self.response_cursor += n;
            if self.response_cursor >= response.len() {
                // All response bytes consumed; clear for the next exchange.
                self.pending_response = None;
                self.response_cursor = 0;
            }
            Ok(n)
        } else {
            Err(Error::Timeout)
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.pending_response = None;
        self.response_cursor = 0;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn basic_send_receive() {
        let mut mock = MockTransport::new();
        mock.expect(b"010C\r", b"41 0C 1A F8\r\r>");

        mock.send(b"010C\r").await.unwrap();

        let mut buf = [0u8; 64];
        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(&buf[..n], b"41 0C 1A F8\r\r>");
    }

    #[tokio::test]
    async fn tracks_sent_data() {
        let mut mock = MockTransport::new();
        mock.expect(b"ATRV\r", b"12.5V\r>");
        mock.expect(b"010D\r", b"41 0D 64\r>");

        mock.send(b"ATRV\r").await.unwrap();
        mock.send(b"010D\r").await.unwrap();

        assert_eq!(mock.sent_data().len(), 2);
        assert_eq!(mock.sent_data()[0], b"ATRV\r");
        assert_eq!(mock.sent_data()[1], b"010D\r");
    }

    #[tokio::test]
    async fn mismatched_send_does_not_consume() {
        let mut mock = MockTransport::new();
        mock.expect(b"ATZ\r", b"ELM327 v1.5\r>");

        let result = mock.send(b"ATRV\r").await;
        assert!(matches!(result.unwrap_err(), Error::Protocol(_)));
        assert_eq!(mock.remaining_expectations(), 1);

        // The scripted exchange still works afterwards.
        mock.send(b"ATZ\r").await.unwrap();
        assert_eq!(mock.remaining_expectations(), 0);
    }

    #[tokio::test]
    async fn exhausted_queue_errors() {
        let mut mock = MockTransport::new();
        let result = mock.send(b"010C\r").await;
        assert!(matches!(result.unwrap_err(), Error::Protocol(_)));
    }

    #[tokio::test]
    async fn receive_without_send_times_out() {
        let mut mock = MockTransport::new();
        let mut buf = [0u8; 64];
        let result = mock.receive(&mut buf, Duration::from_millis(10)).await;
        assert!(matches!(result.unwrap_err(), Error::Timeout));
    }

    #[tokio::test]
    async fn partial_receive() {
        let mut mock = MockTransport::new();
        mock.expect(b"010D\r", b"41 0D 64\r>");
        mock.send(b"010D\r").await.unwrap();

        let mut buf = [0u8; 4];
        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(&buf[..n], b"41 0");

        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(&buf[..n], b"D 64");
    }

    #[tokio::test]
    async fn disconnect_fails_operations() {
        let mut mock = MockTransport::new();
        mock.close().await.unwrap();
        assert!(!mock.is_connected());

        let result = mock.send(b"ATRV\r").await;
        assert!(matches!(result.unwrap_err(), Error::NotConnected));

        let mut buf = [0u8; 8];
        let mut mock = MockTransport::new();
        mock.set_connected(false);
        let result = mock.receive(&mut buf, Duration::from_millis(10)).await;
        assert!(matches!(result.unwrap_err(), Error::NotConnected));
    }
}
