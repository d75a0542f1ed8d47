//! Error types for obdlink.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Transport-layer and protocol-layer
//! failures are all captured here.
//!
//! Note that a malformed PID response is *not* an error: decoding simply
//! yields no measurement and the frame is surfaced as a raw status line.
//! The variants below cover conditions a caller can act on.

/// The error type for all obdlink operations.
///
/// Variants cover the failure modes encountered when talking to an ELM327
/// adapter: physical transport failures, protocol-level surprises, timeouts,
/// and invalid caller input.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (serial port, RFCOMM channel, TCP socket).
    #[error("transport error: {0}")]
    Transport(String),

    /// A protocol-level error (unexpected adapter reply, mock mismatch).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Timed out waiting for a response from the adapter.
    ///
    /// This typically indicates the adapter is unpowered, the ignition is
    /// off, or the vehicle bus protocol could not be negotiated.
    #[error("timeout waiting for response")]
    Timeout,

    /// An invalid parameter was passed to the engine or a builder.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No connection to the adapter has been established.
    #[error("not connected")]
    NotConnected,

    /// The connection to the adapter was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_transport() {
        let e = Error::Transport("rfcomm channel busy".into());
        assert_eq!(e.to_string(), "transport error: rfcomm channel busy");
    }

    #[test]
    fn error_display_protocol() {
        let e = Error::Protocol("unexpected reply".into());
        assert_eq!(e.to_string(), "protocol error: unexpected reply");
    }

    #[test]
    fn error_display_timeout() {
        let e = Error::Timeout;
        assert_eq!(e.to_string(), "timeout waiting for response");
    }

    #[test]
    fn error_display_invalid_parameter() {
        let e = Error::InvalidParameter("empty command rotation".into());
        assert_eq!(e.to_string(), "invalid parameter: empty command rotation");
    }

    #[test]
    fn error_display_not_connected() {
        let e = Error::NotConnected;
        assert_eq!(e.to_string(), "not connected");
    }

    #[test]
    fn error_display_connection_lost() {
        let e = Error::ConnectionLost;
        assert_eq!(e.to_string(), "connection lost");
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broken");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.to_string().contains("pipe broken"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<Error>();
    }
}
