//! ELM327 text-protocol framing and cleanup.
//!
//! ELM327 adapters speak a line-oriented ASCII protocol over whatever link
//! carries them (serial, RFCOMM, TCP). Commands are short ASCII strings
//! terminated with a carriage return; responses are one or more
//! `\r`-terminated lines, usually followed by a `>` prompt when the adapter
//! is ready for the next command.
//!
//! # Command format
//!
//! ```text
//! <command>\r
//! ```
//!
//! - `AT` commands configure the adapter itself (`ATZ`, `ATE0`, `ATRV`, ...).
//! - Everything else is forwarded to the vehicle bus. Mode-1 PID requests
//!   are four hex digits: mode `01` plus the two-digit PID (e.g. `010C`).
//! - An empty command encodes to a bare `\r`, which most adapters treat as
//!   "repeat the last command". Useful as a keep-alive probe.
//!
//! # Response format
//!
//! Responses vary wildly between adapter clones: echo on or off, spaces
//! between hex bytes or not, stray `>` prompts, `SEARCHING...` banners while
//! the adapter hunts for a bus protocol. [`FrameAccumulator`] absorbs all of
//! that and hands back one cleaned response string per terminator.

use bytes::{BufMut, BytesMut};

/// Command/response terminator byte.
pub const TERMINATOR: u8 = b'\r';

/// Ready-for-next-command prompt emitted by the adapter.
pub const PROMPT: u8 = b'>';

/// Policy for bytes that arrive after a terminator within the same chunk.
///
/// Adapters over TCP or RFCOMM frequently deliver several `\r`-terminated
/// lines in a single read. [`TrailingBytes::Retain`] keeps the surplus in the
/// accumulator so the next [`FrameAccumulator::next_response`] call sees it.
/// [`TrailingBytes::Discard`] throws the surplus away along with the frame,
/// which mirrors the behaviour of simpler scan tools that clear their buffer
/// on every line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingBytes {
    /// Keep bytes after the terminator for the next frame (default).
    #[default]
    Retain,
    /// Drop everything after the first terminator in the buffer.
    Discard,
}

/// Accumulates raw transport bytes and yields cleaned responses.
///
/// Feed chunks in with [`feed`](Self::feed) as they arrive, then drain
/// complete responses with [`next_response`](Self::next_response). Cleanup
/// normalises the adapter's output:
///
/// - `\r` and `>` are removed, whitespace is collapsed to single spaces.
/// - Any character that is not an ASCII letter, digit or space is stripped.
/// - The literal strings `OK`, `?` and `,` are suppressed.
/// - Frames containing `SEARCHING` (any case) are swallowed entirely; they
///   are a transient bus-negotiation banner, not a response.
///
/// The cleaned result may be empty, which callers treat as "nothing
/// decodable" but still counts as a completed exchange.
#[derive(Debug)]
pub struct FrameAccumulator {
    buf: Vec<u8>,
    trailing: TrailingBytes,
}

impl FrameAccumulator {
    /// Create an accumulator with the default [`TrailingBytes::Retain`] policy.
    pub fn new() -> Self {
        Self::with_trailing_policy(TrailingBytes::Retain)
    }

    /// Create an accumulator with an explicit trailing-bytes policy.
    pub fn with_trailing_policy(trailing: TrailingBytes) -> Self {
        Self {
            buf: Vec::new(),
            trailing,
        }
    }

    /// Append a chunk of raw bytes from the transport.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Number of buffered bytes not yet part of a complete frame.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Drain the next complete cleaned response, if one is buffered.
    ///
    /// Returns `None` when no terminator has arrived yet. `SEARCHING` frames
    /// are skipped internally; the loop keeps going until it finds a real
    /// frame or runs out of terminators.
    ///
    /// # Example
    ///
    /// ```
    /// use obdlink_elm327::protocol::FrameAccumulator;
    ///
    /// let mut acc = FrameAccumulator::new();
    /// acc.feed(b"41 0C ");
    /// assert_eq!(acc.next_response(), None);
    /// acc.feed(b"1A F8\r\r>");
    /// assert_eq!(acc.next_response(), Some("41 0C 1A F8".to_string()));
    /// ```
    pub fn next_response(&mut self) -> Option<String> {
        loop {
            let term = self.buf.iter().position(|&b| b == TERMINATOR)?;
            let frame: Vec<u8> = match self.trailing {
                TrailingBytes::Retain => {
                    let rest = self.buf.split_off(term + 1);
                    std::mem::replace(&mut self.buf, rest)
                }
                TrailingBytes::Discard => std::mem::take(&mut self.buf),
            };
            let raw = String::from_utf8_lossy(&frame[..term]);
            let cleaned = clean_response(&raw);
            if cleaned.to_ascii_uppercase().contains("SEARCHING") {
                continue;
            }
            return Some(cleaned);
        }
    }
}

impl Default for FrameAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalise one raw response line into a cleaned response string.
///
/// Keeps ASCII letters and digits, collapses whitespace runs to single
/// spaces, drops everything else (`.`, `>`, `?`, `,`, control bytes), then
/// suppresses the literal `OK` acknowledgement.
pub fn clean_response(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else if c.is_whitespace() {
            pending_space = true;
        }
        // `?`, `,`, `>` and other punctuation fall out of the filter above.
    }
    out.replace("OK", "").trim().to_string()
}

/// Encode a command into raw bytes ready for transmission.
///
/// Appends the `\r` terminator. An empty command encodes to a bare `\r`.
///
/// # Example
///
/// ```
/// use obdlink_elm327::protocol::encode_command;
///
/// assert_eq!(encode_command("ATRV"), b"ATRV\r");
/// assert_eq!(encode_command("010C"), b"010C\r");
/// assert_eq!(encode_command(""), b"\r");
/// ```
pub fn encode_command(cmd: &str) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(cmd.len() + 1);
    buf.put_slice(cmd.as_bytes());
    buf.put_u8(TERMINATOR);
    buf.to_vec()
}
