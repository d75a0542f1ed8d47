//! Fluent builder for [`Elm327Engine`].

use std::time::Duration;

use obdlink_core::error::Result;
use obdlink_core::transport::Transport;
use obdlink_transport::{SerialTransport, TcpTransport};

use crate::commands;
use crate::engine::Elm327Engine;

/// Default command/response timeout.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(1);

/// Default engine displacement for the fallback fuel model, in cc.
pub const DEFAULT_DISPLACEMENT_CC: u32 = 2000;

const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Builder for [`Elm327Engine`].
///
/// # Example
///
/// ```no_run
/// use obdlink_elm327::Elm327Builder;
/// use std::time::Duration;
///
/// # async fn example() -> obdlink_core::Result<()> {
/// let engine = Elm327Builder::new()
///     .displacement_cc(1600)
///     .command_timeout(Duration::from_millis(500))
///     .open_serial("/dev/ttyUSB0", 38_400)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Elm327Builder {
    rotation: Vec<String>,
    displacement_cc: u32,
    command_timeout: Duration,
    event_capacity: usize,
}

impl Elm327Builder {
    /// Start a builder with the default scan rotation and settings.
    pub fn new() -> Self {
        Self {
            rotation: commands::default_rotation(),
            displacement_cc: DEFAULT_DISPLACEMENT_CC,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Replace the scan rotation. An empty rotation is allowed; a scan
    /// started over it simply never sends anything.
    pub fn rotation(mut self, commands: Vec<String>) -> Self {
        self.rotation = commands;
        self
    }

    /// Append one command to the scan rotation.
    pub fn push_command(mut self, command: impl Into<String>) -> Self {
        self.rotation.push(command.into());
        self
    }

    /// Set the engine displacement for the fallback fuel model.
    pub fn displacement_cc(mut self, cc: u32) -> Self {
        self.displacement_cc = cc;
        self
    }

    /// Set the per-command response timeout used by
    /// [`probe`](Elm327Engine::probe).
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Set the event broadcast channel capacity.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Build the engine over an already-connected transport.
    pub fn build_with_transport(self, transport: Box<dyn Transport>) -> Elm327Engine {
        Elm327Engine::new(
            transport,
            self.rotation,
            self.displacement_cc,
            self.command_timeout,
            self.event_capacity,
        )
    }

    /// Connect to a WiFi adapter over TCP and build the engine.
    pub async fn connect_tcp(self, addr: &str) -> Result<Elm327Engine> {
        let transport = TcpTransport::connect(addr).await?;
        Ok(self.build_with_transport(Box::new(transport)))
    }

    /// Open a serial (USB or RFCOMM) adapter and build the engine.
    pub async fn open_serial(self, port: &str, baud_rate: u32) -> Result<Elm327Engine> {
        let transport = SerialTransport::open(port, baud_rate).await?;
        Ok(self.build_with_transport(Box::new(transport)))
    }
}

impl Default for Elm327Builder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obdlink_test_harness::MockTransport;

    #[tokio::test]
    async fn builder_defaults() {
        let builder = Elm327Builder::new();
        assert_eq!(builder.displacement_cc, DEFAULT_DISPLACEMENT_CC);
        assert_eq!(builder.command_timeout, DEFAULT_COMMAND_TIMEOUT);
        assert_eq!(builder.rotation, commands::default_rotation());
    }

    #[tokio::test]
    async fn builder_customisation() {
        let engine = Elm327Builder::new()
            .rotation(vec!["010C".to_string()])
            .push_command("010D")
            .displacement_cc(1600)
            .command_timeout(Duration::from_millis(250))
            .build_with_transport(Box::new(MockTransport::new()));
        assert_eq!(engine.engine_displacement().await, 1600);
    }
}
