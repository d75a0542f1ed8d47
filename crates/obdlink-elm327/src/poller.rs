//! Background scan poller.
//!
//! While a scan is running, a background task owns the transport exclusively
//! and drives the command rotation: every cleaned response releases the next
//! command, so exactly one request is outstanding at any time and the next
//! request goes out before the current response is analysed.
//!
//! The engine talks to the task over an `mpsc` control channel. Shutdown
//! hands the transport back through a `oneshot` so the engine can resume
//! direct probing after the scan stops.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use obdlink_core::error::{Error, Result};
use obdlink_core::events::ScanEvent;
use obdlink_core::transport::Transport;

use crate::commands;
use crate::engine::ScanState;
use crate::pid;
use crate::protocol::{self, FrameAccumulator};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A request sent from the engine to the poller task.
pub(crate) enum PollerRequest {
    /// Stop polling and hand the transport back.
    Shutdown {
        response_tx: oneshot::Sender<Box<dyn Transport>>,
    },
}

/// Handle to the background poller task.
pub(crate) struct PollerHandle {
    ctrl_tx: mpsc::Sender<PollerRequest>,
    /// Kept so the task can be aborted when the engine is dropped.
    #[allow(dead_code)]
    task_handle: JoinHandle<()>,
}

impl PollerHandle {
    /// Ask the poller to exit and reclaim the transport.
    pub(crate) async fn shutdown(self) -> Result<Box<dyn Transport>> {
        let (response_tx, response_rx) = oneshot::channel();
        self.ctrl_tx
            .send(PollerRequest::Shutdown { response_tx })
            .await
            .map_err(|_| Error::NotConnected)?;
        response_rx.await.map_err(|_| Error::NotConnected)
    }
}

// ---------------------------------------------------------------------------
// DisconnectedTransport sentinel
// ---------------------------------------------------------------------------

/// Sentinel transport placed into the engine's `Arc<Mutex<>>` after the
/// real transport has been moved into the poller task.
pub(crate) struct DisconnectedTransport;

#[async_trait::async_trait]
impl Transport for DisconnectedTransport {
    async fn send(&mut self, _data: &[u8]) -> Result<()> {
        Err(Error::NotConnected)
    }

    async fn receive(&mut self, _buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        Err(Error::NotConnected)
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// Spawn
// ---------------------------------------------------------------------------

/// Spawn the poller task.
///
/// The task owns the transport exclusively. It immediately starts the
/// scheduler and sends the first command of the rotation.
pub(crate) fn spawn_poller(
    transport: Box<dyn Transport>,
    state: Arc<Mutex<ScanState>>,
    event_tx: broadcast::Sender<ScanEvent>,
) -> PollerHandle {
    let (ctrl_tx, ctrl_rx) = mpsc::channel::<PollerRequest>(16);
    let task_handle = tokio::spawn(poll_loop(transport, state, event_tx, ctrl_rx));
    PollerHandle {
        ctrl_tx,
        task_handle,
    }
}

// ---------------------------------------------------------------------------
// Poll loop
// ---------------------------------------------------------------------------

async fn poll_loop(
    mut transport: Box<dyn Transport>,
    state: Arc<Mutex<ScanState>>,
    event_tx: broadcast::Sender<ScanEvent>,
    mut ctrl_rx: mpsc::Receiver<PollerRequest>,
) {
    let mut acc = FrameAccumulator::new();
    let mut connection_lost = false;

    // Kick off the rotation.
    let first = { state.lock().await.scheduler.start() };
    if let Some(cmd) = first {
        send_command(&mut *transport, &cmd).await;
    }

    loop {
        tokio::select! {
            biased;

            // Priority: control requests from the engine.
            ctrl = ctrl_rx.recv() => {
                match ctrl {
                    Some(PollerRequest::Shutdown { response_tx }) => {
                        debug!("poller shutting down, returning transport");
                        let _ = response_tx.send(transport);
                        return;
                    }
                    None => {
                        // All senders dropped -- the engine was dropped.
                        debug!("poller control channel closed, exiting");
                        return;
                    }
                }
            }

            // Idle: read adapter bytes and process complete frames.
            _ = async {
                let mut buf = [0u8; 256];
                match transport.receive(&mut buf, Duration::from_millis(100)).await {
                    Ok(n) if n > 0 => {
                        trace!(n, "adapter bytes received");
                        acc.feed(&buf[..n]);
                        while let Some(cleaned) = acc.next_response() {
                            process_response(&mut *transport, &cleaned, &state, &event_tx).await;
                        }
                    }
                    Ok(_) | Err(Error::Timeout) => {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                    Err(Error::ConnectionLost) | Err(Error::NotConnected) => {
                        if !connection_lost {
                            connection_lost = true;
                            warn!("adapter connection lost during scan");
                            state.lock().await.scheduler.stop();
                            let _ = event_tx.send(ScanEvent::Disconnected);
                        }
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                    Err(e) => {
                        debug!(?e, "transport error in poll loop");
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            } => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Response processing
// ---------------------------------------------------------------------------

/// Handle one cleaned response: report it, release the next command in the
/// rotation, then decode. The whole cycle runs under the scan-state lock so
/// scheduling and decoding never interleave with engine-side mutations.
async fn process_response(
    transport: &mut dyn Transport,
    cleaned: &str,
    state: &Arc<Mutex<ScanState>>,
    event_tx: &broadcast::Sender<ScanEvent>,
) {
    let mut st = state.lock().await;
    if !st.scheduler.is_active() {
        debug!(cleaned, "response after scan stop, discarding");
        return;
    }

    if !cleaned.is_empty() {
        let _ = event_tx.send(ScanEvent::StatusChanged(cleaned.to_string()));
    }

    // Send the next request before analysing this response. The adapter
    // works on it while we decode, which keeps the rotation pipelined.
    if let Some(next) = st.scheduler.on_response() {
        send_command(transport, &next).await;
    }

    analyse(&mut st, cleaned, event_tx);
}

/// Decode a cleaned response and publish whatever it yields.
fn analyse(st: &mut ScanState, cleaned: &str, event_tx: &broadcast::Sender<ScanEvent>) {
    if cleaned.is_empty() {
        return;
    }

    let tokens = pid::split_tokens(cleaned);
    if let Some(measurement) = pid::decode(&tokens) {
        trace!(pid = measurement.pid, value = measurement.value, "decoded measurement");
        let _ = event_tx.send(ScanEvent::MeasurementReady(measurement));
        let displacement_cc = st.displacement_cc;
        if let Some(display) = st.fuel.on_measurement(&measurement, displacement_cc) {
            let _ = event_tx.send(ScanEvent::FuelDisplayChanged(display));
        }
    } else if let Some(volts) = commands::parse_voltage(cleaned) {
        debug!(volts, "battery voltage");
        let _ = event_tx.send(ScanEvent::VoltageChanged { volts });
    } else {
        trace!(cleaned, "undecodable response");
    }
}

async fn send_command(transport: &mut dyn Transport, cmd: &str) {
    trace!(cmd, "sending scan command");
    let bytes = protocol::encode_command(cmd);
    if let Err(e) = transport.send(&bytes).await {
        debug!(?e, cmd, "failed to send scan command");
    }
}
