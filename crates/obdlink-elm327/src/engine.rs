//! The ELM327 scan engine.
//!
//! [`Elm327Engine`] owns the transport and the scan state. Before a scan is
//! started (and after it stops) the transport sits behind a mutex on the
//! engine and [`probe`](Elm327Engine::probe) drives it directly. During a
//! scan the transport is moved into the poller task and a sentinel takes its
//! place, so a probe attempt while scanning fails with
//! [`Error::NotConnected`] instead of corrupting the rotation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

use obdlink_core::error::{Error, Result};
use obdlink_core::events::ScanEvent;
use obdlink_core::transport::Transport;

use crate::fuel::FuelEstimator;
use crate::poller::{self, DisconnectedTransport, PollerHandle};
use crate::protocol::{self, FrameAccumulator};
use crate::scheduler::CommandScheduler;

/// Shared scan state: scheduler, fuel model and configuration.
///
/// One mutex guards the whole of it so a decode-and-advance cycle in the
/// poller never interleaves with an engine-side mutation.
pub(crate) struct ScanState {
    pub(crate) scheduler: CommandScheduler,
    pub(crate) fuel: FuelEstimator,
    pub(crate) displacement_cc: u32,
}

/// An ELM327 (or compatible) OBD-II adapter session.
///
/// Construct through [`Elm327Builder`](crate::Elm327Builder). Cloning is not
/// supported; share the engine behind an `Arc` if multiple tasks need it.
pub struct Elm327Engine {
    transport: Arc<Mutex<Box<dyn Transport>>>,
    state: Arc<Mutex<ScanState>>,
    event_tx: broadcast::Sender<ScanEvent>,
    poller: Mutex<Option<PollerHandle>>,
    command_timeout: Duration,
}

impl Elm327Engine {
    pub(crate) fn new(
        transport: Box<dyn Transport>,
        rotation: Vec<String>,
        displacement_cc: u32,
        command_timeout: Duration,
        event_capacity: usize,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(event_capacity);
        Self {
            transport: Arc::new(Mutex::new(transport)),
            state: Arc::new(Mutex::new(ScanState {
                scheduler: CommandScheduler::new(rotation),
                fuel: FuelEstimator::new(),
                displacement_cc,
            })),
            event_tx,
            poller: Mutex::new(None),
            command_timeout,
        }
    }

    /// Subscribe to scan events.
    ///
    /// Each subscriber gets an independent receiver; slow subscribers that
    /// fall behind the channel capacity see `Lagged` and miss events rather
    /// than stalling the scan.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.event_tx.subscribe()
    }

    /// Send one command and wait for its cleaned response.
    ///
    /// This is the direct, synchronous mode used during adapter discovery
    /// and setup (`ATZ`, `ATE0`, protocol selection). `SEARCHING` banners
    /// are drained silently; the first real frame is returned, which may be
    /// an empty string when the adapter answered with only `OK` or a prompt.
    ///
    /// Fails with [`Error::NotConnected`] while a scan is running, because
    /// the poller task owns the transport then.
    pub async fn probe(&self, cmd: &str) -> Result<String> {
        let bytes = protocol::encode_command(cmd);
        let mut transport = self.transport.lock().await;
        if !transport.is_connected() {
            return Err(Error::NotConnected);
        }

        debug!(cmd, "probe");
        transport.send(&bytes).await?;

        let mut acc = FrameAccumulator::new();
        let mut buf = [0u8; 256];
        loop {
            let n = tokio::time::timeout(
                self.command_timeout,
                transport.receive(&mut buf, self.command_timeout),
            )
            .await
            .map_err(|_| Error::Timeout)??;
            acc.feed(&buf[..n]);
            if let Some(cleaned) = acc.next_response() {
                if !cleaned.is_empty() {
                    let _ = self.event_tx.send(ScanEvent::StatusChanged(cleaned.clone()));
                }
                return Ok(cleaned);
            }
        }
    }

    /// Start the background scan cycle.
    ///
    /// Moves the transport into a poller task, clears the fuel history and
    /// sends the first command of the rotation. Calling while a scan is
    /// already running is a no-op.
    pub async fn start_scan(&self) -> Result<()> {
        let mut poller_guard = self.poller.lock().await;
        if poller_guard.is_some() {
            debug!("scan already running");
            return Ok(());
        }

        {
            let mut st = self.state.lock().await;
            st.fuel.reset();
        }

        let transport = {
            let mut guard = self.transport.lock().await;
            if !guard.is_connected() {
                return Err(Error::NotConnected);
            }
            std::mem::replace(&mut *guard, Box::new(DisconnectedTransport))
        };

        info!("starting scan cycle");
        let _ = self.event_tx.send(ScanEvent::Connected);
        let handle = poller::spawn_poller(transport, self.state.clone(), self.event_tx.clone());
        *poller_guard = Some(handle);
        Ok(())
    }

    /// Stop the background scan cycle and reclaim the transport.
    ///
    /// Idempotent: stopping when no scan is running is a no-op. Any response
    /// frame still in flight when this returns is discarded by the poller.
    pub async fn stop_scan(&self) -> Result<()> {
        let handle = { self.poller.lock().await.take() };
        let Some(handle) = handle else {
            return Ok(());
        };

        self.state.lock().await.scheduler.stop();

        info!("stopping scan cycle");
        let transport = handle.shutdown().await?;
        *self.transport.lock().await = transport;
        Ok(())
    }

    /// Whether a scan cycle is currently running.
    pub async fn is_scanning(&self) -> bool {
        self.poller.lock().await.is_some()
    }

    /// Update the engine displacement used by the fallback fuel model.
    ///
    /// Takes effect on the very next estimate, mid-scan included.
    pub async fn set_engine_displacement(&self, displacement_cc: u32) {
        self.state.lock().await.displacement_cc = displacement_cc;
    }

    /// Configured engine displacement in cubic centimetres.
    pub async fn engine_displacement(&self) -> u32 {
        self.state.lock().await.displacement_cc
    }

    /// Clear the fuel-consumption history so the running average starts over.
    pub async fn reset_fuel_history(&self) {
        self.state.lock().await.fuel.reset();
    }

    /// Stop any running scan and close the transport.
    pub async fn close(&self) -> Result<()> {
        self.stop_scan().await?;
        let mut transport = self.transport.lock().await;
        transport.close().await?;
        let _ = self.event_tx.send(ScanEvent::Disconnected);
        info!("adapter session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands;
    use obdlink_core::Unit;
    use obdlink_test_harness::MockTransport;

    fn engine_with(mock: MockTransport, rotation: Vec<String>) -> Elm327Engine {
        Elm327Engine::new(
            Box::new(mock),
            rotation,
            2000,
            Duration::from_secs(1),
            64,
        )
    }

    async fn next_event(rx: &mut broadcast::Receiver<ScanEvent>) -> ScanEvent {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed")
    }

    #[tokio::test]
    async fn probe_returns_cleaned_response() {
        let mut mock = MockTransport::new();
        mock.expect(b"ATRV\r", b"12.5V\r\r>");
        let engine = engine_with(mock, Vec::new());

        let response = engine.probe(commands::VOLTAGE).await.unwrap();
        assert_eq!(response, "125V");
    }

    #[tokio::test]
    async fn probe_drains_searching_banner() {
        let mut mock = MockTransport::new();
        mock.expect(b"010C\r", b"SEARCHING...\r41 0C 1A F8\r\r>");
        let engine = engine_with(mock, Vec::new());

        let response = engine.probe("010C").await.unwrap();
        assert_eq!(response, "41 0C 1A F8");
    }

    #[tokio::test]
    async fn probe_emits_status_event() {
        let mut mock = MockTransport::new();
        mock.expect(b"ATE0\r", b"ATE0 OK\r>");
        let engine = engine_with(mock, Vec::new());
        let mut events = engine.subscribe();

        let response = engine.probe("ATE0").await.unwrap();
        assert_eq!(response, "ATE0");
        match next_event(&mut events).await {
            ScanEvent::StatusChanged(text) => assert_eq!(text, "ATE0"),
            other => panic!("expected StatusChanged, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn scan_cycle_emits_measurements_and_fuel() {
        let mut mock = MockTransport::new();
        mock.expect(b"ATRV\r", b"12.5V\r>");
        mock.expect(b"010C\r", b"41 0C 1A F8\r>");
        mock.expect(b"010D\r", b"41 0D 64\r>");
        let rotation = vec!["ATRV".to_string(), "010C".to_string(), "010D".to_string()];
        let engine = engine_with(mock, rotation);
        let mut events = engine.subscribe();

        engine.start_scan().await.unwrap();

        assert!(matches!(next_event(&mut events).await, ScanEvent::Connected));

        match next_event(&mut events).await {
            ScanEvent::StatusChanged(text) => assert_eq!(text, "125V"),
            other => panic!("expected StatusChanged, got {other:?}"),
        }
        match next_event(&mut events).await {
            ScanEvent::VoltageChanged { volts } => assert_eq!(volts, 12.5),
            other => panic!("expected VoltageChanged, got {other:?}"),
        }

        match next_event(&mut events).await {
            ScanEvent::StatusChanged(text) => assert_eq!(text, "41 0C 1A F8"),
            other => panic!("expected StatusChanged, got {other:?}"),
        }
        match next_event(&mut events).await {
            ScanEvent::MeasurementReady(m) => {
                assert_eq!(m.pid, 0x0C);
                assert_eq!(m.value, 1722.0);
                assert_eq!(m.unit, Unit::Rpm);
            }
            other => panic!("expected MeasurementReady, got {other:?}"),
        }

        match next_event(&mut events).await {
            ScanEvent::StatusChanged(text) => assert_eq!(text, "41 0D 64"),
            other => panic!("expected StatusChanged, got {other:?}"),
        }
        match next_event(&mut events).await {
            ScanEvent::MeasurementReady(m) => {
                assert_eq!(m.pid, 0x0D);
                assert_eq!(m.value, 100.0);
            }
            other => panic!("expected MeasurementReady, got {other:?}"),
        }
        // Speed is a fuel trigger; with MAF and load at zero the fallback
        // model floors at 1 L/h.
        match next_event(&mut events).await {
            ScanEvent::FuelDisplayChanged(display) => {
                assert_eq!(display.instant_lph, 1.0);
                assert_eq!(display.litres_per_100km, Some(1.0));
            }
            other => panic!("expected FuelDisplayChanged, got {other:?}"),
        }

        engine.stop_scan().await.unwrap();
    }

    #[tokio::test]
    async fn probe_fails_while_scanning() {
        let mut mock = MockTransport::new();
        mock.expect(b"ATRV\r", b"12.5V\r>");
        let engine = engine_with(mock, vec!["ATRV".to_string()]);

        engine.start_scan().await.unwrap();
        assert!(engine.is_scanning().await);
        match engine.probe("ATZ").await {
            Err(Error::NotConnected) => {}
            other => panic!("expected NotConnected, got {other:?}"),
        }
        engine.stop_scan().await.unwrap();
    }

    #[tokio::test]
    async fn stop_scan_is_idempotent() {
        let mut mock = MockTransport::new();
        mock.expect(b"ATRV\r", b"12.5V\r>");
        let engine = engine_with(mock, vec!["ATRV".to_string()]);

        engine.stop_scan().await.unwrap();
        engine.start_scan().await.unwrap();
        engine.stop_scan().await.unwrap();
        engine.stop_scan().await.unwrap();
        assert!(!engine.is_scanning().await);
    }

    #[tokio::test]
    async fn start_scan_twice_is_noop() {
        let mut mock = MockTransport::new();
        mock.expect(b"ATRV\r", b"12.5V\r>");
        let engine = engine_with(mock, vec!["ATRV".to_string()]);

        engine.start_scan().await.unwrap();
        engine.start_scan().await.unwrap();
        engine.stop_scan().await.unwrap();
    }

    #[tokio::test]
    async fn transport_survives_scan_stop() {
        let mut mock = MockTransport::new();
        mock.expect(b"ATRV\r", b"12.5V\r>");
        mock.expect(b"ATZ\r", b"ELM327 v1.5\r>");
        let engine = engine_with(mock, vec!["ATRV".to_string()]);

        engine.start_scan().await.unwrap();
        // Give the poller time to run the first exchange.
        tokio::time::sleep(Duration::from_millis(100)).await;
        engine.stop_scan().await.unwrap();

        // Direct probing works again on the reclaimed transport.
        let response = engine.probe("ATZ").await.unwrap();
        assert_eq!(response, "ELM327 v15");
    }

    #[tokio::test]
    async fn displacement_updates_apply() {
        let mock = MockTransport::new();
        let engine = engine_with(mock, Vec::new());
        assert_eq!(engine.engine_displacement().await, 2000);
        engine.set_engine_displacement(1600).await;
        assert_eq!(engine.engine_displacement().await, 1600);
    }
}
