//! Asynchronous scan event types.
//!
//! Events are emitted by the protocol engine through a
//! `tokio::sync::broadcast` channel as responses are decoded. Dashboards
//! and loggers subscribe to these instead of wiring callbacks into the
//! decode pipeline.

use crate::types::{FuelDisplay, Measurement};

/// An event emitted by the protocol engine.
///
/// Delivery is best-effort through a bounded broadcast channel; a slow
/// subscriber may miss events during a fast polling rotation.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// A PID response was decoded into a physical value.
    MeasurementReady(Measurement),

    /// A cleaned adapter response line, reported verbatim.
    ///
    /// Every non-empty cleaned response produces one of these, including
    /// responses that are additionally PID-decoded.
    StatusChanged(String),

    /// Fuel consumption figures were refreshed, either from direct fuel
    /// rate telemetry or from the fallback model.
    FuelDisplayChanged(FuelDisplay),

    /// The adapter reported its battery voltage (`ATRV` probe).
    VoltageChanged {
        /// Battery voltage in volts.
        volts: f64,
    },

    /// Successfully connected to the adapter.
    Connected,

    /// Connection to the adapter was lost or closed.
    Disconnected,
}
