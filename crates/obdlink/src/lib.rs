//! # obdlink -- Async OBD-II Diagnostics over ELM327 Adapters
//!
//! `obdlink` is an asynchronous Rust library for reading live engine data
//! from a vehicle through ELM327-compatible OBD-II adapters (USB, Bluetooth
//! RFCOMM, WiFi). It is designed for dashboards, trip computers, and fleet
//! telemetry where a steady stream of decoded sensor values matters more
//! than one-shot queries.
//!
//! ## Quick Start
//!
//! Add `obdlink` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! obdlink = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! Connect to a WiFi adapter and stream engine data:
//!
//! ```no_run
//! use obdlink::{Elm327Builder, ScanEvent};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = Elm327Builder::new()
//!         .displacement_cc(1600)
//!         .connect_tcp("192.168.0.10:35000")
//!         .await?;
//!
//!     // Adapter setup runs in direct mode.
//!     engine.probe("ATZ").await?;
//!     engine.probe("ATE0").await?;
//!
//!     let mut events = engine.subscribe();
//!     engine.start_scan().await?;
//!
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             ScanEvent::MeasurementReady(m) => println!("{m}"),
//!             ScanEvent::FuelDisplayChanged(f) => {
//!                 println!("fuel: {:.1} L/h avg {:.1}", f.instant_lph, f.average_lph)
//!             }
//!             other => println!("{other:?}"),
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                  | Purpose                                          |
//! |------------------------|--------------------------------------------------|
//! | `obdlink-core`         | [`Transport`] trait, [`ScanEvent`], types, errors |
//! | `obdlink-transport`    | Serial and TCP transport implementations          |
//! | `obdlink-elm327`       | ELM327 protocol engine: framing, PIDs, fuel model |
//! | `obdlink-test-harness` | Mock transports for hardware-free testing         |
//! | **`obdlink`**          | This facade crate -- re-exports everything        |
//!
//! ## Two Modes of Operation
//!
//! - **Direct probing** ([`Elm327Engine::probe`]): one command, one cleaned
//!   response. Used for adapter reset, echo-off, protocol selection and
//!   capability discovery before a scan starts.
//! - **Background scanning** ([`Elm327Engine::start_scan`]): a poller task
//!   owns the transport and cycles through the command rotation, keeping
//!   exactly one request outstanding. Decoded values arrive as
//!   [`ScanEvent`]s on a broadcast channel.
//!
//! ## Fuel Consumption
//!
//! Vehicles that implement PID `5E` report fuel rate directly. For the many
//! that do not, the engine estimates consumption from mass air flow and
//! calculated load, scaled by the configured engine displacement. See
//! [`elm327::fuel`] for the model.

pub use obdlink_core::*;

/// ELM327 protocol engine.
///
/// Provides [`Elm327Engine`](elm327::Elm327Engine) and
/// [`Elm327Builder`](elm327::Elm327Builder), plus the protocol building
/// blocks (framing, PID decoding, fuel estimation, scheduling) for callers
/// that want to assemble their own loop.
pub mod elm327 {
    pub use obdlink_elm327::*;
}

/// Serial and TCP transports.
pub mod transport {
    pub use obdlink_transport::*;
}

pub use obdlink_elm327::{Elm327Builder, Elm327Engine};
pub use obdlink_transport::{SerialTransport, TcpTransport};
