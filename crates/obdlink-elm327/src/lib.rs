//! ELM327 protocol engine for OBD-II adapters.
//!
//! This crate implements the command/response protocol spoken by ELM327 and
//! compatible adapters (USB, Bluetooth RFCOMM, WiFi). Commands are short
//! ASCII strings terminated by a carriage return; the adapter answers with
//! one or more `\r`-terminated lines followed by a `>` prompt.
//!
//! The main entry point is [`Elm327Engine`], usually constructed through
//! [`Elm327Builder`]. The engine supports two modes of operation:
//!
//! - **Direct probing** with [`Elm327Engine::probe`]: send one command and
//!   wait for its cleaned response. Used during adapter discovery and setup.
//! - **Background scanning** with [`Elm327Engine::start_scan`]: a poller task
//!   takes ownership of the transport and cycles through a command rotation,
//!   decoding each response and publishing [`ScanEvent`]s to subscribers.
//!
//! ```no_run
//! use obdlink_elm327::Elm327Builder;
//! use std::time::Duration;
//!
//! # async fn example() -> obdlink_core::Result<()> {
//! let engine = Elm327Builder::new()
//!     .displacement_cc(1600)
//!     .command_timeout(Duration::from_secs(1))
//!     .connect_tcp("192.168.0.10:35000")
//!     .await?;
//!
//! let mut events = engine.subscribe();
//! engine.start_scan().await?;
//! while let Ok(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod commands;
pub mod engine;
pub mod fuel;
pub mod pid;
mod poller;
pub mod protocol;
pub mod scheduler;

pub use builder::Elm327Builder;
pub use engine::Elm327Engine;
pub use fuel::FuelEstimator;
pub use protocol::{FrameAccumulator, TrailingBytes};
pub use scheduler::CommandScheduler;

pub use obdlink_core::{Error, FuelDisplay, Measurement, Result, ScanEvent, Unit};
