//! Monitor live engine data from an ELM327 adapter.
//!
//! Demonstrates adapter setup in direct mode, then a background scan with
//! event subscription. This is the skeleton of a live dashboard: decoded
//! measurements, battery voltage and fuel figures arrive as events.
//!
//! # Requirements
//!
//! - A WiFi ELM327 adapter (or adjust the address for your setup; most
//!   clones listen on 192.168.0.10:35000)
//! - Ignition on, engine running for meaningful data
//!
//! # Usage
//!
//! ```sh
//! cargo run -p obdlink --example monitor_scan
//! ```

use std::time::Duration;

use obdlink::{Elm327Builder, ScanEvent};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let addr = "192.168.0.10:35000";
    println!("Connecting to adapter at {addr}...");

    let engine = Elm327Builder::new()
        .displacement_cc(1600)
        .command_timeout(Duration::from_secs(2))
        .connect_tcp(addr)
        .await?;

    // Adapter setup: reset, then turn echo off so responses come back clean.
    let ident = engine.probe("ATZ").await?;
    println!("Adapter: {ident}");
    engine.probe("ATE0").await?;

    let mut events = engine.subscribe();
    engine.start_scan().await?;
    println!("Scanning. Monitoring for 60 seconds...\n");

    let deadline = tokio::time::Instant::now() + Duration::from_secs(60);
    let start = tokio::time::Instant::now();

    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            break;
        }

        match tokio::time::timeout(remaining, events.recv()).await {
            Ok(Ok(event)) => {
                let elapsed = start.elapsed();
                let timestamp = format!("{:>4}.{:03}s", elapsed.as_secs(), elapsed.subsec_millis());

                match event {
                    ScanEvent::MeasurementReady(m) => {
                        println!("{timestamp} {m}");
                    }
                    ScanEvent::VoltageChanged { volts } => {
                        println!("{timestamp} battery {volts:.1} V");
                    }
                    ScanEvent::FuelDisplayChanged(fuel) => {
                        match fuel.litres_per_100km {
                            Some(per_100km) => println!(
                                "{timestamp} fuel {:.1} L/h (avg {:.1}) {per_100km:.1} L/100km",
                                fuel.instant_lph, fuel.average_lph
                            ),
                            None => println!(
                                "{timestamp} fuel {:.1} L/h (avg {:.1})",
                                fuel.instant_lph, fuel.average_lph
                            ),
                        }
                    }
                    ScanEvent::StatusChanged(_) => {
                        // Raw responses; noisy, skip.
                    }
                    ScanEvent::Connected => println!("{timestamp} connected"),
                    ScanEvent::Disconnected => {
                        println!("{timestamp} disconnected");
                        break;
                    }
                }
            }
            Ok(Err(tokio::sync::broadcast::error::RecvError::Lagged(n))) => {
                println!("(missed {n} events due to lag)");
            }
            Ok(Err(tokio::sync::broadcast::error::RecvError::Closed)) => {
                println!("Event channel closed.");
                break;
            }
            Err(_) => break,
        }
    }

    engine.stop_scan().await?;
    engine.close().await?;
    println!("\nMonitoring complete.");
    Ok(())
}
