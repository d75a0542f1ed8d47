//! Core types used throughout obdlink.
//!
//! These types carry decoded vehicle telemetry from the protocol engine to
//! the presentation layer without exposing any ELM327 wire details.

use std::fmt;

/// Physical unit of a decoded measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Percent (engine load, throttle, pedal position, torque).
    Percent,
    /// Degrees Celsius.
    Celsius,
    /// Kilopascal.
    KiloPascal,
    /// Engine revolutions per minute.
    Rpm,
    /// Kilometres per hour.
    KmPerHour,
    /// Grams per second (mass air flow).
    GramsPerSecond,
    /// Kilometres (odometer-style distances).
    Kilometres,
    /// Litres per hour (fuel rate).
    LitresPerHour,
    /// Volts (adapter battery voltage probe).
    Volts,
    /// Unscaled raw byte value, for PIDs without a decode formula.
    Raw,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Unit::Percent => "%",
            Unit::Celsius => "\u{b0}C",
            Unit::KiloPascal => "kPa",
            Unit::Rpm => "rpm",
            Unit::KmPerHour => "km/h",
            Unit::GramsPerSecond => "g/s",
            Unit::Kilometres => "km",
            Unit::LitresPerHour => "l/h",
            Unit::Volts => "V",
            Unit::Raw => "",
        };
        write!(f, "{s}")
    }
}

/// A decoded physical value for a single PID.
///
/// Produced by the PID decoder from a mode-1 response; immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// The Parameter ID this value was decoded from (0x00-0xFF).
    pub pid: u8,
    /// The decoded physical value.
    pub value: f64,
    /// The physical unit of `value`.
    pub unit: Unit,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PID {:02X}: {} {}", self.pid, self.value, self.unit)
    }
}

/// Fuel consumption figures for the presentation layer.
///
/// `litres_per_100km` is populated only by the fallback model; direct fuel
/// rate telemetry (PID 0x5E) reports instantaneous and average rate only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelDisplay {
    /// Instantaneous fuel rate in litres per hour.
    pub instant_lph: f64,
    /// Running average fuel rate over the session, litres per hour.
    pub average_lph: f64,
    /// Consumption in litres per 100 km, when the fallback model computed it.
    pub litres_per_100km: Option<f64>,
}
