//! Fuel consumption estimation.
//!
//! When the vehicle reports PID `5E` (engine fuel rate) directly, that value
//! is authoritative and this module just tracks its running average. Many
//! vehicles do not implement `5E`; for those, instantaneous consumption is
//! estimated from mass air flow and calculated engine load, scaled by the
//! configured engine displacement:
//!
//! ```text
//! coeff      = (displacement_cc / 1000) / 714
//! instant    = MAF * load * coeff + 1        (L/h)
//! per 100 km = instant * 100 / speed         (clamped to 99)
//! ```
//!
//! The first direct `5E` reading permanently disables the fallback model for
//! the life of the estimator, so the two sources never mix in the history.

use obdlink_core::{FuelDisplay, Measurement};

use crate::pid;

/// Divisor in the fallback fuel-rate model.
pub const FALLBACK_DIVISOR: f64 = 714.0;

/// Ceiling for the L/100km display value.
pub const PER_100KM_CEILING: f64 = 99.0;

/// Running fuel-consumption estimator.
///
/// Feed every decoded [`Measurement`] through
/// [`on_measurement`](Self::on_measurement); it returns a [`FuelDisplay`]
/// whenever a new consumption figure can be published.
#[derive(Debug, Default)]
pub struct FuelEstimator {
    history: Vec<f64>,
    has_direct_fuel_rate: bool,
    last_maf: f64,
    last_load: f64,
    last_speed: f64,
}

impl FuelEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once a direct PID `5E` reading has been seen.
    pub fn has_direct_fuel_rate(&self) -> bool {
        self.has_direct_fuel_rate
    }

    /// Running average over every instantaneous figure recorded so far.
    pub fn average(&self) -> Option<f64> {
        if self.history.is_empty() {
            None
        } else {
            Some(self.history.iter().sum::<f64>() / self.history.len() as f64)
        }
    }

    /// Clear the consumption history. Cached sensor values and the
    /// direct-rate flag survive; only the average starts over.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Ingest one decoded measurement.
    ///
    /// `displacement_cc` is read fresh on every call so a configuration
    /// change takes effect on the very next estimate.
    pub fn on_measurement(
        &mut self,
        measurement: &Measurement,
        displacement_cc: u32,
    ) -> Option<FuelDisplay> {
        match measurement.pid {
            pid::PID_FUEL_RATE => {
                self.has_direct_fuel_rate = true;
                self.history.push(measurement.value);
                Some(FuelDisplay {
                    instant_lph: measurement.value,
                    average_lph: self.mean_after_push(),
                    litres_per_100km: None,
                })
            }
            pid::PID_MAF => {
                self.last_maf = measurement.value;
                None
            }
            pid::PID_ENGINE_LOAD => {
                self.last_load = measurement.value;
                self.estimate(displacement_cc)
            }
            pid::PID_SPEED => {
                self.last_speed = measurement.value;
                self.estimate(displacement_cc)
            }
            pid::PID_RPM => self.estimate(displacement_cc),
            _ => None,
        }
    }

    fn estimate(&mut self, displacement_cc: u32) -> Option<FuelDisplay> {
        if self.has_direct_fuel_rate {
            return None;
        }
        // A stopped vehicle would divide by zero below.
        if self.last_speed <= 0.0 {
            return None;
        }
        let coeff = (displacement_cc as f64 / 1000.0) / FALLBACK_DIVISOR;
        let instant = self.last_maf * self.last_load * coeff + 1.0;
        let per_100km = (instant * 100.0 / self.last_speed).min(PER_100KM_CEILING);
        self.history.push(instant);
        Some(FuelDisplay {
            instant_lph: instant,
            average_lph: self.mean_after_push(),
            litres_per_100km: Some(per_100km),
        })
    }

    fn mean_after_push(&self) -> f64 {
        self.history.iter().sum::<f64>() / self.history.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obdlink_core::Unit;

    fn m(pid: u8, value: f64) -> Measurement {
        Measurement {
            pid,
            value,
            unit: Unit::Raw,
        }
    }

    #[test]
    fn fallback_estimate_from_maf_load_and_speed() {
        let mut fuel = FuelEstimator::new();
        assert!(fuel.on_measurement(&m(pid::PID_MAF, 10.0), 2000).is_none());
        assert!(fuel
            .on_measurement(&m(pid::PID_ENGINE_LOAD, 50.0), 2000)
            .is_none()); // speed still zero
        let display = fuel
            .on_measurement(&m(pid::PID_SPEED, 100.0), 2000)
            .unwrap();
        let coeff = 2.0 / FALLBACK_DIVISOR;
        let expected = 10.0 * 50.0 * coeff + 1.0;
        assert!((display.instant_lph - expected).abs() < 1e-9);
        // At exactly 100 km/h the L/100km figure equals the instant rate.
        assert!((display.litres_per_100km.unwrap() - expected).abs() < 1e-9);
        assert_eq!(display.average_lph, display.instant_lph);
    }

    #[test]
    fn zero_speed_suppresses_estimate() {
        let mut fuel = FuelEstimator::new();
        fuel.on_measurement(&m(pid::PID_MAF, 10.0), 2000);
        assert!(fuel
            .on_measurement(&m(pid::PID_ENGINE_LOAD, 50.0), 2000)
            .is_none());
        assert!(fuel.on_measurement(&m(pid::PID_RPM, 800.0), 2000).is_none());
        assert!(fuel.average().is_none());
    }

    #[test]
    fn per_100km_clamped_at_ceiling() {
        let mut fuel = FuelEstimator::new();
        fuel.on_measurement(&m(pid::PID_MAF, 100.0), 2000);
        fuel.on_measurement(&m(pid::PID_ENGINE_LOAD, 100.0), 2000);
        let display = fuel.on_measurement(&m(pid::PID_SPEED, 5.0), 2000).unwrap();
        assert_eq!(display.litres_per_100km, Some(PER_100KM_CEILING));
    }

    #[test]
    fn direct_fuel_rate_disables_fallback() {
        let mut fuel = FuelEstimator::new();
        let display = fuel.on_measurement(&m(pid::PID_FUEL_RATE, 8.0), 2000).unwrap();
        assert_eq!(display.instant_lph, 8.0);
        assert_eq!(display.litres_per_100km, None);
        assert!(fuel.has_direct_fuel_rate());

        fuel.on_measurement(&m(pid::PID_MAF, 10.0), 2000);
        fuel.on_measurement(&m(pid::PID_ENGINE_LOAD, 50.0), 2000);
        assert!(fuel
            .on_measurement(&m(pid::PID_SPEED, 100.0), 2000)
            .is_none());

        let display = fuel.on_measurement(&m(pid::PID_FUEL_RATE, 12.0), 2000).unwrap();
        assert_eq!(display.instant_lph, 12.0);
        assert_eq!(display.average_lph, 10.0);
    }

    #[test]
    fn displacement_change_applies_immediately() {
        let mut fuel = FuelEstimator::new();
        fuel.on_measurement(&m(pid::PID_MAF, 10.0), 2000);
        fuel.on_measurement(&m(pid::PID_ENGINE_LOAD, 50.0), 2000);
        let at_2000 = fuel
            .on_measurement(&m(pid::PID_SPEED, 100.0), 2000)
            .unwrap();
        let at_1000 = fuel
            .on_measurement(&m(pid::PID_RPM, 2500.0), 1000)
            .unwrap();
        let ratio = (at_2000.instant_lph - 1.0) / (at_1000.instant_lph - 1.0);
        assert!((ratio - 2.0).abs() < 1e-9);
    }

    #[test]
    fn reset_clears_average_only() {
        let mut fuel = FuelEstimator::new();
        fuel.on_measurement(&m(pid::PID_MAF, 10.0), 2000);
        fuel.on_measurement(&m(pid::PID_ENGINE_LOAD, 50.0), 2000);
        fuel.on_measurement(&m(pid::PID_SPEED, 100.0), 2000);
        assert!(fuel.average().is_some());

        fuel.reset();
        assert!(fuel.average().is_none());

        // Cached MAF/load/speed survive: the next trigger estimates again.
        let display = fuel.on_measurement(&m(pid::PID_RPM, 2000.0), 2000).unwrap();
        assert_eq!(display.average_lph, display.instant_lph);
    }
}
