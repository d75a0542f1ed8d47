//! Mode-1 PID response decoding.
//!
//! A cleaned mode-1 response looks like `41 0C 1A F8`: the `41` mode echo,
//! the PID, then one or two data bytes (`A`, optionally `B`). [`decode`]
//! applies the standard OBD-II scaling formula for each known PID and
//! produces a [`Measurement`] with the right unit. Unknown PIDs fall through
//! to a raw `A` reading so callers can still see the value.
//!
//! All scaling uses integer arithmetic where the OBD-II formula does, so
//! results truncate exactly the way handheld scan tools display them.

use obdlink_core::{Measurement, Unit};

/// Mode echo prefix on every mode-1 response.
pub const MODE1_RESPONSE: &str = "41";

/// Calculated engine load, percent.
pub const PID_ENGINE_LOAD: u8 = 0x04;
/// Engine coolant temperature, degrees C.
pub const PID_COOLANT_TEMP: u8 = 0x05;
/// Fuel pressure, kPa.
pub const PID_FUEL_PRESSURE: u8 = 0x0A;
/// Intake manifold absolute pressure, kPa.
pub const PID_MANIFOLD_PRESSURE: u8 = 0x0B;
/// Engine RPM.
pub const PID_RPM: u8 = 0x0C;
/// Vehicle speed, km/h.
pub const PID_SPEED: u8 = 0x0D;
/// Intake air temperature, degrees C.
pub const PID_INTAKE_TEMP: u8 = 0x0F;
/// Mass air flow rate, g/s.
pub const PID_MAF: u8 = 0x10;
/// Throttle position, percent.
pub const PID_THROTTLE: u8 = 0x11;
/// Distance travelled with MIL on, km.
pub const PID_DISTANCE_MIL: u8 = 0x21;
/// Fuel rail pressure relative to manifold vacuum, kPa.
pub const PID_RAIL_PRESSURE_VAC: u8 = 0x22;
/// Fuel rail gauge pressure (diesel/GDI), kPa.
pub const PID_RAIL_PRESSURE: u8 = 0x23;
/// Distance travelled since codes cleared, km.
pub const PID_DISTANCE_CLEARED: u8 = 0x31;
/// Ambient air temperature, degrees C.
pub const PID_AMBIENT_TEMP: u8 = 0x46;
/// Relative throttle position, percent.
pub const PID_RELATIVE_THROTTLE: u8 = 0x5A;
/// Engine oil temperature, degrees C.
pub const PID_OIL_TEMP: u8 = 0x5C;
/// Engine fuel rate, L/h.
pub const PID_FUEL_RATE: u8 = 0x5E;
/// Actual engine torque, percent (signed, offset 125).
pub const PID_ENGINE_TORQUE: u8 = 0x62;

/// Split a cleaned response into hex byte tokens.
///
/// Normally the adapter puts a space between bytes and this is plain
/// whitespace splitting. Adapters configured with `ATS0` send one unbroken
/// hex run (`410C1AF8`); when the whole response is a single hex token
/// longer than two characters, it is chunked into byte pairs instead.
///
/// # Example
///
/// ```
/// use obdlink_elm327::pid::split_tokens;
///
/// assert_eq!(split_tokens("41 0C 1A F8"), vec!["41", "0C", "1A", "F8"]);
/// assert_eq!(split_tokens("410C1AF8"), vec!["41", "0C", "1A", "F8"]);
/// ```
pub fn split_tokens(cleaned: &str) -> Vec<&str> {
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    if let [single] = tokens.as_slice() {
        if single.len() > 2 && single.chars().all(|c| c.is_ascii_hexdigit()) {
            return (0..single.len())
                .step_by(2)
                .map(|i| &single[i..(i + 2).min(single.len())])
                .collect();
        }
    }
    tokens
}

/// Decode a tokenised mode-1 response into a [`Measurement`].
///
/// Expects `["41", <pid>, <A>, <B>?]`. Returns `None` when the first token
/// is not the mode-1 echo, the PID or data bytes are missing, or any token
/// fails to parse as hex. A missing `B` byte is treated as zero.
///
/// # Example
///
/// ```
/// use obdlink_elm327::pid::decode;
/// use obdlink_core::Unit;
///
/// let m = decode(&["41", "0C", "1A", "F8"]).unwrap();
/// assert_eq!(m.value, 1722.0);
/// assert_eq!(m.unit, Unit::Rpm);
/// ```
pub fn decode(tokens: &[&str]) -> Option<Measurement> {
    let (first, rest) = tokens.split_first()?;
    if !first.eq_ignore_ascii_case(MODE1_RESPONSE) {
        return None;
    }
    let pid = hex_byte(rest.first()?)?;
    let a = hex_byte(rest.get(1)?)? as u32;
    let b = match rest.get(2) {
        Some(token) => hex_byte(token)? as u32,
        None => 0,
    };

    let (value, unit) = match pid {
        PID_ENGINE_LOAD => ((a * 100 / 255) as f64, Unit::Percent),
        PID_COOLANT_TEMP | PID_INTAKE_TEMP | PID_AMBIENT_TEMP | PID_OIL_TEMP => {
            (a as f64 - 40.0, Unit::Celsius)
        }
        PID_FUEL_PRESSURE => ((a * 3) as f64, Unit::KiloPascal),
        PID_MANIFOLD_PRESSURE => (a as f64, Unit::KiloPascal),
        PID_RPM => (((a * 256 + b) / 4) as f64, Unit::Rpm),
        PID_SPEED => (a as f64, Unit::KmPerHour),
        PID_MAF => (((256 * a + b) / 100) as f64, Unit::GramsPerSecond),
        PID_THROTTLE | PID_RELATIVE_THROTTLE => ((100 * a / 255) as f64, Unit::Percent),
        PID_DISTANCE_MIL | PID_DISTANCE_CLEARED => ((a * 256 + b) as f64, Unit::Kilometres),
        PID_RAIL_PRESSURE_VAC => ((a * 256 + b) as f64 * 0.079, Unit::KiloPascal),
        PID_RAIL_PRESSURE => (((a * 256 + b) * 10) as f64, Unit::KiloPascal),
        PID_FUEL_RATE => (((a * 256 + b) / 20) as f64, Unit::LitresPerHour),
        PID_ENGINE_TORQUE => (a as f64 - 125.0, Unit::Percent),
        _ => (a as f64, Unit::Raw),
    };

    Some(Measurement { pid, value, unit })
}

fn hex_byte(token: &str) -> Option<u8> {
    u8::from_str_radix(token, 16).ok()
}
