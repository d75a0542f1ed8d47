//! ELM327 command builders and special-response parsers.

use crate::pid;

/// Read the adapter's measured battery voltage.
pub const VOLTAGE: &str = "ATRV";

/// Reset the adapter to power-on defaults.
pub const RESET: &str = "ATZ";

/// Turn command echo off.
pub const ECHO_OFF: &str = "ATE0";

/// Build a mode-1 PID request for the given PID.
///
/// # Example
///
/// ```
/// use obdlink_elm327::commands::pid_request;
///
/// assert_eq!(pid_request(0x0C), "010C");
/// assert_eq!(pid_request(0x5E), "015E");
/// ```
pub fn pid_request(pid: u8) -> String {
    format!("01{pid:02X}")
}

/// The default scan rotation: a voltage probe followed by the core
/// engine-data PIDs. The voltage probe leads the rotation so every cycle
/// refreshes the battery reading.
pub fn default_rotation() -> Vec<String> {
    vec![
        VOLTAGE.to_string(),
        pid_request(pid::PID_RPM),
        pid_request(pid::PID_SPEED),
        pid_request(pid::PID_COOLANT_TEMP),
        pid_request(pid::PID_ENGINE_LOAD),
        pid_request(pid::PID_MAF),
        pid_request(pid::PID_FUEL_RATE),
    ]
}

/// Parse a cleaned `ATRV` response into volts.
///
/// The adapter reports e.g. `12.5V`; after cleanup the decimal point is
/// gone, leaving `125V`. The first two digits are the whole part and the
/// third is tenths. Returns `None` for anything that does not fit that
/// shape, including a command echo containing `ATRV`.
///
/// # Example
///
/// ```
/// use obdlink_elm327::commands::parse_voltage;
///
/// assert_eq!(parse_voltage("125V"), Some(12.5));
/// assert_eq!(parse_voltage("41 0C 1A F8"), None);
/// ```
pub fn parse_voltage(cleaned: &str) -> Option<f64> {
    if cleaned.contains(VOLTAGE) {
        return None;
    }
    let v = cleaned.find('V')?;
    let digits = &cleaned[..v];
    if digits.len() < 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let whole: f64 = digits[..2].parse().ok()?;
    let tenths: f64 = digits[2..3].parse().ok()?;
    Some(whole + tenths / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_request_formats_uppercase_hex() {
        assert_eq!(pid_request(0x04), "0104");
        assert_eq!(pid_request(0x5A), "015A");
    }

    #[test]
    fn parse_voltage_nominal() {
        assert_eq!(parse_voltage("125V"), Some(12.5));
        assert_eq!(parse_voltage("138V"), Some(13.8));
    }

    #[test]
    fn parse_voltage_ignores_extra_precision() {
        // "12.51V" cleans to "1251V": only the first tenth digit counts.
        assert_eq!(parse_voltage("1251V"), Some(12.5));
    }

    #[test]
    fn parse_voltage_rejects_echo() {
        assert_eq!(parse_voltage("ATRV125V"), None);
    }

    #[test]
    fn parse_voltage_rejects_non_voltage() {
        assert_eq!(parse_voltage("41 0D 64"), None);
        assert_eq!(parse_voltage("12V"), None);
        assert_eq!(parse_voltage(""), None);
        assert_eq!(parse_voltage("NO DATA"), None);
    }

    #[test]
    fn default_rotation_leads_with_voltage() {
        let rotation = default_rotation();
        assert_eq!(rotation[0], VOLTAGE);
        assert!(rotation.contains(&"010C".to_string()));
        assert!(rotation.contains(&"015E".to_string()));
    }
}
