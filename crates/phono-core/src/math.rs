//! Level and time conversions for DSP.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! - [`db_to_voltage`] / [`voltage_to_db`] - amplitude ratios (20·log10)
//! - [`power_ratio_to_db`] / [`db_to_power_ratio`] - power ratios (10·log10)
//! - [`ms_to_samples`] - time to whole samples

use libm::{log10f, powf};

/// Convert decibels to an amplitude (voltage) ratio.
///
/// # Arguments
/// * `db` - Value in decibels
///
/// # Returns
/// Amplitude ratio (0 dB → 1.0, +20 dB → 10.0)
///
/// # Example
/// ```rust
/// use phono_core::db_to_voltage;
///
/// assert!((db_to_voltage(0.0) - 1.0).abs() < 1e-6);
/// assert!((db_to_voltage(-20.0) - 0.1).abs() < 1e-6);
/// ```
#[inline]
pub fn db_to_voltage(db: f32) -> f32 {
    powf(10.0, db / 20.0)
}

/// Convert an amplitude (voltage) ratio to decibels.
///
/// No floor is applied: `0.0` yields negative infinity and negative input
/// yields NaN, so callers guard meters against silence themselves.
///
/// # Example
/// ```rust
/// use phono_core::voltage_to_db;
///
/// assert!((voltage_to_db(10.0) - 20.0).abs() < 1e-5);
/// ```
#[inline]
pub fn voltage_to_db(voltage: f32) -> f32 {
    20.0 * log10f(voltage)
}

/// Convert a power ratio to decibels.
#[inline]
pub fn power_ratio_to_db(ratio: f32) -> f32 {
    10.0 * log10f(ratio)
}

/// Convert decibels to a power ratio.
#[inline]
pub fn db_to_power_ratio(db: f32) -> f32 {
    powf(10.0, db / 10.0)
}

/// Convert milliseconds to a whole number of samples (truncating).
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> usize {
    let samples = ms * sample_rate / 1000.0;
    if samples > 0.0 { samples as usize } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_voltage_roundtrip() {
        for &v in &[0.001, 0.1, 0.5, 1.0, 2.0, 10.0, 123.4] {
            let back = db_to_voltage(voltage_to_db(v));
            assert!((back - v).abs() / v < 1e-5, "v={v}, back={back}");
        }
    }

    #[test]
    fn test_known_values() {
        assert!((voltage_to_db(1.0)).abs() < 1e-6);
        assert!((voltage_to_db(0.5) + 6.0206).abs() < 1e-3);
        assert!((power_ratio_to_db(100.0) - 20.0).abs() < 1e-5);
        assert!((db_to_power_ratio(3.0) - 1.9953).abs() < 1e-3);
    }

    #[test]
    fn test_voltage_to_db_of_silence() {
        assert!(voltage_to_db(0.0).is_infinite());
    }

    #[test]
    fn test_ms_to_samples() {
        assert_eq!(ms_to_samples(1.0, 48000.0), 48);
        assert_eq!(ms_to_samples(0.75, 48000.0), 36);
        assert_eq!(ms_to_samples(0.5, 44100.0), 22);
        assert_eq!(ms_to_samples(-1.0, 44100.0), 0);
    }
}
