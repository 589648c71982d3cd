//! Conversion of raw counts to lux.
//!
//! All functions are pure; the sensor struct feeds them its current gain and
//! integration time.
use crate::types::{Gain, IntegrationTime};

/// Lux per count at the highest gain and the longest integration time.
pub const MAX_RESOLUTION_LUX: f64 = 0.0036;
/// Lux reading at which the output saturates, same settings as above.
pub const MIN_OVERFLOW_VALUE_LUX: f64 = 236.0;
/// Above this many lux the response is no longer linear.
pub const HIGH_LUX_THRESHOLD: f64 = 100.0;
pub const MAX_OUTPUT: u16 = 0xFFFF;

/// How many times coarser than the best resolution the given settings are.
/// Both ratios are powers of two, so integer division is exact.
fn resolution_scale(gain: Gain, integration_time: IntegrationTime) -> u32 {
    let gain_scale = Gain::MAX.eighths() / gain.eighths();
    let time_scale = IntegrationTime::MAX.millis() / integration_time.millis();
    gain_scale * time_scale
}

/// Lux represented by a single count.
pub fn lux_resolution(gain: Gain, integration_time: IntegrationTime) -> f64 {
    MAX_RESOLUTION_LUX * f64::from(resolution_scale(gain, integration_time))
}

/// Lux at which the output saturates with the given settings.
pub fn lux_overflow_value(gain: Gain, integration_time: IntegrationTime) -> f64 {
    MIN_OVERFLOW_VALUE_LUX * f64::from(resolution_scale(gain, integration_time))
}

/// Calibration polynomial for readings above [`HIGH_LUX_THRESHOLD`].
///
/// Each power is computed first, then scaled, then the terms are summed from
/// left to right. Keep that order: the result is compared bit for bit.
pub fn high_lux_correction(x: f64) -> f64 {
    6.0135e-13 * x.powf(4.0) - 9.3924e-9 * x.powf(3.0) + 8.1488e-5 * x.powf(2.0) + 1.0023 * x
}

pub fn raw_to_lux(raw: u16, gain: Gain, integration_time: IntegrationTime) -> f64 {
    let lux = f64::from(raw) * lux_resolution(gain, integration_time);
    if lux > HIGH_LUX_THRESHOLD {
        high_lux_correction(lux)
    } else {
        lux
    }
}

pub fn is_overflowing(raw: u16) -> bool {
    raw >= MAX_OUTPUT
}

pub fn is_underflowing(raw: u16) -> bool {
    raw == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finest_resolution_at_max_settings() {
        assert_eq!(
            lux_resolution(Gain::Double, IntegrationTime::Time800ms),
            MAX_RESOLUTION_LUX
        );
        assert_eq!(
            lux_resolution(Gain::Unit, IntegrationTime::Time800ms),
            MAX_RESOLUTION_LUX * 2.0
        );
        assert_eq!(
            lux_overflow_value(Gain::Double, IntegrationTime::Time800ms),
            MIN_OVERFLOW_VALUE_LUX
        );
    }

    #[test]
    fn coarsest_resolution_at_min_settings() {
        // 16 from the gain, 32 from the integration time
        assert_eq!(
            lux_resolution(Gain::Eighth, IntegrationTime::Time25ms),
            MAX_RESOLUTION_LUX * 512.0
        );
        assert_eq!(
            lux_overflow_value(Gain::Eighth, IntegrationTime::Time25ms),
            MIN_OVERFLOW_VALUE_LUX * 512.0
        );
    }

    #[test]
    fn correction_regression_at_one_thousand() {
        let expected =
            6.0135e-13 * 1.0e12 - 9.3924e-9 * 1.0e9 + 8.1488e-5 * 1.0e6 + 1.0023 * 1000.0;
        assert_eq!(high_lux_correction(1000.0), expected);
        assert!((high_lux_correction(1000.0) - 1074.99695).abs() < 1e-6);
    }

    #[test]
    fn linear_below_threshold() {
        // 0.0576 lux per count at gain 1, 100ms
        let lux = raw_to_lux(1000, Gain::Unit, IntegrationTime::Time100ms);
        assert_eq!(lux, 1000.0 * 0.0576);
        assert_eq!(raw_to_lux(0, Gain::Unit, IntegrationTime::Time100ms), 0.0);
    }

    #[test]
    fn corrected_above_threshold() {
        let raw = 10_000;
        let linear = f64::from(raw) * lux_resolution(Gain::Unit, IntegrationTime::Time100ms);
        assert!(linear > HIGH_LUX_THRESHOLD);
        assert_eq!(
            raw_to_lux(raw, Gain::Unit, IntegrationTime::Time100ms),
            high_lux_correction(linear)
        );
    }

    #[test]
    fn monotonic_over_every_count() {
        for &gain in Gain::ALL.iter() {
            for &time in IntegrationTime::ALL.iter() {
                let mut previous = raw_to_lux(0, gain, time);
                for raw in 1..=u16::MAX {
                    let lux = raw_to_lux(raw, gain, time);
                    assert!(
                        lux >= previous,
                        "lux dropped at raw {} for gain {} and {}",
                        raw,
                        gain,
                        time
                    );
                    previous = lux;
                }
            }
        }
    }

    #[test]
    fn saturation_flags() {
        assert!(is_overflowing(0xFFFF));
        assert!(!is_overflowing(0xFFFE));
        assert!(is_underflowing(0));
        assert!(!is_underflowing(1));
    }
}
