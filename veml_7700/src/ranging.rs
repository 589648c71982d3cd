//! Decisions of the auto-ranging loop.
//!
//! Ranging first walks the integration time toward [`REFERENCE_INTEGRATION_TIME`],
//! then the gain, then the integration time again. Gain changes add noise, so
//! they only happen once the integration time sits at the reference.
use crate::types::{Gain, IntegrationTime};

/// Below this many counts the signal is too weak to be trusted.
pub const LOW_OUTPUT_LIMIT: u16 = 100;
/// Above this many counts the sensor leaves its linear band.
pub const HIGH_OUTPUT_LIMIT: u16 = 10_000;
pub const REFERENCE_INTEGRATION_TIME: IntegrationTime = IntegrationTime::Time100ms;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SamplingPerformance {
    /// Weak signal and the settings can still be raised.
    LowerEnd,
    Sweet,
    /// Strong signal and the settings can still be lowered.
    UpperEnd,
}

/// A single move along the gain or integration time ladder.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    IncreaseGain,
    DecreaseGain,
    IncreaseIntegrationTime,
    DecreaseIntegrationTime,
}

pub fn classify(raw: u16, gain: Gain, integration_time: IntegrationTime) -> SamplingPerformance {
    if raw < LOW_OUTPUT_LIMIT && (gain < Gain::MAX || integration_time < IntegrationTime::MAX) {
        SamplingPerformance::LowerEnd
    } else if raw > HIGH_OUTPUT_LIMIT
        && (gain > Gain::MIN || integration_time > IntegrationTime::MIN)
    {
        SamplingPerformance::UpperEnd
    } else {
        SamplingPerformance::Sweet
    }
}

/// The adjustment to make next, or `None` when there is nothing left to try.
pub fn next_step(
    performance: SamplingPerformance,
    gain: Gain,
    integration_time: IntegrationTime,
) -> Option<Step> {
    match performance {
        SamplingPerformance::Sweet => None,
        SamplingPerformance::UpperEnd => {
            if integration_time > REFERENCE_INTEGRATION_TIME {
                Some(Step::DecreaseIntegrationTime)
            } else if gain > Gain::MIN {
                Some(Step::DecreaseGain)
            } else if integration_time > IntegrationTime::MIN {
                Some(Step::DecreaseIntegrationTime)
            } else {
                None
            }
        }
        SamplingPerformance::LowerEnd => {
            if integration_time < REFERENCE_INTEGRATION_TIME {
                Some(Step::IncreaseIntegrationTime)
            } else if gain < Gain::MAX {
                Some(Step::IncreaseGain)
            } else if integration_time < IntegrationTime::MAX {
                Some(Step::IncreaseIntegrationTime)
            } else {
                None
            }
        }
    }
}

/// Settings after applying `step`. Boundaries are sticky.
pub fn apply_step(
    step: Step,
    gain: Gain,
    integration_time: IntegrationTime,
) -> (Gain, IntegrationTime) {
    match step {
        Step::IncreaseGain => (gain.higher().unwrap_or(gain), integration_time),
        Step::DecreaseGain => (gain.lower().unwrap_or(gain), integration_time),
        Step::IncreaseIntegrationTime => (
            gain,
            integration_time.longer().unwrap_or(integration_time),
        ),
        Step::DecreaseIntegrationTime => (
            gain,
            integration_time.shorter().unwrap_or(integration_time),
        ),
    }
}
