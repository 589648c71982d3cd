use log::debug;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
};
use veml_7700::{Gain, IntegrationTime, InvalidValue, Persistence, PowerSavingMode};

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Cannot read configuration file {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Malformed configuration file: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    InvalidValue(#[from] InvalidValue),
    #[error("Threshold window {low} lux to {high} lux is empty")]
    EmptyWindow { low: f64, high: f64 },
}

/// On-disk configuration of the monitor. Every key is optional.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Configuration {
    /// Number of the I²C bus the sensor sits on (`/dev/i2c-N`).
    pub i2c_bus: u8,
    pub gain: f64,
    pub integration_time_ms: f64,
    pub persistence: u32,
    /// Power saving levels to go through after the initial measurements.
    pub power_saving_modes: Vec<u8>,
    pub samples_per_phase: u32,
    pub threshold_low_lux: f64,
    pub threshold_high_lux: f64,
    pub event_polls: u32,
    /// Replace the sensor with a simulated one lit at this many lux.
    pub simulated_lux: Option<f64>,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            i2c_bus: 1,
            gain: 1.0,
            integration_time_ms: 100.0,
            persistence: 1,
            power_saving_modes: vec![1, 2, 3, 4],
            samples_per_phase: 10,
            threshold_low_lux: 60.0,
            threshold_high_lux: 230.0,
            event_polls: 10,
            simulated_lux: None,
        }
    }
}

/// Configuration once checked against what the sensor supports.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub gain: Gain,
    pub integration_time: IntegrationTime,
    pub persistence: Persistence,
    pub power_saving_modes: Vec<PowerSavingMode>,
    pub samples_per_phase: u32,
    pub threshold_low_lux: f64,
    pub threshold_high_lux: f64,
    pub event_polls: u32,
}

impl Configuration {
    /// Read the configuration at `path`, or use the defaults without one.
    pub fn load(path: Option<&Path>) -> Result<Configuration, ConfigurationError> {
        match path {
            Some(path) => read_json_from_file(path),
            None => Ok(Configuration::default()),
        }
    }

    pub fn settings(&self) -> Result<Settings, ConfigurationError> {
        if !(self.threshold_low_lux < self.threshold_high_lux) {
            return Err(ConfigurationError::EmptyWindow {
                low: self.threshold_low_lux,
                high: self.threshold_high_lux,
            });
        }

        let power_saving_modes = self
            .power_saving_modes
            .iter()
            .map(|&level| PowerSavingMode::from_level(level))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Settings {
            gain: Gain::from_value(self.gain)?,
            integration_time: IntegrationTime::from_millis(self.integration_time_ms)?,
            persistence: Persistence::from_count(self.persistence)?,
            power_saving_modes,
            samples_per_phase: self.samples_per_phase,
            threshold_low_lux: self.threshold_low_lux,
            threshold_high_lux: self.threshold_high_lux,
            event_polls: self.event_polls,
        })
    }
}

fn read_json_from_file<P: AsRef<Path>, T: serde::de::DeserializeOwned>(
    path: P,
) -> Result<T, ConfigurationError> {
    // Open the file in read-only mode with buffer.
    debug!("Reading file: {:?}", path.as_ref());
    let file = File::open(path.as_ref()).map_err(|source| ConfigurationError::Io {
        path: path.as_ref().to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let t = serde_json::from_reader(reader)?;

    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Configuration::default().settings().unwrap();
        assert_eq!(settings.gain, Gain::Unit);
        assert_eq!(settings.integration_time, IntegrationTime::Time100ms);
        assert_eq!(settings.power_saving_modes.len(), 4);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let json = r#"{ "gain": 0.125, "integrationTimeMs": 800, "simulatedLux": 12.5 }"#;
        let cfg: Configuration = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.i2c_bus, 1);
        assert_eq!(cfg.simulated_lux, Some(12.5));
        let settings = cfg.settings().unwrap();
        assert_eq!(settings.gain, Gain::Eighth);
        assert_eq!(settings.integration_time, IntegrationTime::Time800ms);
    }

    #[test]
    fn rejects_values_the_sensor_does_not_have() {
        let cfg = Configuration {
            gain: 4.0,
            ..Configuration::default()
        };
        assert!(matches!(
            cfg.settings(),
            Err(ConfigurationError::InvalidValue(InvalidValue::Gain(_)))
        ));

        let cfg = Configuration {
            power_saving_modes: vec![1, 5],
            ..Configuration::default()
        };
        assert!(cfg.settings().is_err());

        let cfg = Configuration {
            threshold_low_lux: 300.0,
            ..Configuration::default()
        };
        assert!(matches!(
            cfg.settings(),
            Err(ConfigurationError::EmptyWindow { .. })
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = Configuration::load(Some(Path::new("/nonexistent/light-monitor.json")))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::Io { .. }));
    }
}
