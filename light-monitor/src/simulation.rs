//! A stand-in for the sensor when no I²C bus is available.
use std::convert::Infallible;

use log::trace;
use veml_7700::registers::{ConfigurationRegister, FieldValue, Register};
use veml_7700::{lux, RegisterBus, ThresholdEvent};

/// Register level model of a VEML7700 lit by a constant scene.
#[derive(Debug)]
pub struct SimulatedBus {
    lux: f64,
    config: ConfigurationRegister,
    threshold_low: u16,
    threshold_high: u16,
}

impl SimulatedBus {
    pub fn new(lux: f64) -> SimulatedBus {
        SimulatedBus {
            lux,
            config: ConfigurationRegister::default(),
            threshold_low: 0,
            threshold_high: u16::MAX,
        }
    }

    pub fn set_lux(&mut self, lux: f64) {
        self.lux = lux;
    }

    fn als_count(&self) -> u16 {
        if self.config.shutdown {
            return 0;
        }
        let resolution = lux::lux_resolution(self.config.gain, self.config.integration_time);
        let count = (self.lux / resolution).round();
        count.max(0.0).min(f64::from(u16::MAX)) as u16
    }

    fn interrupt_status(&self) -> u16 {
        let count = self.als_count();
        let event = match (count < self.threshold_low, count > self.threshold_high) {
            (false, false) => ThresholdEvent::None,
            (true, false) => ThresholdEvent::Low,
            (false, true) => ThresholdEvent::High,
            (true, true) => ThresholdEvent::Both,
        };
        if self.config.interrupt_enabled {
            event.pack()
        } else {
            0
        }
    }
}

impl RegisterBus for SimulatedBus {
    type Error = Infallible;

    fn read16(&mut self, register: u8) -> Result<u16, Infallible> {
        let value = if register == Register::AlsOutput.opcode() {
            self.als_count()
        } else if register == Register::WhiteOutput.opcode() {
            // the white channel sees a broader spectrum
            self.als_count().saturating_add(self.als_count() / 2)
        } else if register == Register::InterruptStatus.opcode() {
            self.interrupt_status()
        } else {
            0
        };
        trace!("Simulated read {:#06x} from {:#04x}", value, register);
        Ok(value)
    }

    fn write16(&mut self, register: u8, value: u16) -> Result<(), Infallible> {
        trace!("Simulated write {:#06x} to {:#04x}", value, register);
        if register == Register::Configuration.opcode() {
            // invalid words are ignored, like the device would
            if let Ok(config) = ConfigurationRegister::decode(value) {
                self.config = config;
            }
        } else if register == Register::HighThreshold.opcode() {
            self.threshold_high = value;
        } else if register == Register::LowThreshold.opcode() {
            self.threshold_low = value;
        }
        // power saving only stretches the refresh time, which is not modelled
        Ok(())
    }
}
