//! Driver for the Vishay VEML7700 ambient light sensor.
//!
//! The sensor is configured through a handful of 16 bits registers. This
//! crate keeps a copy of the configuration, only writes a register when one of
//! its fields actually changes, converts raw counts to lux and can adjust gain
//! and integration time on its own to stay in the linear band of the sensor
//! (see [`VEML7700Sensor::calibrate`]).
//!
//! Nothing here sleeps on its own. After changing a setting the caller should
//! wait for [`VEML7700Sensor::estimated_refresh_time`] before sampling again,
//! or hand a delay to [`VEML7700Sensor::calibrate_with`].
use std::convert::TryFrom;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, trace};

mod bus;
pub mod lux;
pub mod ranging;
pub mod registers;
mod types;

pub use bus::{I2cBus, RegisterBus};
pub use ranging::{SamplingPerformance, Step};
pub use registers::DEVICE_ADDRESS;
pub use types::{
    Gain, IntegrationTime, InvalidValue, Persistence, PowerSavingMode, PowerStatus,
    ThresholdEvent, VEML7700Error,
};

use registers::{Command, ConfigurationRegister, PowerSavingRegister, Register};

/// Refresh overhead of power saving mode 1. Each further mode doubles it.
const MIN_POWER_SAVING_REFRESH_OVERHEAD_MS: u64 = 500;

/// Values returned by [`VEML7700Sensor::sample`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sample {
    /// Output of the ambient light channel.
    Als(u16),
    /// Output of the white channel.
    White(u16),
    /// Ambient light then white output.
    Both(u16, u16),
}

/// Provide access to a VEML7700 sensor.
#[derive(Debug)]
pub struct VEML7700Sensor<B> {
    bus: B,
    config: ConfigurationRegister,
    power_saving: PowerSavingRegister,
    threshold_low: Option<u16>,
    threshold_high: Option<u16>,
    als_output: Option<u16>,
    white_output: Option<u16>,
    threshold_event: Option<ThresholdEvent>,
}

impl<I2C: I2c> VEML7700Sensor<I2cBus<I2C>> {
    /// Construct a new VEML7700 sensor on the given i2c bus, at the default
    /// address.
    ///
    /// No traffic happens until a setting changes; use
    /// [`VEML7700Sensor::sync`] to push the power-on defaults to the device.
    pub fn new(i2c: I2C) -> VEML7700Sensor<I2cBus<I2C>> {
        VEML7700Sensor::with_bus(I2cBus::new(i2c))
    }
}

impl<B: RegisterBus> VEML7700Sensor<B> {
    pub fn with_bus(bus: B) -> VEML7700Sensor<B> {
        VEML7700Sensor {
            bus,
            config: ConfigurationRegister::default(),
            power_saving: PowerSavingRegister::default(),
            threshold_low: None,
            threshold_high: None,
            als_output: None,
            white_output: None,
            threshold_event: None,
        }
    }

    /// Destroy driver instance, return the bus instance.
    pub fn destroy(self) -> B {
        self.bus
    }

    // Abstraction over the bus

    fn execute(&mut self, command: Command) -> Result<(), VEML7700Error<B::Error>> {
        let register = command.register();
        trace!("Writing {:#06x} to {:?}", command.payload(), register);
        self.bus
            .write16(register.opcode(), command.payload())
            .map_err(VEML7700Error::Transport)
    }

    fn read(&mut self, register: Register) -> Result<u16, VEML7700Error<B::Error>> {
        let value = self
            .bus
            .read16(register.opcode())
            .map_err(VEML7700Error::Transport)?;
        trace!("Read {:#06x} from {:?}", value, register);
        Ok(value)
    }

    /// Write the configuration register if it differs, then remember it.
    fn update_configuration(
        &mut self,
        config: ConfigurationRegister,
    ) -> Result<(), VEML7700Error<B::Error>> {
        if config == self.config {
            return Ok(());
        }
        self.execute(config.command())?;
        self.config = config;
        Ok(())
    }

    fn update_power_saving(
        &mut self,
        power_saving: PowerSavingRegister,
    ) -> Result<(), VEML7700Error<B::Error>> {
        if power_saving == self.power_saving {
            return Ok(());
        }
        self.execute(power_saving.command())?;
        self.power_saving = power_saving;
        Ok(())
    }

    /// Write every register from the driver state, changed or not.
    pub fn sync(&mut self) -> Result<(), VEML7700Error<B::Error>> {
        self.execute(self.config.command())?;
        self.execute(self.power_saving.command())?;
        if let Some(low) = self.threshold_low {
            self.execute(registers::low_threshold_command(low))?;
        }
        if let Some(high) = self.threshold_high {
            self.execute(registers::high_threshold_command(high))?;
        }
        Ok(())
    }

    // Settings

    pub fn configuration(&self) -> ConfigurationRegister {
        self.config
    }

    pub fn gain(&self) -> Gain {
        self.config.gain
    }

    pub fn set_gain(&mut self, gain: Gain) -> Result<(), VEML7700Error<B::Error>> {
        self.update_configuration(ConfigurationRegister {
            gain,
            ..self.config
        })
    }

    /// Set the gain from its multiplier, e.g. `0.25`.
    pub fn set_gain_value(&mut self, gain: f64) -> Result<(), VEML7700Error<B::Error>> {
        self.set_gain(Gain::from_value(gain)?)
    }

    pub fn integration_time(&self) -> IntegrationTime {
        self.config.integration_time
    }

    pub fn set_integration_time(
        &mut self,
        integration_time: IntegrationTime,
    ) -> Result<(), VEML7700Error<B::Error>> {
        self.update_configuration(ConfigurationRegister {
            integration_time,
            ..self.config
        })
    }

    pub fn set_integration_time_millis(
        &mut self,
        millis: f64,
    ) -> Result<(), VEML7700Error<B::Error>> {
        self.set_integration_time(IntegrationTime::from_millis(millis)?)
    }

    pub fn persistence(&self) -> Persistence {
        self.config.persistence
    }

    pub fn set_persistence(
        &mut self,
        persistence: Persistence,
    ) -> Result<(), VEML7700Error<B::Error>> {
        self.update_configuration(ConfigurationRegister {
            persistence,
            ..self.config
        })
    }

    pub fn set_persistence_count(&mut self, count: u32) -> Result<(), VEML7700Error<B::Error>> {
        self.set_persistence(Persistence::from_count(count)?)
    }

    /// Whether the threshold window interrupt is enabled.
    pub fn threshold_enabled(&self) -> bool {
        self.config.interrupt_enabled
    }

    pub fn set_threshold_enabled(&mut self, enabled: bool) -> Result<(), VEML7700Error<B::Error>> {
        self.update_configuration(ConfigurationRegister {
            interrupt_enabled: enabled,
            ..self.config
        })
    }

    pub fn threshold_low(&self) -> Option<u16> {
        self.threshold_low
    }

    /// Set the low end of the threshold window, in raw counts. Only the low
    /// 16 bits are kept.
    pub fn set_threshold_low(&mut self, threshold: i64) -> Result<(), VEML7700Error<B::Error>> {
        let threshold = registers::threshold_payload(threshold);
        if self.threshold_low == Some(threshold) {
            return Ok(());
        }
        self.execute(registers::low_threshold_command(threshold))?;
        self.threshold_low = Some(threshold);
        Ok(())
    }

    pub fn threshold_high(&self) -> Option<u16> {
        self.threshold_high
    }

    /// Set the high end of the threshold window, in raw counts. Only the low
    /// 16 bits are kept.
    pub fn set_threshold_high(&mut self, threshold: i64) -> Result<(), VEML7700Error<B::Error>> {
        let threshold = registers::threshold_payload(threshold);
        if self.threshold_high == Some(threshold) {
            return Ok(());
        }
        self.execute(registers::high_threshold_command(threshold))?;
        self.threshold_high = Some(threshold);
        Ok(())
    }

    // Power

    pub fn power_status(&self) -> PowerStatus {
        if self.config.shutdown {
            PowerStatus::Off
        } else if self.power_saving.enabled {
            PowerStatus::Saving(self.power_saving.mode)
        } else {
            PowerStatus::On
        }
    }

    /// Change the power state. Touches the configuration register and then
    /// the power saving register, each only when it changes.
    pub fn set_power_status(&mut self, status: PowerStatus) -> Result<(), VEML7700Error<B::Error>> {
        let (shutdown, power_saving) = match status {
            PowerStatus::On => (
                false,
                PowerSavingRegister {
                    enabled: false,
                    ..self.power_saving
                },
            ),
            PowerStatus::Off => (
                true,
                PowerSavingRegister {
                    enabled: false,
                    ..self.power_saving
                },
            ),
            PowerStatus::Saving(mode) => (
                false,
                PowerSavingRegister {
                    mode,
                    enabled: true,
                },
            ),
        };

        self.update_configuration(ConfigurationRegister {
            shutdown,
            ..self.config
        })?;
        self.update_power_saving(power_saving)
    }

    /// Same as [`set_power_status`](Self::set_power_status) with `0` for on,
    /// `1..=4` for the power saving modes and `5` for off.
    pub fn set_power_status_level(&mut self, level: u8) -> Result<(), VEML7700Error<B::Error>> {
        self.set_power_status(PowerStatus::from_level(level)?)
    }

    pub fn power_on(&mut self) -> Result<(), VEML7700Error<B::Error>> {
        self.set_power_status(PowerStatus::On)
    }

    /// Shut the sensor down. It keeps its configuration.
    pub fn power_off(&mut self) -> Result<(), VEML7700Error<B::Error>> {
        self.set_power_status(PowerStatus::Off)
    }

    pub fn power_save(&mut self, mode: PowerSavingMode) -> Result<(), VEML7700Error<B::Error>> {
        self.set_power_status(PowerStatus::Saving(mode))
    }

    /// How long a new sample takes with the current settings. `None` while
    /// the sensor is shut down, as no sample will ever come.
    pub fn estimated_refresh_time(&self) -> Option<Duration> {
        let integration = self.config.integration_time.duration();
        match self.power_status() {
            PowerStatus::On => Some(integration),
            PowerStatus::Saving(mode) => {
                let overhead = MIN_POWER_SAVING_REFRESH_OVERHEAD_MS << (mode.level() - 1);
                Some(Duration::from_millis(overhead) + integration)
            }
            PowerStatus::Off => None,
        }
    }

    // Sampling

    /// Last ALS count read from the sensor.
    pub fn output(&self) -> Option<u16> {
        self.als_output
    }

    /// Last white channel count read from the sensor.
    pub fn white_output(&self) -> Option<u16> {
        self.white_output
    }

    /// Read the requested output registers and remember their values.
    ///
    /// Returns `None` without touching the bus when nothing is requested.
    pub fn sample(
        &mut self,
        read_als: bool,
        read_white: bool,
    ) -> Result<Option<Sample>, VEML7700Error<B::Error>> {
        let als = if read_als {
            Some(self.sample_als()?)
        } else {
            None
        };
        let white = if read_white {
            Some(self.sample_white()?)
        } else {
            None
        };

        Ok(match (als, white) {
            (Some(als), Some(white)) => Some(Sample::Both(als, white)),
            (Some(als), None) => Some(Sample::Als(als)),
            (None, Some(white)) => Some(Sample::White(white)),
            (None, None) => None,
        })
    }

    pub fn sample_als(&mut self) -> Result<u16, VEML7700Error<B::Error>> {
        let raw = self.read(Register::AlsOutput)?;
        self.als_output = Some(raw);
        Ok(raw)
    }

    pub fn sample_white(&mut self) -> Result<u16, VEML7700Error<B::Error>> {
        let raw = self.read(Register::WhiteOutput)?;
        self.white_output = Some(raw);
        Ok(raw)
    }

    // Illuminance

    pub fn lux_resolution(&self) -> f64 {
        lux::lux_resolution(self.config.gain, self.config.integration_time)
    }

    pub fn lux_overflow_value(&self) -> f64 {
        lux::lux_overflow_value(self.config.gain, self.config.integration_time)
    }

    /// Illuminance of the last ALS sample, with the current settings.
    pub fn lux(&self) -> Option<f64> {
        self.als_output
            .map(|raw| lux::raw_to_lux(raw, self.config.gain, self.config.integration_time))
    }

    pub fn is_overflowing(&self) -> bool {
        self.als_output.map_or(false, lux::is_overflowing)
    }

    pub fn is_underflowing(&self) -> bool {
        self.als_output.map_or(false, lux::is_underflowing)
    }

    // Auto-ranging

    /// How well the last ALS sample sits in the sensor range. `None` before
    /// the first sample.
    pub fn sampling_performance(&self) -> Option<SamplingPerformance> {
        self.als_output
            .map(|raw| ranging::classify(raw, self.config.gain, self.config.integration_time))
    }

    fn apply_step(&mut self, step: Step) -> Result<(), VEML7700Error<B::Error>> {
        let (gain, integration_time) =
            ranging::apply_step(step, self.config.gain, self.config.integration_time);
        self.update_configuration(ConfigurationRegister {
            gain,
            integration_time,
            ..self.config
        })
    }

    pub fn increase_gain(&mut self) -> Result<(), VEML7700Error<B::Error>> {
        self.apply_step(Step::IncreaseGain)
    }

    pub fn decrease_gain(&mut self) -> Result<(), VEML7700Error<B::Error>> {
        self.apply_step(Step::DecreaseGain)
    }

    pub fn increase_integration_time(&mut self) -> Result<(), VEML7700Error<B::Error>> {
        self.apply_step(Step::IncreaseIntegrationTime)
    }

    pub fn decrease_integration_time(&mut self) -> Result<(), VEML7700Error<B::Error>> {
        self.apply_step(Step::DecreaseIntegrationTime)
    }

    /// Adjust gain and integration time until the ALS output is in a usable
    /// range, or until nothing more can be changed.
    ///
    /// Samples once, then once more after every adjustment. Returns how many
    /// adjustments were made. Only bus errors can make this fail.
    ///
    /// Samples are read back to back, see
    /// [`calibrate_with`](Self::calibrate_with) to let the sensor refresh in
    /// between.
    pub fn calibrate(&mut self) -> Result<u32, VEML7700Error<B::Error>> {
        self.calibrate_settling(|_| {})
    }

    /// Same as [`calibrate`](Self::calibrate), waiting
    /// [`estimated_refresh_time`](Self::estimated_refresh_time) on `delay`
    /// before every sample.
    pub fn calibrate_with<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Result<u32, VEML7700Error<B::Error>> {
        self.calibrate_settling(|sensor| {
            if let Some(refresh) = sensor.estimated_refresh_time() {
                let millis = u32::try_from(refresh.as_millis()).unwrap_or(u32::MAX);
                delay.delay_ms(millis);
            }
        })
    }

    fn calibrate_settling<F>(&mut self, mut settle: F) -> Result<u32, VEML7700Error<B::Error>>
    where
        F: FnMut(&Self),
    {
        settle(&*self);
        let mut raw = self.sample_als()?;
        let mut adjustments = 0;

        loop {
            let (gain, integration_time) = (self.config.gain, self.config.integration_time);
            let performance = ranging::classify(raw, gain, integration_time);
            let step = match ranging::next_step(performance, gain, integration_time) {
                Some(step) => step,
                None => break,
            };

            debug!(
                "Output {} is {:?} at gain {} and {}, applying {:?}",
                raw, performance, gain, integration_time, step
            );
            self.apply_step(step)?;
            adjustments += 1;
            settle(&*self);
            raw = self.sample_als()?;
        }

        debug!(
            "Calibrated after {} adjustment(s): gain {}, integration time {}, output {}",
            adjustments, self.config.gain, self.config.integration_time, raw
        );
        Ok(adjustments)
    }

    // Interrupts

    pub fn last_threshold_event(&self) -> Option<ThresholdEvent> {
        self.threshold_event
    }

    /// Read and clear the interrupt status.
    ///
    /// Returns `None`, without touching the bus, when the threshold interrupt
    /// is disabled. The sensor clears the status on read, so an event is only
    /// reported once.
    pub fn poll_threshold_event(
        &mut self,
    ) -> Result<Option<ThresholdEvent>, VEML7700Error<B::Error>> {
        if !self.config.interrupt_enabled {
            return Ok(None);
        }
        let status = self.read(Register::InterruptStatus)?;
        let event = registers::decode_interrupt_status(status);
        self.threshold_event = Some(event);
        Ok(Some(event))
    }
}
