//! Access to the sensor hardware.

#[cfg(target_os = "linux")]
mod implementation {
    use log::debug;
    use rppal::i2c::I2c;
    use veml_7700::{I2cBus, VEML7700Sensor};

    pub type Sensor = VEML7700Sensor<I2cBus<I2c>>;

    /// Open the VEML7700 sitting on `/dev/i2c-<bus>`.
    pub fn open(bus: u8) -> Result<Sensor, rppal::i2c::Error> {
        let i2c = I2c::with_bus(bus)?;
        debug!("Opened I2C bus {} at {} Hz", bus, i2c.clock_speed()?);
        Ok(VEML7700Sensor::new(i2c))
    }
}

#[cfg(target_os = "linux")]
pub use implementation::{open, Sensor};
