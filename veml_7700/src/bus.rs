use std::fmt::Debug;

use embedded_hal::i2c::I2c;

use crate::registers::DEVICE_ADDRESS;

/// Word level access to the sensor registers.
///
/// Errors are handed back to the caller untouched, no retry happens in this
/// crate.
pub trait RegisterBus {
    type Error: Debug;

    fn read16(&mut self, register: u8) -> Result<u16, Self::Error>;

    fn write16(&mut self, register: u8, value: u16) -> Result<(), Self::Error>;
}

/// SMBus style word transfers on top of an `embedded-hal` I2C bus.
/// Words travel least significant byte first.
#[derive(Debug)]
pub struct I2cBus<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cBus<I2C> {
    pub fn new(i2c: I2C) -> I2cBus<I2C> {
        I2cBus::with_address(i2c, DEVICE_ADDRESS)
    }

    pub fn with_address(i2c: I2C, address: u8) -> I2cBus<I2C> {
        I2cBus { i2c, address }
    }

    /// Return the underlying I²C bus instance.
    pub fn into_inner(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> RegisterBus for I2cBus<I2C> {
    type Error = I2C::Error;

    fn read16(&mut self, register: u8) -> Result<u16, Self::Error> {
        let mut data = [0; 2];
        self.i2c.write_read(self.address, &[register], &mut data)?;

        Ok(u16::from_le_bytes(data))
    }

    fn write16(&mut self, register: u8, value: u16) -> Result<(), Self::Error> {
        let [lsb, msb] = value.to_le_bytes();
        self.i2c.write(self.address, &[register, lsb, msb])
    }
}
