//! Bit layout of the VEML7700 registers.
//!
//! Every register is a 16 bits word. Fields of a register cannot be written
//! independently, so the structs below always encode a whole register.
use crate::types::{
    Gain, IntegrationTime, InvalidValue, Persistence, PowerSavingMode, ThresholdEvent,
};

pub const DEVICE_ADDRESS: u8 = 0x10;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

/// Command codes of the sensor.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Register {
    Configuration = 0x00,
    HighThreshold = 0x01,
    LowThreshold = 0x02,
    PowerSaving = 0x03,
    AlsOutput = 0x04,
    WhiteOutput = 0x05,
    InterruptStatus = 0x06,
}

impl Register {
    pub const fn opcode(self) -> u8 {
        self as u8
    }

    pub const fn direction(self) -> Direction {
        match self {
            Register::Configuration
            | Register::HighThreshold
            | Register::LowThreshold
            | Register::PowerSaving => Direction::Write,
            Register::AlsOutput | Register::WhiteOutput | Register::InterruptStatus => {
                Direction::Read
            }
        }
    }
}

/// Position of a field inside a register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub offset: u8,
    pub width: u8,
}

impl Field {
    pub const fn new(offset: u8, width: u8) -> Field {
        Field { offset, width }
    }

    pub const fn mask(self) -> u16 {
        (1 << self.width) - 1
    }

    pub const fn pack(self, code: u16) -> u16 {
        (code & self.mask()) << self.offset
    }

    pub const fn unpack(self, register: u16) -> u16 {
        (register >> self.offset) & self.mask()
    }
}

// Configuration register
pub const GAIN: Field = Field::new(11, 2);
pub const INTEGRATION_TIME: Field = Field::new(6, 4);
pub const PERSISTENCE: Field = Field::new(4, 2);
pub const INTERRUPT_ENABLE: Field = Field::new(1, 1);
pub const SHUTDOWN: Field = Field::new(0, 1);

// Power saving register
pub const POWER_SAVING_MODE: Field = Field::new(1, 2);
pub const POWER_SAVING_ENABLE: Field = Field::new(0, 1);

// Interrupt status register
pub const THRESHOLD_EVENT: Field = Field::new(14, 2);

/// A value stored in a register field through an explicit code table.
pub trait FieldValue: Sized {
    const FIELD: Field;
    const NAME: &'static str;

    fn code(self) -> u16;

    fn from_code(code: u16) -> Option<Self>;

    fn pack(self) -> u16 {
        Self::FIELD.pack(self.code())
    }

    fn unpack(register: u16) -> Result<Self, InvalidValue> {
        let code = Self::FIELD.unpack(register);
        Self::from_code(code).ok_or(InvalidValue::Code {
            field: Self::NAME,
            code,
        })
    }
}

impl FieldValue for Gain {
    const FIELD: Field = GAIN;
    const NAME: &'static str = "gain";

    fn code(self) -> u16 {
        match self {
            Gain::Unit => 0b00,
            Gain::Double => 0b01,
            Gain::Quarter => 0b10,
            Gain::Eighth => 0b11,
        }
    }

    fn from_code(code: u16) -> Option<Gain> {
        Gain::ALL.iter().copied().find(|g| g.code() == code)
    }
}

impl FieldValue for IntegrationTime {
    const FIELD: Field = INTEGRATION_TIME;
    const NAME: &'static str = "integration time";

    // The codes do not follow the durations, hence the table.
    fn code(self) -> u16 {
        match self {
            IntegrationTime::Time25ms => 0b1100,
            IntegrationTime::Time50ms => 0b1000,
            IntegrationTime::Time100ms => 0b0000,
            IntegrationTime::Time200ms => 0b0001,
            IntegrationTime::Time400ms => 0b0010,
            IntegrationTime::Time800ms => 0b0011,
        }
    }

    fn from_code(code: u16) -> Option<IntegrationTime> {
        IntegrationTime::ALL
            .iter()
            .copied()
            .find(|t| t.code() == code)
    }
}

impl FieldValue for Persistence {
    const FIELD: Field = PERSISTENCE;
    const NAME: &'static str = "persistence";

    fn code(self) -> u16 {
        match self {
            Persistence::One => 0b00,
            Persistence::Two => 0b01,
            Persistence::Four => 0b10,
            Persistence::Eight => 0b11,
        }
    }

    fn from_code(code: u16) -> Option<Persistence> {
        Persistence::ALL.iter().copied().find(|p| p.code() == code)
    }
}

impl FieldValue for PowerSavingMode {
    const FIELD: Field = POWER_SAVING_MODE;
    const NAME: &'static str = "power saving mode";

    fn code(self) -> u16 {
        u16::from(self.level()) - 1
    }

    fn from_code(code: u16) -> Option<PowerSavingMode> {
        PowerSavingMode::ALL
            .iter()
            .copied()
            .find(|m| m.code() == code)
    }
}

impl FieldValue for ThresholdEvent {
    const FIELD: Field = THRESHOLD_EVENT;
    const NAME: &'static str = "threshold event";

    // bit 1 flags the low threshold, bit 0 the high one
    fn code(self) -> u16 {
        match self {
            ThresholdEvent::None => 0b00,
            ThresholdEvent::Low => 0b10,
            ThresholdEvent::High => 0b01,
            ThresholdEvent::Both => 0b11,
        }
    }

    fn from_code(code: u16) -> Option<ThresholdEvent> {
        match code {
            0b00 => Some(ThresholdEvent::None),
            0b10 => Some(ThresholdEvent::Low),
            0b01 => Some(ThresholdEvent::High),
            0b11 => Some(ThresholdEvent::Both),
            _ => None,
        }
    }
}

fn pack_flag(field: Field, flag: bool) -> u16 {
    field.pack(u16::from(flag))
}

fn unpack_flag(field: Field, register: u16) -> bool {
    field.unpack(register) != 0
}

/// A word ready to be written to one of the write-only registers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Command {
    register: Register,
    payload: u16,
}

impl Command {
    fn write(register: Register, payload: u16) -> Command {
        debug_assert_eq!(register.direction(), Direction::Write);
        Command { register, payload }
    }

    pub fn register(&self) -> Register {
        self.register
    }

    pub fn payload(&self) -> u16 {
        self.payload
    }
}

/// Content of the configuration register (0x00).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ConfigurationRegister {
    pub gain: Gain,
    pub integration_time: IntegrationTime,
    pub persistence: Persistence,
    pub interrupt_enabled: bool,
    pub shutdown: bool,
}

impl Default for ConfigurationRegister {
    fn default() -> Self {
        ConfigurationRegister {
            gain: Gain::Unit,
            integration_time: IntegrationTime::Time100ms,
            persistence: Persistence::One,
            interrupt_enabled: false,
            shutdown: false,
        }
    }
}

impl ConfigurationRegister {
    pub fn encode(&self) -> u16 {
        self.gain.pack()
            | self.integration_time.pack()
            | self.persistence.pack()
            | pack_flag(INTERRUPT_ENABLE, self.interrupt_enabled)
            | pack_flag(SHUTDOWN, self.shutdown)
    }

    pub fn decode(register: u16) -> Result<ConfigurationRegister, InvalidValue> {
        Ok(ConfigurationRegister {
            gain: Gain::unpack(register)?,
            integration_time: IntegrationTime::unpack(register)?,
            persistence: Persistence::unpack(register)?,
            interrupt_enabled: unpack_flag(INTERRUPT_ENABLE, register),
            shutdown: unpack_flag(SHUTDOWN, register),
        })
    }

    pub fn command(&self) -> Command {
        Command::write(Register::Configuration, self.encode())
    }
}

/// Content of the power saving register (0x03).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PowerSavingRegister {
    pub mode: PowerSavingMode,
    pub enabled: bool,
}

impl Default for PowerSavingRegister {
    fn default() -> Self {
        PowerSavingRegister {
            mode: PowerSavingMode::Mode1,
            enabled: false,
        }
    }
}

impl PowerSavingRegister {
    pub fn encode(&self) -> u16 {
        self.mode.pack() | pack_flag(POWER_SAVING_ENABLE, self.enabled)
    }

    pub fn decode(register: u16) -> Result<PowerSavingRegister, InvalidValue> {
        Ok(PowerSavingRegister {
            mode: PowerSavingMode::unpack(register)?,
            enabled: unpack_flag(POWER_SAVING_ENABLE, register),
        })
    }

    pub fn command(&self) -> Command {
        Command::write(Register::PowerSaving, self.encode())
    }
}

/// Keep the low 16 bits of a threshold; anything wider wraps.
pub fn threshold_payload(threshold: i64) -> u16 {
    (threshold & 0xFFFF) as u16
}

pub fn high_threshold_command(threshold: u16) -> Command {
    Command::write(Register::HighThreshold, threshold)
}

pub fn low_threshold_command(threshold: u16) -> Command {
    Command::write(Register::LowThreshold, threshold)
}

/// Decode the interrupt status register (0x06).
pub fn decode_interrupt_status(register: u16) -> ThresholdEvent {
    // all four two-bit patterns are mapped
    ThresholdEvent::from_code(THRESHOLD_EVENT.unpack(register)).unwrap_or(ThresholdEvent::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_setting_round_trips() {
        for gain in Gain::ALL.iter().copied() {
            assert_eq!(Gain::unpack(gain.pack()), Ok(gain));
        }
        for time in IntegrationTime::ALL.iter().copied() {
            assert_eq!(IntegrationTime::unpack(time.pack()), Ok(time));
        }
        for persistence in Persistence::ALL.iter().copied() {
            assert_eq!(Persistence::unpack(persistence.pack()), Ok(persistence));
        }
        for mode in PowerSavingMode::ALL.iter().copied() {
            assert_eq!(PowerSavingMode::unpack(mode.pack()), Ok(mode));
        }
    }

    #[test]
    fn fields_land_at_their_offsets() {
        assert_eq!(Gain::Eighth.pack(), 0b11 << 11);
        assert_eq!(IntegrationTime::Time25ms.pack(), 0b1100 << 6);
        assert_eq!(IntegrationTime::Time100ms.pack(), 0);
        assert_eq!(Persistence::Eight.pack(), 0b11 << 4);
        assert_eq!(PowerSavingMode::Mode4.pack(), 0b11 << 1);
        assert_eq!(GAIN.mask(), 0b11);
        assert_eq!(INTEGRATION_TIME.mask(), 0b1111);
    }

    #[test]
    fn default_configuration_is_all_zero() {
        let config = ConfigurationRegister::default();
        assert_eq!(config.encode(), 0x0000);
        assert_eq!(config.command().register(), Register::Configuration);
        assert_eq!(PowerSavingRegister::default().encode(), 0x0000);
    }

    #[test]
    fn configuration_packs_every_field() {
        let config = ConfigurationRegister {
            gain: Gain::Double,
            integration_time: IntegrationTime::Time800ms,
            persistence: Persistence::Two,
            interrupt_enabled: true,
            shutdown: true,
        };
        let word = (0b01 << 11) | (0b0011 << 6) | (0b01 << 4) | 0b10 | 0b1;
        assert_eq!(config.encode(), word);
        assert_eq!(ConfigurationRegister::decode(word), Ok(config));
    }

    #[test]
    fn unknown_integration_time_code_is_rejected() {
        let word = 0b0100 << 6;
        assert_eq!(
            ConfigurationRegister::decode(word),
            Err(InvalidValue::Code {
                field: "integration time",
                code: 0b0100
            })
        );
    }

    #[test]
    fn power_saving_register_layout() {
        let register = PowerSavingRegister {
            mode: PowerSavingMode::Mode3,
            enabled: true,
        };
        assert_eq!(register.encode(), 0b101);
        assert_eq!(PowerSavingRegister::decode(0b101), Ok(register));
        assert_eq!(register.command().register().opcode(), 0x03);
    }

    #[test]
    fn thresholds_truncate_to_sixteen_bits() {
        assert_eq!(threshold_payload(0x1_2345), 0x2345);
        assert_eq!(threshold_payload(-1), 0xFFFF);
        assert_eq!(threshold_payload(500), 500);
        assert_eq!(high_threshold_command(7).register().opcode(), 0x01);
        assert_eq!(low_threshold_command(7).payload(), 7);
    }

    #[test]
    fn interrupt_status_bits() {
        assert_eq!(decode_interrupt_status(0b10 << 14), ThresholdEvent::Low);
        assert_eq!(decode_interrupt_status(0b01 << 14), ThresholdEvent::High);
        assert_eq!(decode_interrupt_status(0b11 << 14), ThresholdEvent::Both);
        assert_eq!(decode_interrupt_status(0x0000), ThresholdEvent::None);
        // lower bits are not part of the field
        assert_eq!(decode_interrupt_status(0x3FFF), ThresholdEvent::None);
    }

    #[test]
    fn register_directions() {
        assert_eq!(Register::Configuration.direction(), Direction::Write);
        assert_eq!(Register::AlsOutput.direction(), Direction::Read);
        assert_eq!(Register::InterruptStatus.opcode(), 0x06);
    }
}
