use std::fmt;
use std::time::Duration;

/// Relative tolerance used when matching a physical value to a setting.
const REL_TOLERANCE: f64 = 1e-9;

fn is_close(a: f64, b: f64) -> bool {
    a.is_finite() && b.is_finite() && (a - b).abs() <= REL_TOLERANCE * a.abs().max(b.abs())
}

/// Move one rung up or down an ordered table of settings.
fn step<T: Copy + PartialEq>(table: &[T], current: T, up: bool) -> Option<T> {
    let idx = table.iter().position(|&t| t == current)?;
    if up {
        table.get(idx + 1).copied()
    } else {
        idx.checked_sub(1).and_then(|i| table.get(i).copied())
    }
}

/// Available gains for the sensor, ordered by magnitude.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Gain {
    /// gain of 1/8
    Eighth,
    /// gain of 1/4
    Quarter,
    /// gain of 1
    Unit,
    /// gain of 2
    Double,
}

impl Gain {
    /// Every gain, smallest first. There is no 1/2 gain on this part.
    pub const ALL: [Gain; 4] = [Gain::Eighth, Gain::Quarter, Gain::Unit, Gain::Double];
    pub const MIN: Gain = Gain::ALL[0];
    pub const MAX: Gain = Gain::ALL[Gain::ALL.len() - 1];

    /// The gain expressed in eighths, so ratios between gains stay integers.
    pub const fn eighths(self) -> u32 {
        match self {
            Gain::Eighth => 1,
            Gain::Quarter => 2,
            Gain::Unit => 8,
            Gain::Double => 16,
        }
    }

    /// The multiplier as a number, e.g. `0.25` for [`Gain::Quarter`].
    pub fn value(self) -> f64 {
        f64::from(self.eighths()) / 8.0
    }

    /// Interpret a multiplier such as `2.0` or `0.125`.
    pub fn from_value(value: f64) -> Result<Gain, InvalidValue> {
        Gain::ALL
            .iter()
            .copied()
            .find(|gain| is_close(value, gain.value()))
            .ok_or(InvalidValue::Gain(value))
    }

    /// The next higher gain, if any.
    pub fn higher(self) -> Option<Gain> {
        step(&Gain::ALL, self, true)
    }

    /// The next lower gain, if any.
    pub fn lower(self) -> Option<Gain> {
        step(&Gain::ALL, self, false)
    }
}

impl fmt::Display for Gain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Gain::Eighth => write!(f, "1/8"),
            Gain::Quarter => write!(f, "1/4"),
            Gain::Unit => write!(f, "1"),
            Gain::Double => write!(f, "2"),
        }
    }
}

/// Available integration times for the sensor, ordered by duration
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IntegrationTime {
    /// 25ms integration time
    Time25ms,
    /// 50ms integration time
    Time50ms,
    /// 100ms integration time
    Time100ms,
    /// 200ms integration time
    Time200ms,
    /// 400ms integration time
    Time400ms,
    /// 800ms integration time
    Time800ms,
}

impl IntegrationTime {
    pub const ALL: [IntegrationTime; 6] = [
        IntegrationTime::Time25ms,
        IntegrationTime::Time50ms,
        IntegrationTime::Time100ms,
        IntegrationTime::Time200ms,
        IntegrationTime::Time400ms,
        IntegrationTime::Time800ms,
    ];
    pub const MIN: IntegrationTime = IntegrationTime::ALL[0];
    pub const MAX: IntegrationTime = IntegrationTime::ALL[IntegrationTime::ALL.len() - 1];

    pub const fn millis(self) -> u32 {
        match self {
            IntegrationTime::Time25ms => 25,
            IntegrationTime::Time50ms => 50,
            IntegrationTime::Time100ms => 100,
            IntegrationTime::Time200ms => 200,
            IntegrationTime::Time400ms => 400,
            IntegrationTime::Time800ms => 800,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::from_millis(u64::from(self.millis()))
    }

    /// Interpret a duration given in milliseconds, e.g. `200.0`.
    pub fn from_millis(millis: f64) -> Result<IntegrationTime, InvalidValue> {
        IntegrationTime::ALL
            .iter()
            .copied()
            .find(|time| is_close(millis, f64::from(time.millis())))
            .ok_or(InvalidValue::IntegrationTime(millis))
    }

    /// Interpret a duration given in seconds, e.g. `0.2`.
    pub fn from_secs_f64(secs: f64) -> Result<IntegrationTime, InvalidValue> {
        IntegrationTime::from_millis(secs * 1000.0)
            .map_err(|_| InvalidValue::IntegrationTime(secs))
    }

    /// Twice as long, if the sensor supports it.
    pub fn longer(self) -> Option<IntegrationTime> {
        step(&IntegrationTime::ALL, self, true)
    }

    /// Half as long, if the sensor supports it.
    pub fn shorter(self) -> Option<IntegrationTime> {
        step(&IntegrationTime::ALL, self, false)
    }
}

impl fmt::Display for IntegrationTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}ms", self.millis())
    }
}

/// Number of consecutive out-of-window samples before the interrupt fires.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Persistence {
    One,
    Two,
    Four,
    Eight,
}

impl Persistence {
    pub const ALL: [Persistence; 4] = [
        Persistence::One,
        Persistence::Two,
        Persistence::Four,
        Persistence::Eight,
    ];

    pub const fn count(self) -> u32 {
        match self {
            Persistence::One => 1,
            Persistence::Two => 2,
            Persistence::Four => 4,
            Persistence::Eight => 8,
        }
    }

    pub fn from_count(count: u32) -> Result<Persistence, InvalidValue> {
        Persistence::ALL
            .iter()
            .copied()
            .find(|p| p.count() == count)
            .ok_or(InvalidValue::Persistence(count))
    }
}

impl fmt::Display for Persistence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

/// Power saving mode. Higher levels trade refresh rate for current draw.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PowerSavingMode {
    Mode1,
    Mode2,
    Mode3,
    Mode4,
}

impl PowerSavingMode {
    pub const ALL: [PowerSavingMode; 4] = [
        PowerSavingMode::Mode1,
        PowerSavingMode::Mode2,
        PowerSavingMode::Mode3,
        PowerSavingMode::Mode4,
    ];

    pub const fn level(self) -> u8 {
        match self {
            PowerSavingMode::Mode1 => 1,
            PowerSavingMode::Mode2 => 2,
            PowerSavingMode::Mode3 => 3,
            PowerSavingMode::Mode4 => 4,
        }
    }

    pub fn from_level(level: u8) -> Result<PowerSavingMode, InvalidValue> {
        PowerSavingMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.level() == level)
            .ok_or(InvalidValue::PowerSavingMode(level))
    }
}

/// Power state of the sensor, derived from the shutdown flag and the power
/// saving register.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PowerStatus {
    On,
    Saving(PowerSavingMode),
    Off,
}

impl PowerStatus {
    /// `0` is on, `1..=4` the power saving modes and `5` off.
    pub fn from_level(level: u8) -> Result<PowerStatus, InvalidValue> {
        match level {
            0 => Ok(PowerStatus::On),
            5 => Ok(PowerStatus::Off),
            1..=4 => PowerSavingMode::from_level(level).map(PowerStatus::Saving),
            _ => Err(InvalidValue::PowerStatus(level)),
        }
    }
}

impl fmt::Display for PowerStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PowerStatus::On => write!(f, "PWR_ON"),
            PowerStatus::Saving(mode) => write!(f, "PWR_SAVE_{}", mode.level()),
            PowerStatus::Off => write!(f, "PWR_OFF"),
        }
    }
}

/// Which side of the threshold window the output crossed since the last poll.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ThresholdEvent {
    None,
    Low,
    High,
    Both,
}

impl ThresholdEvent {
    pub fn is_low(self) -> bool {
        matches!(self, ThresholdEvent::Low | ThresholdEvent::Both)
    }

    pub fn is_high(self) -> bool {
        matches!(self, ThresholdEvent::High | ThresholdEvent::Both)
    }
}

impl fmt::Display for ThresholdEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ThresholdEvent::None => write!(f, "none"),
            ThresholdEvent::Low => write!(f, "low"),
            ThresholdEvent::High => write!(f, "high"),
            ThresholdEvent::Both => write!(f, "both"),
        }
    }
}

/// A value that does not map to any setting of the sensor.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum InvalidValue {
    #[error("cannot interpret {0} as a gain; valid values: 1, 2, 1/4, 1/8")]
    Gain(f64),
    #[error(
        "cannot interpret {0} as integration time; \
         valid values are 25ms, 50ms, 100ms, 200ms, 400ms, 800ms"
    )]
    IntegrationTime(f64),
    #[error("cannot interpret {0} as a persistence value; valid values: 1, 2, 4, 8")]
    Persistence(u32),
    #[error("cannot interpret {0} as a power saving mode; valid values are 1, 2, 3, 4")]
    PowerSavingMode(u8),
    #[error("cannot interpret {0} as a power status; valid values are 0 to 5")]
    PowerStatus(u8),
    #[error("bit pattern {code:#06b} does not encode any {field}")]
    Code { field: &'static str, code: u16 },
}

/// Errors when accessing the sensor
#[derive(Debug, thiserror::Error)]
pub enum VEML7700Error<E: fmt::Debug> {
    /// Errors that occur when accessing the I2C peripheral.
    #[error("i2c error: {0:?}")]
    Transport(E),
    /// A setting was rejected before reaching the bus.
    #[error(transparent)]
    InvalidValue(#[from] InvalidValue),
}
