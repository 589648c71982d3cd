use embedded_hal::delay::DelayNs;
use std::convert::TryFrom;
use std::thread;
use std::time::Duration;

/// Empty struct that provides delay functionality on top of `thread::sleep`
pub struct Delay;

impl DelayNs for Delay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::new(0, ns))
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)))
    }
}

/// Block for `duration`, at millisecond precision.
pub fn wait<D: DelayNs>(delay: &mut D, duration: Duration) {
    let ms = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
    delay.delay_ms(ms);
}
