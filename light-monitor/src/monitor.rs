//! The measurement session run by the binary.
use embedded_hal::delay::DelayNs;
use log::{info, warn};
use veml_7700::{RegisterBus, VEML7700Error, VEML7700Sensor};

use crate::configuration::Settings;
use crate::delay::wait;
use crate::lux_levels::describe;
use crate::status::Status;

type Result<B> = std::result::Result<(), VEML7700Error<<B as RegisterBus>::Error>>;

/// Wait until the sensor had time to produce a sample with its current
/// settings. Does nothing while it is shut down.
fn settle<B: RegisterBus, D: DelayNs>(sensor: &VEML7700Sensor<B>, delay: &mut D) {
    if let Some(refresh) = sensor.estimated_refresh_time() {
        wait(delay, refresh);
    }
}

fn sample_and_calibrate<B: RegisterBus, D: DelayNs>(
    sensor: &mut VEML7700Sensor<B>,
    settings: &Settings,
    delay: &mut D,
) -> Result<B> {
    for _ in 0..settings.samples_per_phase {
        settle(sensor, delay);
        sensor.sample_als()?;
        if sensor.is_overflowing() {
            warn!("Output saturated at {} lux", sensor.lux_overflow_value());
        }
        if let Some(lux) = sensor.lux() {
            info!("Lux: {:.4}", lux);
        }
        sensor.calibrate_with(delay)?;
    }
    Ok(())
}

/// Bring the sensor up with `settings`, sample it in every requested power
/// mode, watch the threshold window and shut it down.
pub fn run<B: RegisterBus, D: DelayNs>(
    sensor: &mut VEML7700Sensor<B>,
    settings: &Settings,
    delay: &mut D,
) -> Result<B> {
    sensor.sync()?;
    sensor.set_gain(settings.gain)?;
    sensor.set_integration_time(settings.integration_time)?;
    sensor.set_persistence(settings.persistence)?;

    info!("Power on");
    sensor.power_on()?;

    info!("Calibrating");
    sensor.calibrate_with(delay)?;
    info!("Status: \n{}", Status::of(sensor));

    info!("Refreshing.");
    settle(sensor, delay);
    sensor.sample(true, true)?;
    info!("Status: \n{}", Status::of(sensor));
    if let Some(lux) = sensor.lux() {
        info!("Light level: {}", describe(lux));
    }

    info!("Performing {} samples.", settings.samples_per_phase);
    sample_and_calibrate(sensor, settings, delay)?;

    for &mode in settings.power_saving_modes.iter() {
        info!("Entering power save mode {}.", mode.level());
        sensor.power_save(mode)?;
        sample_and_calibrate(sensor, settings, delay)?;
    }
    sensor.power_on()?;

    info!("Waiting for threshold events");
    let resolution = sensor.lux_resolution();
    sensor.set_threshold_low((settings.threshold_low_lux / resolution) as i64)?;
    sensor.set_threshold_high((settings.threshold_high_lux / resolution) as i64)?;
    sensor.set_threshold_enabled(true)?;
    for _ in 0..settings.event_polls {
        settle(sensor, delay);
        match sensor.poll_threshold_event()? {
            Some(event) => info!("Poll event: {}", event),
            None => info!("Poll event: interrupt disabled"),
        }
    }
    sensor.set_threshold_enabled(false)?;
    info!("Status: \n{}", Status::of(sensor));

    info!("Power off.");
    sensor.power_off()
}
