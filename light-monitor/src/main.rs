use std::path::PathBuf;

use light_monitor::configuration::{Configuration, Settings};
use light_monitor::delay::Delay;
use light_monitor::simulation::SimulatedBus;
use light_monitor::*;
use log::info;
use veml_7700::VEML7700Sensor;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let cfg = Configuration::load(path.as_deref())?;
    let settings = cfg.settings()?;

    match cfg.simulated_lux {
        Some(lux) => {
            info!("Simulating a sensor lit at {} lux", lux);
            let mut sensor = VEML7700Sensor::with_bus(SimulatedBus::new(lux));
            monitor::run(&mut sensor, &settings, &mut Delay)?;
        }
        None => run_on_hardware(&cfg, &settings)?,
    }

    Ok(())
}

#[cfg(target_os = "linux")]
fn run_on_hardware(
    cfg: &Configuration,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut sensor = sensors::open(cfg.i2c_bus)?;
    monitor::run(&mut sensor, settings, &mut Delay)?;
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn run_on_hardware(
    _cfg: &Configuration,
    _settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    Err("No I2C bus on this platform, set `simulatedLux` in the configuration".into())
}
