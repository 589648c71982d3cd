pub mod configuration;
pub mod delay;
pub mod lux_levels;
pub mod monitor;
pub mod sensors;
pub mod simulation;
pub mod status;

pub use configuration::Configuration;
