use std::fmt;

use veml_7700::{RegisterBus, VEML7700Sensor};

struct Entry {
    desc: &'static str,
    val: String,
    unit: Option<&'static str>,
}

/// Snapshot of everything the driver knows, printed as an aligned table.
pub struct Status {
    entries: Vec<Entry>,
}

fn entry(desc: &'static str, val: String, unit: Option<&'static str>) -> Entry {
    Entry { desc, val, unit }
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

impl Status {
    pub fn of<B: RegisterBus>(sensor: &VEML7700Sensor<B>) -> Status {
        let threshold = format!(
            "({}, {}, {})",
            sensor.threshold_enabled(),
            or_dash(sensor.threshold_low()),
            or_dash(sensor.threshold_high())
        );

        Status {
            entries: vec![
                entry("Lux", or_dash(sensor.lux().map(|l| format!("{:.4}", l))), Some("lux")),
                entry("Output", or_dash(sensor.output()), Some("cnt")),
                entry(
                    "Integration time",
                    sensor.integration_time().millis().to_string(),
                    Some("ms"),
                ),
                entry("Gain", sensor.gain().to_string(), None),
                entry("White", or_dash(sensor.white_output()), Some("cnt")),
                entry("Event", or_dash(sensor.last_threshold_event()), None),
                entry("Power", sensor.power_status().to_string(), None),
                entry("Threshold", threshold, None),
                entry(
                    "Refresh",
                    or_dash(sensor.estimated_refresh_time().map(|d| d.as_millis())),
                    Some("ms"),
                ),
                entry(
                    "Resolution",
                    format!("{:.4}", sensor.lux_resolution()),
                    Some("lux/cnt"),
                ),
                entry(
                    "Performance",
                    or_dash(sensor.sampling_performance().map(|p| format!("{:?}", p))),
                    None,
                ),
            ],
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let desc_width = self.entries.iter().map(|e| e.desc.len()).max().unwrap_or(0);
        let val_width = self.entries.iter().map(|e| e.val.len()).max().unwrap_or(0);

        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "  {:<dw$} {:>vw$}",
                entry.desc,
                entry.val,
                dw = desc_width,
                vw = val_width
            )?;
            if let Some(unit) = entry.unit {
                write!(f, " [{}]", unit)?;
            }
        }
        Ok(())
    }
}
