//! Everyday descriptions of illuminance levels.

const LUX_LEVELS: [(f64, &str); 27] = [
    (0.0, "Ideal black body"),
    (1e-6, "Absolute threshold of vision"),
    (0.0004, "Darkest sky"),
    (0.001, "Night sky"),
    (0.0014, "Typical photographic scene lit by full moon"),
    (0.005, "Approximate scotopic/mesopic threshold"),
    (0.04, "Phosphorescent markings on a watch dial after 1h in the dark"),
    (2.0, "Floodlit buildings, monuments, and fountains"),
    (5.0, "Approximate mesopic/photopic threshold"),
    (25.0, "Typical photographic scene at sunrise or sunset"),
    (30.0, "Green electroluminescent source"),
    (55.0, "Standard SMPTE cinema screen luminance"),
    (80.0, "Monitor white in the sRGB reference viewing environment"),
    (250.0, "Peak luminance of a typical LCD monitor"),
    (700.0, "Typical photographic scene on overcast day"),
    (2000.0, "Average cloudy sky"),
    (2500.0, "Moon surface"),
    (5000.0, "Typical photographic scene in full sunlight"),
    (7000.0, "Average clear sky"),
    (1e4, "White illuminated cloud"),
    (1.2e4, "Fluorescent lamp"),
    (7.5e4, "Low pressure sodium-vapor lamp"),
    (1.3e5, "Frosted incandescent light bulb"),
    (6e5, "Solar disk at horizon"),
    (7e6, "Filament of a clear incandescent lamp"),
    (1e8, "Possible retinal damage"),
    (1e9, "Solar disk at noon"),
];

/// The description whose reference level is closest to `lux`. On a tie the
/// darker level wins.
pub fn describe(lux: f64) -> &'static str {
    let mut best = LUX_LEVELS[0];
    for &level in LUX_LEVELS.iter().skip(1) {
        if (level.0 - lux).abs() < (best.0 - lux).abs() {
            best = level;
        }
    }
    best.1
}
