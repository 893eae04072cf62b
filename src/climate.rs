/// Baseline temperature band keyed on a latitude threshold.
#[derive(Debug, Clone, Copy)]
pub struct LatitudeBand {
    pub above_lat: f64,
    pub base_temperature_c: f64,
}

// Compared against the signed latitude, so southern latitudes all land in the
// warmest band.
const LATITUDE_BANDS: &[LatitudeBand] = &[
    LatitudeBand {
        above_lat: 45.0,
        base_temperature_c: 8.0,
    },
    LatitudeBand {
        above_lat: 35.0,
        base_temperature_c: 15.0,
    },
    LatitudeBand {
        above_lat: 25.0,
        base_temperature_c: 22.0,
    },
];

const FALLBACK_TEMPERATURE_C: f64 = 28.0;

/// Baseline temperature (°C) for a latitude.
pub fn base_temperature(lat: f64) -> f64 {
    LATITUDE_BANDS
        .iter()
        .find(|band| lat > band.above_lat)
        .map(|band| band.base_temperature_c)
        .unwrap_or(FALLBACK_TEMPERATURE_C)
}
