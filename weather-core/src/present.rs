//! Display derivations over a weather snapshot. All pure.

use crate::{AccumulationWindow, WeatherSnapshot};

pub const NOT_AVAILABLE: &str = "N/A";

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

const SECTOR_DEGREES: f64 = 22.5;

/// 16-point compass abbreviation for a direction in degrees.
///
/// Sector `k` spans `[22.5k, 22.5(k + 1))` degrees and is labelled with the
/// point one step clockwise of its start: half a sector is added and the
/// result rounded half-up, so 0° up to (not including) 22.5° reads "NNE" and
/// 337.5° up to 360° reads "N". This is not the nearest compass point.
/// Values outside 0..360 wrap around.
pub fn wind_direction(deg: f64) -> &'static str {
    let sector = (deg / SECTOR_DEGREES + 0.5 + 0.5).floor() as i64;
    COMPASS_POINTS[sector.rem_euclid(COMPASS_POINTS.len() as i64) as usize]
}

/// Precipitation for `window`, snow taking precedence over rain.
pub fn precipitation_amount(snapshot: &WeatherSnapshot, window: AccumulationWindow) -> String {
    snapshot
        .snow
        .as_ref()
        .and_then(|snow| snow.amount(window))
        .or_else(|| snapshot.rain.as_ref().and_then(|rain| rain.amount(window)))
        .map(|mm| format!("{mm} mm"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// "Snow" whenever the snapshot carries a snow section, whatever its windows hold.
pub fn precipitation_label(snapshot: &WeatherSnapshot) -> &'static str {
    if snapshot.snow.is_some() { "Snow" } else { "Rain" }
}

pub fn wind_gust(snapshot: &WeatherSnapshot) -> String {
    match snapshot.wind.gust {
        Some(gust) if gust != 0.0 => format!("{gust}m/s"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Observation time in local time, or "N/A" for an out-of-range timestamp.
pub fn observation_time(snapshot: &WeatherSnapshot) -> String {
    snapshot
        .observed_at()
        .map(|t| t.format("%c").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
