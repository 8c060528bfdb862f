use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// What a single fetch asks the provider for.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    Coordinates(Coordinates),
    /// Free-text place name, sent verbatim as `q`.
    Place(String),
}

/// Reporting interval for precipitation totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccumulationWindow {
    OneHour,
    ThreeHours,
}

impl AccumulationWindow {
    /// Caption used next to the precipitation label in the panel.
    pub fn caption(&self) -> &'static str {
        match self {
            AccumulationWindow::OneHour => "last 1 hour",
            AccumulationWindow::ThreeHours => "last 3 hour",
        }
    }
}

/// Decoded "current weather" response, kept as the provider shapes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub name: String,
    /// Observation time, Unix seconds.
    pub dt: i64,
    pub weather: Vec<Condition>,
    pub main: MainReadings,
    pub wind: Wind,
    #[serde(default)]
    pub clouds: Clouds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain: Option<Precipitation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snow: Option<Precipitation>,
}

impl WeatherSnapshot {
    /// Short conditions label, e.g. "Clouds".
    pub fn conditions(&self) -> &str {
        self.weather.first().map(|w| w.main.as_str()).unwrap_or("Unknown")
    }

    pub fn observed_at(&self) -> Option<DateTime<Local>> {
        DateTime::from_timestamp(self.dt, 0).map(|utc| utc.with_timezone(&Local))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub main: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    #[serde(default)]
    pub deg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Clouds {
    pub all: f64,
}

/// Precipitation totals keyed by accumulation window.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Precipitation {
    #[serde(rename = "1h", default, skip_serializing_if = "Option::is_none")]
    pub one_hour: Option<f64>,
    #[serde(rename = "3h", default, skip_serializing_if = "Option::is_none")]
    pub three_hours: Option<f64>,
}

impl Precipitation {
    pub fn amount(&self, window: AccumulationWindow) -> Option<f64> {
        match window {
            AccumulationWindow::OneHour => self.one_hour,
            AccumulationWindow::ThreeHours => self.three_hours,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: &str = r#"{
        "coord": {"lon": -0.12, "lat": 51.5},
        "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
        "main": {"temp": 11.3, "feels_like": 10.4, "temp_min": 10.0, "temp_max": 12.1,
                 "pressure": 1012, "humidity": 81},
        "wind": {"speed": 4.6, "deg": 230, "gust": 9.3},
        "clouds": {"all": 75},
        "rain": {"1h": 0.42},
        "dt": 1700000000,
        "name": "London"
    }"#;

    #[test]
    fn decodes_provider_payload_ignoring_unknown_fields() {
        let snapshot: WeatherSnapshot = serde_json::from_str(LONDON).expect("valid payload");

        assert_eq!(snapshot.name, "London");
        assert_eq!(snapshot.conditions(), "Rain");
        assert_eq!(snapshot.main.pressure, 1012.0);
        assert_eq!(snapshot.wind.gust, Some(9.3));
        assert_eq!(snapshot.clouds.all, 75.0);
        assert!(snapshot.snow.is_none());

        let rain = snapshot.rain.expect("rain present");
        assert_eq!(rain.amount(AccumulationWindow::OneHour), Some(0.42));
        assert_eq!(rain.amount(AccumulationWindow::ThreeHours), None);
    }

    #[test]
    fn missing_required_section_is_a_decode_error() {
        let body = r#"{"name": "Nowhere", "dt": 0}"#;
        assert!(serde_json::from_str::<WeatherSnapshot>(body).is_err());
    }

    #[test]
    fn observation_time_converts_seconds() {
        let snapshot: WeatherSnapshot = serde_json::from_str(LONDON).expect("valid payload");
        let observed = snapshot.observed_at().expect("valid timestamp");
        assert_eq!(observed.timestamp(), 1_700_000_000);
    }
}
