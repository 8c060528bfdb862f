use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::{Config, FetchError, WeatherQuery, WeatherSnapshot};

use super::WeatherProvider;

/// Client for the OpenWeather "current weather" endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    app_id: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(app_id: String, base_url: impl Into<String>) -> Self {
        Self {
            app_id,
            base_url: base_url.into(),
            http: Client::new(),
        }
    }

    /// Build a provider from loaded configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let app_id = config.app_id()?;
        Ok(Self::new(app_id.to_owned(), config.base_url.clone()))
    }

    fn endpoint(&self) -> String {
        format!("{}/weather", self.base_url.trim_end_matches('/'))
    }

    fn query_params(&self, query: &WeatherQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![("appid", self.app_id.clone())];

        match query {
            WeatherQuery::Coordinates(coords) => {
                params.push(("lat", coords.latitude.to_string()));
                params.push(("lon", coords.longitude.to_string()));
            }
            WeatherQuery::Place(place) => params.push(("q", place.clone())),
        }

        params.push(("units", "metric".to_string()));
        params
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, query: &WeatherQuery) -> Result<WeatherSnapshot, FetchError> {
        debug!(?query, "requesting current weather");

        let res = self
            .http
            .get(self.endpoint())
            .query(&self.query_params(query))
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Coordinates;

    fn provider() -> OpenWeatherProvider {
        OpenWeatherProvider::new("KEY".into(), "https://example.test/data/2.5/")
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(provider().endpoint(), "https://example.test/data/2.5/weather");
    }

    #[test]
    fn coordinate_query_carries_lat_lon_and_units() {
        let params = provider()
            .query_params(&WeatherQuery::Coordinates(Coordinates::new(51.5, -0.12)));

        assert_eq!(
            params,
            vec![
                ("appid", "KEY".to_string()),
                ("lat", "51.5".to_string()),
                ("lon", "-0.12".to_string()),
                ("units", "metric".to_string()),
            ]
        );
    }

    #[test]
    fn place_query_is_sent_verbatim() {
        let params = provider().query_params(&WeatherQuery::Place("São Paulo, BR".into()));
        assert!(params.contains(&("q", "São Paulo, BR".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "lat"));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);

        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn from_config_requires_app_id() {
        let err = OpenWeatherProvider::from_config(&Config::default()).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather app id configured"));
    }
}
