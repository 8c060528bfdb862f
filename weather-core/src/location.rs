//! Location services used for the widget's one-shot position lookup.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::{debug, info};

use crate::{Coordinates, LocationError};

pub const IP_API_URL: &str = "http://ip-api.com/json";

/// Something that can report the device's current position once.
#[async_trait]
pub trait LocationService: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Position supplied up front, e.g. from command-line arguments.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationService for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// Location lookup switched off; behaves like a denied permission.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledLocation;

#[async_trait]
impl LocationService for DisabledLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

/// Approximate position from the ip-api.com geolocation service.
#[derive(Debug, Clone)]
pub struct IpApiLocator {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpApiLocator {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: Client::new(),
        }
    }
}

impl Default for IpApiLocator {
    fn default() -> Self {
        Self::new(IP_API_URL)
    }
}

#[async_trait]
impl LocationService for IpApiLocator {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        let res = self
            .http
            .get(&self.url)
            .query(&[("fields", "status,message,lat,lon")])
            .send()
            .await
            .map_err(|e| {
                debug!("ip geolocation request failed: {e}");
                LocationError::ServiceUnavailable
            })?;

        if !res.status().is_success() {
            return Err(LocationError::Other(format!(
                "ip geolocation returned status {}",
                res.status()
            )));
        }

        let body: IpApiResponse = res
            .json()
            .await
            .map_err(|e| LocationError::Other(format!("malformed geolocation response: {e}")))?;

        if body.status != "success" {
            let reason = body.message.unwrap_or_else(|| body.status.clone());
            return Err(LocationError::Other(reason));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => {
                info!(lat, lon, "resolved position from ip geolocation");
                Ok(Coordinates::new(lat, lon))
            }
            _ => Err(LocationError::Other("geolocation response without coordinates".into())),
        }
    }
}
