use async_trait::async_trait;
use std::fmt::Debug;

use crate::{FetchError, WeatherQuery, WeatherSnapshot};

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Source of current-conditions snapshots.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, query: &WeatherQuery) -> Result<WeatherSnapshot, FetchError>;
}
