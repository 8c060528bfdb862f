//! Core library for the weather widget.
//!
//! This crate defines:
//! - Configuration & credential handling
//! - The OpenWeather client behind a provider trait
//! - Location services for the one-shot position lookup
//! - The widget state machine and its renderer-independent view
//!
//! It is used by `weather-widget`, but any front end can drive a
//! [`WeatherWidget`] and draw its [`View`].

pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod present;
pub mod provider;
pub mod view;
pub mod widget;

pub use config::{Config, LoadingRelease};
pub use error::{FetchError, LocationError};
pub use location::{DisabledLocation, FixedLocation, IpApiLocator, LocationService};
pub use model::{AccumulationWindow, Coordinates, WeatherQuery, WeatherSnapshot};
pub use provider::{OpenWeatherProvider, WeatherProvider};
pub use view::View;
pub use widget::{WeatherWidget, WidgetState};
