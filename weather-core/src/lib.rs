//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather provider and the host geolocation capability
//! - The weather view: lookup state machine and its text rendering
//!
//! It is used by `weather-cli`, but the view only depends on the
//! [`WeatherProvider`] and [`Geolocator`] traits, so other hosts can drive it.

pub mod config;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod provider;
pub mod render;
pub mod view;

pub use config::Config;
pub use error::{GeolocationError, LookupError};
pub use geolocation::{FixedPosition, Geolocator, IpGeolocator, NoGeolocation};
pub use model::{
    Coordinates, CurrentWeather, ForecastEntry, Location, LookupState, Query, Temperature, Unit,
    convert_temperature, icon_url,
};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
pub use render::{RenderContext, render};
pub use view::{LookupOutcome, LookupTarget, LookupTicket, WeatherView};
