use crate::{
    Config,
    error::LookupError,
    model::{CurrentWeather, ForecastEntry, Location, Unit},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of weather data. Values come back already expressed in `unit`.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, location: &Location, unit: Unit)
    -> Result<CurrentWeather, LookupError>;

    async fn forecast(
        &self,
        location: &Location,
        unit: Unit,
    ) -> Result<Vec<ForecastEntry>, LookupError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.api_key()?;
    Ok(OpenWeatherProvider::with_base_url(api_key, config.base_url()))
}
