use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{
    config::DEFAULT_BASE_URL,
    error::LookupError,
    model::{CurrentWeather, ForecastEntry, Location, Temperature, Unit},
};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue `GET {base_url}/{endpoint}` for `location` in `unit` and decode the body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        location: &Location,
        unit: Unit,
    ) -> Result<T, LookupError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let mut params: Vec<(&str, String)> = match location {
            Location::City(name) => vec![("q", name.clone())],
            Location::Coordinates(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
            ],
        };
        params.push(("units", unit.as_str().to_string()));
        params.push(("appid", self.api_key.clone()));

        tracing::debug!(endpoint, %location, %unit, "requesting OpenWeather");

        let res = self.http.get(&url).query(&params).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            let message = error_message(status, &body);
            tracing::warn!(endpoint, %status, %message, "OpenWeather request failed");
            return Err(LookupError::Provider(message));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// The body's `message` field, or a status line if the body has none.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<OwErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("request failed with status {status}"))
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    #[serde(default)]
    sys: OwSys,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn condition(weather: &[OwWeather]) -> (String, Option<String>) {
    weather
        .first()
        .map(|w| (w.description.clone(), w.icon.clone()))
        .unwrap_or_else(|| ("Unknown".to_string(), None))
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, location: &Location, unit: Unit) -> Result<CurrentWeather, LookupError> {
        let parsed: OwCurrentResponse = self.get_json("weather", location, unit).await?;
        let (description, icon) = condition(&parsed.weather);

        Ok(CurrentWeather {
            city: parsed.name,
            country: parsed.sys.country,
            temperature: Temperature::new(parsed.main.temp, unit),
            humidity_pct: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            description,
            icon,
        })
    }

    async fn forecast(
        &self,
        location: &Location,
        unit: Unit,
    ) -> Result<Vec<ForecastEntry>, LookupError> {
        let parsed: OwForecastResponse = self.get_json("forecast", location, unit).await?;

        parsed
            .list
            .into_iter()
            .map(|entry| -> Result<ForecastEntry, LookupError> {
                let timestamp = DateTime::<Utc>::from_timestamp(entry.dt, 0).ok_or_else(|| {
                    LookupError::Network(format!("Invalid forecast timestamp: {}", entry.dt))
                })?;
                let (description, icon) = condition(&entry.weather);

                Ok(ForecastEntry {
                    timestamp,
                    temperature: Temperature::new(entry.main.temp, unit),
                    description,
                    icon,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_body_message() {
        let msg = error_message(StatusCode::NOT_FOUND, r#"{"cod":"404","message":"city not found"}"#);
        assert_eq!(msg, "city not found");
    }

    #[test]
    fn error_message_falls_back_to_status() {
        let msg = error_message(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(msg, "request failed with status 502 Bad Gateway");
    }

    #[test]
    fn condition_defaults_when_weather_missing() {
        let (description, icon) = condition(&[]);
        assert_eq!(description, "Unknown");
        assert!(icon.is_none());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let provider = OpenWeatherProvider::with_base_url("KEY".into(), "http://localhost/");
        assert_eq!(provider.base_url(), "http://localhost");
    }
}
