use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const ICON_URL_BASE: &str = "https://openweathermap.org/img/wn";

/// Temperature scale selector. The string form is sent verbatim as `units=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Metric,
    Imperial,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Metric => "metric",
            Unit::Imperial => "imperial",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Unit::Metric => "Celsius",
            Unit::Imperial => "Fahrenheit",
        }
    }

    /// Wind speed is reported in m/s for metric and mph for imperial.
    pub fn wind_speed_label(&self) -> &'static str {
        match self {
            Unit::Metric => "m/s",
            Unit::Imperial => "mph",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Unit::Metric => Unit::Imperial,
            Unit::Imperial => Unit::Metric,
        }
    }

    pub const fn all() -> &'static [Unit] {
        &[Unit::Metric, Unit::Imperial]
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Unit {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "metric" | "celsius" | "c" => Ok(Unit::Metric),
            "imperial" | "fahrenheit" | "f" => Ok(Unit::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit '{value}'. Supported units: metric, imperial."
            )),
        }
    }
}

impl std::str::FromStr for Unit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::try_from(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// What a provider request is keyed by.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    City(String),
    Coordinates(Coordinates),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::City(name) => f.write_str(name),
            Location::Coordinates(c) => write!(f, "{},{}", c.latitude, c.longitude),
        }
    }
}

/// User-editable lookup inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub location_text: String,
    pub unit: Unit,
}

/// A temperature together with the scale the provider reported it in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature {
    pub value: f64,
    pub unit: Unit,
}

impl Temperature {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// Value expressed in `target`. Identity when already in `target`, so a
    /// value fetched in the displayed unit is never converted twice.
    pub fn in_unit(&self, target: Unit) -> f64 {
        match (self.unit, target) {
            (Unit::Metric, Unit::Imperial) => self.value * 9.0 / 5.0 + 32.0,
            (Unit::Imperial, Unit::Metric) => (self.value - 32.0) * 5.0 / 9.0,
            _ => self.value,
        }
    }
}

/// Free-function form of [`Temperature::in_unit`].
pub fn convert_temperature(temperature: Temperature, target: Unit) -> f64 {
    temperature.in_unit(target)
}

pub fn icon_url(icon_code: &str) -> String {
    format!("{ICON_URL_BASE}/{icon_code}.png")
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    pub city: String,
    pub country: Option<String>,
    pub temperature: Temperature,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub description: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub temperature: Temperature,
    pub description: String,
    pub icon: Option<String>,
}

/// Result of the most recent lookup. Exactly one variant holds at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LookupState {
    #[default]
    Idle,
    Loading,
    Error(String),
    Success {
        current: CurrentWeather,
        forecast: Vec<ForecastEntry>,
    },
}

impl LookupState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LookupState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LookupState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn current(&self) -> Option<&CurrentWeather> {
        match self {
            LookupState::Success { current, .. } => Some(current),
            _ => None,
        }
    }

    pub fn forecast(&self) -> Option<&[ForecastEntry]> {
        match self {
            LookupState::Success { forecast, .. } => Some(forecast),
            _ => None,
        }
    }
}
