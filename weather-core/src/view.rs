//! Weather view state machine.
//!
//! Every change to the location text or the unit issues a [`LookupTicket`].
//! Running a ticket performs the current-weather request and then the
//! forecast request; committing the outcome updates the view state. Only the
//! most recently issued ticket may commit, so a slow lookup that finishes
//! after a newer one started is dropped instead of overwriting fresher data.

use crate::{
    error::LookupError,
    geolocation::Geolocator,
    model::{CurrentWeather, ForecastEntry, Location, LookupState, Query, Unit},
    provider::WeatherProvider,
};

#[derive(Debug, Clone, PartialEq)]
pub enum LookupTarget {
    City(String),
    /// Resolve the host position first, then look up by coordinates.
    CurrentPosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupTicket {
    pub seq: u64,
    pub target: LookupTarget,
    pub unit: Unit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupOutcome {
    pub seq: u64,
    pub result: Result<(CurrentWeather, Vec<ForecastEntry>), LookupError>,
}

#[derive(Debug)]
pub struct WeatherView<P, G> {
    provider: P,
    geolocator: G,
    query: Query,
    state: LookupState,
    latest_seq: u64,
}

impl<P: WeatherProvider, G: Geolocator> WeatherView<P, G> {
    pub fn new(provider: P, geolocator: G) -> Self {
        Self {
            provider,
            geolocator,
            query: Query::default(),
            state: LookupState::Idle,
            latest_seq: 0,
        }
    }

    /// Initial unit, set before the first lookup is issued.
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.query.unit = unit;
        self
    }

    /// Initial location text, set before the first lookup is issued.
    pub fn with_location_text(mut self, text: impl Into<String>) -> Self {
        self.query.location_text = text.into();
        self
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn unit(&self) -> Unit {
        self.query.unit
    }

    pub fn location_text(&self) -> &str {
        &self.query.location_text
    }

    pub fn state(&self) -> &LookupState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }

    pub fn current(&self) -> Option<&CurrentWeather> {
        self.state.current()
    }

    pub fn forecast(&self) -> Option<&[ForecastEntry]> {
        self.state.forecast()
    }

    /// First lookup for the initial query.
    pub fn mount(&mut self) -> LookupTicket {
        self.issue()
    }

    /// Update the location text; issues a lookup when the text changed.
    pub fn set_location_text(&mut self, text: impl Into<String>) -> Option<LookupTicket> {
        let text = text.into();
        if text == self.query.location_text {
            return None;
        }
        self.query.location_text = text;
        Some(self.issue())
    }

    /// Update the unit; issues a lookup when the unit changed.
    pub fn set_unit(&mut self, unit: Unit) -> Option<LookupTicket> {
        if unit == self.query.unit {
            return None;
        }
        self.query.unit = unit;
        Some(self.issue())
    }

    pub fn toggle_unit(&mut self) -> LookupTicket {
        self.query.unit = self.query.unit.toggled();
        self.issue()
    }

    /// Explicit search for the current text, regardless of whether anything changed.
    pub fn search(&mut self) -> LookupTicket {
        self.issue()
    }

    fn issue(&mut self) -> LookupTicket {
        self.latest_seq += 1;
        self.state = LookupState::Loading;

        let text = self.query.location_text.trim();
        let target = if text.is_empty() {
            LookupTarget::CurrentPosition
        } else {
            LookupTarget::City(text.to_string())
        };

        tracing::debug!(seq = self.latest_seq, ?target, unit = %self.query.unit, "lookup issued");

        LookupTicket { seq: self.latest_seq, target, unit: self.query.unit }
    }

    /// Run the lookup described by `ticket` without touching view state.
    pub async fn execute(&self, ticket: &LookupTicket) -> LookupOutcome {
        LookupOutcome { seq: ticket.seq, result: self.fetch(ticket).await }
    }

    async fn fetch(
        &self,
        ticket: &LookupTicket,
    ) -> Result<(CurrentWeather, Vec<ForecastEntry>), LookupError> {
        let location = match &ticket.target {
            LookupTarget::City(name) => Location::City(name.clone()),
            LookupTarget::CurrentPosition => {
                if !self.geolocator.is_supported() {
                    return Err(LookupError::GeolocationUnsupported);
                }
                Location::Coordinates(self.geolocator.current_position().await?)
            }
        };

        let current = self.provider.current(&location, ticket.unit).await?;
        let forecast = self.provider.forecast(&location, ticket.unit).await?;

        Ok((current, forecast))
    }

    /// Apply an outcome. Returns `false` when a newer lookup has been issued
    /// since, in which case the outcome is dropped.
    pub fn commit(&mut self, outcome: LookupOutcome) -> bool {
        if outcome.seq != self.latest_seq {
            tracing::debug!(seq = outcome.seq, latest = self.latest_seq, "stale lookup discarded");
            return false;
        }

        self.state = match outcome.result {
            Ok((current, forecast)) => {
                tracing::debug!(seq = outcome.seq, entries = forecast.len(), "lookup succeeded");
                LookupState::Success { current, forecast }
            }
            Err(err) => {
                tracing::debug!(seq = outcome.seq, error = %err, "lookup failed");
                LookupState::Error(err.to_string())
            }
        };

        true
    }

    /// Execute and commit in one step.
    pub async fn refresh(&mut self, ticket: LookupTicket) -> bool {
        let outcome = self.execute(&ticket).await;
        self.commit(outcome)
    }
}
