//! Host position lookup used when no location text is given.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{error::GeolocationError, model::Coordinates};

pub const DEFAULT_IP_GEOLOCATION_URL: &str = "http://ip-api.com/json";

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    /// Whether the host can resolve a position at all.
    fn is_supported(&self) -> bool;

    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

#[async_trait]
impl<T: Geolocator + ?Sized> Geolocator for Box<T> {
    fn is_supported(&self) -> bool {
        (**self).is_supported()
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        (**self).current_position().await
    }
}

/// A position known up front (config file or command-line flags).
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

#[async_trait]
impl Geolocator for FixedPosition {
    fn is_supported(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}

/// Host without any position source.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

#[async_trait]
impl Geolocator for NoGeolocation {
    fn is_supported(&self) -> bool {
        false
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

/// Approximate position from the public IP address.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    url: String,
    http: Client,
}

impl IpGeolocator {
    pub fn new() -> Self {
        Self::with_url(DEFAULT_IP_GEOLOCATION_URL)
    }

    pub fn with_url(url: &str) -> Self {
        Self { url: url.to_string(), http: Client::new() }
    }
}

impl Default for IpGeolocator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[async_trait]
impl Geolocator for IpGeolocator {
    fn is_supported(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        let res = self.http.get(&self.url).send().await.map_err(|err| {
            tracing::warn!(error = %err, "IP geolocation request failed");
            GeolocationError::Denied
        })?;

        if !res.status().is_success() {
            tracing::warn!(status = %res.status(), "IP geolocation returned failure status");
            return Err(GeolocationError::Denied);
        }

        let body: IpApiResponse = res.json().await.map_err(|err| {
            tracing::warn!(error = %err, "IP geolocation response could not be parsed");
            GeolocationError::Denied
        })?;

        if body.status.as_deref().is_some_and(|s| s != "success") {
            return Err(GeolocationError::Denied);
        }

        match (body.lat, body.lon) {
            (Some(latitude), Some(longitude)) => Ok(Coordinates { latitude, longitude }),
            _ => Err(GeolocationError::Denied),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_position_returns_coordinates() {
        let coords = Coordinates { latitude: 1.5, longitude: -2.0 };
        let geo = FixedPosition(coords);

        assert!(geo.is_supported());
        assert_eq!(geo.current_position().await, Ok(coords));
    }

    #[tokio::test]
    async fn no_geolocation_is_unsupported() {
        let geo = NoGeolocation;

        assert!(!geo.is_supported());
        assert_eq!(geo.current_position().await, Err(GeolocationError::Unsupported));
    }
}
