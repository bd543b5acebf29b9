use thiserror::Error;

/// Failures of the host geolocation capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Error fetching current location")]
    Denied,
    #[error("Geolocation is not supported by this browser")]
    Unsupported,
}

/// Everything that can end a lookup. The display text is what the view shows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Provider answered with a non-success status; message comes from the body.
    #[error("{0}")]
    Provider(String),
    #[error("Error fetching current location")]
    GeolocationDenied,
    #[error("Geolocation is not supported by this browser")]
    GeolocationUnsupported,
    /// Transport or decode failure.
    #[error("{0}")]
    Network(String),
}

impl From<GeolocationError> for LookupError {
    fn from(err: GeolocationError) -> Self {
        match err {
            GeolocationError::Denied => LookupError::GeolocationDenied,
            GeolocationError::Unsupported => LookupError::GeolocationUnsupported,
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key.
        LookupError::Network(err.without_url().to_string())
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(err: serde_json::Error) -> Self {
        LookupError::Network(format!("Failed to parse provider response: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geolocation_errors_map_to_lookup_errors() {
        assert_eq!(LookupError::from(GeolocationError::Denied), LookupError::GeolocationDenied);
        assert_eq!(
            LookupError::from(GeolocationError::Unsupported).to_string(),
            "Geolocation is not supported by this browser"
        );
    }

    #[test]
    fn provider_message_is_verbatim() {
        assert_eq!(LookupError::Provider("city not found".into()).to_string(), "city not found");
    }
}
