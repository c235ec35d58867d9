use thiserror::Error;

use crate::types::ProviderKind;

/// Problems with the origin coordinate or its place in the service area.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("invalid coordinate: {reason}")]
    InvalidCoordinate { reason: String },

    #[error("no known city within {max_km} km of ({lat}, {lng})")]
    NoCityMatch { lat: f64, lng: f64, max_km: f64 },
}

/// Failures from a single upstream provider, or from both at once.
///
/// Every variant is `Clone` so one fetch outcome can be handed to all
/// callers waiting on the same in-flight request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("{provider} provider timed out after {timeout_ms} ms")]
    Timeout {
        provider: ProviderKind,
        timeout_ms: u64,
    },

    #[error("{provider} provider HTTP error: {message}")]
    Http {
        provider: ProviderKind,
        message: String,
    },

    #[error("{provider} provider returned status {status}: {message}")]
    Upstream {
        provider: ProviderKind,
        status: String,
        message: String,
    },

    #[error("{provider} provider response could not be decoded: {message}")]
    Decode {
        provider: ProviderKind,
        message: String,
    },

    #[error("all providers unavailable (directory: {directory}; search: {search})")]
    AllProvidersUnavailable {
        directory: Box<ProviderError>,
        search: Box<ProviderError>,
    },
}

impl ProviderError {
    /// The provider this error came from, or `None` for the combined failure.
    #[must_use]
    pub fn provider(&self) -> Option<ProviderKind> {
        match self {
            ProviderError::Timeout { provider, .. }
            | ProviderError::Http { provider, .. }
            | ProviderError::Upstream { provider, .. }
            | ProviderError::Decode { provider, .. } => Some(*provider),
            ProviderError::AllProvidersUnavailable { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("cache is full ({max_entries} entries)")]
    Full { max_entries: usize },
}

/// Error returned by [`crate::PlaceFinder::find_nearby_places`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The background fetch task ended without a result.
    #[error("search fetch aborted: {reason}")]
    FetchAborted { reason: String },
}
