//! Error types for the network stats board

use thiserror::Error;

/// Errors that can occur when fetching from a data provider
///
/// This is the only error kind that crosses the adapter boundary. Every
/// variant names the provider so the store can attribute the failure to
/// the right metric slice.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network request failed
    #[error("{provider}: network error fetching {endpoint}: {source}")]
    Network {
        provider: &'static str,
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Provider answered with a non-2xx status
    #[error("{provider}: HTTP {status} from {endpoint}")]
    Status {
        provider: &'static str,
        endpoint: String,
        status: u16,
    },

    /// Rate limit exceeded
    #[error("{provider}: rate limit exceeded")]
    RateLimited { provider: &'static str },

    /// Response body did not match the provider's documented shape
    #[error("{provider}: invalid response from {endpoint}: {detail}")]
    InvalidResponse {
        provider: &'static str,
        endpoint: String,
        detail: String,
    },

    /// Timeout waiting for response
    #[error("{provider}: request to {endpoint} timed out")]
    Timeout {
        provider: &'static str,
        endpoint: String,
    },
}

impl ProviderError {
    /// Classifies a transport-level failure, splitting timeouts out of the
    /// generic network case.
    pub fn network(provider: &'static str, endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        let endpoint = endpoint.into();
        if source.is_timeout() {
            Self::Timeout { provider, endpoint }
        } else {
            Self::Network {
                provider,
                endpoint,
                source,
            }
        }
    }

    /// Maps a response status, treating 429 as rate limiting.
    pub fn status(provider: &'static str, endpoint: impl Into<String>, status: u16) -> Self {
        if status == 429 {
            Self::RateLimited { provider }
        } else {
            Self::Status {
                provider,
                endpoint: endpoint.into(),
                status,
            }
        }
    }

    /// Creates an InvalidResponse error
    pub fn invalid_response(
        provider: &'static str,
        endpoint: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::InvalidResponse {
            provider,
            endpoint: endpoint.into(),
            detail: detail.into(),
        }
    }

    /// The provider this error is attributed to
    pub fn provider(&self) -> &'static str {
        match self {
            Self::Network { provider, .. }
            | Self::Status { provider, .. }
            | Self::RateLimited { provider }
            | Self::InvalidResponse { provider, .. }
            | Self::Timeout { provider, .. } => provider,
        }
    }
}
