use reqwest::StatusCode;
use thiserror::Error;

use crate::provider::ProviderId;

/// Failure of a provider call or of an aggregation over several providers.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("{provider}: request failed: {source}")]
    Transport {
        provider: ProviderId,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider}: upstream returned status {status}: {body}")]
    Status {
        provider: ProviderId,
        status: StatusCode,
        body: String,
    },

    #[error("{provider}: failed to decode response: {source}")]
    Decode {
        provider: ProviderId,
        #[source]
        source: serde_json::Error,
    },

    #[error("no weather providers configured")]
    NoProviders,

    #[error("a provider task ended without reporting a result")]
    Incomplete,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WeatherError {
    /// Provider the failure originated from, when it is one of the built-in clients.
    pub fn provider(&self) -> Option<ProviderId> {
        match self {
            WeatherError::Transport { provider, .. }
            | WeatherError::Status { provider, .. }
            | WeatherError::Decode { provider, .. } => Some(*provider),
            _ => None,
        }
    }
}
