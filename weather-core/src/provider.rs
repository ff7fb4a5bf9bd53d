use crate::{
    Config, Fahrenheit, WeatherError,
    provider::{openweather::OpenWeatherProvider, weatherapi::WeatherApiProvider},
};
use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;
pub mod weatherapi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    WeatherApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::WeatherApi]
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "http://api.openweathermap.org",
            ProviderId::WeatherApi => "http://api.weatherapi.com",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_env(&self) -> String {
        format!("WEATHER_{}_API_KEY", self.as_str().to_uppercase())
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderId {
    type Err = anyhow::Error;

    /// Case-insensitive lookup by short name.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        ProviderId::all()
            .iter()
            .copied()
            .find(|id| id.as_str().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| {
                let known: Vec<_> = ProviderId::all().iter().map(ProviderId::as_str).collect();
                anyhow::anyhow!("Unknown provider '{name}'. Supported providers: {}.", known.join(", "))
            })
    }
}

/// Anything that can report the current temperature for a city.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn temperature(&self, city: &str) -> Result<Fahrenheit, WeatherError>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let provider_cfg = config
        .provider_config(id)
        .filter(|cfg| !cfg.api_key.is_empty())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No API key configured for provider '{id}'.\n\
                 Hint: run `weather configure {id}` or set {}.",
                id.api_key_env()
            )
        })?;

    let api_key = provider_cfg.api_key.clone();
    let base_url = provider_cfg
        .base_url
        .clone()
        .unwrap_or_else(|| id.default_base_url().to_string());

    let provider: Arc<dyn WeatherProvider> = match id {
        ProviderId::OpenWeather => Arc::new(OpenWeatherProvider::with_base_url(api_key, base_url)),
        ProviderId::WeatherApi => Arc::new(WeatherApiProvider::with_base_url(api_key, base_url)),
    };

    Ok(provider)
}

/// Build the provider set from every configured provider, in `ProviderId::all()` order.
pub fn providers_from_config(config: &Config) -> anyhow::Result<Vec<Arc<dyn WeatherProvider>>> {
    let mut providers = Vec::new();

    for id in ProviderId::all() {
        if !config.is_provider_configured(*id) {
            tracing::warn!(provider = %id, "no API key configured, skipping provider");
            continue;
        }
        providers.push(provider_from_config(*id, config)?);
    }

    if providers.is_empty() {
        return Err(anyhow::anyhow!(
            "No weather providers configured.\n\
             Hint: run `weather configure <provider>` (e.g. `weather configure openweather`) first."
        ));
    }

    Ok(providers)
}

/// Send `request` and decode a JSON body, mapping each failure to the provider that caused it.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    provider: ProviderId,
    request: RequestBuilder,
) -> Result<T, WeatherError> {
    let res = request
        .send()
        .await
        .map_err(|source| WeatherError::Transport { provider, source })?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|source| WeatherError::Transport { provider, source })?;

    if !status.is_success() {
        return Err(WeatherError::Status {
            provider,
            status,
            body: truncate_body(&body),
        });
    }

    serde_json::from_str(&body).map_err(|source| WeatherError::Decode { provider, source })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn parses_short_names_case_insensitively() {
        assert_eq!("OpenWeather".parse::<ProviderId>().unwrap(), ProviderId::OpenWeather);
        assert_eq!(" weatherapi ".parse::<ProviderId>().unwrap(), ProviderId::WeatherApi);

        let err = "accuweather".parse::<ProviderId>().unwrap_err().to_string();
        assert!(err.contains("Unknown provider 'accuweather'"));
        assert!(err.contains("openweather, weatherapi"));
    }

    #[test]
    fn api_key_env_names() {
        assert_eq!(ProviderId::OpenWeather.api_key_env(), "WEATHER_OPENWEATHER_API_KEY");
        assert_eq!(ProviderId::WeatherApi.api_key_env(), "WEATHER_WEATHERAPI_API_KEY");
    }

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(ProviderId::OpenWeather, &cfg).unwrap_err();
        assert!(err.to_string().contains("No API key configured for provider"));
    }

    #[test]
    fn providers_from_config_errors_when_nothing_configured() {
        let cfg = Config::default();
        let err = providers_from_config(&cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No weather providers configured"));
        assert!(msg.contains("Hint: run `weather configure"));
    }

    #[test]
    fn providers_from_config_skips_unconfigured() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::WeatherApi, "KEY".to_string());

        let providers = providers_from_config(&cfg).expect("one provider configured");
        assert_eq!(providers.len(), 1);
    }

    #[test]
    fn providers_from_config_builds_all() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "OPEN_KEY".to_string());
        cfg.upsert_provider_api_key(ProviderId::WeatherApi, "WEATHER_KEY".to_string());

        let providers = providers_from_config(&cfg).expect("both configured");
        assert_eq!(providers.len(), 2);
    }

    #[test]
    fn truncate_body_limits_long_bodies() {
        let long = "é".repeat(300);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.chars().count(), 203);
        assert!(truncated.ends_with("..."));

        assert_eq!(truncate_body("short"), "short");
    }
}
