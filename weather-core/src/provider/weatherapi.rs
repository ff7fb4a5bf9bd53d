use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{Fahrenheit, WeatherError, provider::fetch_json};

use super::{ProviderId, WeatherProvider};

/// WeatherAPI.com current-conditions client. Upstream reports Fahrenheit directly.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self { api_key, base_url: base_url.trim_end_matches('/').to_string(), http: Client::new() }
    }
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_f: f64,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    current: WaCurrent,
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn temperature(&self, city: &str) -> Result<Fahrenheit, WeatherError> {
        let request = self
            .http
            .get(format!("{}/v1/current.json", self.base_url))
            .query(&[("key", self.api_key.as_str()), ("q", city), ("aqi", "no")]);

        let parsed: WaResponse = fetch_json(ProviderId::WeatherApi, request).await?;
        let fahrenheit = Fahrenheit(parsed.current.temp_f).round();

        tracing::info!(provider = "weatherapi", city, temp = fahrenheit.value(), "temperature fetched");
        Ok(fahrenheit)
    }
}
