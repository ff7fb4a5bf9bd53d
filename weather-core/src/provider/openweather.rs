use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{Fahrenheit, WeatherError, provider::fetch_json};

use super::{ProviderId, WeatherProvider};

/// OpenWeatherMap current-weather client. Upstream reports Kelvin.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn temperature(&self, city: &str) -> Result<Fahrenheit, WeatherError> {
        let request = self
            .http
            .get(format!("{}/data/2.5/weather", self.base_url))
            .query(&[("APPID", self.api_key.as_str()), ("q", city)]);

        let parsed: OwCurrentResponse = fetch_json(ProviderId::OpenWeather, request).await?;
        let fahrenheit = Fahrenheit::from_kelvin(parsed.main.temp).round();

        tracing::info!(provider = "openweather", city, temp = fahrenheit.value(), "temperature fetched");
        Ok(fahrenheit)
    }
}
