use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};

use crate::provider::ProviderId;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

const ENV_BIND: &str = "WEATHER_BIND";

/// Configuration for a single provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,

    /// Overrides the provider's public endpoint, e.g. to point at a mock server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    /// Example TOML:
    /// [providers.openweather]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Config {
    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Load config from disk and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Override file values with `WEATHER_BIND` and `WEATHER_<PROVIDER>_API_KEY`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = lookup(ENV_BIND).filter(|v| !v.is_empty()) {
            self.server.bind = bind;
        }

        for id in ProviderId::all() {
            if let Some(key) = lookup(&id.api_key_env()).filter(|v| !v.is_empty()) {
                self.upsert_provider_api_key(*id, key);
            }
        }
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set or replace a provider API key, keeping any base URL override.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        match self.providers.get_mut(provider_id.as_str()) {
            Some(cfg) => cfg.api_key = api_key,
            None => {
                self.providers
                    .insert(provider_id.as_str().to_string(), ProviderConfig { api_key, base_url: None });
            }
        }
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id).map(|cfg| cfg.api_key.as_str())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some_and(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_default_bind() {
        let cfg = Config::default();
        assert_eq!(cfg.server.bind, DEFAULT_BIND);
        assert!(!cfg.is_provider_configured(ProviderId::OpenWeather));
    }

    #[test]
    fn parses_toml_with_base_url() {
        let cfg = Config::from_toml(
            r#"
            [server]
            bind = "127.0.0.1:9000"

            [providers.openweather]
            api_key = "OPEN_KEY"
            base_url = "http://localhost:1234"

            [providers.weatherapi]
            api_key = "WEATHER_KEY"
            "#,
        )
        .expect("valid toml");

        assert_eq!(cfg.server.bind, "127.0.0.1:9000");
        let ow = cfg.provider_config(ProviderId::OpenWeather).unwrap();
        assert_eq!(ow.api_key, "OPEN_KEY");
        assert_eq!(ow.base_url.as_deref(), Some("http://localhost:1234"));
        assert_eq!(cfg.provider_api_key(ProviderId::WeatherApi), Some("WEATHER_KEY"));
    }

    #[test]
    fn missing_server_section_falls_back_to_default() {
        let cfg = Config::from_toml("[providers.weatherapi]\napi_key = \"K\"\n").unwrap();
        assert_eq!(cfg.server.bind, DEFAULT_BIND);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "FILE_KEY".into());
        cfg.providers.get_mut("openweather").unwrap().base_url = Some("http://mock".into());

        cfg.apply_env(|key| match key {
            "WEATHER_BIND" => Some("127.0.0.1:3000".into()),
            "WEATHER_OPENWEATHER_API_KEY" => Some("ENV_KEY".into()),
            "WEATHER_WEATHERAPI_API_KEY" => Some(String::new()),
            _ => None,
        });

        assert_eq!(cfg.server.bind, "127.0.0.1:3000");
        let ow = cfg.provider_config(ProviderId::OpenWeather).unwrap();
        assert_eq!(ow.api_key, "ENV_KEY");
        assert_eq!(ow.base_url.as_deref(), Some("http://mock"));
        assert!(!cfg.is_provider_configured(ProviderId::WeatherApi));
    }

    #[test]
    fn empty_api_key_is_not_configured() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::WeatherApi, String::new());
        assert!(!cfg.is_provider_configured(ProviderId::WeatherApi));
    }
}
