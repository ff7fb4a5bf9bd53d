use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::Password;
use weather_core::{
    Config, MultiProvider, ProviderId, RequestContext, WeatherProvider, providers_from_config,
};

use crate::http;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Average temperatures across weather providers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve `GET /weather/{city}` over HTTP.
    Serve {
        /// Listen address; overrides the config file and WEATHER_BIND.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "openweather" or "weatherapi".
        provider: String,
    },

    /// Print the averaged temperature for a city.
    Show {
        /// City name, passed to every provider as-is.
        city: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { bind } => {
                let config = Config::load()?;
                let bind = bind.unwrap_or_else(|| config.server.bind.clone());
                let providers = MultiProvider::new(providers_from_config(&config)?);

                tracing::info!(providers = providers.len(), "provider set ready");
                http::serve(&bind, Arc::new(providers)).await?;
            }
            Command::Configure { provider } => configure(&provider)?,
            Command::Show { city } => {
                let config = Config::load()?;
                let providers = MultiProvider::new(providers_from_config(&config)?);

                let ctx = RequestContext::new(city);
                let temp = providers.temperature(&ctx.city).await?;
                let report = ctx.finish(temp);

                println!("{}: {} (took {})", report.city, report.temp, report.took);
            }
        }

        Ok(())
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id: ProviderId = provider.parse()?;
    let mut config = Config::load_file()?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.upsert_provider_api_key(id, api_key.trim().to_string());
    config.save()?;

    println!("Saved API key for {id} to {}", Config::config_file_path()?.display());
    Ok(())
}
