//! Core library for the `weather` service.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The provider abstraction and the built-in provider clients
//! - Scatter-gather aggregation across providers
//! - Shared domain models (temperatures, reports)
//!
//! It is used by `weather-server`, but can also be reused by other binaries or services.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;

pub use aggregate::MultiProvider;
pub use config::{Config, ProviderConfig, ServerConfig};
pub use error::WeatherError;
pub use model::{Fahrenheit, RequestContext, WeatherReport};
pub use provider::{ProviderId, WeatherProvider, providers_from_config};
