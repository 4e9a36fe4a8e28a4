//! Application configuration module
//!
//! Configuration is loaded from environment variables with the `AREA_SCOUT`
//! prefix using the `config` and `dotenvy` crates. Nested values are separated
//! by a double underscore. Every section has working defaults, so an empty
//! environment yields a runnable in-memory configuration.
//!
//! # Example
//!
//! ```no_run
//! use area_scout::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod cache;
mod enrichment;
mod error;
mod generation;
mod scoring;
mod server;
mod sources;

pub use cache::{CacheBackend, CacheConfig};
pub use enrichment::EnrichmentConfig;
pub use error::{ConfigError, ValidationError};
pub use generation::{GenerationConfig, ProviderSettings};
pub use scoring::ScoringConfig;
pub use server::{Environment, ServerConfig};
pub use sources::{SourceSettings, SourcesConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Cache backend, response TTL, warming
    #[serde(default)]
    pub cache: CacheConfig,

    /// External data sources
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Deadlines and fan-out
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Persona catalog
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Video providers
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// - `AREA_SCOUT__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `AREA_SCOUT__SOURCES__PROPERTY__API_KEY=...` -> `sources.property.api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("AREA_SCOUT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.cache.validate()?;
        self.sources.validate()?;
        self.enrichment.validate()?;
        self.generation.validate()?;
        if self.enrichment.cold_deadline_secs >= self.server.request_timeout_secs {
            return Err(ValidationError::DeadlineExceedsRequestTimeout);
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
