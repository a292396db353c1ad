//! Runtime settings, read from an optional TOML file and `CATALOG__*`
//! environment variables (`CATALOG__PRICING__POLICY=chunked`).

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::asset::DEFAULT_BASE_URL;
use crate::document::DEFAULT_MAX_BATCH_WRITES;
use crate::pricing::BatchPolicy;

/// Default location of the settings file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/catalog.toml";

const ENV_PREFIX: &str = "CATALOG";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub assets: AssetConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PricingConfig {
    /// Upper bound on writes per price-adjustment commit.
    #[serde(default = "default_max_batch_writes")]
    pub max_batch_writes: usize,
    #[serde(default)]
    pub policy: BatchPolicy,
    /// Round adjusted prices to this many places. Unset keeps full precision.
    #[serde(default)]
    pub decimal_places: Option<u32>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            max_batch_writes: default_max_batch_writes(),
            policy: BatchPolicy::default(),
            decimal_places: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StoreConfig {
    /// Largest atomic commit the in-memory store accepts.
    #[serde(default = "default_max_batch_writes")]
    pub max_batch_writes: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_batch_writes: default_max_batch_writes(),
        }
    }
}

fn default_max_batch_writes() -> usize {
    DEFAULT_MAX_BATCH_WRITES
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl CatalogConfig {
    /// Load from `config/catalog.toml` (if present) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load from the given file (if present) and the environment.
    /// Environment variables win over the file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: CatalogConfig = settings.try_deserialize()?;
        if loaded.pricing.max_batch_writes == 0 || loaded.store.max_batch_writes == 0 {
            return Err(ConfigError::Message(
                "max_batch_writes must be at least 1".to_string(),
            ));
        }
        Ok(loaded)
    }
}
