#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Configuration and resource adapters for Catacomb.
//!
//! Settings live in a TOML document addressed by dotted keys such as
//! `weapons.pistol.damage`. Reads never fail: a missing key yields the
//! caller's default and a value of the wrong type is reported through
//! `tracing` before the default is used.

mod catalog;
mod resources;

use std::{fs, path::Path, path::PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use toml::{Table, Value};
use tracing::warn;

pub use catalog::{ActorConfig, GadgetConfig, WeaponConfig};
pub use resources::{Placeholder, ResourceCache, Texture, TextureError, PLACEHOLDER_COLOR};

/// Errors raised while loading a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("could not read config file {path}: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid TOML.
    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Key-value settings backed by a TOML document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigStore {
    root: Table,
}

impl ConfigStore {
    /// Creates an empty store in which every lookup yields its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a store from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let root: Table = toml::from_str(text)?;
        Ok(Self { root })
    }

    /// Reads and parses the TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Raw value stored under the dotted `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut parts = key.split('.');
        let mut value = self.root.get(parts.next()?)?;
        for part in parts {
            value = value.as_table()?.get(part)?;
        }
        Some(value)
    }

    /// Reports whether a value is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Value stored under `key`, or `default` when it is missing or has the wrong type.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(value) = self.get(key) else {
            return default;
        };
        match value.clone().try_into() {
            Ok(parsed) => parsed,
            Err(error) => {
                warn!(key, %error, "config value has the wrong type, using the default");
                default
            }
        }
    }

    /// Table stored under `key` deserialized as `T`, falling back to `T::default()`.
    pub fn section<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.get_or(key, T::default())
    }
}
