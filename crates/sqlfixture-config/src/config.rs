// crates/sqlfixture-config/src/config.rs
// ============================================================================
// Module: SQL Fixture Config
// Description: TOML fixture manifests and store settings.
// Purpose: Load, validate, and apply declarative fixture sets.
// Dependencies: sqlfixture-core, serde, toml, thiserror
// ============================================================================

//! ## Overview
//! A [`FixtureConfig`] declares the simulated latency and a list of fixtures
//! whose parameters are described by value kind tags. Predicates cannot be
//! expressed in a file; register those in code on the built store.
//! Invariants:
//! - Unknown fields are rejected.
//! - Each canonical key appears at most once per file; duplicates are an error
//!   rather than a silent overwrite.
//! - Latency is bounded by [`MAX_LATENCY_MS`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use sqlfixture_core::CanonicalKey;
use sqlfixture_core::FixtureStore;
use sqlfixture_core::ParamShape;
use sqlfixture_core::QueryResponse;
use sqlfixture_core::ValueKind;
use sqlfixture_core::normalize;
use sqlfixture_core::normalize::normalized_text;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum config file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum configurable latency in milliseconds.
pub const MAX_LATENCY_MS: u64 = 60_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Returns the default latency in milliseconds.
const fn default_latency_ms() -> u64 {
    20
}

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Declarative fixture set.
///
/// # Invariants
/// - `latency_ms` is at most [`MAX_LATENCY_MS`] once validated.
/// - Fixture queries are non-empty and canonically distinct once validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureConfig {
    /// Simulated latency in milliseconds.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    /// Fixtures registered on the store.
    #[serde(default)]
    pub fixtures: Vec<FixtureEntry>,
}

/// One declared fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureEntry {
    /// Query text.
    pub query: String,
    /// Positional value kinds.
    #[serde(default)]
    pub params: Vec<ValueKind>,
    /// Response returned on a match.
    pub response: QueryResponse,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            fixtures: Vec::new(),
        }
    }
}

impl FixtureConfig {
    /// Loads and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when reading, parsing, or validation fails.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates TOML config text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a limit or uniqueness rule fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.latency_ms > MAX_LATENCY_MS {
            return Err(ConfigError::Invalid(format!(
                "latency_ms out of range: {} (max {MAX_LATENCY_MS})",
                self.latency_ms
            )));
        }
        let mut seen: BTreeMap<CanonicalKey, usize> = BTreeMap::new();
        for (index, entry) in self.fixtures.iter().enumerate() {
            if normalized_text(&entry.query).is_empty() {
                return Err(ConfigError::Invalid(format!("fixtures[{index}].query must be non-empty")));
            }
            if let Some(first) = seen.insert(normalize(&entry.query), index) {
                return Err(ConfigError::Invalid(format!(
                    "fixtures[{index}].query duplicates fixtures[{first}].query"
                )));
            }
        }
        Ok(())
    }

    /// Returns the configured latency.
    #[must_use]
    pub const fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    /// Builds a store with the configured latency and fixtures.
    #[must_use]
    pub fn build_store(&self) -> FixtureStore {
        let store = FixtureStore::builder().latency(self.latency()).build();
        self.register(&store);
        store
    }

    /// Applies latency and fixtures to an existing store.
    ///
    /// Fixtures overwrite existing registrations with the same canonical key.
    pub fn apply_to(&self, store: &FixtureStore) {
        store.set_latency(self.latency());
        self.register(store);
    }

    /// Registers every declared fixture.
    fn register(&self, store: &FixtureStore) {
        for entry in &self.fixtures {
            let params = entry.params.iter().copied().map(ParamShape::from).collect();
            store.add(entry.query.clone(), params, entry.response.clone());
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Config loading and validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates config path length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}
