// crates/sqlfixture-core/src/interfaces.rs
// ============================================================================
// Module: SQL Fixture Interfaces
// Description: Client and pool contracts shared with real database drivers.
// Purpose: Let fixture-backed doubles stand in wherever a client is expected.
// Dependencies: async-trait, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`DatabaseClient`] and [`DatabasePool`] capture the capability surface
//! application code needs from a database handle: `query`, `end`, `release`,
//! and for pools `connect`. Both the fixture doubles in this crate and adapters
//! over real drivers implement them. [`CapabilitySet`] offers the same check at
//! runtime for code that receives handles dynamically.
//! Invariants:
//! - Query failures surface only through the returned future's `Err`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::fixture::QueryResponse;
use crate::normalize::CanonicalKey;
use crate::validation::ValidationError;

// ============================================================================
// SECTION: Query Input
// ============================================================================

/// Query text bundled with its bound values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// SQL text.
    pub text: String,
    /// Bound values, when carried with the text.
    #[serde(default)]
    pub values: Option<Vec<Value>>,
}

impl QueryConfig {
    /// Creates a config carrying only query text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            values: None,
        }
    }

    /// Attaches bound values.
    #[must_use]
    pub fn with_values(mut self, values: Vec<Value>) -> Self {
        self.values = Some(values);
        self
    }
}

/// First argument of a query call: plain text or a config record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryInput {
    /// Plain SQL text.
    Text(String),
    /// Text plus optional values.
    Config(QueryConfig),
}

impl QueryInput {
    /// Resolves the query text and effective values.
    ///
    /// Explicit `values` win; config values apply only when `values` is `None`.
    #[must_use]
    pub fn resolve(self, values: Option<Vec<Value>>) -> (String, Vec<Value>) {
        match self {
            Self::Text(text) => (text, values.unwrap_or_default()),
            Self::Config(config) => (config.text, values.or(config.values).unwrap_or_default()),
        }
    }
}

impl From<&str> for QueryInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for QueryInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<QueryConfig> for QueryInput {
    fn from(config: QueryConfig) -> Self {
        Self::Config(config)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Query rejection reasons.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages start with `invalid query` or `invalid values`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// No fixture is registered under the query's canonical key.
    #[error("invalid query: {query} query hash: {key}")]
    UnregisteredQuery {
        /// Query text as supplied.
        query: String,
        /// Canonical key computed from the text.
        key: CanonicalKey,
    },
    /// Supplied value count disagrees with the declared shapes.
    #[error(
        "invalid values: Each value must have a corresponding definition (expected {expected}, \
         got {actual})"
    )]
    ArityMismatch {
        /// Number of declared parameter shapes.
        expected: usize,
        /// Number of supplied values.
        actual: usize,
    },
    /// At least one supplied value failed its shape.
    #[error("invalid values: {values}")]
    InvalidValues {
        /// Supplied values serialized as JSON.
        values: String,
    },
}

impl From<ValidationError> for QueryError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::ArityMismatch {
                expected,
                actual,
            } => Self::ArityMismatch {
                expected,
                actual,
            },
        }
    }
}

// ============================================================================
// SECTION: Capabilities
// ============================================================================

/// Operation a database handle can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// `query(text_or_config, values)`.
    Query,
    /// `end()`.
    End,
    /// `release()`.
    Release,
    /// `connect()`.
    Connect,
}

impl Capability {
    /// Bit used in [`CapabilitySet`].
    const fn bit(self) -> u8 {
        match self {
            Self::Query => 1,
            Self::End => 1 << 1,
            Self::Release => 1 << 2,
            Self::Connect => 1 << 3,
        }
    }
}

/// Set of operations a handle offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilitySet {
    /// Capability bitmask.
    bits: u8,
}

impl CapabilitySet {
    /// Capabilities of a single client connection.
    pub const CLIENT: Self = Self::empty()
        .with(Capability::Query)
        .with(Capability::End)
        .with(Capability::Release);
    /// Capabilities of a pool.
    pub const POOL: Self = Self::CLIENT.with(Capability::Connect);

    /// Returns an empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            bits: 0,
        }
    }

    /// Returns the set with `capability` added.
    #[must_use]
    pub const fn with(self, capability: Capability) -> Self {
        Self {
            bits: self.bits | capability.bit(),
        }
    }

    /// Returns true when `capability` is present.
    #[must_use]
    pub const fn contains(self, capability: Capability) -> bool {
        self.bits & capability.bit() != 0
    }
}

/// Returns true when the set covers the client surface (query, end, release).
#[must_use]
pub const fn is_database_client(capabilities: CapabilitySet) -> bool {
    capabilities.contains(Capability::Query)
        && capabilities.contains(Capability::End)
        && capabilities.contains(Capability::Release)
}

/// Returns true when the set covers the pool surface (client plus connect).
#[must_use]
pub const fn is_database_pool(capabilities: CapabilitySet) -> bool {
    is_database_client(capabilities) && capabilities.contains(Capability::Connect)
}

// ============================================================================
// SECTION: Traits
// ============================================================================

/// Query-answering database handle.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Error returned by the handle.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Runs a query and returns its rows.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] when the query is rejected.
    async fn query(
        &self,
        input: QueryInput,
        values: Option<Vec<Value>>,
    ) -> Result<QueryResponse, Self::Error>;

    /// Ends the handle.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] when shutdown fails.
    async fn end(&self) -> Result<(), Self::Error>;

    /// Releases the handle back to its pool.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] when release fails.
    async fn release(&self) -> Result<(), Self::Error>;

    /// Reports the operations this handle offers.
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::CLIENT
    }
}

/// Database handle that can hand out connections.
#[async_trait]
pub trait DatabasePool: DatabaseClient {
    /// Connection type produced by [`DatabasePool::connect`].
    type Connection: DatabaseClient;

    /// Acquires a connection.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseClient::Error`] when no connection can be produced.
    async fn connect(&self) -> Result<Self::Connection, Self::Error>;
}
