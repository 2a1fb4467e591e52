// crates/sqlfixture-core/src/fixture.rs
// ============================================================================
// Module: SQL Fixture Model
// Description: Registered fixtures, parameter shapes, and response payloads.
// Purpose: Define the data carried by the fixture store.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`Fixture`] pairs the registered query text with its parameter shapes and the
//! response returned on a match. Parameter shapes are either a static
//! [`ValueKind`] tag or a named [`Predicate`].
//! Invariants:
//! - Responses are opaque to the store and returned unmodified.
//! - Predicates must be side-effect free.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeMap;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::normalize::CanonicalKey;

// ============================================================================
// SECTION: Value Kinds
// ============================================================================

/// Runtime kind of a bound parameter value.
///
/// Kinds follow JSON, not `typeof`: [`ValueKind::Object`] matches only JSON
/// objects. Arrays need [`ValueKind::Array`] and `null` needs
/// [`ValueKind::Null`].
///
/// # Invariants
/// - Labels are stable and lowercase; they round-trip through [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Boolean,
    /// JSON number (integer or float).
    Number,
    /// JSON string.
    String,
    /// JSON array.
    Array,
    /// JSON object.
    Object,
}

impl ValueKind {
    /// Returns the kind of the provided value.
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a type tag label is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown value kind: {0}")]
pub struct UnknownValueKind(pub String);

impl FromStr for ValueKind {
    type Err = UnknownValueKind;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label {
            "null" => Ok(Self::Null),
            "boolean" => Ok(Self::Boolean),
            "number" => Ok(Self::Number),
            "string" => Ok(Self::String),
            "array" => Ok(Self::Array),
            "object" => Ok(Self::Object),
            other => Err(UnknownValueKind(other.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Predicates
// ============================================================================

/// Shared predicate callable.
type PredicateFn = dyn Fn(&Value) -> bool + Send + Sync;

/// Named predicate applied to a single bound parameter.
///
/// # Invariants
/// - The name is used for diagnostics only; it does not affect matching.
#[derive(Clone)]
pub struct Predicate {
    /// Label rendered in store dumps.
    name: String,
    /// Check applied to the value.
    check: Arc<PredicateFn>,
}

impl Predicate {
    /// Creates a predicate with a diagnostic name.
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// Returns the diagnostic name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true when the value satisfies the predicate.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        (self.check)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate").field("name", &self.name).finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Parameter Shapes
// ============================================================================

/// Validator for one positional bound parameter.
#[derive(Debug, Clone)]
pub enum ParamShape {
    /// Value kind must equal the tag.
    Kind(ValueKind),
    /// Predicate must accept the value.
    Predicate(Predicate),
}

impl ParamShape {
    /// Shorthand for a static kind tag.
    #[must_use]
    pub const fn kind(kind: ValueKind) -> Self {
        Self::Kind(kind)
    }

    /// Shorthand for a named predicate.
    pub fn predicate<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Predicate::new(name, check))
    }

    /// Returns true when the value satisfies this shape.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Kind(kind) => ValueKind::of(value) == *kind,
            Self::Predicate(predicate) => predicate.matches(value),
        }
    }
}

impl From<ValueKind> for ParamShape {
    fn from(kind: ValueKind) -> Self {
        Self::Kind(kind)
    }
}

impl From<Predicate> for ParamShape {
    fn from(predicate: Predicate) -> Self {
        Self::Predicate(predicate)
    }
}

impl Serialize for ParamShape {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Kind(kind) => kind.serialize(serializer),
            Self::Predicate(predicate) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("predicate", predicate.name())?;
                map.end()
            }
        }
    }
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// A single result row.
pub type Row = Map<String, Value>;

/// Response payload returned on a successful query match.
///
/// # Invariants
/// - Extra fields are carried opaquely and flattened on serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    /// Number of rows reported by the query.
    pub row_count: u64,
    /// Result rows in order.
    #[serde(default)]
    pub rows: Vec<Row>,
    /// Additional metadata passed through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QueryResponse {
    /// Builds a response whose row count matches the provided rows.
    #[must_use]
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            row_count: rows.len() as u64,
            rows,
            extra: Map::new(),
        }
    }

    /// Builds a response with no rows.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Adds an opaque metadata field.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Registered (query, parameter shapes, response) triple.
///
/// # Invariants
/// - `key` equals `normalize(&query)`.
#[derive(Debug, Clone, Serialize)]
pub struct Fixture {
    /// Canonical lookup key.
    #[serde(skip)]
    pub key: CanonicalKey,
    /// Query text exactly as registered.
    pub query: String,
    /// Positional parameter validators.
    #[serde(rename = "valDefs")]
    pub params: Vec<ParamShape>,
    /// Response returned on a match.
    pub response: QueryResponse,
}
