// crates/sqlfixture-core/src/validation.rs
// ============================================================================
// Module: SQL Fixture Parameter Validation
// Description: Positional validation of bound values against parameter shapes.
// Purpose: Decide whether supplied values satisfy a fixture's shapes.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! Validation is evaluated in order:
//! 1. No supplied values always validates, whatever the shapes declare.
//! 2. Supplied values with no shapes, or with a different count, is an
//!    [`ValidationError::ArityMismatch`] rather than a plain mismatch.
//! 3. Otherwise every position must satisfy its shape.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::fixture::ParamShape;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Validation failures distinct from a plain value mismatch.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Value count does not match the declared shape count.
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
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates supplied values against positional parameter shapes.
///
/// Every position is evaluated; the result is the conjunction of all checks.
///
/// # Errors
///
/// Returns [`ValidationError::ArityMismatch`] when values are supplied and the
/// shape list is empty or has a different length.
pub fn validate(values: &[Value], shapes: &[ParamShape]) -> Result<bool, ValidationError> {
    if values.is_empty() {
        return Ok(true);
    }
    if shapes.is_empty() || values.len() != shapes.len() {
        return Err(ValidationError::ArityMismatch {
            expected: shapes.len(),
            actual: values.len(),
        });
    }
    Ok(values.iter().zip(shapes).fold(true, |valid, (value, shape)| shape.matches(value) && valid))
}
