// crates/sqlfixture-config/src/lib.rs
// ============================================================================
// Module: SQL Fixture Config Library
// Description: Declarative fixture manifests for the SQL fixture store.
// Purpose: Single source of truth for fixture TOML semantics.
// Dependencies: sqlfixture-core, serde, toml
// ============================================================================

//! ## Overview
//! `sqlfixture-config` defines a TOML manifest for fixture sets: simulated
//! latency plus (query, value kinds, response) entries. Loading is strict and
//! fails closed on unknown fields, oversized files, and duplicate queries.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
