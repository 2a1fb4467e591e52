// crates/sqlfixture-core/src/lib.rs
// ============================================================================
// Module: SQL Fixture Core Library
// Description: Public API surface for the SQL fixture test double.
// Purpose: Expose fixture registration, query answering, and client traits.
// Dependencies: crate::{audit, connection, fixture, interfaces, normalize, store, validation}
// ============================================================================

//! ## Overview
//! SQL fixture core lets tests register canonical (query, parameter shapes,
//! response) fixtures on a [`FixtureStore`] and hand out handles that answer
//! `query` calls like a database client or pool. Queries are matched by a
//! whitespace- and case-insensitive canonical key, bound values are checked
//! against per-position shapes, and outcomes are delivered after a simulated
//! latency.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod connection;
pub mod fixture;
pub mod interfaces;
pub mod normalize;
pub mod store;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditOperation;
pub use audit::AuditOutcome;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::QueryAuditEvent;
pub use audit::QueryAuditSink;
pub use audit::StderrAuditSink;
pub use audit::WriterAuditSink;
pub use connection::Connection;
pub use fixture::Fixture;
pub use fixture::ParamShape;
pub use fixture::Predicate;
pub use fixture::QueryResponse;
pub use fixture::Row;
pub use fixture::UnknownValueKind;
pub use fixture::ValueKind;
pub use interfaces::Capability;
pub use interfaces::CapabilitySet;
pub use interfaces::DatabaseClient;
pub use interfaces::DatabasePool;
pub use interfaces::QueryConfig;
pub use interfaces::QueryError;
pub use interfaces::QueryInput;
pub use interfaces::is_database_client;
pub use interfaces::is_database_pool;
pub use normalize::CanonicalKey;
pub use normalize::normalize;
pub use store::DEFAULT_LATENCY;
pub use store::Delayed;
pub use store::FixtureStore;
pub use store::FixtureStoreBuilder;
pub use store::PendingQuery;
pub use validation::ValidationError;
pub use validation::validate;
