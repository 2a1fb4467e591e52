// crates/sqlfixture-core/src/store.rs
// ============================================================================
// Module: SQL Fixture Store
// Description: In-memory fixture registry that answers queries.
// Purpose: Register canonical query fixtures and resolve queries against them.
// Dependencies: serde_json, tokio
// ============================================================================

//! ## Overview
//! [`FixtureStore`] maps canonical keys to [`Fixture`] values and answers
//! queries after a simulated latency. Cloning a store yields another handle
//! onto the same fixtures, latency, and audit sink, so connections and test
//! code observe each other's registrations.
//! Invariants:
//! - Later registrations under the same canonical key overwrite earlier ones.
//! - Lookup and validation run when a query is issued; only delivery is delayed.
//! - Locks are never held across an await point.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::audit::AuditOperation;
use crate::audit::AuditOutcome;
use crate::audit::NoopAuditSink;
use crate::audit::QueryAuditEvent;
use crate::audit::QueryAuditSink;
use crate::connection::Connection;
use crate::fixture::Fixture;
use crate::fixture::ParamShape;
use crate::fixture::QueryResponse;
use crate::interfaces::CapabilitySet;
use crate::interfaces::DatabaseClient;
use crate::interfaces::DatabasePool;
use crate::interfaces::QueryError;
use crate::interfaces::QueryInput;
use crate::normalize::CanonicalKey;
use crate::normalize::normalize;
use crate::validation::validate;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Simulated latency applied when none is configured.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(20);

// ============================================================================
// SECTION: Futures
// ============================================================================

/// Boxed future resolving after the simulated latency.
pub type Delayed<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Pending query outcome.
pub type PendingQuery = Delayed<Result<QueryResponse, QueryError>>;

/// Delivers `value` once `latency` has elapsed.
fn delayed<T: Send + 'static>(latency: Duration, value: T) -> Delayed<T> {
    Box::pin(async move {
        tokio::time::sleep(latency).await;
        value
    })
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder for a fixture store.
///
/// # Invariants
/// - Unset fields fall back to [`DEFAULT_LATENCY`] and a no-op audit sink.
#[derive(Default)]
pub struct FixtureStoreBuilder {
    /// Initial simulated latency.
    latency: Option<Duration>,
    /// Audit sink for store events.
    audit: Option<Arc<dyn QueryAuditSink>>,
}

impl FixtureStoreBuilder {
    /// Sets the initial simulated latency.
    #[must_use]
    pub const fn latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Sets the audit sink.
    #[must_use]
    pub fn audit_sink(mut self, sink: Arc<dyn QueryAuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Builds an empty fixture store.
    #[must_use]
    pub fn build(self) -> FixtureStore {
        FixtureStore {
            inner: Arc::new(StoreInner {
                fixtures: Mutex::new(BTreeMap::new()),
                latency: Mutex::new(self.latency.unwrap_or(DEFAULT_LATENCY)),
                audit: self.audit.unwrap_or_else(|| Arc::new(NoopAuditSink)),
            }),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Shared store state.
struct StoreInner {
    /// Fixtures keyed by canonical key.
    fixtures: Mutex<BTreeMap<CanonicalKey, Fixture>>,
    /// Simulated latency for query and connect delivery.
    latency: Mutex<Duration>,
    /// Audit sink for store events.
    audit: Arc<dyn QueryAuditSink>,
}

/// In-memory fixture store answering queries like a database pool.
///
/// # Invariants
/// - Clones share state; there is no process-wide default instance.
#[derive(Clone)]
pub struct FixtureStore {
    /// Shared state.
    inner: Arc<StoreInner>,
}

impl Default for FixtureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureStore {
    /// Creates an empty store with the default latency and no audit output.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Returns a builder for the store.
    #[must_use]
    pub fn builder() -> FixtureStoreBuilder {
        FixtureStoreBuilder::default()
    }

    /// Locks the fixture map.
    ///
    /// Every mutation is a single insert, remove, or clear, so a poisoned map
    /// is still consistent.
    fn fixtures(&self) -> MutexGuard<'_, BTreeMap<CanonicalKey, Fixture>> {
        self.inner.fixtures.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sends an event to the audit sink.
    fn audit(&self, event: &QueryAuditEvent) {
        self.inner.audit.record(event);
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    /// Registers a fixture, overwriting any fixture with the same canonical key.
    pub fn add(&self, query: impl Into<String>, params: Vec<ParamShape>, response: QueryResponse) {
        let query = query.into();
        let key = normalize(&query);
        let fixture = Fixture {
            key: key.clone(),
            query,
            params,
            response,
        };
        self.fixtures().insert(key.clone(), fixture);
        self.audit(&QueryAuditEvent::new(
            AuditOperation::Add,
            Some(key),
            AuditOutcome::Ok,
            self.latency(),
        ));
    }

    /// Removes the fixture registered for `query`.
    ///
    /// Returns true when a fixture was removed.
    pub fn drop(&self, query: &str) -> bool {
        let key = normalize(query);
        let removed = self.fixtures().remove(&key).is_some();
        let outcome = if removed { AuditOutcome::Ok } else { AuditOutcome::NotFound };
        self.audit(&QueryAuditEvent::new(AuditOperation::Drop, Some(key), outcome, self.latency()));
        removed
    }

    /// Removes every fixture.
    pub fn drop_all(&self) {
        self.fixtures().clear();
        self.audit(&QueryAuditEvent::new(
            AuditOperation::DropAll,
            None,
            AuditOutcome::Ok,
            self.latency(),
        ));
    }

    /// Sets the simulated latency for subsequent queries and connects.
    pub fn set_latency(&self, latency: Duration) {
        *self.inner.latency.lock().unwrap_or_else(PoisonError::into_inner) = latency;
        self.audit(&QueryAuditEvent::new(
            AuditOperation::SetLatency,
            None,
            AuditOutcome::Ok,
            latency,
        ));
    }

    // ------------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------------

    /// Returns the simulated latency.
    #[must_use]
    pub fn latency(&self) -> Duration {
        *self.inner.latency.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a snapshot of the fixture registered for `query`.
    #[must_use]
    pub fn lookup(&self, query: &str) -> Option<Fixture> {
        self.fixtures().get(&normalize(query)).cloned()
    }

    /// Returns true when a fixture is registered for `query`.
    #[must_use]
    pub fn contains(&self, query: &str) -> bool {
        self.fixtures().contains_key(&normalize(query))
    }

    /// Returns the registered canonical keys in key order.
    #[must_use]
    pub fn keys(&self) -> Vec<CanonicalKey> {
        self.fixtures().keys().cloned().collect()
    }

    /// Returns the number of registered fixtures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fixtures().len()
    }

    /// Returns true when no fixtures are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fixtures().is_empty()
    }

    /// Renders all fixtures as pretty JSON keyed by canonical key.
    ///
    /// Each entry exposes `query`, `valDefs`, and `response`. Intended for
    /// debugging and assertions, not persistence.
    #[must_use]
    pub fn serialize(&self) -> String {
        serde_json::to_string_pretty(&*self.fixtures()).unwrap_or_else(|_| "{}".to_string())
    }

    // ------------------------------------------------------------------------
    // Query Answering
    // ------------------------------------------------------------------------

    /// Answers a query after the simulated latency.
    ///
    /// `values` takes precedence over values carried in a [`crate::QueryConfig`].
    /// Every rejection, including arity mismatches, is delivered through the
    /// returned future.
    pub fn query(&self, input: impl Into<QueryInput>, values: Option<Vec<Value>>) -> PendingQuery {
        let outcome = self.answer(input.into(), values);
        delayed(self.latency(), outcome)
    }

    /// Produces a connection bound to this store after the simulated latency.
    pub fn connect(&self) -> Delayed<Connection> {
        self.audit(&QueryAuditEvent::new(
            AuditOperation::Connect,
            None,
            AuditOutcome::Ok,
            self.latency(),
        ));
        delayed(self.latency(), Connection::new(self.clone()))
    }

    /// Resolves a query synchronously against the current fixtures.
    fn answer(
        &self,
        input: QueryInput,
        values: Option<Vec<Value>>,
    ) -> Result<QueryResponse, QueryError> {
        let (text, values) = input.resolve(values);
        let value_count = values.len();
        let key = normalize(&text);
        let fixture = self.fixtures().get(&key).cloned();
        let result = match fixture {
            None => Err(QueryError::UnregisteredQuery {
                query: text,
                key: key.clone(),
            }),
            Some(fixture) => match validate(&values, &fixture.params) {
                Ok(true) => Ok(fixture.response),
                Ok(false) => Err(QueryError::InvalidValues {
                    values: Value::Array(values).to_string(),
                }),
                Err(error) => Err(QueryError::from(error)),
            },
        };
        let outcome = match &result {
            Ok(_) => AuditOutcome::Ok,
            Err(QueryError::UnregisteredQuery {
                ..
            }) => AuditOutcome::UnregisteredQuery,
            Err(QueryError::ArityMismatch {
                ..
            }) => AuditOutcome::ArityMismatch,
            Err(QueryError::InvalidValues {
                ..
            }) => AuditOutcome::InvalidValues,
        };
        self.audit(
            &QueryAuditEvent::new(AuditOperation::Query, Some(key), outcome, self.latency())
                .with_value_count(value_count),
        );
        result
    }
}

impl fmt::Display for FixtureStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl fmt::Debug for FixtureStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureStore")
            .field("fixtures", &self.len())
            .field("latency", &self.latency())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Client Surface
// ============================================================================

#[async_trait]
impl DatabaseClient for FixtureStore {
    type Error = QueryError;

    async fn query(
        &self,
        input: QueryInput,
        values: Option<Vec<Value>>,
    ) -> Result<QueryResponse, QueryError> {
        Self::query(self, input, values).await
    }

    async fn end(&self) -> Result<(), QueryError> {
        Ok(())
    }

    async fn release(&self) -> Result<(), QueryError> {
        Ok(())
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::POOL
    }
}

#[async_trait]
impl DatabasePool for FixtureStore {
    type Connection = Connection;

    async fn connect(&self) -> Result<Connection, QueryError> {
        Ok(Self::connect(self).await)
    }
}
