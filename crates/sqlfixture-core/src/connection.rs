// crates/sqlfixture-core/src/connection.rs
// ============================================================================
// Module: SQL Fixture Connection
// Description: Connection façade over a shared fixture store.
// Purpose: Stand in for a live database connection in tests.
// Dependencies: async-trait, serde_json
// ============================================================================

//! ## Overview
//! A [`Connection`] is handed out by [`FixtureStore::connect`]. It forwards
//! queries to the store it was created from and treats `end` and `release` as
//! no-ops. It carries no session or transaction state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future;
use std::future::Ready;

use async_trait::async_trait;
use serde_json::Value;

use crate::fixture::QueryResponse;
use crate::interfaces::DatabaseClient;
use crate::interfaces::QueryError;
use crate::interfaces::QueryInput;
use crate::store::FixtureStore;
use crate::store::PendingQuery;

// ============================================================================
// SECTION: Connection
// ============================================================================

/// Connection façade bound to a fixture store.
///
/// # Invariants
/// - Shares the store with every other handle; never owns its lifecycle.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Store answering this connection's queries.
    store: FixtureStore,
}

impl Connection {
    /// Binds a connection to the store.
    pub(crate) const fn new(store: FixtureStore) -> Self {
        Self {
            store,
        }
    }

    /// Returns the store backing this connection.
    #[must_use]
    pub const fn store(&self) -> &FixtureStore {
        &self.store
    }

    /// Answers a query through the backing store.
    ///
    /// See [`FixtureStore::query`].
    pub fn query(&self, input: impl Into<QueryInput>, values: Option<Vec<Value>>) -> PendingQuery {
        self.store.query(input, values)
    }

    /// Ends the connection. Always succeeds.
    pub fn end(&self) -> Ready<()> {
        future::ready(())
    }

    /// Releases the connection. Always succeeds.
    pub fn release(&self) -> Ready<()> {
        future::ready(())
    }
}

#[async_trait]
impl DatabaseClient for Connection {
    type Error = QueryError;

    async fn query(
        &self,
        input: QueryInput,
        values: Option<Vec<Value>>,
    ) -> Result<QueryResponse, QueryError> {
        self.store.query(input, values).await
    }

    async fn end(&self) -> Result<(), QueryError> {
        Ok(())
    }

    async fn release(&self) -> Result<(), QueryError> {
        Ok(())
    }
}
