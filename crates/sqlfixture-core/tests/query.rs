// crates/sqlfixture-core/tests/query.rs
// ============================================================================
// Module: Query Answering Tests
// Description: Async query resolution through stores and connections.
// Purpose: Validate matching, rejection taxonomy, latency, and client traits.
// ============================================================================

//! ## Overview
//! End-to-end query behavior: registered fixtures resolve with their exact
//! response, unregistered text and bad values reject through the future, and
//! every outcome waits for the simulated latency.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::time::Duration;

use serde_json::Value;
use serde_json::json;
use sqlfixture_core::CapabilitySet;
use sqlfixture_core::Connection;
use sqlfixture_core::DatabaseClient;
use sqlfixture_core::DatabasePool;
use sqlfixture_core::FixtureStore;
use sqlfixture_core::ParamShape;
use sqlfixture_core::QueryConfig;
use sqlfixture_core::QueryError;
use sqlfixture_core::QueryResponse;
use sqlfixture_core::Row;
use sqlfixture_core::ValueKind;
use sqlfixture_core::is_database_client;
use sqlfixture_core::is_database_pool;
use sqlfixture_core::normalize;
use tokio::time::Instant;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const BY_ID: &str = "SELECT * FROM employees WHERE id = $1";

fn rows(values: &[Value]) -> Vec<Row> {
    values.iter().filter_map(|value| value.as_object().cloned()).collect()
}

fn employee_response() -> QueryResponse {
    QueryResponse::new(rows(&[json!({
        "id": 1,
        "name": "John Smith",
        "position": "application developer"
    })]))
}

fn is_positive_int() -> ParamShape {
    ParamShape::predicate("is_positive_int", |value| value.as_u64().is_some_and(|id| id > 0))
}

fn store_with_latency(latency: Duration) -> FixtureStore {
    FixtureStore::builder().latency(latency).build()
}

/// Generic consumer used to prove the fixture handles satisfy the client trait.
async fn first_row_id<C: DatabaseClient>(client: &C, sql: &str) -> Option<Value> {
    let response = client.query(sql.into(), Some(vec![json!(1)])).await.ok()?;
    response.rows.first().and_then(|row| row.get("id").cloned())
}

// ============================================================================
// SECTION: Scenarios
// ============================================================================

#[tokio::test]
async fn number_shape_scenario() {
    let store = store_with_latency(Duration::ZERO);
    let response = QueryResponse::new(rows(&[json!({"id": 1})]));
    store.add("SELECT * FROM t WHERE id = $1", vec![ValueKind::Number.into()], response.clone());
    let conn = store.connect().await;

    let resolved = conn.query("SELECT * FROM t WHERE id = $1", Some(vec![json!(1)])).await;
    assert_eq!(resolved, Ok(response));

    let err = conn.query("SELECT * FROM t WHERE id = $1", Some(vec![json!("1")])).await.unwrap_err();
    assert!(err.to_string().starts_with("invalid values"), "{err}");
    assert_eq!(
        err,
        QueryError::InvalidValues {
            values: r#"["1"]"#.to_string(),
        }
    );

    let err = conn.query("select * from nonexistent", None).await.unwrap_err();
    let key = normalize("select * from nonexistent");
    assert_eq!(
        err.to_string(),
        format!("invalid query: select * from nonexistent query hash: {key}")
    );
    assert_eq!(
        err,
        QueryError::UnregisteredQuery {
            query: "select * from nonexistent".to_string(),
            key,
        }
    );
}

#[tokio::test]
async fn predicate_shape_scenario() {
    let store = store_with_latency(Duration::ZERO);
    store.add(BY_ID, vec![is_positive_int()], employee_response());
    let conn = store.connect().await;

    for bad in [json!(0), json!(1.5), json!("1"), json!(-1)] {
        let err = conn.query(BY_ID, Some(vec![bad.clone()])).await.unwrap_err();
        assert!(matches!(err, QueryError::InvalidValues { .. }), "{bad} -> {err}");
    }
    let res = conn.query(BY_ID, Some(vec![json!(1)])).await.expect("valid id");
    assert_eq!(res.row_count, 1);
    assert_eq!(res.rows[0]["name"], json!("John Smith"));
}

#[tokio::test]
async fn zero_values_resolve_against_declared_shapes() {
    let store = store_with_latency(Duration::ZERO);
    store.add(BY_ID, vec![ValueKind::Number.into()], employee_response());

    assert_eq!(store.query(BY_ID, None).await, Ok(employee_response()));
    assert_eq!(store.query(BY_ID, Some(Vec::new())).await, Ok(employee_response()));
}

#[tokio::test]
async fn arity_mismatch_rejects_through_the_future() {
    let store = store_with_latency(Duration::ZERO);
    store.add("SELECT * FROM schema.table;", Vec::new(), employee_response());
    store.add(BY_ID, vec![ValueKind::Number.into()], employee_response());

    let pending = store.query("SELECT * FROM schema.table", Some(vec![json!("hello")]));
    let err = pending.await.unwrap_err();
    assert_eq!(
        err,
        QueryError::ArityMismatch {
            expected: 0,
            actual: 1,
        }
    );
    assert!(err.to_string().starts_with("invalid values"));

    let err = store.query(BY_ID, Some(vec![json!(1), json!(2)])).await.unwrap_err();
    assert!(matches!(err, QueryError::ArityMismatch { expected: 1, actual: 2 }));
}

#[tokio::test]
async fn dropped_query_rejects_as_unregistered() {
    let store = store_with_latency(Duration::ZERO);
    store.add(BY_ID, vec![is_positive_int()], employee_response());
    assert!(store.drop(BY_ID));

    let err = store.query(BY_ID, Some(vec![json!(1)])).await.unwrap_err();
    assert!(matches!(err, QueryError::UnregisteredQuery { .. }));
}

// ============================================================================
// SECTION: Query Config
// ============================================================================

#[tokio::test]
async fn config_values_apply_when_none_passed() {
    let store = store_with_latency(Duration::ZERO);
    store.add(BY_ID, vec![is_positive_int()], employee_response());

    let config = QueryConfig::new(BY_ID).with_values(vec![json!(1)]);
    assert_eq!(store.query(config, None).await, Ok(employee_response()));

    let config = QueryConfig::new(BY_ID).with_values(vec![json!("hello")]);
    let err = store.query(config, None).await.unwrap_err();
    assert!(err.to_string().starts_with("invalid values"));

    let err = store.query(QueryConfig::new("select * schema.table"), None).await.unwrap_err();
    assert!(err.to_string().starts_with("invalid query"));
}

#[tokio::test]
async fn explicit_values_override_config_values() {
    let store = store_with_latency(Duration::ZERO);
    store.add(BY_ID, vec![is_positive_int()], employee_response());

    let config = QueryConfig::new(BY_ID).with_values(vec![json!("bad")]);
    assert_eq!(store.query(config, Some(vec![json!(1)])).await, Ok(employee_response()));

    let config = QueryConfig::new(BY_ID);
    assert_eq!(store.query(config, Some(vec![json!(1)])).await, Ok(employee_response()));

    let config = QueryConfig::new(BY_ID).with_values(vec![json!(0)]);
    assert_eq!(store.query(config, Some(Vec::new())).await, Ok(employee_response()));
}

// ============================================================================
// SECTION: Latency
// ============================================================================

#[tokio::test(start_paused = true)]
async fn outcomes_wait_for_configured_latency() {
    let store = FixtureStore::new();
    store.add(BY_ID, vec![is_positive_int()], employee_response());

    let start = Instant::now();
    let conn = store.connect().await;
    assert!(start.elapsed() >= Duration::from_millis(20));

    store.set_latency(Duration::from_millis(250));
    let start = Instant::now();
    conn.query(BY_ID, Some(vec![json!(1)])).await.expect("resolve");
    assert!(start.elapsed() >= Duration::from_millis(250));

    let start = Instant::now();
    conn.query("SELECT nothing", None).await.unwrap_err();
    assert!(start.elapsed() >= Duration::from_millis(250));
}

#[tokio::test(start_paused = true)]
async fn zero_latency_resolves_without_advancing_time() {
    let store = store_with_latency(Duration::ZERO);
    store.add(BY_ID, Vec::new(), employee_response());
    let start = Instant::now();
    store.query(BY_ID, None).await.expect("resolve");
    assert!(start.elapsed() < Duration::from_millis(2));
}

#[tokio::test]
async fn outcome_is_fixed_when_query_is_issued() {
    let store = store_with_latency(Duration::from_millis(5));
    store.add(BY_ID, Vec::new(), employee_response());

    let pending = store.query(BY_ID, None);
    store.drop_all();
    assert_eq!(pending.await, Ok(employee_response()));
    assert!(store.query(BY_ID, None).await.is_err());
}

// ============================================================================
// SECTION: Client Surface
// ============================================================================

#[tokio::test]
async fn connections_share_the_store() {
    let store = store_with_latency(Duration::ZERO);
    let first = store.connect().await;
    let second = store.connect().await;

    store.add("SELECT * FROM employees", Vec::new(), employee_response());
    assert_eq!(first.query("select * from employees", None).await, Ok(employee_response()));
    assert_eq!(second.query("SELECT * FROM employees;", None).await, Ok(employee_response()));
    assert!(first.store().contains("SELECT * FROM employees"));

    first.end().await;
    first.release().await;
    assert_eq!(second.query("SELECT * FROM employees", None).await, Ok(employee_response()));
}

#[tokio::test]
async fn handles_satisfy_client_and_pool_traits() {
    let store = store_with_latency(Duration::ZERO);
    store.add(BY_ID, vec![is_positive_int()], employee_response());

    assert_eq!(first_row_id(&store, BY_ID).await, Some(json!(1)));
    let conn: Connection = DatabasePool::connect(&store).await.expect("connect");
    assert_eq!(first_row_id(&conn, BY_ID).await, Some(json!(1)));

    DatabaseClient::end(&conn).await.expect("end");
    DatabaseClient::release(&conn).await.expect("release");
    DatabaseClient::end(&store).await.expect("end");
}

#[test]
fn capability_checks_match_handle_kinds() {
    let store = FixtureStore::new();
    assert!(is_database_pool(DatabaseClient::capabilities(&store)));
    assert!(is_database_client(DatabaseClient::capabilities(&store)));
    assert!(is_database_client(CapabilitySet::CLIENT));
    assert!(!is_database_pool(CapabilitySet::CLIENT));
    assert!(!is_database_client(CapabilitySet::empty()));
}

#[tokio::test]
async fn connection_reports_client_capabilities() {
    let store = store_with_latency(Duration::ZERO);
    let conn = store.connect().await;
    assert_eq!(DatabaseClient::capabilities(&conn), CapabilitySet::CLIENT);
}
