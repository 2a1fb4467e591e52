// crates/sqlfixture-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example fixture configuration.
// Purpose: Deterministic example for docs and tests.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example of a fixture manifest. Kept in sync with
//! [`crate::FixtureConfig`] by the crate tests.

/// Returns a canonical example fixture configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"latency_ms = 20

[[fixtures]]
query = "SELECT * FROM employees WHERE id = $1"
params = ["number"]

[fixtures.response]
rowCount = 1
rows = [{ id = 1, name = "John Smith", position = "application developer" }]

[[fixtures]]
query = "SELECT * FROM employees"

[fixtures.response]
rowCount = 2
command = "SELECT"
rows = [
    { id = 1, name = "John Smith", position = "application developer" },
    { id = 2, name = "Jane Smith", position = "application developer" },
]
"#,
    )
}
