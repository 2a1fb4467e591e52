// crates/sqlfixture-core/src/audit.rs
// ============================================================================
// Module: SQL Fixture Audit Logging
// Description: Structured audit events for fixture registration and queries.
// Purpose: Emit JSON-line logs without hard logging dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The fixture store reports every registration change and every answered
//! query as a [`QueryAuditEvent`]. Sinks decide where the JSON lines go; the
//! default sink discards them.
//! Invariants:
//! - Events carry canonical keys and counts only, never raw values or rows.
//! - Sink failures are swallowed; auditing never changes a query outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::normalize::CanonicalKey;

// ============================================================================
// SECTION: Labels
// ============================================================================

/// Store operation that produced an audit event.
///
/// # Invariants
/// - Variants are stable for log labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOperation {
    /// Fixture registered or overwritten.
    Add,
    /// Single fixture removal.
    Drop,
    /// All fixtures cleared.
    DropAll,
    /// Simulated latency changed.
    SetLatency,
    /// Connection handed out.
    Connect,
    /// Query answered or rejected.
    Query,
}

/// Outcome recorded for an audited operation.
///
/// # Invariants
/// - Variants are stable for log labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// Operation succeeded.
    Ok,
    /// Drop targeted a query that was not registered.
    NotFound,
    /// Query text matched no fixture.
    UnregisteredQuery,
    /// Supplied value count disagreed with the declared shapes.
    ArityMismatch,
    /// At least one supplied value failed its shape.
    InvalidValues,
}

// ============================================================================
// SECTION: Events
// ============================================================================

/// Fixture store audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Operation that produced the event.
    pub operation: AuditOperation,
    /// Canonical key when the operation targets one fixture.
    pub key: Option<CanonicalKey>,
    /// Operation outcome.
    pub outcome: AuditOutcome,
    /// Number of supplied values (queries only).
    pub value_count: Option<usize>,
    /// Simulated latency in effect (milliseconds).
    pub latency_ms: u128,
}

impl QueryAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(
        operation: AuditOperation,
        key: Option<CanonicalKey>,
        outcome: AuditOutcome,
        latency: Duration,
    ) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "fixture_store",
            timestamp_ms,
            operation,
            key,
            outcome,
            value_count: None,
            latency_ms: latency.as_millis(),
        }
    }

    /// Attaches the supplied value count.
    #[must_use]
    pub const fn with_value_count(mut self, count: usize) -> Self {
        self.value_count = Some(count);
        self
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for fixture store events.
pub trait QueryAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &QueryAuditEvent);
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl QueryAuditSink for NoopAuditSink {
    fn record(&self, _event: &QueryAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl QueryAuditSink for StderrAuditSink {
    fn record(&self, event: &QueryAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl QueryAuditSink for FileAuditSink {
    fn record(&self, event: &QueryAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Audit sink that logs JSON lines to an arbitrary writer.
pub struct WriterAuditSink<W: Write + Send> {
    /// Output writer for log records.
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterAuditSink<W> {
    /// Creates a sink over the provided writer.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl<W: Write + Send> QueryAuditSink for WriterAuditSink<W> {
    fn record(&self, event: &QueryAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut writer) = self.writer.lock()
        {
            let _ = writeln!(writer, "{payload}");
        }
    }
}
