// crates/folio-core/src/audit.rs
// ============================================================================
// Module: Folio Validation Audit Logging
// Description: Structured audit events for payload validation calls.
// Purpose: Emit redacted JSON-lines records without hard logging deps.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Each [`crate::PayloadValidator`] call produces one [`ValidationAuditEvent`].
//! Events carry the outcome, the violated property paths, and the lookup
//! strategy, but never the submitted field values. Sinks decide where the
//! JSON line goes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Validation call outcome classification.
///
/// # Invariants
/// - Variants are stable for log labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// The record passed every rule.
    Valid,
    /// The record violated at least one rule.
    Invalid,
    /// The reference lookup failed; no verdict was reached.
    Error,
}

/// Payload validation audit event.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Call outcome.
    pub outcome: ValidationOutcome,
    /// Discriminator value when it was an integer.
    pub discriminator: Option<i64>,
    /// Length of `ddd` when it was an array.
    pub item_count: Option<usize>,
    /// Number of violations reported.
    pub error_count: usize,
    /// Violated property paths in report order.
    pub properties: Vec<String>,
    /// Lookup strategy label.
    pub lookup: &'static str,
    /// Lookup failure message when the outcome is an error.
    pub failure: Option<String>,
}

/// Inputs required to construct a validation audit event.
pub struct ValidationAuditEventParams {
    /// Call outcome.
    pub outcome: ValidationOutcome,
    /// Discriminator value when it was an integer.
    pub discriminator: Option<i64>,
    /// Length of `ddd` when it was an array.
    pub item_count: Option<usize>,
    /// Violated property paths in report order.
    pub properties: Vec<String>,
    /// Lookup strategy label.
    pub lookup: &'static str,
    /// Lookup failure message when the outcome is an error.
    pub failure: Option<String>,
}

impl ValidationAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: ValidationAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "payload_validation",
            timestamp_ms,
            outcome: params.outcome,
            discriminator: params.discriminator,
            item_count: params.item_count,
            error_count: params.properties.len(),
            properties: params.properties,
            lookup: params.lookup,
            failure: params.failure,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for validation events.
pub trait ValidationAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &ValidationAuditEvent);
}

/// Audit sink that discards every event.
pub struct NoopAuditSink;

impl ValidationAuditSink for NoopAuditSink {
    fn record(&self, _event: &ValidationAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl ValidationAuditSink for StderrAuditSink {
    fn record(&self, event: &ValidationAuditEvent) {
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

impl ValidationAuditSink for FileAuditSink {
    fn record(&self, event: &ValidationAuditEvent) {
        let Ok(payload) = serde_json::to_string(event) else {
            return;
        };
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{payload}");
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions are permitted."
    )]

    use std::sync::Arc;

    use serde_json::Value;
    use serde_json::json;

    use super::*;
    use crate::lookup::AllowListLookup;
    use crate::lookup::ReferenceSet;
    use crate::validator::PayloadValidator;

    #[test]
    fn file_sink_writes_one_redacted_line_per_call() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("audit.log");
        let sink = Arc::new(FileAuditSink::new(&path).expect("open audit log"));
        let validator = PayloadValidator::new()
            .with_lookup(AllowListLookup::new().with_ids(ReferenceSet::Yyy, [9]))
            .with_audit(sink);

        let record = json!({
            "aaa": "2024-05-01",
            "bbb": "secret title",
            "ccc": 11,
            "ddd": [{ "zzz": 1, "yyy": 2, "xxx": 1, "www": "w" }]
        });
        let result = validator.validate(&record).unwrap();
        assert!(!result.is_valid);
        validator.validate(&json!({ "aaa": "2024-05-01", "bbb": "x", "ccc": 10 })).unwrap();

        let contents = std::fs::read_to_string(&path).expect("read audit log");
        assert!(!contents.contains("secret title"));
        let lines: Vec<Value> =
            contents.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "payload_validation");
        assert_eq!(lines[0]["outcome"], "invalid");
        assert_eq!(lines[0]["lookup"], "allow_list");
        assert_eq!(lines[0]["item_count"], 1);
        assert_eq!(lines[0]["properties"], json!(["ddd[0].yyy"]));
        assert_eq!(lines[1]["outcome"], "valid");
        assert_eq!(lines[1]["error_count"], 0);
    }
}
