//! Activity entries recorded for every store command

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A record of one command run against the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Unique ID for this entry (ULID format)
    pub id: String,

    /// When the command ran
    pub timestamp: DateTime<Utc>,

    /// Canonical op string (e.g. "reorder lists")
    pub op: String,

    /// The command's parameters
    pub input: Value,

    /// The result, or `{"error": ...}` on failure
    pub output: Value,

    pub duration_ms: u64,
}

impl ActivityEntry {
    pub fn new(op: impl Into<String>, input: Value, output: Value, duration_ms: u64) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            timestamp: Utc::now(),
            op: op.into(),
            input,
            output,
            duration_ms,
        }
    }

    /// Entry for a command that succeeded
    pub fn success(op: impl Into<String>, input: Value, output: Value, duration_ms: u64) -> Self {
        Self::new(op, input, output, duration_ms)
    }

    /// Entry for a command that failed
    pub fn failure(op: impl Into<String>, input: Value, error: &str, duration_ms: u64) -> Self {
        Self::new(
            op,
            input,
            serde_json::json!({ "error": error }),
            duration_ms,
        )
    }

    pub fn is_failure(&self) -> bool {
        self.output.get("error").is_some()
    }
}
