//! Change feed events
//!
//! Row-level notifications from the store. The envelope matches what database
//! webhooks send (`{"type": "INSERT", "table": ..., "record": ..., "old_record": ...}`),
//! so the same type is used for locally produced and externally pushed events.
//!
//! `record` stays untyped on purpose: a malformed row must reach the
//! dispatcher so it can be reported and dropped there, not fail the transport.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::util::now_millis;

/// Orders table name (ventas)
pub const ORDERS_TABLE: &str = "ventas";

/// Dining tables table name (mesas)
pub const TABLES_TABLE: &str = "mesas";

/// Kind of row change
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    #[serde(alias = "insert")]
    Insert,
    #[serde(alias = "update")]
    Update,
    #[serde(alias = "delete")]
    Delete,
}

/// One row change delivered by the feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeEvent {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub table: String,
    /// Full new row (empty object for deletes)
    #[serde(default)]
    pub record: Value,
    #[serde(default)]
    pub old_record: Option<Value>,
    /// Receive time (millis), stamped when the envelope lacks it
    #[serde(default = "now_millis")]
    pub received_at: i64,
}

impl ChangeEvent {
    pub fn insert(table: impl Into<String>, record: Value) -> Self {
        Self {
            kind: ChangeKind::Insert,
            table: table.into(),
            record,
            old_record: None,
            received_at: now_millis(),
        }
    }

    pub fn update(table: impl Into<String>, record: Value, old_record: Option<Value>) -> Self {
        Self {
            kind: ChangeKind::Update,
            table: table.into(),
            record,
            old_record,
            received_at: now_millis(),
        }
    }

    /// Best-effort row id for logging, even when the row itself is invalid
    pub fn record_id(&self) -> Option<String> {
        let id = self
            .record
            .get("id")
            .or_else(|| self.old_record.as_ref().and_then(|r| r.get("id")))?;
        match id {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}
