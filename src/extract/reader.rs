//! The table-read capability the extraction core is written against.
//!
//! Everything in `extract` talks to the ledger through [`TableReader`], so the
//! algorithms can be driven by the HTTP client in production and by an
//! in-memory fake in tests.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// An untyped table row, exactly as the server returned it.
pub type Row = serde_json::Map<String, Value>;

// ─────────────────────────────────────────────────────────────────────────────
// Key
// ─────────────────────────────────────────────────────────────────────────────

/// An opaque lower-bound key.
///
/// Cursors returned by the server are stored verbatim and sent back without
/// any reinterpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(Value);

impl Key {
    /// The sentinel used for the first page of a scan (numeric zero).
    pub fn start() -> Self {
        Key(Value::from(0u64))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for Key {
    fn from(value: Value) -> Self {
        Key(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key(Value::String(value.to_string()))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Query shapes
// ─────────────────────────────────────────────────────────────────────────────

/// Identifies one table instance: the owning account, the scope, the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRef<'a> {
    pub account: &'a str,
    pub scope: &'a str,
    pub table: &'a str,
}

impl<'a> TableRef<'a> {
    pub fn new(account: &'a str, scope: &'a str, table: &'a str) -> Self {
        Self {
            account,
            scope,
            table,
        }
    }
}

impl fmt::Display for TableRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.account, self.scope, self.table)
    }
}

/// A secondary index to scan instead of the primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpec<'a> {
    /// 1-based index position as the chain API counts it.
    pub position: u8,
    /// Key type of the index, e.g. `name` or `i64`.
    pub key_type: &'a str,
}

/// One batch of rows from a table read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub rows: Vec<Row>,
    pub has_more: bool,
    /// Continuation cursor; only meaningful when `has_more` is set.
    pub next_key: Option<Key>,
}

// ─────────────────────────────────────────────────────────────────────────────
// TableReader
// ─────────────────────────────────────────────────────────────────────────────

/// Read-only access to ledger tables.
///
/// Implementations must not retry: any failure is surfaced to the caller
/// unmodified.
#[async_trait]
pub trait TableReader: Send + Sync {
    /// Reads up to `page_size` rows of `table` starting at `cursor`.
    async fn get_page(
        &self,
        table: TableRef<'_>,
        page_size: u32,
        cursor: &Key,
    ) -> Result<Page, AppError>;

    /// Reads rows of `table` through a secondary index, starting at
    /// `lower_bound`. A `limit` of `None` asks for every match.
    async fn get_indexed_range(
        &self,
        table: TableRef<'_>,
        index: IndexSpec<'_>,
        lower_bound: &Key,
        limit: Option<u32>,
    ) -> Result<Page, AppError>;
}
