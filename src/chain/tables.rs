//! `get_table_rows` client implementing [`TableReader`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::chain::client::ChainClient;
use crate::error::AppError;
use crate::extract::reader::{IndexSpec, Key, Page, Row, TableReader, TableRef};

/// Chain API path for table reads.
pub const GET_TABLE_ROWS_PATH: &str = "/v1/chain/get_table_rows";

/// Wire value of an unbounded `limit`.
const UNBOUNDED_LIMIT: i64 = -1;

// ─────────────────────────────────────────────────────────────────────────────
// Internal Wire Types (match the chain API JSON exactly)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct WireTableRowsRequest<'a> {
    code: &'a str,
    scope: &'a str,
    table: &'a str,
    json: bool,
    limit: i64,
    lower_bound: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_type: Option<&'a str>,
}

impl<'a> WireTableRowsRequest<'a> {
    fn new(table: TableRef<'a>, limit: i64, lower_bound: &'a Key) -> Self {
        Self {
            code: table.account,
            scope: table.scope,
            table: table.table,
            json: true,
            limit,
            lower_bound: lower_bound.as_value(),
            index_position: None,
            key_type: None,
        }
    }

    fn with_index(mut self, index: IndexSpec<'a>) -> Self {
        self.index_position = Some(index.position.to_string());
        self.key_type = Some(index.key_type);
        self
    }
}

#[derive(Debug, Deserialize)]
struct WireTableRowsResponse {
    rows: Vec<Row>,
    #[serde(default)]
    more: bool,
    #[serde(default)]
    next_key: Option<Value>,
}

impl From<WireTableRowsResponse> for Page {
    fn from(wire: WireTableRowsResponse) -> Self {
        let next_key = if wire.more {
            wire.next_key.filter(|key| !key.is_null()).map(Key::from)
        } else {
            None
        };
        Page {
            rows: wire.rows,
            has_more: wire.more,
            next_key,
        }
    }
}

/// Error envelope returned by the node on failed requests.
#[derive(Debug, Deserialize)]
struct WireChainError {
    message: String,
    error: Option<WireErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct WireErrorDetail {
    name: String,
    what: String,
    #[serde(default)]
    details: Vec<WireErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct WireErrorMessage {
    message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// TableRowsClient
// ─────────────────────────────────────────────────────────────────────────────

/// Reads contract tables through the chain API.
#[derive(Clone)]
pub struct TableRowsClient {
    client: ChainClient,
}

impl TableRowsClient {
    pub fn new(client: ChainClient) -> Self {
        Self { client }
    }

    async fn get_table_rows(&self, request: &WireTableRowsRequest<'_>) -> Result<Page, AppError> {
        let response = self.client.post_json(GET_TABLE_ROWS_PATH, request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.handle_error_response(response, status).await);
        }

        let wire: WireTableRowsResponse = response.json().await.map_err(|e| {
            AppError::InvalidResponse(format!("Failed to parse get_table_rows response: {}", e))
        })?;

        debug!(
            "[CHAIN] {}/{}/{}: {} rows, more={}",
            request.code,
            request.scope,
            request.table,
            wire.rows.len(),
            wire.more
        );

        Ok(wire.into())
    }

    /// Parses an error body and maps it to `AppError::ChainError`.
    async fn handle_error_response(
        &self,
        response: reqwest::Response,
        status: reqwest::StatusCode,
    ) -> AppError {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("Unable to read error body"));

        if let Ok(wire) = serde_json::from_str::<WireChainError>(&body) {
            return AppError::ChainError(match wire.error {
                Some(detail) => match detail.details.first() {
                    Some(first) => format!("[{}] {}: {}", detail.name, detail.what, first.message),
                    None => format!("[{}] {}", detail.name, detail.what),
                },
                None => wire.message,
            });
        }

        AppError::ChainError(format!(
            "HTTP {} - {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown error")
        ))
    }
}

#[async_trait]
impl TableReader for TableRowsClient {
    async fn get_page(
        &self,
        table: TableRef<'_>,
        page_size: u32,
        cursor: &Key,
    ) -> Result<Page, AppError> {
        let request = WireTableRowsRequest::new(table, i64::from(page_size), cursor);
        self.get_table_rows(&request).await
    }

    async fn get_indexed_range(
        &self,
        table: TableRef<'_>,
        index: IndexSpec<'_>,
        lower_bound: &Key,
        limit: Option<u32>,
    ) -> Result<Page, AppError> {
        let limit = limit.map(i64::from).unwrap_or(UNBOUNDED_LIMIT);
        let request = WireTableRowsRequest::new(table, limit, lower_bound).with_index(index);
        self.get_table_rows(&request).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
