use thiserror::Error;

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Transport ─────────────────────────────────────────────────────────────
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Chain API error: {0}")]
    ChainError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    // ── Extraction ────────────────────────────────────────────────────────────
    #[error("Page of {table} reported more rows but carried no next_key")]
    MissingCursor { table: String },

    #[error("Table {table} returned no rows")]
    EmptyTable { table: String },

    // ── Config / Output ───────────────────────────────────────────────────────
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to write output: {0}")]
    Output(String),

    // ── Generic fallback ──────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}
