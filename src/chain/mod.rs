//! Chain API access.
//!
//! - [`ChainClient`] owns the HTTP client and logs every request with timing
//! - [`TableRowsClient`] implements [`TableReader`](crate::extract::TableReader)
//!   on top of `/v1/chain/get_table_rows`

pub mod client;
pub mod tables;

pub use client::ChainClient;
pub use tables::{TableRowsClient, GET_TABLE_ROWS_PATH};
