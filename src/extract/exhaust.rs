//! Full scan of a paged table.

use tracing::{debug, info};

use crate::error::AppError;
use crate::extract::reader::{Key, Row, TableReader, TableRef};

/// Rows requested per page while exhausting a table.
pub const PAGE_SIZE: u32 = 100;

/// Reads every row of `table`, following `next_key` until the server reports
/// no more data.
///
/// Pages are concatenated in the order the server returns them. Rows are not
/// deduplicated: overlapping pages yield duplicate rows. There is no upper
/// bound on the number of pages.
///
/// # Errors
///
/// - Any error from the reader aborts the scan of this table.
/// - `AppError::MissingCursor` if a page claims more rows without a cursor.
pub async fn exhaust<R>(reader: &R, table: TableRef<'_>) -> Result<Vec<Row>, AppError>
where
    R: TableReader + ?Sized,
{
    let mut rows: Vec<Row> = Vec::new();
    let mut cursor = Key::start();
    let mut page_count: u32 = 0;

    loop {
        page_count += 1;
        let page = reader.get_page(table, PAGE_SIZE, &cursor).await?;

        debug!(
            "[EXHAUST] {} page {}: {} rows, more={}",
            table,
            page_count,
            page.rows.len(),
            page.has_more
        );

        rows.extend(page.rows);

        if !page.has_more {
            break;
        }

        cursor = page.next_key.ok_or_else(|| AppError::MissingCursor {
            table: table.to_string(),
        })?;
    }

    info!(
        "[EXHAUST] {} complete: {} rows, {} pages",
        table,
        rows.len(),
        page_count
    );

    Ok(rows)
}
