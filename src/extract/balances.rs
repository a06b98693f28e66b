//! Token stats and per-member balances.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::TokenConfig;
use crate::error::AppError;
use crate::extract::exhaust::PAGE_SIZE;
use crate::extract::members::Member;
use crate::extract::reader::{Key, Row, TableReader, TableRef};

const ACCOUNTS_TABLE: &str = "accounts";
const STAT_TABLE: &str = "stat";

/// An accounts row tagged with the member that owns it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BalanceRecord(Row);

impl BalanceRecord {
    fn new(mut row: Row, member: &Member) -> Self {
        row.insert("member".to_string(), Value::String(member.to_string()));
        BalanceRecord(row)
    }

    pub fn member(&self) -> Option<&str> {
        self.0.get("member").and_then(Value::as_str)
    }

    pub fn balance(&self) -> Option<&str> {
        self.0.get("balance").and_then(Value::as_str)
    }

    pub fn row(&self) -> &Row {
        &self.0
    }
}

/// True if the row's balance is denominated in `symbol`, e.g. `"10.0000 HVOICE"`.
fn holds_symbol(row: &Row, symbol: &str) -> bool {
    row.get("balance")
        .and_then(Value::as_str)
        .and_then(|balance| balance.split_whitespace().last())
        == Some(symbol)
}

/// Looks up each member's balance of `token`, in member order.
///
/// Each member's accounts table is read once, without pagination. Members
/// holding no balance of the token are left out.
pub async fn join_balances<R>(
    reader: &R,
    token: &TokenConfig,
    members: &[Member],
) -> Result<Vec<BalanceRecord>, AppError>
where
    R: TableReader + ?Sized,
{
    let mut records = Vec::new();

    for member in members {
        let table = TableRef::new(&token.contract, member.as_str(), ACCOUNTS_TABLE);
        let page = reader.get_page(table, PAGE_SIZE, &Key::start()).await?;
        if page.has_more {
            debug!("[BALANCES] {} has more rows than one read returns", table);
        }

        if let Some(row) = page.rows.into_iter().find(|row| holds_symbol(row, &token.symbol)) {
            records.push(BalanceRecord::new(row, member));
        }
    }

    info!(
        "[BALANCES] {}: {} of {} members hold a balance",
        token.symbol,
        records.len(),
        members.len()
    );
    Ok(records)
}

/// Reads the supply row of `token` from its `stat` table.
///
/// # Errors
///
/// `AppError::EmptyTable` if the contract has no stats for the symbol.
pub async fn fetch_stats<R>(reader: &R, token: &TokenConfig) -> Result<Row, AppError>
where
    R: TableReader + ?Sized,
{
    let table = TableRef::new(&token.contract, &token.symbol, STAT_TABLE);
    let page = reader.get_page(table, PAGE_SIZE, &Key::start()).await?;

    page.rows
        .into_iter()
        .next()
        .ok_or_else(|| AppError::EmptyTable {
            table: table.to_string(),
        })
}
