//! Extraction core: table exhaustion, membership resolution and balance joins.
//!
//! All algorithms are generic over [`TableReader`] and issue their queries
//! strictly one after another.

pub mod balances;
pub mod content;
pub mod exhaust;
pub mod members;
pub mod reader;

#[cfg(test)]
pub(crate) mod testing;

pub use balances::{fetch_stats, join_balances, BalanceRecord};
pub use content::{Content, ContentGroup, Document};
pub use exhaust::{exhaust, PAGE_SIZE};
pub use members::{resolve_members, Member};
pub use reader::{IndexSpec, Key, Page, Row, TableReader, TableRef};
