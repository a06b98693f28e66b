//! In-memory `TableReader` for tests.

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppError;
use crate::extract::reader::{IndexSpec, Key, Page, Row, TableReader, TableRef};

/// Builds a `Row` from a `json!` object literal.
pub(crate) fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("row() needs a JSON object, got {}", other),
    }
}

/// One recorded read.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    pub table: String,
    pub cursor: Key,
    pub limit: Option<u32>,
    pub index: Option<(u8, String)>,
}

enum FakeTable {
    /// Pages served one per call, in order.
    Scripted {
        pages: VecDeque<Page>,
        failure: Option<String>,
    },
    /// Rows sorted by `key_field`, served with lower-bound semantics.
    Keyed { key_field: String, rows: Vec<Row> },
}

#[derive(Default)]
struct State {
    tables: HashMap<String, FakeTable>,
    indexes: HashMap<String, Page>,
    calls: Vec<Call>,
}

/// A scripted stand-in for the chain API.
#[derive(Default)]
pub(crate) struct FakeChain {
    state: Mutex<State>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts `table` with pages of `(rows, next_key)`; a page has more data
    /// exactly when it carries a cursor.
    pub fn script_pages(&self, table: TableRef<'_>, pages: Vec<(Vec<Row>, Option<Key>)>) {
        let pages = pages
            .into_iter()
            .map(|(rows, next_key)| Page {
                rows,
                has_more: next_key.is_some(),
                next_key,
            })
            .collect();
        self.script_pages_raw(table, pages);
    }

    pub fn script_pages_raw(&self, table: TableRef<'_>, pages: Vec<Page>) {
        self.state.lock().unwrap().tables.insert(
            table.to_string(),
            FakeTable::Scripted {
                pages: pages.into(),
                failure: None,
            },
        );
    }

    /// Makes reads of `table` fail once its scripted pages are used up.
    pub fn fail_after_script(&self, table: TableRef<'_>, message: &str) {
        let mut state = self.state.lock().unwrap();
        let entry = state
            .tables
            .entry(table.to_string())
            .or_insert_with(|| FakeTable::Scripted {
                pages: VecDeque::new(),
                failure: None,
            });
        if let FakeTable::Scripted { failure, .. } = entry {
            *failure = Some(message.to_string());
        }
    }

    /// Serves `rows` ordered by `key_field`, honouring the lower bound.
    pub fn keyed_rows(&self, table: TableRef<'_>, key_field: &str, mut rows: Vec<Row>) {
        rows.sort_by(|a, b| compare_values(&a[key_field], &b[key_field]));
        self.state.lock().unwrap().tables.insert(
            table.to_string(),
            FakeTable::Keyed {
                key_field: key_field.to_string(),
                rows,
            },
        );
    }

    /// Serves `rows` for any secondary-index read of `table`.
    pub fn index_rows(&self, table: TableRef<'_>, rows: Vec<Row>) {
        self.state.lock().unwrap().indexes.insert(
            table.to_string(),
            Page {
                rows,
                has_more: false,
                next_key: None,
            },
        );
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_for(&self, table: TableRef<'_>) -> Vec<Call> {
        let name = table.to_string();
        self.calls().into_iter().filter(|c| c.table == name).collect()
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a.as_u64(), b.as_u64()) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => match (a.as_str(), b.as_str()) {
            (Some(x), Some(y)) => x.cmp(y),
            _ => a.to_string().cmp(&b.to_string()),
        },
    }
}

#[async_trait]
impl TableReader for FakeChain {
    async fn get_page(
        &self,
        table: TableRef<'_>,
        page_size: u32,
        cursor: &Key,
    ) -> Result<Page, AppError> {
        let mut state = self.state.lock().unwrap();
        let name = table.to_string();
        state.calls.push(Call {
            table: name.clone(),
            cursor: cursor.clone(),
            limit: Some(page_size),
            index: None,
        });

        match state.tables.get_mut(&name) {
            Some(FakeTable::Scripted { pages, failure }) => match pages.pop_front() {
                Some(page) => Ok(page),
                None => match failure {
                    Some(message) => Err(AppError::ConnectionFailed(message.clone())),
                    None => Err(AppError::Internal(format!("{} has no scripted page left", name))),
                },
            },
            Some(FakeTable::Keyed { key_field, rows }) => {
                let key_field = key_field.as_str();
                let mut matching = rows.iter().filter(|r| {
                    compare_values(&r[key_field], cursor.as_value()) != Ordering::Less
                });
                let taken: Vec<Row> = matching
                    .by_ref()
                    .take(page_size as usize)
                    .cloned()
                    .collect();
                let next = matching.next().map(|r| Key::from(r[key_field].clone()));
                Ok(Page {
                    rows: taken,
                    has_more: next.is_some(),
                    next_key: next,
                })
            }
            None => Ok(Page::default()),
        }
    }

    async fn get_indexed_range(
        &self,
        table: TableRef<'_>,
        index: IndexSpec<'_>,
        lower_bound: &Key,
        limit: Option<u32>,
    ) -> Result<Page, AppError> {
        let mut state = self.state.lock().unwrap();
        let name = table.to_string();
        state.calls.push(Call {
            table: name.clone(),
            cursor: lower_bound.clone(),
            limit,
            index: Some((index.position, index.key_type.to_string())),
        });

        Ok(state.indexes.get(&name).cloned().unwrap_or_default())
    }
}
