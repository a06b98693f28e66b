//! Membership resolution over the DAO document graph.
//!
//! Members are found by scanning the edge index for `member` edges leaving
//! the DAO root, loading each target document, and reading the member
//! account out of the document's `details` content group.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::DaoConfig;
use crate::error::AppError;
use crate::extract::content::Document;
use crate::extract::reader::{IndexSpec, Key, Row, TableReader, TableRef};

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// A resolved member account name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Member(String);

impl Member {
    pub fn new(name: impl Into<String>) -> Self {
        Member(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two edge fields membership cares about.
#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Edge {
    edge_name: String,
    to_node: Value,
}

impl Edge {
    fn from_row(row: &Row) -> Result<Self, AppError> {
        serde_json::from_value(Value::Object(row.clone()))
            .map_err(|e| AppError::InvalidResponse(format!("Malformed edge row: {}", e)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Resolves every member of the DAO, in edge-scan order.
///
/// The edge index is read once with no limit and no pagination. Edges whose
/// target document is missing, or whose document has no `details` member
/// field, are skipped with a warning.
///
/// # Errors
///
/// Reader errors and malformed edge or document rows abort resolution.
pub async fn resolve_members<R>(reader: &R, dao: &DaoConfig) -> Result<Vec<Member>, AppError>
where
    R: TableReader + ?Sized,
{
    let targets = member_targets(reader, dao).await?;
    let documents = TableRef::new(&dao.contract, &dao.contract, &dao.documents_table);

    info!(
        "[MEMBERS] {} {} edges from {}",
        targets.len(),
        dao.member_edge,
        dao.contract
    );

    let mut members = Vec::with_capacity(targets.len());

    for node in targets {
        let Some(document) = lookup_document(reader, documents, &node).await? else {
            warn!(
                "[MEMBERS] Invalid member id found: {}. Found edge but not the document. Skipping",
                node
            );
            continue;
        };

        match extract_member(&document, dao) {
            Some(member) => members.push(member),
            None => warn!(
                "[MEMBERS] Document {} has no {}/{} field. Skipping",
                node, dao.details_group, dao.member_label
            ),
        }
    }

    info!("[MEMBERS] Resolved {} members", members.len());
    Ok(members)
}

/// Scans the edge-name index and returns the targets of the member edges.
async fn member_targets<R>(reader: &R, dao: &DaoConfig) -> Result<Vec<Value>, AppError>
where
    R: TableReader + ?Sized,
{
    let edges = TableRef::new(&dao.contract, &dao.contract, &dao.edges_table);
    let index = IndexSpec {
        position: dao.edge_index_position,
        key_type: &dao.edge_key_type,
    };

    let page = reader
        .get_indexed_range(edges, index, &Key::from(dao.member_edge.as_str()), None)
        .await?;

    // The index scan is only lower-bounded, so later edge names come back too.
    let mut targets = Vec::new();
    for row in &page.rows {
        let edge = Edge::from_row(row)?;
        if edge.edge_name == dao.member_edge {
            targets.push(edge.to_node);
        }
    }
    Ok(targets)
}

/// Loads the document with exactly this id.
///
/// The documents table only offers a lower-bound read, which lands on the
/// next document when `id` does not exist, so the returned id is checked.
async fn lookup_document<R>(
    reader: &R,
    documents: TableRef<'_>,
    id: &Value,
) -> Result<Option<Document>, AppError>
where
    R: TableReader + ?Sized,
{
    let page = reader.get_page(documents, 1, &Key::from(id.clone())).await?;

    let Some(row) = page.rows.into_iter().next() else {
        return Ok(None);
    };
    if row.get("id") != Some(id) {
        return Ok(None);
    }

    serde_json::from_value(Value::Object(row))
        .map(Some)
        .map_err(|e| AppError::InvalidResponse(format!("Malformed document {}: {}", id, e)))
}

/// Reads the member account out of a document, if present.
fn extract_member(document: &Document, dao: &DaoConfig) -> Option<Member> {
    document
        .field(&dao.details_group, &dao.member_label)?
        .as_str()
        .map(Member::new)
}
