//! The snapshot run: dump raw tables, resolve members, join balances.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{error, info};

use crate::config::SnapshotConfig;
use crate::error::AppError;
use crate::extract::{
    exhaust, fetch_stats, join_balances, resolve_members, TableReader, TableRef,
};
use crate::streaming::write_json;

/// File the resolved member list is written to.
pub const MEMBERS_FILE: &str = "members.json";

// ─────────────────────────────────────────────────────────────────────────────
// Report
// ─────────────────────────────────────────────────────────────────────────────

/// A step that did not produce its file.
#[derive(Debug)]
pub struct StepFailure {
    /// Output file the step was meant to write.
    pub step: String,
    pub error: AppError,
}

/// Outcome of a snapshot run.
#[derive(Debug, Default)]
pub struct SnapshotReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<StepFailure>,
    /// Token steps not attempted because member resolution failed.
    pub skipped: Vec<String>,
}

impl SnapshotReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.skipped.is_empty()
    }

    fn record(&mut self, step: String, result: Result<PathBuf, AppError>) {
        match result {
            Ok(path) => {
                info!("[SNAPSHOT] Wrote {}", path.display());
                self.written.push(path);
            }
            Err(e) => {
                error!("[SNAPSHOT] {} failed: {}", step, e);
                self.failures.push(StepFailure { step, error: e });
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Run
// ─────────────────────────────────────────────────────────────────────────────

/// Runs every extraction step in order and writes its output under `out_dir`.
///
/// A failing step is recorded and the run moves on; only the balance joins
/// depend on another step (member resolution) and are skipped if it failed.
///
/// # Errors
///
/// `AppError::Output` if `out_dir` cannot be created. Step failures are
/// reported in the returned [`SnapshotReport`] instead.
pub async fn run_snapshot<R>(
    reader: &R,
    config: &SnapshotConfig,
    out_dir: &Path,
) -> Result<SnapshotReport, AppError>
where
    R: TableReader + ?Sized,
{
    std::fs::create_dir_all(out_dir).map_err(|e| {
        AppError::Output(format!("Failed to create {}: {}", out_dir.display(), e))
    })?;

    let start = Instant::now();
    let mut report = SnapshotReport::default();

    for raw in &config.tables {
        let table = TableRef::new(&raw.account, &raw.scope, &raw.table);
        let result = match exhaust(reader, table).await {
            Ok(rows) => write_json(out_dir.join(&raw.file), &rows),
            Err(e) => Err(e),
        };
        report.record(raw.file.clone(), result);
    }

    let members = match resolve_members(reader, &config.dao).await {
        Ok(members) => {
            let written = write_json(out_dir.join(MEMBERS_FILE), &members);
            report.record(MEMBERS_FILE.to_string(), written);
            Some(members)
        }
        Err(e) => {
            report.record(MEMBERS_FILE.to_string(), Err(e));
            None
        }
    };

    for token in &config.tokens {
        let stats_file = token.stats_file();
        let result = match fetch_stats(reader, token).await {
            Ok(stats) => write_json(out_dir.join(&stats_file), &stats),
            Err(e) => Err(e),
        };
        report.record(stats_file, result);

        let accounts_file = token.accounts_file();
        let Some(members) = members.as_deref() else {
            report.skipped.push(accounts_file);
            continue;
        };
        let result = match join_balances(reader, token, members).await {
            Ok(records) => write_json(out_dir.join(&accounts_file), &records),
            Err(e) => Err(e),
        };
        report.record(accounts_file, result);
    }

    info!(
        "[SNAPSHOT] Done in {}ms: {} written, {} failed, {} skipped",
        start.elapsed().as_millis(),
        report.written.len(),
        report.failures.len(),
        report.skipped.len()
    );

    Ok(report)
}
