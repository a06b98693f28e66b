//! Snapshot configuration.
//!
//! Contract names, token symbols, table names and the API endpoint all live
//! here and are passed explicitly to the extraction steps. The defaults are
//! the production values; a TOML file may override any subset of them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::AppError;

/// Public Telos API node used when no endpoint is configured.
pub const DEFAULT_API_URL: &str = "https://telos.greymass.com";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

// ─────────────────────────────────────────────────────────────────────────────
// SnapshotConfig
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Base URL of the chain API node.
    pub api_url: String,
    pub timeout_secs: u64,
    /// Directory the JSON files are written to.
    pub output_dir: PathBuf,
    pub dao: DaoConfig,
    /// Tables dumped in full.
    pub tables: Vec<RawTableConfig>,
    /// Tokens whose stats and member balances are extracted.
    pub tokens: Vec<TokenConfig>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            output_dir: PathBuf::from("."),
            dao: DaoConfig::default(),
            tables: vec![
                RawTableConfig::new(
                    "bank.hypha",
                    "bank.hypha",
                    "redemptions",
                    "bank-redemptions.json",
                ),
                RawTableConfig::new("bank.hypha", "bank.hypha", "payments", "bank-payments.json"),
                RawTableConfig::new(
                    "costak.hypha",
                    "costak.hypha",
                    "balances",
                    "costak-balances.json",
                ),
                RawTableConfig::new("costak.hypha", "costak.hypha", "locks", "costak-locks.json"),
            ],
            tokens: vec![
                TokenConfig::new("hvoice", "voice.hypha", "HVOICE"),
                TokenConfig::new("husd", "husd.hypha", "HUSD"),
                TokenConfig::new("hypha", "hypha.hypha", "HYPHA"),
            ],
        }
    }
}

impl SnapshotConfig {
    /// Loads a config from a TOML file. Missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, AppError> {
        let config: SnapshotConfig =
            toml::from_str(text).map_err(|e| AppError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values a run cannot proceed without.
    pub fn validate(&self) -> Result<(), AppError> {
        let url = Url::parse(&self.api_url)
            .map_err(|e| AppError::Config(format!("Invalid api_url {:?}: {}", self.api_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "api_url must be http or https, got {}",
                url.scheme()
            )));
        }
        if self.dao.contract.is_empty() {
            return Err(AppError::Config("dao.contract is empty".into()));
        }
        for token in &self.tokens {
            if token.symbol.is_empty() || token.contract.is_empty() || token.name.is_empty() {
                return Err(AppError::Config(format!(
                    "Incomplete token entry: {:?}",
                    token
                )));
            }
        }
        for table in &self.tables {
            if table.file.is_empty() {
                return Err(AppError::Config(format!("No output file for table {}", table.table)));
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DaoConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Where the document graph lives and how membership is encoded in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaoConfig {
    /// The DAO contract. Its own scope holds the edges and documents; it is
    /// the root of the membership walk.
    pub contract: String,
    pub edges_table: String,
    pub documents_table: String,
    /// Secondary index on edge name.
    pub edge_index_position: u8,
    pub edge_key_type: String,
    pub member_edge: String,
    pub details_group: String,
    pub member_label: String,
}

impl Default for DaoConfig {
    fn default() -> Self {
        Self {
            contract: "dao.hypha".to_string(),
            edges_table: "edges".to_string(),
            documents_table: "documents".to_string(),
            edge_index_position: 4,
            edge_key_type: "name".to_string(),
            member_edge: "member".to_string(),
            details_group: "details".to_string(),
            member_label: "member".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tables and tokens
// ─────────────────────────────────────────────────────────────────────────────

/// A table dumped in full to `file`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTableConfig {
    pub account: String,
    pub scope: String,
    pub table: String,
    pub file: String,
}

impl RawTableConfig {
    pub fn new(account: &str, scope: &str, table: &str, file: &str) -> Self {
        Self {
            account: account.to_string(),
            scope: scope.to_string(),
            table: table.to_string(),
            file: file.to_string(),
        }
    }
}

/// A token contract and the symbol it issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Prefix of the output files, e.g. `hvoice` for `hvoice_stats.json`.
    pub name: String,
    pub contract: String,
    pub symbol: String,
}

impl TokenConfig {
    pub fn new(name: &str, contract: &str, symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            contract: contract.to_string(),
            symbol: symbol.to_string(),
        }
    }

    pub fn stats_file(&self) -> String {
        format!("{}_stats.json", self.name)
    }

    pub fn accounts_file(&self) -> String {
        format!("{}_accounts.json", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SnapshotConfig::default();
        config.validate().unwrap();
        assert_eq!(config.tables.len(), 4);
        assert_eq!(config.tokens.len(), 3);
        assert_eq!(config.dao.contract, "dao.hypha");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = SnapshotConfig::from_toml(
            r#"
            api_url = "http://localhost:8888"

            [dao]
            contract = "dao.test"
            "#,
        )
        .unwrap();

        assert_eq!(config.api_url, "http://localhost:8888");
        assert_eq!(config.dao.contract, "dao.test");
        assert_eq!(config.dao.edges_table, "edges");
        assert_eq!(config.dao.edge_index_position, 4);
        assert_eq!(config.tokens, SnapshotConfig::default().tokens);
    }

    #[test]
    fn token_list_can_be_replaced() {
        let config = SnapshotConfig::from_toml(
            r#"
            [[tokens]]
            name = "seeds"
            contract = "token.seeds"
            symbol = "SEEDS"
            "#,
        )
        .unwrap();

        assert_eq!(config.tokens.len(), 1);
        assert_eq!(config.tokens[0].stats_file(), "seeds_stats.json");
        assert_eq!(config.tokens[0].accounts_file(), "seeds_accounts.json");
    }

    #[test]
    fn rejects_bad_endpoint() {
        let result = SnapshotConfig::from_toml(r#"api_url = "not a url""#);
        assert!(matches!(result, Err(AppError::Config(_))));

        let result = SnapshotConfig::from_toml(r#"api_url = "ftp://example.com""#);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn rejects_incomplete_token() {
        let result = SnapshotConfig::from_toml(
            r#"
            [[tokens]]
            name = "x"
            contract = ""
            symbol = "X"
            "#,
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = SnapshotConfig::load(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
