use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use hypha_snapshot::chain::{ChainClient, TableRowsClient};
use hypha_snapshot::{run_snapshot, AppError, SnapshotConfig};

/// Dump DAO membership, token balances and bank/staking tables to JSON.
#[derive(Debug, Parser)]
#[command(name = "hypha-snapshot", version, about)]
struct Cli {
    /// TOML file overriding the built-in contracts, tables and tokens
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Chain API node, e.g. https://telos.greymass.com
    #[arg(long, env = "HYPHA_SNAPSHOT_API_URL")]
    api_url: Option<String>,

    /// Directory the JSON files are written to
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl Cli {
    fn into_config(self) -> Result<SnapshotConfig, AppError> {
        let mut config = match &self.config {
            Some(path) => SnapshotConfig::load(path)?,
            None => SnapshotConfig::default(),
        };
        if let Some(api_url) = self.api_url {
            config.api_url = api_url;
        }
        if let Some(out_dir) = self.out_dir {
            config.output_dir = out_dir;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = timeout_secs;
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(config: SnapshotConfig) -> Result<bool, AppError> {
    let client = TableRowsClient::new(ChainClient::from_config(&config)?);

    info!(
        "[SNAPSHOT] Extracting from {} into {}",
        config.api_url,
        config.output_dir.display()
    );

    let report = run_snapshot(&client, &config, &config.output_dir).await?;

    for failure in &report.failures {
        error!("[SNAPSHOT] {}: {}", failure.step, failure.error);
    }
    for step in &report.skipped {
        warn!("[SNAPSHOT] {}: skipped, members unavailable", step);
    }

    Ok(report.is_complete())
}

fn main() -> ExitCode {
    init_logging();

    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(2);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(config)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
