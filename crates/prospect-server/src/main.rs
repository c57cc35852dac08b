//! prospect server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `PROSPECT_*`
//! environment overrides, and serves the refresh and read API over HTTP.
//!
//! # One-shot refresh
//!
//! ```text
//! cargo run -p prospect-server -- --refresh "Acme Co" --data-type news --days 30
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use prospect_api::refresh::RefreshResponse;
use prospect_refresh::RefreshRequest;
use prospect_server::ServerConfig;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Prospect company content server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Refresh one company, print the result as JSON and exit.
  #[arg(long, value_name = "COMPANY")]
  refresh: Option<String>,

  /// Data type for `--refresh`: `news` or `interviews`.
  #[arg(long, default_value = "news", requires = "refresh")]
  data_type: String,

  /// Look-back window in days for `--refresh`.
  #[arg(long, default_value_t = 30, requires = "refresh")]
  days: u32,

  /// Period label for `--refresh`; defaults to `<days>d`.
  #[arg(long, requires = "refresh")]
  period: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config).context("failed to load configuration")?;
  let refresher = server_cfg.refresher();

  // Helper mode: run one refresh and exit.
  if let Some(company) = cli.refresh {
    let request = RefreshRequest {
      company_name: Some(company),
      data_type:    Some(cli.data_type),
      period:       Some(cli.period.unwrap_or_else(|| format!("{}d", cli.days))),
      days:         Some(cli.days),
    };
    let outcome = refresher.refresh(request).await.map_err(|e| {
      let summary = e.summary();
      anyhow::Error::new(e).context(summary)
    })?;
    let response = RefreshResponse::from(outcome);
    println!(
      "{}",
      serde_json::to_string_pretty(&response).context("failed to encode response")?
    );
    return Ok(());
  }

  let app = prospect_server::app(refresher);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
