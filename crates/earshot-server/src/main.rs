//! earshot server binary.
//!
//! Reads `earshot.toml` (or the path given with `--config`) layered under the
//! environment, builds the configured store, post source and reply strategy,
//! and serves the JSON API over HTTP.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use earshot_server::config::ServerConfig;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "earshot social listening server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, env = "EARSHOT_CONFIG", default_value = "earshot.toml")]
  config: PathBuf,
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

  let cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let state = earshot_server::build_state(&cfg)
    .await
    .context("failed to initialise server")?;

  tracing::info!(
    store = %cfg.store.backend,
    mode = %cfg.store.mode,
    reply = %cfg.reply.strategy,
    "dependencies ready"
  );

  let app = earshot_server::app(state, &cfg);
  let address = cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
