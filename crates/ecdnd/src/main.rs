//! ecdnd: encrypted file delivery daemon
//!
//! Usage:
//!   API_KEY=... AES_KEY=<base64> ecdnd [--config /etc/ecdn/config.toml] [--base-dir DIR]
//!
//! `AES_KEY` is base64; the delivery key is SHA-256 of its decoded bytes.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ecdn_core::config::EcdnConfig;
use ecdnd::{
    metrics::{self, DeliveryMetrics, HealthState},
    routes, AppState, Secrets,
};
use prometheus_client::registry::Registry;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "ecdnd", version, about = "Encrypted file delivery daemon")]
struct Cli {
    /// Path to config.toml
    #[arg(
        long,
        short = 'c',
        env = "ECDN_CONFIG",
        default_value = "/etc/ecdn/config.toml"
    )]
    config: PathBuf,

    /// Directory to serve (overrides server.base_dir)
    #[arg(long, env = "ECDN_BASE_DIR")]
    base_dir: Option<PathBuf>,

    /// Listen address (overrides server.listen)
    #[arg(long, env = "ECDN_LISTEN")]
    listen: Option<String>,

    /// API key clients must send in X-API-Key
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base64 secret the delivery key is derived from
    #[arg(long, env = "AES_KEY", hide_env_values = true)]
    aes_key: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides server.log_level
    #[arg(long, env = "ECDN_LOG")]
    log: Option<String>,

    /// Log format; overrides server.log_format
    #[arg(long, env = "ECDN_LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_found) = load_config(&cli.config).await?;

    let level = cli.log.as_deref().unwrap_or(&config.server.log_level);
    let (format, unknown_format) = resolve_log_format(cli.log_format, &config.server.log_format);
    init_logging(level, &format);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "ecdnd starting"
    );
    if !config_found {
        warn!(
            "config file not found: {}  (using defaults)",
            cli.config.display()
        );
    }
    if let Some(value) = unknown_format {
        warn!("unknown server.log_format {value:?}  (using text)");
    }

    let secrets = Secrets::from_values(cli.api_key, cli.aes_key)
        .context("loading API_KEY / AES_KEY from the environment")?;

    let base_dir = cli.base_dir.unwrap_or(config.server.base_dir);
    if !base_dir.is_dir() {
        warn!(base_dir = %base_dir.display(), "served directory does not exist yet");
    }
    let listen = cli.listen.unwrap_or(config.server.listen);

    let mut registry = Registry::default();
    let delivery_metrics = DeliveryMetrics::new(&mut registry);

    if let Some(addr) = config.server.metrics_addr {
        let health = HealthState {
            registry: Arc::new(registry),
            base_dir: base_dir.clone(),
        };
        tokio::spawn(async move {
            if let Err(e) = metrics::serve(addr, health).await {
                error!("metrics server failed: {e}");
            }
        });
    }

    let state = AppState::new(secrets, base_dir, delivery_metrics);
    routes::serve(&listen, state).await
}

async fn load_config(path: &Path) -> Result<(EcdnConfig, bool)> {
    if path.exists() {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| anyhow::anyhow!("reading config {}: {e}", path.display()))?;
        let config = EcdnConfig::from_toml(&content)
            .map_err(|e| anyhow::anyhow!("parsing config {}: {e}", path.display()))?;
        Ok((config, true))
    } else {
        Ok((EcdnConfig::default(), false))
    }
}

/// CLI flag wins; otherwise the config value. An unrecognised config value
/// falls back to text and is returned so it can be reported once logging is up.
fn resolve_log_format(flag: Option<LogFormat>, configured: &str) -> (LogFormat, Option<String>) {
    if let Some(format) = flag {
        return (format, None);
    }
    match LogFormat::from_str(configured, true) {
        Ok(format) => (format, None),
        Err(_) => (LogFormat::Text, Some(configured.to_string())),
    }
}

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .init();
        }
    }
}
