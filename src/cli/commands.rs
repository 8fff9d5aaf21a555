use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::playlist::extractor::ExtractorClient;
use crate::resolver::PlaylistResolver;
use crate::server::{self, AppState};
use crate::storage::MemoryStore;

/// Run the HTTP API server until interrupted.
pub async fn serve(bind: Option<SocketAddr>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;

    let addr = match bind {
        Some(addr) => addr,
        None => format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|_| {
                Error::Config(format!(
                    "Invalid bind address: {}:{}",
                    config.server.host, config.server.port
                ))
            })?,
    };

    let state = build_state(&config);
    info!(
        "Proxying playlist requests to {} (retention {}h)",
        config.upstream.base_url, config.cache.retention_hours
    );

    server::serve(addr, state).await
}

/// Resolve a single playlist URL and print it, for ad-hoc use and scripting.
pub async fn fetch(url: String, titles: bool, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let state = build_state(&config);

    let playlist = state.resolver.resolve(&url).await?;

    if titles {
        println!("{}", playlist.export_titles());
    } else {
        println!("{}", serde_json::to_string_pretty(&playlist)?);
    }

    Ok(())
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn build_state(config: &Config) -> AppState {
    let client = ExtractorClient::new(config.upstream.base_url.clone())
        .with_timeout(Duration::from_secs(config.upstream.timeout_secs))
        .with_user_agent(config.upstream.user_agent.clone());

    let retention = Duration::from_secs(config.cache.retention_hours * 60 * 60);
    let resolver =
        PlaylistResolver::new(Arc::new(MemoryStore::new()), client).with_retention(retention);

    AppState::new(Arc::new(resolver))
}

/// Load configuration, falling back to defaults when no file exists at the
/// default location. An explicitly passed path must exist.
fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load_with_env(path),
        None => {
            let default_path = Config::config_dir()?.join("config.toml");
            if default_path.exists() {
                debug!("Loading configuration from {}", default_path.display());
                Config::load_with_env(default_path)
            } else {
                debug!("No configuration file, using defaults");
                let mut config = Config::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
        }
    }
}

pub fn init_logging(debug: bool, verbose: bool) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(debug)
        .with_line_number(debug)
        .init();

    Ok(())
}
