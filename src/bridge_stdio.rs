//! The STDIO bridge: CLI entry point, server factory and serve loop.
//!
//! stdout carries MCP JSON-RPC, so every log line goes to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rmcp::transport::io::stdio;
use rmcp::ServiceExt;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::{self, BridgeConfig, LoggingConfig};
use crate::error::BridgeError;
use crate::installer::{InstallOutcome, PackageInstaller, StdFileSystem};
use crate::mcp::UnityBridgeServer;

pub use crate::unity::UnityTcpClient;

#[derive(Parser, Debug)]
#[command(name = "loop-mcp-stdio")]
#[command(about = "STDIO MCP server bridging to the Unity editor", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "LOOP_MCP_CONFIG")]
    config: Option<PathBuf>,

    /// Unity editor host
    #[arg(long, env = "UNITY_HOST")]
    host: Option<String>,

    /// Unity editor TCP port
    #[arg(long, env = "UNITY_PORT")]
    port: Option<u16>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Override log format (pretty, json)
    #[arg(long)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Serve MCP over stdio (default)
    Serve,
    /// Check that the Unity editor answers
    Ping,
    /// Copy packaged assets into a Unity project
    Install {
        /// Directory holding the packaged assets
        #[arg(long)]
        source: PathBuf,
        /// Destination directory inside the Unity project
        #[arg(long)]
        target: PathBuf,
    },
}

impl Cli {
    fn apply_overrides(&self, config: &mut BridgeConfig) {
        if let Some(host) = &self.host {
            config.unity.host = host.clone();
        }
        if let Some(port) = self.port {
            config.unity.port = port;
        }
        if let Some(log_level) = &self.log_level {
            config.logging.level = log_level.clone();
        }
        if let Some(log_format) = &self.log_format {
            config.logging.format = log_format.clone();
        }
    }
}

/// Process entry point: parse arguments, load configuration and run the chosen command
pub async fn main() -> Result<()> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    init_logging(&config.logging)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            print_banner(&config);
            run_server(config).await?;
        }
        Command::Ping => ping_unity(config).await?,
        Command::Install { source, target } => {
            let installer = PackageInstaller::new(StdFileSystem);
            match installer.install(&source, &target)? {
                InstallOutcome::Installed { files_copied } => {
                    info!("Installed {} files into {}", files_copied, target.display())
                }
                InstallOutcome::AlreadyPresent => {
                    info!("Nothing to do, {} already exists", target.display())
                }
            }
        }
    }

    Ok(())
}

/// File and environment first, then CLI flags; validated only once all layers are in
fn resolve_config(cli: &Cli) -> Result<BridgeConfig> {
    let mut config = config::load_config(cli.config.as_deref()).with_context(|| {
        match &cli.config {
            Some(path) => format!("Failed to load configuration from: {}", path.display()),
            None => "Failed to load configuration".to_string(),
        }
    })?;

    cli.apply_overrides(&mut config);
    config::validate_config(&config)?;
    Ok(config)
}

/// Build the MCP handler and its Unity client from configuration
pub fn create_server(config: BridgeConfig) -> UnityBridgeServer {
    let client = UnityTcpClient::new(config.unity);
    UnityBridgeServer::new(client, config.server.name)
        .with_instructions(config.server.instructions)
        .with_tool_filter(config.tools)
}

/// Serve MCP over stdin/stdout until the host disconnects or a shutdown signal arrives
pub async fn run_server(config: BridgeConfig) -> crate::error::Result<()> {
    let server = create_server(config);
    let client = server.client().clone();
    let reachability = spawn_reachability_check(client.clone());

    let ct = CancellationToken::new();
    let signal_ct = ct.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_ct.cancel();
    });

    info!("Serving MCP over stdio as '{}'", server.server_name());

    let result = serve_until_done(server, ct).await;
    reachability.abort();
    client.close().await;
    result
}

/// Ping Unity in the background so the MCP handshake never waits on the editor.
/// Unity may be started after the host spawns us, so failure only warns.
fn spawn_reachability_check(client: UnityTcpClient) -> JoinHandle<()> {
    tokio::spawn(async move {
        match client.ping().await {
            Ok(latency) => info!("Unity editor reachable at {} ({:?})", client.addr(), latency),
            Err(e) => warn!(
                "Unity editor not reachable yet at {}: {}. Tool calls will retry.",
                client.addr(),
                e
            ),
        }
    })
}

async fn serve_until_done(
    server: UnityBridgeServer,
    ct: CancellationToken,
) -> crate::error::Result<()> {
    let service = server
        .serve_with_ct(stdio(), ct)
        .await
        .map_err(|e| BridgeError::Internal(format!("MCP initialization failed: {}", e)))?;

    let reason = service
        .waiting()
        .await
        .map_err(|e| BridgeError::Internal(format!("MCP service task failed: {}", e)))?;

    info!("MCP session ended: {:?}", reason);
    Ok(())
}

async fn ping_unity(config: BridgeConfig) -> Result<()> {
    let client = UnityTcpClient::new(config.unity);
    let latency = client
        .ping()
        .await
        .with_context(|| format!("Unity editor did not answer at {}", client.addr()))?;
    info!("Unity editor at {} answered in {:?}", client.addr(), latency);
    client.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down...");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, shutting down...");
        },
    }
}

fn init_logging(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

fn print_banner(config: &BridgeConfig) {
    let version = env!("CARGO_PKG_VERSION");
    info!("{} v{} (Unity bridge)", config.server.name, version);
    info!("  → Unity: {}", config.unity.addr());
    info!(
        "  → Request timeout: {}s",
        config.unity.request_timeout_secs
    );
    info!("  → Log Level: {}", config.logging.level);
    if let Some(filter) = &config.tools {
        info!(
            "  → Tool filter: include={:?} exclude={:?}",
            filter.include, filter.exclude
        );
    }
}
