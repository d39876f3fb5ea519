//! Feedback Monitor - prediction feedback service
//!
//! Entry point for the HTTP service that records user judgments about an
//! image classifier's predictions and reports model performance.

mod cli;

use clap::{Parser, Subcommand};
use feedback_monitor::error::Result;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(name = "feedback-monitor")]
#[command(version, about = "Prediction feedback collection and performance reporting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Set log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Configuration file (defaults to ./feedback-monitor.toml when present)
    #[arg(long, env = "FEEDBACK_CONFIG")]
    config: Option<PathBuf>,

    /// Database path (overrides the configuration file)
    #[arg(long, env = "FEEDBACK_DB_PATH")]
    db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server (default)
    Serve {
        /// Server address
        #[arg(long, env = "FEEDBACK_ADDR")]
        addr: Option<SocketAddr>,

        /// Bearer token required on mutating endpoints
        #[arg(long, env = "FEEDBACK_API_TOKEN", hide_env_values = true)]
        api_token: Option<String>,
    },

    /// Create the feedback table
    InitDb,

    /// Print the performance report
    Report {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Specified level for this crate, WARN for the HTTP stack
    let filter = EnvFilter::new(format!(
        "feedback_monitor={level},tower_http={level},hyper=warn",
        level = level.as_str().to_lowercase()
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .init();

    debug!("Feedback Monitor v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = cli::helpers::load_config(cli.config.as_deref(), cli.db_path)?;

    match cli.command {
        Some(Commands::Serve { addr, api_token }) => {
            if let Some(addr) = addr {
                config.server.addr = addr;
            }
            if api_token.is_some() {
                config.auth.token = api_token;
            }
            config.validate()?;
            cli::serve::handle(config).await
        }
        None => cli::serve::handle(config).await,
        Some(Commands::InitDb) => cli::init::handle(&config).await,
        Some(Commands::Report { json }) => cli::report::handle(&config, json).await,
    }
}
