/*!
 * Tether CLI - resilient session client
 */

use clap::Parser;
use std::path::PathBuf;
use tether::{
    config::{ClientConfig, LogLevel},
    error::{Result, EXIT_SUCCESS},
    logging, run_client,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "tether")]
#[command(version, about = "Keep a session attached to a pool of Tether servers", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Server endpoint as host:port (repeatable, replaces the configured pool)
    #[arg(short = 'e', long = "endpoint", value_name = "HOST:PORT")]
    endpoints: Vec<String>,

    /// Identity sent with every transaction
    #[arg(long, env = "TETHER_INSTANCE_ID")]
    instance_id: Option<String>,

    /// Seed endpoint selection for a reproducible sequence
    #[arg(long)]
    seed: Option<u64>,

    /// Delay between two transactions, in milliseconds
    #[arg(long, value_name = "MS")]
    pacing_ms: Option<u64>,

    /// Deadline of a fresh session, in milliseconds
    #[arg(long, value_name = "MS")]
    grace_ms: Option<u64>,

    /// Pause before reconnecting, in milliseconds
    #[arg(long, value_name = "MS")]
    backoff_ms: Option<u64>,

    /// Length of one disconnect hint unit, in milliseconds
    #[arg(long, value_name = "MS")]
    hint_unit_ms: Option<u64>,

    /// Log level
    #[arg(long, value_enum)]
    log_level: Option<LogLevelArg>,

    /// Write JSON logs to this file instead of stdout
    #[arg(long = "log", value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Verbose logging (debug level)
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, clap::ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

impl Cli {
    /// Layer command line overrides on top of the file configuration
    fn apply_to(self, mut config: ClientConfig) -> ClientConfig {
        if !self.endpoints.is_empty() {
            config.endpoints = self.endpoints;
        }
        if self.instance_id.is_some() {
            config.instance_id = self.instance_id;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(ms) = self.pacing_ms {
            config.pacing_interval_ms = ms;
        }
        if let Some(ms) = self.grace_ms {
            config.initial_grace_ms = ms;
        }
        if let Some(ms) = self.backoff_ms {
            config.backoff_ms = ms;
        }
        if let Some(ms) = self.hint_unit_ms {
            config.hint_unit_ms = ms;
        }
        if let Some(level) = self.log_level {
            config.log_level = level.into();
        }
        if self.log_file.is_some() {
            config.log_file = self.log_file;
        }
        config.verbose |= self.verbose;
        config
    }
}

fn main() {
    let code = match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let base_config = match cli.config {
        Some(ref path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };
    let config = cli.apply_to(base_config);
    config.validate()?;

    if let Err(e) = logging::init_logging(&config) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let stats = runtime.block_on(run_client(&config, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    }))?;

    info!(
        "Opened {} sessions, sent {} transactions",
        stats.sessions_opened, stats.queries_sent
    );
    Ok(())
}
