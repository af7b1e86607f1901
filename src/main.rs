use chrono::Duration;
use clap::{Parser, Subcommand};
use fantapay::application::engine::PaymentEngine;
use fantapay::config::{
    AuthConfig, DEFAULT_BIND, DEFAULT_OTP_TTL_MINUTES, DEFAULT_SESSION_TTL_DAYS, ServerConfig,
};
use fantapay::infrastructure::notifier::LogNotifier;
use fantapay::infrastructure::{PERSISTENT_STORAGE, ROCKSDB_FALLBACK_WARNING, open_stores};
use fantapay::interfaces::csv::status_table_writer::StatusTableWriter;
use fantapay::interfaces::http::{self, AppState};
use miette::{IntoDiagnostic, Result};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP/JSON API
    Serve {
        /// Address to listen on
        #[arg(long, env = "FANTAPAY_BIND", default_value = DEFAULT_BIND)]
        bind: SocketAddr,

        /// Path to persistent database (optional). If provided, uses RocksDB.
        #[arg(long, env = "FANTAPAY_DB_PATH")]
        db_path: Option<PathBuf>,

        /// Session lifetime in days
        #[arg(long, env = "FANTAPAY_SESSION_TTL_DAYS", default_value_t = DEFAULT_SESSION_TTL_DAYS)]
        session_ttl_days: i64,

        /// One-time code lifetime in minutes
        #[arg(long, env = "FANTAPAY_OTP_TTL_MINUTES", default_value_t = DEFAULT_OTP_TTL_MINUTES)]
        otp_ttl_minutes: i64,
    },
    /// Print a competition's payment status table as CSV
    Report {
        /// Competition id
        #[arg(long)]
        competition: String,

        /// Path to persistent database (optional). If provided, uses RocksDB.
        #[arg(long, env = "FANTAPAY_DB_PATH")]
        db_path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Command::Serve {
            bind,
            db_path,
            session_ttl_days,
            otp_ttl_minutes,
        } => {
            let config = ServerConfig {
                bind,
                db_path,
                auth: AuthConfig {
                    session_ttl: Duration::days(session_ttl_days),
                    otp_ttl: Duration::minutes(otp_ttl_minutes),
                },
            };
            serve(config).await
        }
        Command::Report {
            competition,
            db_path,
        } => report(&competition, db_path).await,
    }
}

async fn serve(config: ServerConfig) -> Result<()> {
    warn_if_volatile(config.db_path.as_ref());
    let stores = open_stores(config.db_path.as_deref()).into_diagnostic()?;
    info!(
        persistent = PERSISTENT_STORAGE && config.db_path.is_some(),
        "storage ready"
    );

    let state = AppState::new(stores, Arc::new(LogNotifier), config.auth);
    http::serve(config.bind, state).await.into_diagnostic()
}

async fn report(competition_id: &str, db_path: Option<PathBuf>) -> Result<()> {
    warn_if_volatile(db_path.as_ref());
    let stores = open_stores(db_path.as_deref()).into_diagnostic()?;
    let engine = PaymentEngine::new(stores);
    let table = engine
        .status_table_unchecked(competition_id)
        .await
        .into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = StatusTableWriter::new(stdout.lock());
    writer.write_table(&table).into_diagnostic()?;
    Ok(())
}

fn warn_if_volatile(db_path: Option<&PathBuf>) {
    if db_path.is_some() && !PERSISTENT_STORAGE {
        eprintln!("{ROCKSDB_FALLBACK_WARNING}");
    }
}
