//! # Stockbook CLI
//!
//! Prints stock, customers, transactions and reports as JSON, and the
//! identity provider's login/logout URLs.
//!
//! ## Usage
//! ```text
//! stockbook report [--cumulative arrival-order]
//! stockbook stock <retail|wholesale>
//! stockbook customers
//! stockbook transactions <retail|wholesale>
//! stockbook login-url
//! stockbook logout-url
//!
//! Global: --config <file>  --db <file>  --memory  --id-token <jwt>
//! ```
//!
//! Errors are printed to stderr as `{ "code": ..., "message": ... }` with a
//! non-zero exit status.

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use stockbook::commands::{customer, report, stock, transaction};
use stockbook::error::ApiError;
use stockbook::state::{ConfigState, RetryPolicy, StorageClient};
use stockbook_auth::oidc::new_state;
use stockbook_auth::{OidcClient, StockbookConfig};
use stockbook_core::report::{CumulativeOrder, ReportOptions};
use stockbook_core::Channel;
use stockbook_db::{DocumentStore, MemoryStore};

#[derive(Debug, Parser)]
#[command(name = "stockbook", version, about = "Stockbook inventory and sales ledger")]
struct Cli {
    /// Config file (default: platform config dir / stockbook.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file, overriding the configured path
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Use an empty in-memory store
    #[arg(long, global = true)]
    memory: bool,

    /// ID token from the identity provider
    #[arg(long, global = true, env = "STOCKBOOK_ID_TOKEN", hide_env_values = true)]
    id_token: Option<String>,

    /// Access token from the identity provider
    #[arg(long, global = true, env = "STOCKBOOK_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// All report views with totals
    Report {
        #[arg(long, value_enum, default_value_t = CumulativeArg::Chronological)]
        cumulative: CumulativeArg,
    },
    /// Stock rows of a channel with derived fields
    Stock { channel: Channel },
    /// All customers
    Customers,
    /// Transactions of a channel
    Transactions { channel: Channel },
    /// Provider login URL with a fresh state value
    LoginUrl,
    /// Provider logout URL
    LogoutUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CumulativeArg {
    Chronological,
    ArrivalOrder,
}

impl From<CumulativeArg> for CumulativeOrder {
    fn from(arg: CumulativeArg) -> Self {
        match arg {
            CumulativeArg::Chronological => CumulativeOrder::Chronological,
            CumulativeArg::ArrivalOrder => CumulativeOrder::ArrivalOrder,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    stockbook::init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let rendered = serde_json::to_string(&err).unwrap_or_else(|_| err.to_string());
            eprintln!("{}", rendered);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String, ApiError> {
    let mut config = StockbookConfig::load(cli.config.clone())?;
    if let Some(db) = &cli.db {
        config.storage.database_path = db.clone();
    }

    match &cli.command {
        Command::LoginUrl => {
            let client = OidcClient::new(config.identity.clone())?;
            return Ok(client.login_url(&new_state())?.to_string());
        }
        Command::LogoutUrl => {
            let client = OidcClient::new(config.identity.clone())?;
            return Ok(client.logout_url()?.to_string());
        }
        _ => {}
    }

    let policy = RetryPolicy::from_config(&config.storage);
    let credentials = stockbook::authorize(
        &config,
        cli.id_token.as_deref(),
        cli.access_token.as_deref(),
    )
    .await?;

    let state = ConfigState::new(config);
    let value = if cli.memory {
        info!("Using in-memory store");
        let client = StorageClient::new(MemoryStore::new(), credentials).with_policy(policy);
        execute(&client, &cli.command).await?
    } else {
        let store = stockbook::open_store(&state).await?;
        let client = StorageClient::new(store, credentials).with_policy(policy);
        let result = execute(&client, &cli.command).await;
        client.store().close().await;
        result?
    };

    serde_json::to_string_pretty(&value).map_err(|e| ApiError::internal(e.to_string()))
}

async fn execute<S: DocumentStore>(store: &S, command: &Command) -> Result<Value, ApiError> {
    let value = match command {
        Command::Report { cumulative } => {
            let options = ReportOptions {
                cumulative: (*cumulative).into(),
            };
            to_value(report::load_reports(store, options).await?)?
        }
        Command::Stock { channel } => to_value(stock::list_stock(store, *channel).await?)?,
        Command::Customers => to_value(customer::list_customers(store).await?)?,
        Command::Transactions { channel } => {
            to_value(transaction::list_transactions(store, *channel).await?)?
        }
        Command::LoginUrl | Command::LogoutUrl => Value::Null,
    };
    Ok(value)
}

fn to_value<T: serde::Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}
