//! `kpidashd`, the factory KPI dashboard server.
//!
//! Usage:
//!   kpidashd -c <context-name-or-path> [--listen <addr>]
//!   kpidashd hash-password
//!
//! The context name resolves to `/etc/kpidash/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod bootstrap;
mod config;
mod routes;
mod storage;
mod wiring;

use std::io::BufRead;

use clap::{Parser, Subcommand};
use tracing::info;

use config::ServerConfig;

/// Factory KPI dashboard server.
#[derive(Parser, Debug)]
#[command(name = "kpidashd", about = "Factory KPI dashboard server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required_unless_present = "command")]
    config: Option<String>,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read a password from stdin and print its argon2id hash for `[admin] password_hash`.
    HashPassword,
}

fn hash_password_from_stdin() -> anyhow::Result<()> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']);
    auth::store_impls::check_password_strength(password)?;
    println!("{}", auth::store_impls::hash_password(password)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    if let Some(Command::HashPassword) = cli.command {
        return hash_password_from_stdin();
    }
    let Some(context) = cli.config else {
        anyhow::bail!("--config is required");
    };

    let config_path = ServerConfig::resolve_path(&context);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;
    bootstrap::verify_config(&server_config)?;

    let stores = storage::open_stores(&server_config.storage)?;
    let modules = wiring::build_modules(&stores, &server_config)?;
    bootstrap::ensure_admin(modules.auth.service(), &server_config)?;

    let app = routes::build_router(&modules.all(), stores.backend());

    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!(storage = stores.backend(), "kpidashd listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
