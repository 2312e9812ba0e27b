//! flatcms - a flat-file content manager served over HTTP.
//!
//! Usage:
//!   flatcms                  start the server
//!   flatcms --add-user NAME  add an account (prompts for the password)

use std::io;

use anyhow::{bail, Context, Result};
use flatcms_core::{Config, CredentialStore};
use flatcms_web::{router, AppState};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = Config::load().context("Failed to load configuration")?;

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--add-user" {
        return add_user(&config, args.get(2).map(String::as_str));
    }

    serve(config).await
}

async fn serve(config: Config) -> Result<()> {
    let state = AppState::from_config(&config)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;
    info!(addr = %config.bind_addr(), "flatcms listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("flatcms shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Add an account from the command line, e.g. to seed an admin user.
fn add_user(config: &Config, username: Option<&str>) -> Result<()> {
    let username = match username.map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => bail!("Usage: flatcms --add-user NAME"),
    };

    let path = config.credentials_file()?;
    let store = CredentialStore::init(path.clone(), config.hash_cost)
        .with_context(|| format!("Failed to open credential store: {}", path.display()))?;

    let password = rpassword::prompt_password("Password: ")?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        bail!("Passwords do not match");
    }
    if password.trim().is_empty() {
        bail!("Password must not be empty");
    }

    store
        .create(username, password.trim())
        .with_context(|| format!("Failed to add user {}", username))?;
    eprintln!("Added user {} to {}", username, path.display());
    Ok(())
}
