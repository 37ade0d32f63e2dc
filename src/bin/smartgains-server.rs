// ABOUTME: SmartGains server binary: config, logging, database, and HTTP serve loop
// ABOUTME: Wires ServerResources and runs the axum router until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use smartgains_server::auth::AuthManager;
use smartgains_server::config::ServerConfig;
use smartgains_server::database::Database;
use smartgains_server::email::EmailService;
use smartgains_server::llm::OpenAiCompatibleProvider;
use smartgains_server::logging::{init_logging, LoggingConfig};
use smartgains_server::routes::{build_router, ServerResources};

/// SmartGains fitness trainer platform server
#[derive(Parser)]
#[command(name = "smartgains-server", version, about)]
struct Args {
    /// Override the HTTP port from configuration
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env().context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.http_port = port;
    }

    init_logging(&LoggingConfig::from_server_config(&config))
        .context("Failed to initialize logging")?;

    info!(
        environment = %config.environment,
        port = config.http_port,
        "starting smartgains-server"
    );

    let database = Database::new(&config.database.url)
        .await
        .context("Failed to initialize database")?;

    let auth = AuthManager::new(
        &config.security.jwt_secret,
        config.security.token_expiry_hours,
    );
    let email = EmailService::new(config.email.clone()).context("Failed to set up email")?;
    let llm = OpenAiCompatibleProvider::new(&config.llm).context("Failed to set up LLM client")?;

    let resources = Arc::new(ServerResources {
        database,
        auth,
        email,
        llm: Box::new(llm),
        config: config.clone(),
    });

    let router = build_router(resources);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
