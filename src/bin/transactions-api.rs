// ABOUTME: Transactions API server binary
// ABOUTME: Loads configuration, wires store, worker and token maker, then serves the HTTP gateway
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Transactions API Server Binary

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use transactions_api::{
    config::ServerConfig,
    logging,
    routes,
    server::Server,
    store::{MemoryStore, Store},
    token::random_symmetric_key,
    worker::{QueueTaskDistributor, TaskDistributor, TaskProcessor},
};

#[derive(Parser)]
#[command(name = "transactions-api")]
#[command(about = "Transactions API - banking service with token authentication")]
pub struct Args {
    /// Override the HTTP listen address
    #[arg(long)]
    http_address: Option<SocketAddr>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print a fresh random symmetric key and exit
    GenerateKey,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(Command::GenerateKey) = args.command {
        println!("{}", random_symmetric_key());
        return Ok(());
    }

    let mut config = ServerConfig::from_env()?;
    if let Some(http_address) = args.http_address {
        config.http_address = http_address;
    }

    logging::init_from_env()?;
    info!("{}", config.summary());

    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());

    let (distributor, receiver) = QueueTaskDistributor::new();
    let processor = TaskProcessor::new(Arc::clone(&store));
    tokio::spawn(processor.run(receiver));

    let http_address = config.http_address;
    let distributor: Arc<dyn TaskDistributor> = Arc::new(distributor);
    let server = Arc::new(Server::new(config, store, Some(distributor))?);

    let listener = tokio::net::TcpListener::bind(http_address)
        .await
        .with_context(|| format!("cannot bind HTTP gateway to {http_address}"))?;
    info!(address = %http_address, "HTTP gateway listening");

    axum::serve(listener, routes::router(server))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP gateway failed")?;

    info!("HTTP gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
