//! # An Implementation of a Redis Server

use anyhow::Result;
use clap::Parser;
use resp_kv_server::cli::Args;
use resp_kv_server::errors::ApplicationError;
use resp_kv_server::expiry::eviction_loop;
use resp_kv_server::server::Server;
use resp_kv_server::store::DataStore;
use log::info;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    env_logger::init();
    info!("Starting the server...");

    let args = Args::parse();
    let store = Arc::new(DataStore::new());

    let evictor_store = Arc::clone(&store);
    std::thread::Builder::new()
        .name("evictor-thread".to_string())
        .spawn(move || eviction_loop(evictor_store))?;

    let server = Server::new(args, store).await?;

    tokio::select! {
        result = server.start() => result?,
        _ = Server::await_shutdown() => {}
    }

    Ok(())
}
