//! The Redis Server

use crate::cli::Args;
use crate::conn::handle_connection;
use crate::constants::LOCAL_HOST;
use crate::constants::{ExitCode, CONNECTION_PERMIT_TIMEOUT_MS};
use crate::errors::ServerError;
use crate::log_and_stderr;
use crate::store::DataStore;
use anyhow::Result;
use log::{debug, error, info, warn};
use std::process::exit;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::timeout;

/// Redis server
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    max_conn: Arc<Semaphore>,
    store: Arc<DataStore>,
}

impl Server {
    /// Create an instance of the Redis server
    pub async fn new(args: Args, store: Arc<DataStore>) -> Result<Self, ServerError> {
        let port = args.port;
        let max_conn = args.max_conn;

        let listener = TcpListener::bind(format!("{LOCAL_HOST}:{port}")).await?;
        let addr = listener.local_addr()?;
        log_and_stderr!(info, "Listening on", addr);

        let max_conn = Arc::new(Semaphore::new(max_conn));

        Ok(Self {
            listener,
            max_conn,
            store,
        })
    }

    /// Start the server
    ///
    /// Starts the async core thread.
    pub async fn start(&self) -> Result<(), ServerError> {
        self.core_loop().await
    }

    /// Resolve Redis queries
    ///
    /// Supports multiple concurrent clients in addition to multiple requests from the same connection.
    async fn core_loop(&self) -> Result<(), ServerError> {
        debug!("Starting the core loop...");
        info!("Waiting for requests...");

        loop {
            match self.acquire_socket_permit().await {
                Ok((mut socket, permit)) => {
                    let store = Arc::clone(&self.store);

                    // A new task is spawned for each inbound socket. The socket is moved to the new task and processed there.
                    tokio::spawn(async move {
                        // Process each socket (stream) concurrently.
                        // Each connection can process multiple successive requests (commands) from the same client.
                        if let Err(e) = handle_connection(store, &mut socket).await {
                            warn!("connection handler stopped: {e}");
                        }
                        // Drop socket while the permit is still live.
                        drop(socket);
                        // Drop the permit so more tasks can be created.
                        drop(permit);
                    });
                }
                Err(e) => {
                    log_and_stderr!(warn, "WARN:", e);
                }
            };
        }
    }

    /// Tries to acquire a permit for a connection socket
    ///
    /// # Returns
    ///
    /// Returns a tuple of `(TcpStream, OwnedSemaphorePermit)`.
    ///
    /// # Errors
    /// - [`ServerError::IoError`] in case a new incoming connection from this listener could not be accepted
    /// - [`ServerError::ElapsedError`] in case permit could not be obtained on time
    /// - [`ServerError::AcquireError`] in case permit could not be obtained because semaphore has been closed
    async fn acquire_socket_permit(
        &self,
    ) -> Result<(TcpStream, OwnedSemaphorePermit), ServerError> {
        let permit = timeout(
            Duration::from_millis(CONNECTION_PERMIT_TIMEOUT_MS),
            self.max_conn.clone().acquire_owned(),
        )
        .await
        .map_err(|e| {
            ServerError::ElapsedError(format!("{e} ({CONNECTION_PERMIT_TIMEOUT_MS} ms)"))
        })??;
        let (socket, _) = self.listener.accept().await?;
        Ok((socket, permit))
    }

    /// Awaits the shutdown signal and exits the process once it fires.
    pub async fn await_shutdown() {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("CTRL+C received. Shutting down...");
                exit(ExitCode::Ok as i32);
            }
            Err(err) => {
                error!("Unable to listen for the shutdown signal: {err}");
                error!("Terminating the app ({})...", ExitCode::Shutdown as i32);
                exit(ExitCode::Shutdown as i32);
            }
        }
    }
}
