//! TCP listener and graceful shutdown.
//!
//! One task per accepted connection, all tracked in a `JoinSet`. On shutdown
//! the server:
//! 1. Stops calling `listener.accept()` and drops the listener, so the port
//!    refuses new connections.
//! 2. Signals every connection task over a watch channel. Each task drops its
//!    socket as soon as it sees the signal, even mid-read.
//! 3. Waits for all tasks to exit, then returns from [`Server::serve`].

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tracing::{Instrument, debug, debug_span, error, info};

use crate::config::DEFAULT_IDLE_TIMEOUT;
use crate::connection;
use crate::error::Error;
use crate::router::Router;

/// The HTTP server.
pub struct Server {
    listener: TcpListener,
    idle_timeout: Duration,
}

impl Server {
    /// Binds a listener on `addr`. Port `0` picks a free port; see
    /// [`local_addr`](Server::local_addr).
    ///
    /// ```rust,no_run
    /// # async fn run() -> Result<(), kettle::Error> {
    /// use kettle::Server;
    /// let server = Server::bind("0.0.0.0:4221").await?;
    /// # Ok(()) }
    /// ```
    pub async fn bind(addr: &str) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| Error::Bind { addr: addr.to_owned(), source })?;
        Ok(Self { listener, idle_timeout: DEFAULT_IDLE_TIMEOUT })
    }

    /// How long a connection may stay silent before it is closed.
    pub fn idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves `router` until SIGTERM or Ctrl-C, then shuts down gracefully.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Serves `router` until `signal` resolves, then shuts down gracefully.
    pub async fn serve_with_shutdown<F>(self, router: Router, signal: F) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        let Server { listener, idle_timeout } = self;
        let router = Arc::new(router);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let mut tasks = JoinSet::new();

        info!(addr = %listener.local_addr()?, "kettle listening");

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting immediately,
                // even if more connections are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, closing connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, peer) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    debug!(%peer, "accepted connection");

                    let router = Arc::clone(&router);
                    let mut cancel = cancel_rx.clone();
                    let span = debug_span!("connection", %peer);

                    tasks.spawn(async move {
                        tokio::select! {
                            () = connection::handle_connection(stream, &router, idle_timeout) => {}
                            _ = cancel.changed() => debug!("connection cancelled by shutdown"),
                        }
                    }.instrument(span));
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(res) = tasks.join_next(), if !tasks.is_empty() => log_task_exit(res),
            }
        }

        drop(listener);
        let _ = cancel_tx.send(true);

        while let Some(res) = tasks.join_next().await {
            log_task_exit(res);
        }

        info!("kettle stopped");
        Ok(())
    }
}

/// A connection task only fails by panicking (a handler blew up). That takes
/// down its own connection and nothing else.
fn log_task_exit(res: Result<(), JoinError>) {
    if let Err(e) = res {
        if e.is_panic() {
            error!("connection task panicked: {e}");
        }
    }
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C). On Windows only Ctrl-C
/// is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
