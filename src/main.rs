//! `kettle` binary.
//!
//! Run with:
//!   RUST_LOG=debug cargo run -- --directory /tmp/files
//!
//! Try:
//!   curl -v http://localhost:4221/echo/hello
//!   curl -v -H 'Accept-Encoding: gzip' http://localhost:4221/echo/hello --output -
//!   curl -v --data 'hi there' http://localhost:4221/files/greeting.txt
//!   curl -v http://localhost:4221/files/greeting.txt

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kettle::handlers::{self, DirectoryStore};
use kettle::{Server, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::parse().resolved()?;
    info!(directory = %config.directory.display(), "serving files");

    let app = handlers::router(DirectoryStore::new(&config.directory));

    Server::bind(&config.bind_addr())
        .await?
        .idle_timeout(config.idle_timeout())
        .serve(app)
        .await?;

    Ok(())
}
