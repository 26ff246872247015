//! Process configuration, parsed once at startup.
//!
//! The value is built before the listener binds and never changes
//! afterwards. Components that need it (the file handlers) receive it
//! explicitly; nothing reads it from a global.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

pub const DEFAULT_PORT: u16 = 4221;
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Command-line configuration for the `kettle` binary.
#[derive(Clone, Debug, Parser)]
#[command(name = "kettle", version, about = "A minimal HTTP/1.1 server")]
pub struct ServerConfig {
    /// Directory that `/files/{filename}` reads from and writes to.
    #[arg(long, default_value = ".")]
    pub directory: PathBuf,

    /// TCP port to listen on.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Seconds a connection may stay silent before it is closed.
    #[arg(long = "idle-timeout", default_value_t = DEFAULT_IDLE_TIMEOUT.as_secs())]
    pub idle_timeout_secs: u64,
}

impl ServerConfig {
    /// Makes `directory` absolute, relative to the current working directory.
    pub fn resolved(mut self) -> io::Result<Self> {
        self.directory = std::path::absolute(&self.directory)?;
        Ok(self)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Address the listener binds to: every interface, configured port.
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            port: DEFAULT_PORT,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT.as_secs(),
        }
    }
}
