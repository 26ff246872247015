//! Unified error type.

use std::io;

use thiserror::Error;

/// The error type returned by kettle's fallible server operations.
///
/// Application-level outcomes (400, 404, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s, and request-level
/// problems are [`ParseError`](crate::ParseError)s handled per connection.
/// This type surfaces infrastructure failures: binding the port or reading
/// the listener's address.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("io: {0}")]
    Io(#[from] io::Error),
}
