//! # kettle
//!
//! A minimal HTTP/1.1 server written directly on tokio TCP sockets. No HTTP
//! library underneath: kettle parses the request line and headers itself,
//! matches a small route table, and writes the response bytes back.
//!
//! What it does:
//!
//! - Keep-alive connections, one request in flight per connection
//! - `{name}` path parameters, first registered match wins
//! - gzip response bodies when the client offers `gzip`
//! - A per-read idle timeout on every connection
//! - Graceful shutdown on SIGTERM / Ctrl-C
//!
//! What it does not: HTTP/2, TLS, chunked transfer-encoding, pipelining.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use kettle::{Request, Response, Router, Server, Status};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), kettle::Error> {
//!     let app = Router::new()
//!         .get("/",           root)
//!         .get("/echo/{str}", echo);
//!
//!     Server::bind("0.0.0.0:4221").await?.serve(app).await
//! }
//!
//! async fn root(_req: Request) -> Status {
//!     Status::Ok
//! }
//!
//! async fn echo(req: Request) -> Response {
//!     match req.param("str") {
//!         Some(s) if !s.trim().is_empty() => Response::text(s),
//!         _ => Response::status(Status::BadRequest),
//!     }
//! }
//! ```

mod connection;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod compression;
pub mod config;
pub mod handlers;
pub mod parser;
pub mod route;
pub mod writer;

pub use compression::CompressionResult;
pub use config::ServerConfig;
pub use error::Error;
pub use handler::Handler;
pub use method::{InvalidMethod, Method};
pub use parser::ParseError;
pub use request::{Request, RequestBuilder};
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use route::Route;
pub use router::Router;
pub use server::Server;
pub use status::Status;
