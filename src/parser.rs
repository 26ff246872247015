//! HTTP/1.1 request parsing off a buffered byte stream.
//!
//! One call consumes exactly one request: the request line, the header block
//! up to the blank line, and `content-length` bytes of body. The route is
//! resolved straight after the request line, but headers and body are read
//! whether or not it matched so the stream is left at the next request.

use std::collections::HashMap;
use std::io;
use std::num::ParseIntError;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::method::{InvalidMethod, Method};
use crate::request::Request;
use crate::route;
use crate::router::Router;

/// Why a request could not be parsed.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("empty request")]
    EmptyRequest,

    #[error("invalid request line: {0}")]
    MalformedRequestLine(String),

    #[error("invalid HTTP version: {0}")]
    InvalidHttpVersion(String),

    #[error(transparent)]
    InvalidMethod(#[from] InvalidMethod),

    #[error("invalid header format: {0}")]
    InvalidHeaderFormat(String),

    #[error("empty header name: {0}")]
    EmptyHeaderName(String),

    #[error("invalid content-length: {0}")]
    InvalidContentLength(#[source] ParseIntError),

    #[error("failed to read request: {0}")]
    FailedToReadRequest(#[from] io::Error),
}

impl ParseError {
    /// The socket failed, as opposed to the client sending bad bytes.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::FailedToReadRequest(_))
    }

    /// The read gave up after the connection's idle timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::FailedToReadRequest(e) if e.kind() == io::ErrorKind::TimedOut)
    }
}

/// The three tokens of a request line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestLine {
    pub method: Method,
    pub target: String,
    pub version: String,
}

/// Reads one full request from `reader` and resolves it against `router`.
pub async fn parse_request<R>(reader: &mut R, router: &Router) -> Result<Request, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let line = read_line(reader).await?.ok_or(ParseError::EmptyRequest)?;
    let RequestLine { method, target, .. } = parse_request_line(&line)?;

    let route = router.find_route(method, &target).cloned();
    let headers = parse_headers(reader).await?;
    let params = route::extract_args(&target, route.as_ref());

    let body = match headers.get("content-length") {
        Some(len) => {
            let len = len.parse::<i64>().map_err(ParseError::InvalidContentLength)?;
            // A negative length is well-formed but announces no body.
            match usize::try_from(len) {
                Ok(len) => Some(read_body(reader, len).await?),
                Err(_) => None,
            }
        }
        None => None,
    };

    Ok(Request { method: Some(method), target, headers, body, route, params })
}

/// Splits `METHOD TARGET VERSION`.
///
/// The line is trimmed and split on single spaces, so doubled spaces count
/// as extra (empty) tokens. Any version starting with `HTTP/` is accepted.
pub fn parse_request_line(line: &str) -> Result<RequestLine, ParseError> {
    let parts: Vec<&str> = line.trim().split(' ').collect();
    let [method, target, version] = parts[..] else {
        return Err(ParseError::MalformedRequestLine(line.to_owned()));
    };

    if !version.starts_with("HTTP/") {
        return Err(ParseError::InvalidHttpVersion(version.to_owned()));
    }

    Ok(RequestLine {
        method: method.parse()?,
        target: target.to_owned(),
        version: version.to_owned(),
    })
}

/// Reads `name: value` lines up to a blank line or end of stream.
///
/// Names are trimmed and lowercased, values trimmed. Later duplicates win.
pub async fn parse_headers<R>(reader: &mut R) -> Result<HashMap<String, String>, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let mut headers = HashMap::new();

    while let Some(line) = read_line(reader).await? {
        if line.trim().is_empty() {
            break;
        }

        let Some((name, value)) = line.split_once(':') else {
            return Err(ParseError::InvalidHeaderFormat(line));
        };

        let name = name.trim().to_ascii_lowercase();
        if name.is_empty() {
            return Err(ParseError::EmptyHeaderName(line));
        }

        headers.insert(name, value.trim().to_owned());
    }

    Ok(headers)
}

/// Reads exactly `len` bytes and decodes them as UTF-8.
pub async fn read_body<R>(reader: &mut R, len: usize) -> Result<String, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::with_capacity(len.min(64 * 1024));
    (&mut *reader).take(len as u64).read_to_end(&mut buf).await?;

    if buf.len() < len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("body ended after {} of {len} bytes", buf.len()),
        )
        .into());
    }

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// One line without its `\n` / `\r\n` terminator; `None` at end of stream.
async fn read_line<R>(reader: &mut R) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf).await? == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}
