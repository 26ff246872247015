//! Serialising a [`Response`] onto a connection.
//!
//! Header precedence, later entries overwriting earlier ones of the same name:
//!
//! 1. `Content-Type`, if the response has one
//! 2. `Content-Length`, always (the final, possibly compressed, length)
//! 3. the response's own headers
//! 4. `Connection: close`, if the request asked for it
//! 5. headers added by compression (`Content-Encoding`)

use std::io;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use crate::compression::{self, CompressionResult};
use crate::connection::Connection;
use crate::request::Request;
use crate::response::{Response, put_header};

const HTTP_VERSION: &str = "HTTP/1.1";
const CRLF: &str = "\r\n";

/// Writes `response` to `conn` and closes it afterwards if `request` asked to.
///
/// A connection that is already closed is skipped silently. Write failures
/// are logged and mark the connection closed; they never propagate.
pub(crate) async fn respond<S>(conn: &mut Connection<S>, request: &Request, response: &Response)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if conn.is_closed() {
        debug!("not responding on a closed connection");
        return;
    }

    let bytes = match encode(request, response) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "failed to encode response body");
            conn.close().await;
            return;
        }
    };

    if let Err(e) = conn.write_all(&bytes).await {
        warn!(error = %e, status = %response.status, "failed to write response");
        conn.mark_closed();
        return;
    }

    debug!(status = %response.status, bytes = bytes.len(), "response written");

    if request.wants_close() {
        conn.close().await;
    }
}

/// The full wire form of `response`: status line, headers, blank line, body.
pub fn encode(request: &Request, response: &Response) -> io::Result<Vec<u8>> {
    let original = response.body.as_deref().map(str::as_bytes);
    let compressed = compression::negotiate(request.headers(), original)?;

    let (body, additions) = match compressed {
        Some(CompressionResult { body, headers }) => (Some(body), headers),
        None => (None, Vec::new()),
    };
    let body_len = body.as_ref().map_or(0, Vec::len);
    let headers = build_headers(request, response, body_len, &additions);

    let mut out = format!("{HTTP_VERSION} {}{CRLF}", response.status.as_str());
    for (name, value) in &headers {
        out.push_str(&format!("{name}: {value}{CRLF}"));
    }
    out.push_str(CRLF);

    let mut out = out.into_bytes();
    if let Some(body) = body {
        out.extend_from_slice(&body);
    }
    Ok(out)
}

/// Final header list for `response`, in the precedence order above.
pub fn build_headers(
    request: &Request,
    response: &Response,
    body_len: usize,
    additions: &[(String, String)],
) -> Vec<(String, String)> {
    let mut headers = Vec::new();

    if let Some(content_type) = &response.content_type {
        put_header(&mut headers, "Content-Type".to_owned(), content_type.clone());
    }

    put_header(&mut headers, "Content-Length".to_owned(), body_len.to_string());

    for (name, value) in &response.headers {
        put_header(&mut headers, name.clone(), value.clone());
    }

    if request.wants_close() {
        put_header(&mut headers, "Connection".to_owned(), "close".to_owned());
    }

    for (name, value) in additions {
        put_header(&mut headers, name.clone(), value.clone());
    }

    headers
}
