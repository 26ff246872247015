//! Response body compression negotiated from `accept-encoding`.
//!
//! Only gzip is supported. Client preference order and `q=` weights are not
//! consulted: if gzip is offered at all, it is used. An unsupported or
//! missing `accept-encoding` never fails the request; the body goes out as is.

use std::collections::HashMap;
use std::io::{self, Write};

use flate2::Compression;
use flate2::write::GzEncoder;

/// An encoding the server can apply to a response body.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Encoding {
    Gzip,
}

impl Encoding {
    /// Every encoding the server supports, in selection order.
    pub const SUPPORTED: &'static [Encoding] = &[Encoding::Gzip];

    /// The `Content-Encoding` token.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
        }
    }

    /// Compresses `body` in one shot.
    pub fn compress(self, body: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            Self::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(body)?;
                encoder.finish()
            }
        }
    }
}

/// The body to send plus any headers the compression step adds.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompressionResult {
    pub body: Vec<u8>,
    pub headers: Vec<(String, String)>,
}

impl CompressionResult {
    fn passthrough(body: &[u8]) -> Self {
        Self { body: body.to_vec(), headers: Vec::new() }
    }
}

/// Picks an encoding for `body` from the request's `accept-encoding` header.
///
/// - no body, or an empty one: `None`
/// - no `accept-encoding`, or nothing supported offered: the body unchanged,
///   no extra headers
/// - gzip offered: the gzip-compressed body and `Content-Encoding: gzip`
pub fn negotiate(
    request_headers: &HashMap<String, String>,
    body: Option<&[u8]>,
) -> io::Result<Option<CompressionResult>> {
    let Some(body) = body.filter(|b| !b.is_empty()) else {
        return Ok(None);
    };

    let Some(accept) = request_headers.get("accept-encoding") else {
        return Ok(Some(CompressionResult::passthrough(body)));
    };

    let Some(encoding) = select(accept) else {
        return Ok(Some(CompressionResult::passthrough(body)));
    };

    Ok(Some(CompressionResult {
        body: encoding.compress(body)?,
        headers: vec![("Content-Encoding".to_owned(), encoding.as_str().to_owned())],
    }))
}

/// First supported encoding named in a comma-separated `accept-encoding`
/// value. Token parameters (`;q=0.5`) are dropped before comparing.
pub fn select(accept_encoding: &str) -> Option<Encoding> {
    accept_encoding
        .split(',')
        .map(|token| token.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
        .find_map(|token| {
            Encoding::SUPPORTED.iter().copied().find(|e| e.as_str() == token)
        })
}
