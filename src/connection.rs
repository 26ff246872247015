//! Per-connection request loop.
//!
//! ```text
//!   Reading ──parsed──▶ Dispatching ──handler──▶ Responding ──keep-alive──▶ Reading
//!      │                     │                        │
//!      │ bad request (400)   │ no route (404)         │ Connection: close
//!      │ idle timeout        │                        │
//!      ▼                     ▼                        ▼
//!    Closed ◀────────────────┴────────────────────────┘
//! ```
//!
//! Requests on one connection are handled strictly one at a time: the next
//! request is not read until the current response has been written.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadBuf};
use tokio::time::{Instant, Sleep, sleep_until};
use tracing::{debug, warn};

use crate::parser::{self, ParseError};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::status::Status;
use crate::writer;

// ── Connection ────────────────────────────────────────────────────────────────

/// One accepted socket, buffered for reading, with an idle timeout on reads.
pub(crate) struct Connection<S> {
    stream: BufReader<IdleTimeout<S>>,
    closed: bool,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(stream: S, idle_timeout: Duration) -> Self {
        Self { stream: BufReader::new(IdleTimeout::new(stream, idle_timeout)), closed: false }
    }

    pub(crate) fn reader(&mut self) -> &mut BufReader<IdleTimeout<S>> {
        &mut self.stream
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    /// Marks the connection unusable without touching the socket.
    pub(crate) fn mark_closed(&mut self) {
        self.closed = true;
    }

    /// Shuts down the write half. Reads are not attempted afterwards.
    pub(crate) async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.stream.shutdown().await {
            debug!(error = %e, "shutdown failed");
        }
    }

    pub(crate) async fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await
    }
}

// ── Idle timeout ──────────────────────────────────────────────────────────────

/// Fails a read with [`io::ErrorKind::TimedOut`] once the peer has sent
/// nothing for `timeout`. The clock restarts after every completed read.
/// Writes pass straight through.
pub(crate) struct IdleTimeout<S> {
    inner: S,
    timeout: Duration,
    deadline: Pin<Box<Sleep>>,
    armed: bool,
}

impl<S> IdleTimeout<S> {
    fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout, deadline: Box::pin(sleep_until(deadline_after(timeout))), armed: false }
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for IdleTimeout<S> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = &mut *self;

        if let Poll::Ready(res) = Pin::new(&mut this.inner).poll_read(cx, buf) {
            this.armed = false;
            return Poll::Ready(res);
        }

        if !this.armed {
            this.deadline.as_mut().reset(deadline_after(this.timeout));
            this.armed = true;
        }

        match this.deadline.as_mut().poll(cx) {
            Poll::Ready(()) => {
                this.armed = false;
                Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("no data received for {:?}", this.timeout),
                )))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// `now + timeout`, or roughly thirty years out when that overflows.
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + Duration::from_secs(86_400 * 365 * 30))
}

impl<S: AsyncWrite + Unpin> AsyncWrite for IdleTimeout<S> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

// ── Request loop ──────────────────────────────────────────────────────────────

enum State {
    Reading,
    Dispatching(Request),
    Responding(Request, Response),
    Closed,
}

/// Serves requests on `stream` until the client closes, asks to close, sends
/// something unparseable, or stays idle past `idle_timeout`.
pub(crate) async fn handle_connection<S>(stream: S, router: &Router, idle_timeout: Duration)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut conn = Connection::new(stream, idle_timeout);
    let mut state = State::Reading;

    loop {
        state = match state {
            State::Reading => match parser::parse_request(conn.reader(), router).await {
                Ok(request) => State::Dispatching(request),
                Err(e) => {
                    reject(&mut conn, e).await;
                    State::Closed
                }
            },

            State::Dispatching(request) => {
                debug!(
                    method = ?request.method(),
                    target = request.target(),
                    route = ?request.route().map(ToString::to_string),
                    "request parsed",
                );

                match request.route().and_then(|route| router.handler(route)) {
                    Some(handler) => {
                        let response = handler.dispatch(request.clone()).await;
                        State::Responding(request, response)
                    }
                    None => {
                        writer::respond(&mut conn, &request, &Response::status(Status::NotFound)).await;
                        if request.wants_close() {
                            conn.close().await;
                        }
                        after_exchange(&conn, &request)
                    }
                }
            }

            State::Responding(request, response) => {
                writer::respond(&mut conn, &request, &response).await;
                after_exchange(&conn, &request)
            }

            State::Closed => break,
        };
    }

    conn.close().await;
    debug!("connection closed");
}

fn after_exchange<S>(conn: &Connection<S>, request: &Request) -> State
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if conn.is_closed() || request.wants_close() {
        State::Closed
    } else {
        State::Reading
    }
}

/// Ends the connection after a failed read: silently on transport errors,
/// with `400 Bad Request` and an empty request context otherwise.
async fn reject<S>(conn: &mut Connection<S>, e: ParseError)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if e.is_timeout() {
        debug!("idle timeout, closing connection");
        return;
    }

    if e.is_transport() {
        warn!(error = %e, "read failed, closing connection");
        return;
    }

    warn!(error = %e, "bad request");
    writer::respond(conn, &Request::default(), &Response::status(Status::BadRequest)).await;
}
