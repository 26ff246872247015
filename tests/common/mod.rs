//! Shared helpers for end-to-end tests.

use std::collections::HashMap;
use std::io::Read;
use std::net::SocketAddr;
use std::time::Duration;

use flate2::read::GzDecoder;
use kettle::handlers::{self, DirectoryStore};
use kettle::{Router, Server};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A server bound to `127.0.0.1:0`, serving the full route table over a
/// temporary files directory.
pub struct TestServer {
    pub addr: SocketAddr,
    pub dir: TempDir,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Result<(), kettle::Error>>,
}

impl TestServer {
    pub async fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let router = handlers::router(DirectoryStore::new(dir.path()));
        Self::start_with(router, dir, Duration::from_secs(5)).await
    }

    pub async fn start_with(router: Router, dir: TempDir, idle_timeout: Duration) -> Self {
        let server = Server::bind("127.0.0.1:0").await.unwrap().idle_timeout(idle_timeout);
        let addr = server.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();

        let handle = tokio::spawn(server.serve_with_shutdown(router, async {
            let _ = stopped.await;
        }));

        Self { addr, dir, stop: Some(stop), handle }
    }

    /// Triggers shutdown and waits for the server to return.
    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        tokio::time::timeout(Duration::from_secs(5), &mut self.handle)
            .await
            .expect("server did not stop in time")
            .unwrap()
            .unwrap();
    }

    pub async fn connect(&self) -> TcpStream {
        TcpStream::connect(self.addr).await.unwrap()
    }

    /// Sends one request with `Connection: close` (unless overridden) and
    /// reads the response until the server closes the socket.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        headers: &[(&str, &str)],
        body: Option<&str>,
    ) -> HttpResponse {
        let mut raw = format!("{method} {path} HTTP/1.1\r\nHost: {}\r\n", self.addr);
        for (name, value) in headers {
            raw.push_str(&format!("{name}: {value}\r\n"));
        }
        if !headers.iter().any(|(n, _)| n.eq_ignore_ascii_case("connection")) {
            raw.push_str("Connection: close\r\n");
        }
        if let Some(body) = body {
            raw.push_str(&format!("Content-Length: {}\r\n", body.len()));
        }
        raw.push_str("\r\n");
        if let Some(body) = body {
            raw.push_str(body);
        }

        let mut stream = self.connect().await;
        stream.write_all(raw.as_bytes()).await.unwrap();

        let mut out = Vec::new();
        tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut out))
            .await
            .expect("server did not close the connection")
            .unwrap();

        HttpResponse::parse(&out)
    }
}

#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    /// Lowercased names.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Parses one response from the front of `raw`; returns it and the rest.
    pub fn parse_one(raw: &[u8]) -> (Self, &[u8]) {
        let split = raw
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("response has no header terminator");
        let head = std::str::from_utf8(&raw[..split]).unwrap();
        let mut lines = head.split("\r\n");

        let status_line = lines.next().unwrap();
        let mut parts = status_line.splitn(3, ' ');
        assert_eq!(parts.next(), Some("HTTP/1.1"));
        let status = parts.next().unwrap().parse().unwrap();

        let headers: HashMap<String, String> = lines
            .map(|line| {
                let (name, value) = line.split_once(':').unwrap();
                (name.trim().to_ascii_lowercase(), value.trim().to_owned())
            })
            .collect();

        let len: usize = headers.get("content-length").map_or(0, |v| v.parse().unwrap());
        let rest = &raw[split + 4..];
        let body = rest[..len].to_vec();

        (Self { status, headers, body }, &rest[len..])
    }

    pub fn parse(raw: &[u8]) -> Self {
        let (res, rest) = Self::parse_one(raw);
        assert!(rest.is_empty(), "unexpected trailing bytes: {rest:?}");
        res
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).unwrap()
    }

    pub fn gunzip(&self) -> String {
        let mut out = String::new();
        GzDecoder::new(self.body.as_slice()).read_to_string(&mut out).unwrap();
        out
    }
}
