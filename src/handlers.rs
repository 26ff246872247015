//! The server's route handlers.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /` | [`root`] |
//! | `GET /echo/{str}` | [`echo`] |
//! | `GET /user-agent` | [`user_agent`] |
//! | `GET /files/{filename}` | [`Files::retrieve`] |
//! | `POST /files/{filename}` | [`Files::publish`] |
//!
//! Validation failures are answered with a 4xx response, never an error.
//! File access goes through the [`FileStore`] trait; [`DirectoryStore`] is
//! the on-disk implementation rooted at the configured directory.

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

use crate::request::Request;
use crate::response::{ContentType, Response};
use crate::router::Router;
use crate::status::Status;

/// The full route table, in registration order.
pub fn router<S: FileStore>(store: S) -> Router {
    let files = Arc::new(Files::new(store));
    let retrieve = Arc::clone(&files);
    let publish = files;

    Router::new()
        .get("/", root)
        .get("/echo/{str}", echo)
        .get("/user-agent", user_agent)
        .get("/files/{filename}", move |req: Request| {
            let files = Arc::clone(&retrieve);
            async move { files.retrieve(req).await }
        })
        .post("/files/{filename}", move |req: Request| {
            let files = Arc::clone(&publish);
            async move { files.publish(req).await }
        })
}

/// `GET /`: `200 OK`, nothing else.
pub async fn root(_req: Request) -> Response {
    Response::status(Status::Ok)
}

/// `GET /echo/{str}`: the `str` argument as `text/plain`.
pub async fn echo(req: Request) -> Response {
    match non_blank(req.param("str")) {
        Some(s) => Response::text(s),
        None => Response::status(Status::BadRequest),
    }
}

/// `GET /user-agent`: the `User-Agent` header as `text/plain`.
pub async fn user_agent(req: Request) -> Response {
    match non_blank(req.header("user-agent")) {
        Some(agent) => Response::text(agent),
        None => Response::status(Status::BadRequest),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// ── Files ─────────────────────────────────────────────────────────────────────

/// Storage the `/files` routes read from and write to.
///
/// Names are passed through as they appear in the request path. Path
/// traversal checks, if wanted, belong to the implementation.
pub trait FileStore: Send + Sync + 'static {
    fn exists(&self, name: &str) -> impl Future<Output = io::Result<bool>> + Send;

    fn read(&self, name: &str) -> impl Future<Output = io::Result<String>> + Send;

    /// Creates `name` and writes `contents` to it. Fails with
    /// [`io::ErrorKind::AlreadyExists`] if it is already there.
    fn create(&self, name: &str, contents: &str) -> impl Future<Output = io::Result<()>> + Send;
}

/// A [`FileStore`] over a directory on the local file system.
#[derive(Clone, Debug)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileStore for DirectoryStore {
    async fn exists(&self, name: &str) -> io::Result<bool> {
        tokio::fs::try_exists(self.root.join(name)).await
    }

    async fn read(&self, name: &str) -> io::Result<String> {
        let bytes = tokio::fs::read(self.root.join(name)).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn create(&self, name: &str, contents: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.root.join(name))
            .await?;
        file.write_all(contents.as_bytes()).await?;
        file.flush().await
    }
}

/// Handlers for `/files/{filename}` over a [`FileStore`].
pub struct Files<S> {
    store: S,
}

impl<S: FileStore> Files<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// `GET /files/{filename}`: the file as `application/octet-stream`,
    /// `404` if it does not exist.
    pub async fn retrieve(&self, req: Request) -> Response {
        let Some(name) = non_blank(req.param("filename")) else {
            return Response::status(Status::BadRequest);
        };

        match self.store.exists(name).await {
            Ok(true) => {}
            Ok(false) => return Response::status(Status::NotFound),
            Err(e) => return storage_failure(name, e),
        }

        match self.store.read(name).await {
            Ok(contents) => Response::builder().body(ContentType::OctetStream, contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Response::status(Status::NotFound),
            Err(e) => storage_failure(name, e),
        }
    }

    /// `POST /files/{filename}`: creates the file from the request body.
    /// `201` on success; `400` for a blank name, a blank body, or a file that
    /// already exists.
    pub async fn publish(&self, req: Request) -> Response {
        let Some(name) = non_blank(req.param("filename")) else {
            debug!("filename missing");
            return Response::status(Status::BadRequest);
        };

        let Some(body) = non_blank(req.body()) else {
            debug!(file = name, "body missing");
            return Response::status(Status::BadRequest);
        };

        match self.store.exists(name).await {
            Ok(false) => {}
            Ok(true) => {
                debug!(file = name, "file already exists");
                return Response::status(Status::BadRequest);
            }
            Err(e) => return storage_failure(name, e),
        }

        match self.store.create(name, body).await {
            Ok(()) => Response::status(Status::Created),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Response::status(Status::BadRequest),
            Err(e) => storage_failure(name, e),
        }
    }
}

fn storage_failure(name: &str, e: io::Error) -> Response {
    error!(file = name, error = %e, "file store failed");
    Response::status(Status::InternalServerError)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::method::Method;
    use crate::route::Route;

    /// In-memory store that records every create call.
    #[derive(Default)]
    struct MemoryStore {
        files: Mutex<HashMap<String, String>>,
        creates: Mutex<Vec<(String, String)>>,
    }

    impl MemoryStore {
        fn with(name: &str, contents: &str) -> Self {
            let store = Self::default();
            store.files.lock().unwrap().insert(name.to_owned(), contents.to_owned());
            store
        }
    }

    impl FileStore for MemoryStore {
        async fn exists(&self, name: &str) -> io::Result<bool> {
            Ok(self.files.lock().unwrap().contains_key(name))
        }

        async fn read(&self, name: &str) -> io::Result<String> {
            self.files.lock().unwrap().get(name).cloned().ok_or_else(|| io::ErrorKind::NotFound.into())
        }

        async fn create(&self, name: &str, contents: &str) -> io::Result<()> {
            self.creates.lock().unwrap().push((name.to_owned(), contents.to_owned()));
            self.files.lock().unwrap().insert(name.to_owned(), contents.to_owned());
            Ok(())
        }
    }

    fn echo_request(arg: Option<&str>) -> Request {
        let builder = Request::builder().route(Route::new(Method::Get, "/echo/{str}"));
        match arg {
            Some(arg) => builder.param("str", arg).build(),
            None => builder.build(),
        }
    }

    fn upload(name: &str, body: Option<&str>) -> Request {
        let builder = Request::builder()
            .method(Method::Post)
            .route(Route::new(Method::Post, "/files/{filename}"))
            .param("filename", name);
        match body {
            Some(body) => builder.body(body).build(),
            None => builder.build(),
        }
    }

    #[tokio::test]
    async fn root_is_empty_ok() {
        let res = root(Request::default()).await;
        assert_eq!(res, Response::status(Status::Ok));
    }

    #[tokio::test]
    async fn echo_returns_the_argument() {
        for s in ["world", "test123", "hello-world"] {
            let res = echo(echo_request(Some(s))).await;
            assert_eq!(res.get_status(), Status::Ok);
            assert_eq!(res.content_type(), Some("text/plain"));
            assert_eq!(res.body(), Some(s));
        }
    }

    #[tokio::test]
    async fn echo_rejects_missing_or_blank() {
        for arg in [None, Some(""), Some("   ")] {
            assert_eq!(echo(echo_request(arg)).await.get_status(), Status::BadRequest, "{arg:?}");
        }
    }

    #[tokio::test]
    async fn user_agent_is_echoed() {
        let req = Request::builder().header("User-Agent", "curl/7.68.0").build();
        let res = user_agent(req).await;
        assert_eq!(res.get_status(), Status::Ok);
        assert_eq!(res.content_type(), Some("text/plain"));
        assert_eq!(res.body(), Some("curl/7.68.0"));
    }

    #[tokio::test]
    async fn user_agent_rejects_missing_or_blank() {
        assert_eq!(user_agent(Request::default()).await.get_status(), Status::BadRequest);
        let blank = Request::builder().header("user-agent", "  ").build();
        assert_eq!(user_agent(blank).await.get_status(), Status::BadRequest);
    }

    #[tokio::test]
    async fn retrieve_existing_file() {
        let files = Files::new(MemoryStore::with("test.txt", "Hello, World!"));
        let req = Request::builder().param("filename", "test.txt").build();
        let res = files.retrieve(req).await;
        assert_eq!(res.get_status(), Status::Ok);
        assert_eq!(res.content_type(), Some("application/octet-stream"));
        assert_eq!(res.body(), Some("Hello, World!"));
    }

    #[tokio::test]
    async fn retrieve_missing_file_is_404() {
        let files = Files::new(MemoryStore::default());
        let req = Request::builder().param("filename", "nonexistent.txt").build();
        assert_eq!(files.retrieve(req).await.get_status(), Status::NotFound);
    }

    #[tokio::test]
    async fn retrieve_without_name_is_400() {
        let files = Files::new(MemoryStore::default());
        assert_eq!(files.retrieve(Request::default()).await.get_status(), Status::BadRequest);
        let blank = Request::builder().param("filename", "").build();
        assert_eq!(files.retrieve(blank).await.get_status(), Status::BadRequest);
    }

    #[tokio::test]
    async fn publish_creates_new_file() {
        let files = Files::new(MemoryStore::default());
        let res = files.publish(upload("newfile.txt", Some("New file content"))).await;
        assert_eq!(res, Response::status(Status::Created));
        assert_eq!(
            *files.store.creates.lock().unwrap(),
            [("newfile.txt".to_owned(), "New file content".to_owned())],
        );
    }

    #[tokio::test]
    async fn publish_refuses_existing_file() {
        let files = Files::new(MemoryStore::with("existing.txt", "existing content"));
        let res = files.publish(upload("existing.txt", Some("new content"))).await;
        assert_eq!(res.get_status(), Status::BadRequest);
        assert!(files.store.creates.lock().unwrap().is_empty());
        assert_eq!(files.store.files.lock().unwrap()["existing.txt"], "existing content");
    }

    #[tokio::test]
    async fn publish_rejects_blank_name_or_body() {
        let files = Files::new(MemoryStore::default());
        for req in [
            upload("", Some("content")),
            upload("   ", Some("content")),
            upload("test.txt", None),
            upload("test.txt", Some("")),
            upload("test.txt", Some(" \n ")),
        ] {
            assert_eq!(files.publish(req).await.get_status(), Status::BadRequest);
        }
        assert!(files.store.creates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn directory_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());

        assert!(!store.exists("a.json").await.unwrap());
        store.create("a.json", r#"{"key":"value"}"#).await.unwrap();
        assert!(store.exists("a.json").await.unwrap());
        assert_eq!(store.read("a.json").await.unwrap(), r#"{"key":"value"}"#);

        let err = store.create("a.json", "again").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(std::fs::read_to_string(dir.path().join("a.json")).unwrap(), r#"{"key":"value"}"#);
    }

    #[tokio::test]
    async fn directory_store_handles_empty_and_large_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("empty.txt"), "").unwrap();
        let large = "A".repeat(10_000);
        std::fs::write(dir.path().join("large.txt"), &large).unwrap();

        let files = Files::new(DirectoryStore::new(dir.path()));
        let empty = files.retrieve(Request::builder().param("filename", "empty.txt").build()).await;
        assert_eq!(empty.get_status(), Status::Ok);
        assert_eq!(empty.body(), Some(""));

        let big = files.retrieve(Request::builder().param("filename", "large.txt").build()).await;
        assert_eq!(big.body(), Some(large.as_str()));
    }

    #[test]
    fn router_registers_routes_in_order() {
        let router = router(MemoryStore::default());
        let routes: Vec<String> = router.routes().map(ToString::to_string).collect();
        assert_eq!(
            routes,
            [
                "GET /",
                "GET /echo/{str}",
                "GET /user-agent",
                "GET /files/{filename}",
                "POST /files/{filename}",
            ],
        );
    }
}
