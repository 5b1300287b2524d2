//! Dictionary sources: where raw dictionary content is retrieved from.
//!
//! A source turns a resource locator (`"./es.json"`) into the raw text behind
//! it. Parsing and failure recovery are the translator's job, so sources just
//! report precisely what went wrong.

use crate::i18n::{LanguageCode, ParseError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Why a dictionary could not be obtained.
///
/// Every variant is recovered the same way (an empty dictionary); the
/// distinction only matters for diagnostics.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no resource registered for language '{0}'")]
    UnknownLanguage(LanguageCode),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: StatusCode, url: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("retrieval timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid resource locator '{locator}': {reason}")]
    InvalidLocator { locator: String, reason: String },

    #[error("malformed dictionary: {0}")]
    Malformed(#[from] ParseError),
}

/// Retrieves raw dictionary content by locator.
#[async_trait]
pub trait DictionarySource: Send + Sync {
    async fn retrieve(&self, locator: &str) -> Result<String, FetchError>;
}

/// Fetches dictionaries over HTTP, relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpSource {
    /// Create a source rooted at `base_url`.
    ///
    /// The base is treated as a directory, so `https://site/app` and
    /// `https://site/app/` both resolve `./es.json` to `https://site/app/es.json`.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a source that reuses an existing client.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        let base_url = Url::parse(&base)
            .with_context(|| format!("Invalid dictionary base URL: {}", base_url))?;

        Ok(Self { client, base_url })
    }

    /// Resolve a locator against the base URL.
    pub fn resolve(&self, locator: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(locator)
            .map_err(|e| FetchError::InvalidLocator {
                locator: locator.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl DictionarySource for HttpSource {
    async fn retrieve(&self, locator: &str) -> Result<String, FetchError> {
        let url = self.resolve(locator)?;
        debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Reads dictionaries from the filesystem, relative to a base directory.
#[derive(Debug, Clone)]
pub struct FileSource {
    base_dir: PathBuf,
}

impl FileSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Resolve a locator to a path. Absolute locators ignore the base directory.
    pub fn resolve(&self, locator: &str) -> PathBuf {
        self.base_dir.join(locator)
    }
}

#[async_trait]
impl DictionarySource for FileSource {
    async fn retrieve(&self, locator: &str) -> Result<String, FetchError> {
        let path = self.resolve(locator);
        debug!("Reading {}", path.display());

        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::NotFound => FetchError::NotFound(path.display().to_string()),
                _ => FetchError::Io { path, source },
            })
    }
}

/// Serves dictionaries held in memory, e.g. bundled into the binary.
///
/// Counts every retrieval, which makes it convenient for checking how many
/// fetches an operation issued.
#[derive(Debug, Default)]
pub struct MemorySource {
    resources: HashMap<String, String>,
    requests: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register raw content under a locator.
    pub fn with_resource(mut self, locator: impl Into<String>, content: impl Into<String>) -> Self {
        self.resources.insert(locator.into(), content.into());
        self
    }

    /// Number of retrievals issued so far (successful or not).
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DictionarySource for MemorySource {
    async fn retrieve(&self, locator: &str) -> Result<String, FetchError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.resources
            .get(locator)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(locator.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    // ==================== HttpSource Tests ====================

    #[test]
    fn test_http_resolve_relative_locator() {
        let source = HttpSource::new("https://example.com/app").unwrap();
        assert_eq!(
            source.resolve("./es.json").unwrap().as_str(),
            "https://example.com/app/es.json"
        );

        let source = HttpSource::new("https://example.com/app/").unwrap();
        assert_eq!(
            source.resolve("es.json").unwrap().as_str(),
            "https://example.com/app/es.json"
        );
    }

    #[test]
    fn test_http_resolve_absolute_locator() {
        let source = HttpSource::new("https://example.com/app/").unwrap();
        assert_eq!(
            source.resolve("https://cdn.example.com/i18n/es.json").unwrap().as_str(),
            "https://cdn.example.com/i18n/es.json"
        );
    }

    #[test]
    fn test_http_new_rejects_invalid_base() {
        assert!(HttpSource::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_http_retrieve_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/locales/es.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"greet":"Hola"}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let source = HttpSource::new(&format!("{}/locales", mock_server.uri())).unwrap();
        let body = source.retrieve("./es.json").await.expect("Should fetch");
        assert_eq!(body, r#"{"greet":"Hola"}"#);
    }

    #[tokio::test]
    async fn test_http_retrieve_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/es.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let source = HttpSource::new(&mock_server.uri()).unwrap();
        let result = source.retrieve("./es.json").await;
        assert!(matches!(result, Err(FetchError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_http_retrieve_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/es.json"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let source = HttpSource::new(&mock_server.uri()).unwrap();
        match source.retrieve("./es.json").await {
            Err(FetchError::Status { status, .. }) => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE)
            }
            other => panic!("Expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_retrieve_connection_error() {
        // Nothing listens on port 1
        let source = HttpSource::new("http://localhost:1").unwrap();
        let result = source.retrieve("./es.json").await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    }

    // ==================== FileSource Tests ====================

    #[tokio::test]
    async fn test_file_retrieve_relative_locator() {
        let temp_dir = TempDir::new().expect("temp dir");
        std::fs::write(temp_dir.path().join("es.json"), r#"{"greet":"Hola"}"#).expect("write");

        let source = FileSource::new(temp_dir.path());
        let body = source.retrieve("./es.json").await.expect("Should read");
        assert_eq!(body, r#"{"greet":"Hola"}"#);
    }

    #[tokio::test]
    async fn test_file_retrieve_absolute_locator() {
        let temp_dir = TempDir::new().expect("temp dir");
        let file = temp_dir.path().join("en.json");
        std::fs::write(&file, "{}").expect("write");

        let source = FileSource::new("/does/not/matter");
        let body = source
            .retrieve(file.to_str().unwrap())
            .await
            .expect("Should read");
        assert_eq!(body, "{}");
    }

    #[tokio::test]
    async fn test_file_retrieve_missing() {
        let temp_dir = TempDir::new().expect("temp dir");
        let source = FileSource::new(temp_dir.path());

        let result = source.retrieve("./missing.json").await;
        assert!(matches!(result, Err(FetchError::NotFound(_))));
    }

    // ==================== MemorySource Tests ====================

    #[tokio::test]
    async fn test_memory_source_counts_requests() {
        let source = MemorySource::new().with_resource("./en.json", "{}");

        assert_eq!(source.retrieve("./en.json").await.unwrap(), "{}");
        assert!(matches!(
            source.retrieve("./es.json").await,
            Err(FetchError::NotFound(_))
        ));
        assert_eq!(source.requests(), 2);
    }
}
