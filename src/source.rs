//! Retrieval transport for the manifest and newsletter files.
//!
//! Everything the pipeline reads goes through [`DocumentSource::fetch`] with
//! a path relative to the content root (`newsletters/index.json`,
//! `newsletters/a.txt`). Callers only ever build those paths from sanitized
//! filenames, so sources don't re-check for traversal.
//!
//! | Source | Backing store |
//! |--------|---------------|
//! | [`FsSource`] | A directory on disk, read with `tokio::fs` |
//! | [`HttpSource`] | A base URL, fetched with `reqwest` |
//! | [`MemorySource`] | An in-memory map (tests, embedding) |

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use url::{ParseError, Url};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),
}

/// Reads text resources by content-root-relative path.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<String, FetchError>;
}

/// Reads files under a root directory.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DocumentSource for FsSource {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let full = self.root.join(path);
        match tokio::fs::read_to_string(&full).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FetchError::NotFound(path.to_string()))
            }
            Err(source) => Err(FetchError::Io {
                path: path.to_string(),
                source,
            }),
        }
    }
}

/// Fetches resources relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base: Url,
}

impl HttpSource {
    /// `base` is treated as a directory: a missing trailing slash is added so
    /// relative paths resolve beneath it.
    pub fn new(base: &str) -> Result<Self, FetchError> {
        let base = if base.ends_with('/') {
            Url::parse(base)?
        } else {
            Url::parse(&format!("{base}/"))?
        };
        if base.cannot_be_a_base() {
            return Err(ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base,
        })
    }

    /// Appends `path` to the base one segment at a time. Each segment is
    /// percent-encoded on its own, so encoded dot segments and absolute URLs
    /// stay beneath the base.
    pub fn url_for(&self, path: &str) -> Result<Url, FetchError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(path.split('/'));
        Ok(url)
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let url = self.url_for(path)?;
        let response = self.client.get(url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(path.to_string()));
        }
        Ok(response.error_for_status()?.text().await?)
    }
}

/// Serves resources from memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn fs_source_reads_relative_path() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("newsletters")).unwrap();
        fs::write(tmp.path().join("newsletters/a.txt"), "hello").unwrap();

        let source = FsSource::new(tmp.path());
        assert_eq!(source.fetch("newsletters/a.txt").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn fs_source_missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let source = FsSource::new(tmp.path());
        let err = source.fetch("newsletters/missing.txt").await.unwrap_err();
        let FetchError::NotFound(path) = err else {
            panic!("expected NotFound, got {err:?}");
        };
        assert_eq!(path, "newsletters/missing.txt");
    }

    #[tokio::test]
    async fn fs_source_directory_is_io_error() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("newsletters")).unwrap();
        let source = FsSource::new(tmp.path());
        let err = source.fetch("newsletters").await.unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
    }

    #[tokio::test]
    async fn memory_source_serves_inserted_files() {
        let source = MemorySource::new().with("newsletters/index.json", "[]");
        assert_eq!(source.fetch("newsletters/index.json").await.unwrap(), "[]");
        assert!(matches!(
            source.fetch("other").await,
            Err(FetchError::NotFound(_))
        ));
    }

    #[test]
    fn http_source_resolves_below_base() {
        let source = HttpSource::new("https://example.com/site").unwrap();
        assert_eq!(
            source.url_for("newsletters/a.txt").unwrap().as_str(),
            "https://example.com/site/newsletters/a.txt"
        );
    }

    #[test]
    fn http_source_keeps_existing_trailing_slash() {
        let source = HttpSource::new("https://example.com/").unwrap();
        assert_eq!(
            source.url_for("newsletters/index.json").unwrap().as_str(),
            "https://example.com/newsletters/index.json"
        );
    }

    #[test]
    fn http_source_keeps_encoded_dot_segments_below_base() {
        let source = HttpSource::new("https://example.com/site").unwrap();
        let url = source
            .url_for("newsletters/%2e%2e/%2e%2e/secret.txt")
            .unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert!(url.path().starts_with("/site/newsletters/"));
        assert!(url.path().ends_with("/secret.txt"));
        assert!(url.path().contains("%252e%252e"));
    }

    #[test]
    fn http_source_never_leaves_base_host() {
        let source = HttpSource::new("https://example.com/site").unwrap();
        for path in ["http://evil.test/x", "//evil.test/x", "/etc/passwd"] {
            let url = source.url_for(path).unwrap();
            assert_eq!(url.host_str(), Some("example.com"), "{path}");
            assert!(url.path().starts_with("/site/"), "{path}");
        }
    }

    #[test]
    fn http_source_rejects_cannot_be_a_base_url() {
        assert!(matches!(
            HttpSource::new("mailto:news@example.com"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn http_source_rejects_invalid_base() {
        assert!(matches!(
            HttpSource::new("not a url"),
            Err(FetchError::InvalidUrl(_))
        ));
    }
}
