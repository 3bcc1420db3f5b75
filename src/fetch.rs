//! Input acquisition: local files, in-memory bytes and remote documents.

use anyhow::Context;
use reqwest::{Client, Url};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::FetchConfig;
use crate::error::{Error, Result};

/// Prefix marking a bare document identifier on the command line.
pub const REMOTE_PREFIX: &str = "remote:";

/// Source of raw image bytes addressed by an opaque identifier.
///
/// # Example
///
/// ```rust,no_run
/// use exif_forge::config::Config;
/// use exif_forge::fetch::{HttpFetcher, RemoteSource};
///
/// # async fn example() -> anyhow::Result<()> {
/// let fetcher = HttpFetcher::new(&Config::default().fetch)?;
/// let bytes = fetcher.fetch("https://example.com/photo.jpg").await?;
/// println!("{} bytes", bytes.len());
/// # Ok(())
/// # }
/// ```
#[async_trait::async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch the document named by `id`. Failures are reported once, never retried.
    async fn fetch(&self, id: &str) -> Result<Vec<u8>>;
}

/// HTTP(S) implementation of [`RemoteSource`].
pub struct HttpFetcher {
    base_url: Option<Url>,
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> anyhow::Result<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .map(|base| Url::parse(base).with_context(|| format!("Invalid fetch.base_url {base:?}")))
            .transpose()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { base_url, client })
    }

    /// Resolve an identifier to the URL that will be requested.
    ///
    /// Absolute `http`/`https` URLs are used as is; anything else is joined
    /// to the configured base URL.
    pub fn resolve(&self, id: &str) -> Result<Url> {
        if let Ok(url) = Url::parse(id) {
            return match url.scheme() {
                "http" | "https" => Ok(url),
                scheme => Err(Error::Fetch(format!("unsupported URL scheme {scheme:?}"))),
            };
        }
        let base = self
            .base_url
            .as_ref()
            .ok_or_else(|| Error::Fetch(format!("no base URL configured for identifier {id:?}")))?;
        base.join(id)
            .map_err(|e| Error::Fetch(format!("cannot resolve {id:?} against {base}: {e}")))
    }
}

#[async_trait::async_trait]
impl RemoteSource for HttpFetcher {
    async fn fetch(&self, id: &str) -> Result<Vec<u8>> {
        let url = self.resolve(id)?;
        log::debug!("Fetching {url}");

        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("request to {url} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!("{url} returned {status}")));
        }

        if let Some(content_type) = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_image_content_type(content_type) {
                return Err(Error::Fetch(format!(
                    "{url} is not an image (content-type {content_type})"
                )));
            }
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Error::Fetch(format!("reading {url} failed: {e}")))?;
        log::info!("Fetched {} bytes from {url}", bytes.len());
        Ok(bytes.to_vec())
    }
}

/// `image/*` or a generic binary type.
fn is_image_content_type(value: &str) -> bool {
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence.starts_with("image/") || essence == "application/octet-stream"
}

/// Where the bytes of one conversion come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    /// Raw request body or an uploaded file field.
    Bytes(Vec<u8>),
    Path(PathBuf),
    /// Remote document identifier or URL.
    Remote(String),
}

impl ImageInput {
    /// Interpret a command-line argument.
    ///
    /// `http(s)://` URLs and `remote:<id>` are remote, everything else is a path.
    pub fn from_arg(arg: &str) -> Self {
        if let Some(id) = arg.strip_prefix(REMOTE_PREFIX) {
            Self::Remote(id.to_string())
        } else if arg.starts_with("http://") || arg.starts_with("https://") {
            Self::Remote(arg.to_string())
        } else {
            Self::Path(PathBuf::from(arg))
        }
    }

    /// Human-readable name for logs and reports.
    pub fn label(&self) -> String {
        match self {
            Self::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
            Self::Path(path) => path.display().to_string(),
            Self::Remote(id) => id.clone(),
        }
    }

    pub async fn load(self, remote: &dyn RemoteSource) -> Result<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            Self::Path(path) => Ok(tokio::fs::read(&path).await?),
            Self::Remote(id) => remote.fetch(&id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct StubSource(HashMap<&'static str, Vec<u8>>);

    #[async_trait::async_trait]
    impl RemoteSource for StubSource {
        async fn fetch(&self, id: &str) -> Result<Vec<u8>> {
            self.0
                .get(id)
                .cloned()
                .ok_or_else(|| Error::Fetch(format!("{id} not found")))
        }
    }

    fn fetcher(base_url: Option<&str>) -> HttpFetcher {
        HttpFetcher::new(&FetchConfig {
            base_url: base_url.map(String::from),
            timeout_secs: 5,
        })
        .unwrap()
    }

    // ── resolve ──────────────────────────────────────────────────────

    #[test]
    fn absolute_urls_bypass_base() {
        let url = fetcher(Some("https://docs.example.com/files/"))
            .resolve("http://cdn.example.com/a.jpg")
            .unwrap();
        assert_eq!(url.as_str(), "http://cdn.example.com/a.jpg");
    }

    #[test]
    fn bare_identifier_joins_base() {
        let url = fetcher(Some("https://docs.example.com/files/"))
            .resolve("abc123")
            .unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/files/abc123");
    }

    #[test]
    fn bare_identifier_without_base_is_fetch_error() {
        let err = fetcher(None).resolve("abc123").unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let err = fetcher(None).resolve("file:///etc/passwd").unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }

    #[test]
    fn invalid_base_url_fails_construction() {
        let config = FetchConfig {
            base_url: Some("not a url".into()),
            timeout_secs: 5,
        };
        assert!(HttpFetcher::new(&config).is_err());
    }

    #[test]
    fn content_type_filter() {
        assert!(is_image_content_type("image/jpeg"));
        assert!(is_image_content_type("Image/WebP; charset=binary"));
        assert!(is_image_content_type("application/octet-stream"));
        assert!(!is_image_content_type("text/html; charset=utf-8"));
        assert!(!is_image_content_type("application/json"));
    }

    // ── ImageInput ───────────────────────────────────────────────────

    #[test]
    fn from_arg_classifies_inputs() {
        assert_eq!(
            ImageInput::from_arg("https://x.test/a.png"),
            ImageInput::Remote("https://x.test/a.png".into())
        );
        assert_eq!(ImageInput::from_arg("remote:doc-7"), ImageInput::Remote("doc-7".into()));
        assert_eq!(
            ImageInput::from_arg("photos/a.png"),
            ImageInput::Path(PathBuf::from("photos/a.png"))
        );
    }

    #[tokio::test]
    async fn load_uses_remote_source() {
        let stub = StubSource(HashMap::from([("doc-7", vec![1, 2, 3])]));
        let bytes = ImageInput::Remote("doc-7".into()).load(&stub).await.unwrap();
        assert_eq!(bytes, [1, 2, 3]);

        let err = ImageInput::Remote("missing".into()).load(&stub).await.unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn load_reads_files_and_bytes() {
        let stub = StubSource(HashMap::new());
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("a.bin");
        std::fs::write(&path, b"abc").unwrap();

        assert_eq!(ImageInput::Path(path).load(&stub).await.unwrap(), b"abc");
        assert_eq!(ImageInput::Bytes(vec![9]).load(&stub).await.unwrap(), [9]);

        let err = ImageInput::Path(dir.path().join("missing")).load(&stub).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
