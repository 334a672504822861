use crate::error::{ActionError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

/// Retrieves a release archive by URL.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// HTTP client for release downloads.
///
/// No request timeout is set; the job's own time limit applies.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("las-action/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ActionError::HttpClient)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ArtifactFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let download_err = |source| ActionError::Download {
            url: url.to_string(),
            source,
        };

        let bytes = self
            .client
            .get(url)
            .send()
            .await
            .map_err(download_err)?
            .error_for_status()
            .map_err(download_err)?
            .bytes()
            .await
            .map_err(download_err)?;

        Ok(bytes.to_vec())
    }
}
