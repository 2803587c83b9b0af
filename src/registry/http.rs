// src/registry/http.rs

//! HTTP registry client
//!
//! Wraps reqwest with retry support for the two registry documents the
//! resolver needs: the full packument (for `time`) and the abbreviated
//! install document (for installable `versions`).

use super::packument::{AbbreviatedPackument, Packument};
use super::{RawPublishTimes, RegistryClient, encode_package_name};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for HTTP requests (30 seconds)
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum attempts for a request that fails at the transport level
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds, multiplied by the attempt number
const RETRY_DELAY_MS: u64 = 1000;

/// Media type of the full package document
const FULL_DOC: &str = "application/json";

/// Media type of the abbreviated ("corgi") install document
const INSTALL_DOC: &str = "application/vnd.npm.install-v1+json; q=1.0, application/json; q=0.8";

/// Registry client speaking the npm registry HTTP API
pub struct HttpRegistryClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl HttpRegistryClient {
    /// Create a client for the given registry base URL
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("timewalk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: MAX_RETRIES,
        })
    }

    /// Document URL for a package
    fn package_url(&self, package: &str) -> String {
        format!("{}/{}", self.base_url, encode_package_name(package))
    }

    /// GET a JSON document, retrying transport failures
    ///
    /// HTTP error statuses are not retried: 404 maps to `NotFoundError`,
    /// anything else to `DownloadError`.
    async fn get_json<T: DeserializeOwned>(&self, url: &str, accept: &str) -> Result<T> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.get(url).header(ACCEPT, accept).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::NOT_FOUND {
                        return Err(Error::NotFoundError(format!("{url} returned HTTP 404")));
                    }
                    if !status.is_success() {
                        return Err(Error::DownloadError(format!("HTTP {status} from {url}")));
                    }

                    return response.json::<T>().await.map_err(|e| {
                        Error::ParseError(format!("Failed to parse registry JSON from {url}: {e}"))
                    });
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(Error::DownloadError(format!(
                            "Failed to fetch {url} after {attempt} attempts: {e}"
                        )));
                    }
                    warn!("Registry fetch attempt {} failed: {}, retrying...", attempt, e);
                    tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS * attempt as u64))
                        .await;
                }
            }
        }
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    async fn fetch_publish_times(&self, package: &str) -> Result<RawPublishTimes> {
        let url = self.package_url(package);
        debug!("Fetching publish times for {} from {}", package, url);

        let doc: Packument = self.get_json(&url, FULL_DOC).await?;
        let times = doc.publish_times();
        debug!("{}: {} time entries", package, times.len());
        Ok(times)
    }

    async fn fetch_installable_versions(&self, package: &str) -> Result<Vec<String>> {
        let url = self.package_url(package);
        debug!("Fetching installable versions for {} from {}", package, url);

        let doc: AbbreviatedPackument = self.get_json(&url, INSTALL_DOC).await?;
        Ok(doc.version_list())
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_url() {
        let client = HttpRegistryClient::new("https://registry.npmjs.org/").unwrap();
        assert_eq!(
            client.package_url("@babel/core"),
            "https://registry.npmjs.org/@babel%2Fcore"
        );
        assert_eq!(client.package_url("lodash"), "https://registry.npmjs.org/lodash");
    }

    #[tokio::test]
    async fn test_unreachable_registry_is_an_error() {
        // Port 9 (discard) on localhost is not an HTTP server
        let mut client = HttpRegistryClient::new("http://127.0.0.1:9").unwrap();
        client.max_retries = 1;

        let err = client.fetch_publish_times("anything").await.unwrap_err();
        assert!(matches!(err, Error::DownloadError(_)));
    }
}
