// src/checker/http.rs
// =============================================================================
// This module probes URLs by making HTTP GET requests.
//
// Key functionality:
// - Validates the URL before touching the network (http/https only)
// - Makes one GET request per URL (no retries, no timeout by default)
// - Turns the response into a status line like "200 OK"
// - Turns transport failures into an "ERROR: ..." marker string
//
// The important rule: probing never fails. Whatever happens, the caller gets
// a string back, because every slot of the result array has to be filled.
//
// Rust concepts:
// - async/await: For network I/O
// - thiserror: Derive Display/Error for our error enum
// - Enums: To represent different failure modes
// =============================================================================

use std::error::Error as _;

use async_trait::async_trait;
use reqwest::{redirect, Client, StatusCode};
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::StatusFetcher;
use crate::config::ProbeConfig;

/// Every failed probe is reported as a string starting with this prefix.
pub const ERROR_MARKER_PREFIX: &str = "ERROR: ";

/// Why a probe did not produce a status line.
///
/// The Display text is what ends up in the response array after
/// [`ERROR_MARKER_PREFIX`], so keep it short and free of internal details.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Not an absolute http(s) URL
    #[error("invalid url")]
    InvalidUrl,
    /// Request timed out
    #[error("timed out")]
    Timeout,
    /// Redirect chain longer than the configured limit
    #[error("too many redirects")]
    TooManyRedirects,
    /// Could not resolve hostname
    #[error("could not resolve host")]
    Dns,
    /// TCP connection refused, reset or unreachable
    #[error("connection failed")]
    Connect,
    /// SSL/TLS handshake or certificate error
    #[error("tls error")]
    Tls,
    /// The batch was cancelled before this URL was probed
    #[error("cancelled")]
    Cancelled,
    /// The worker handling this URL died without reporting back
    #[error("worker failed")]
    WorkerFailed,
    /// Anything else reqwest reported
    #[error("{0}")]
    Other(String),
}

/// Renders a failure as the in-band marker string, e.g. `"ERROR: timed out"`.
pub fn error_marker(error: &FetchError) -> String {
    format!("{}{}", ERROR_MARKER_PREFIX, error)
}

/// Renders a status code the way HTTP status lines read: `"200 OK"`.
///
/// Codes without a canonical reason phrase render as just the number.
pub fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

/// Probes URLs with a real HTTP client.
///
/// Client is cheap to clone (it's an Arc internally), and one instance is
/// shared by every request the server handles so connections get pooled.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds the shared client from the probe settings.
    pub fn new(config: &ProbeConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .redirect(redirect::Policy::limited(config.max_redirects))
            .user_agent(concat!("link-prober/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Performs the GET and returns either the status code or a categorized error.
    pub async fn get(&self, url: &str) -> Result<StatusCode, FetchError> {
        let url = parse_probe_url(url)?;

        // Only the status line matters, so the body is never read
        let response = self.client.get(url).send().await.map_err(categorize_error)?;

        Ok(response.status())
    }
}

#[async_trait]
impl StatusFetcher for HttpFetcher {
    async fn fetch_status(&self, url: &str) -> String {
        let status = match self.get(url).await {
            Ok(code) => status_line(code),
            Err(e) => error_marker(&e),
        };

        debug!(url, status = %status, "probed url");
        status
    }
}

// Parses and validates a URL before we spend a network round trip on it
//
// We only accept absolute http:// and https:// URLs; everything else
// (mailto:, ftp:, relative paths, garbage) is an InvalidUrl
fn parse_probe_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim()).map_err(|_| FetchError::InvalidUrl)?;

    match url.scheme() {
        "http" | "https" if url.host().is_some() => Ok(url),
        _ => Err(FetchError::InvalidUrl),
    }
}

// Categorizes the different error types reqwest can return
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Too many redirects
// - etc.
fn categorize_error(error: reqwest::Error) -> FetchError {
    // reqwest's own Display starts with "... for url (...)", so only the
    // underlying causes are searched: the URL must not pick the category
    let causes = source_chain_text(&error);

    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_redirect() {
        FetchError::TooManyRedirects
    } else if error.is_builder() {
        FetchError::InvalidUrl
    } else if error.is_connect() {
        // Connection errors often mean DNS issues or host unreachable
        if causes.contains("dns error") {
            FetchError::Dns
        } else if causes.contains("certificate") || causes.contains("handshake") {
            FetchError::Tls
        } else {
            FetchError::Connect
        }
    } else if causes.contains("certificate") {
        FetchError::Tls
    } else {
        FetchError::Other(error.without_url().to_string())
    }
}

// Lowercased messages of every error below the reqwest error itself
fn source_chain_text(error: &reqwest::Error) -> String {
    let mut text = String::new();
    let mut source = error.source();

    while let Some(cause) = source {
        text.push_str(&cause.to_string().to_lowercase());
        text.push('\n');
        source = cause.source();
    }

    text
}
