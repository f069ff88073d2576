//! Account API client.
//!
//! Uses the curl crate (libcurl) on a single reusable `Easy` handle, so the
//! connection and TLS session carry over between the preflight probe and the
//! claim attempts. [`AccountApi`] is the seam the monitor depends on.

use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Production API root.
pub const DEFAULT_API_BASE: &str = "https://prod-api.lolz.live";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw HTTP response: status and body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request went out (or tried to) and failed below HTTP: DNS,
    /// connect, TLS, timeout. Retryable.
    #[error("network: {0}")]
    Network(#[source] curl::Error),
    /// The request could not be prepared (bad option, bad header).
    #[error("request setup: {0}")]
    Setup(#[from] curl::Error),
    #[error("invalid API base URL {base:?}: {reason}")]
    BadBase { base: String, reason: String },
}

impl ClientError {
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }
}

/// The two calls the monitor makes against the platform.
pub trait AccountApi {
    /// Authenticated GET on the account (preflight).
    fn probe(&mut self) -> Result<HttpResponse, ClientError>;
    /// Authenticated PUT renaming the account to `username`.
    fn claim(&mut self, username: &str) -> Result<HttpResponse, ClientError>;
}

/// curl-backed client for `{base}/users/{user_id}`.
pub struct ApiClient {
    easy: curl::easy::Easy,
    account_url: Url,
    token: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("account_url", &self.account_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(base: &str, token: &str, user_id: u64) -> Result<Self, ClientError> {
        Ok(Self {
            easy: curl::easy::Easy::new(),
            account_url: account_url(base, user_id)?,
            token: token.to_string(),
        })
    }

    pub fn account_url(&self) -> &str {
        self.account_url.as_str()
    }

    /// Reset per-request options; the handle keeps its connection cache.
    fn prepare(&mut self, json_body: bool) -> Result<(), ClientError> {
        self.easy.reset();
        self.easy.url(self.account_url.as_str())?;
        self.easy.connect_timeout(CONNECT_TIMEOUT)?;
        self.easy.timeout(REQUEST_TIMEOUT)?;
        self.easy.useragent(concat!("nickwatch/", env!("CARGO_PKG_VERSION")))?;

        let mut list = curl::easy::List::new();
        list.append(&format!("Authorization: Bearer {}", self.token.trim()))?;
        list.append("Accept: application/json")?;
        if json_body {
            list.append("Content-Type: application/json")?;
        }
        self.easy.http_headers(list)?;
        Ok(())
    }

    fn perform(&mut self) -> Result<HttpResponse, ClientError> {
        let mut body = Vec::new();
        {
            let mut transfer = self.easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform().map_err(ClientError::Network)?;
        }
        let status = self.easy.response_code()?;
        Ok(HttpResponse { status, body })
    }
}

impl AccountApi for ApiClient {
    fn probe(&mut self) -> Result<HttpResponse, ClientError> {
        self.prepare(false)?;
        self.easy.get(true)?;
        self.perform()
    }

    fn claim(&mut self, username: &str) -> Result<HttpResponse, ClientError> {
        self.prepare(true)?;
        let payload = serde_json::json!({ "username": username }).to_string();
        self.easy.custom_request("PUT")?;
        self.easy.post_fields_copy(payload.as_bytes())?;
        self.perform()
    }
}

/// `{base}/users/{user_id}`, tolerating a trailing slash or a path prefix on `base`.
pub fn account_url(base: &str, user_id: u64) -> Result<Url, ClientError> {
    let bad = |reason: String| ClientError::BadBase {
        base: base.to_string(),
        reason,
    };
    let id = user_id.to_string();
    let mut url = Url::parse(base).map_err(|e| bad(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(bad(format!("unsupported scheme {}", url.scheme())));
    }
    url.path_segments_mut()
        .map_err(|_| bad("cannot be a base".to_string()))?
        .pop_if_empty()
        .extend(["users", id.as_str()]);
    Ok(url)
}
