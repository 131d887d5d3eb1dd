//! Upstream fetcher - single outbound GET with failure absorption.
//!
//! Every call returns an [`UpstreamResponse`]: either the decoded body or an
//! absent marker carrying the reason. Nothing here returns an error to the
//! caller, so each call site's failure path is an explicit match arm.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Why an upstream call produced no usable data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// The request did not complete within its timeout.
    #[error("request timed out")]
    Timeout,

    /// The upstream answered with a non-2xx status.
    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection, DNS, TLS or request-building failure.
    #[error("{0}")]
    Transport(String),

    /// The body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The body was empty, `null`, or an empty object.
    #[error("empty response body")]
    Empty,
}

impl FetchFailure {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

/// Result of an upstream call.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamResponse<T = Value> {
    /// The upstream returned a usable body.
    Present(T),
    /// No usable data; the reason is kept for logging and reporting.
    Absent(FetchFailure),
}

impl<T> UpstreamResponse<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent(_))
    }

    /// Drop the failure reason.
    pub fn present(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent(_) => None,
        }
    }
}

/// An outbound GET request: absolute URL, headers and a per-call timeout.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub timeout: Duration,
}

impl UpstreamRequest {
    /// Default per-call timeout when none is set.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Same headers and timeout, different URL. Used to follow page cursors.
    pub fn with_url(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: self.headers.clone(),
            timeout: self.timeout,
        }
    }
}

/// Performs upstream GETs on a shared connection pool.
#[derive(Debug, Clone, Default)]
pub struct UpstreamFetcher {
    client: Client,
}

impl UpstreamFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch and decode a JSON body.
    pub async fn fetch(&self, request: &UpstreamRequest) -> UpstreamResponse {
        let response = match self.send(request).await {
            Ok(response) => response,
            Err(failure) => return UpstreamResponse::Absent(failure),
        };

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return UpstreamResponse::Absent(FetchFailure::from_reqwest(e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return UpstreamResponse::Absent(FetchFailure::Empty);
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Null) => UpstreamResponse::Absent(FetchFailure::Empty),
            Ok(Value::Object(map)) if map.is_empty() => {
                UpstreamResponse::Absent(FetchFailure::Empty)
            }
            Ok(value) => UpstreamResponse::Present(value),
            Err(e) => UpstreamResponse::Absent(FetchFailure::Decode(e.to_string())),
        }
    }

    /// Fetch a body as plain text.
    pub async fn fetch_text(&self, request: &UpstreamRequest) -> UpstreamResponse<String> {
        let response = match self.send(request).await {
            Ok(response) => response,
            Err(failure) => return UpstreamResponse::Absent(failure),
        };

        match response.text().await {
            Ok(text) => UpstreamResponse::Present(text),
            Err(e) => UpstreamResponse::Absent(FetchFailure::from_reqwest(e)),
        }
    }

    /// Send the request and reject non-2xx statuses.
    async fn send(&self, request: &UpstreamRequest) -> Result<reqwest::Response, FetchFailure> {
        debug!(url = %request.url, "Upstream GET");

        let mut builder = self.client.get(&request.url).timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder.send().await.map_err(FetchFailure::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}
