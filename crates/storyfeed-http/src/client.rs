//! HTTP client for the story backend.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

use storyfeed_core::error::{InvalidInputError, ProtocolError, TransportError};
use storyfeed_core::{BaseUrl, Error, Result};

/// Streaming listing endpoint.
pub(crate) const ANALYZE: &str = "analyze";

/// One-shot comment endpoint.
pub(crate) const COMMENTS: &str = "debug/comments";

const EVENT_STREAM: &str = "text/event-stream";

/// Options for the HTTP backend.
#[derive(Debug, Clone, Default)]
pub struct HttpOptions {
    /// Connect timeout. Streams stay open for as long as the server sends,
    /// so no total request timeout is applied.
    pub timeout: Option<Duration>,
}

impl HttpOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AnalyzeQuery {
    pub offset: u32,
    pub limit: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct CommentsQuery<'a> {
    pub id: &'a str,
    pub offset: u32,
}

#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    client: reqwest::Client,
    base: BaseUrl,
    timeout: Option<Duration>,
}

impl HttpClient {
    pub(crate) fn new(base: BaseUrl, options: &HttpOptions) -> Result<Self> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("storyfeed/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = options.timeout {
            builder = builder.connect_timeout(timeout);
        }

        let client = builder.build().map_err(|e| InvalidInputError::Other {
            message: format!("failed to build HTTP client: {e}"),
        })?;

        Ok(Self {
            client,
            base,
            timeout: options.timeout,
        })
    }

    pub(crate) fn base(&self) -> &BaseUrl {
        &self.base
    }

    /// Open a long-lived event stream. Returns the response once headers
    /// arrived with a success status.
    #[instrument(skip(self), fields(base = %self.base))]
    pub(crate) async fn open_stream<Q>(&self, path: &str, params: &Q) -> Result<reqwest::Response>
    where
        Q: Serialize + std::fmt::Debug,
    {
        let url = self.base.endpoint(path);
        debug!(%url, "Opening event stream");

        let response = self
            .client
            .get(&url)
            .query(params)
            .header(ACCEPT, HeaderValue::from_static(EVENT_STREAM))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        trace!(status = %status, "Stream response");
        if status.is_success() {
            Ok(response)
        } else {
            Err(parse_error_response(response).await.into())
        }
    }

    /// Make a GET request and decode the JSON body.
    #[instrument(skip(self), fields(base = %self.base))]
    pub(crate) async fn get_json<Q, R>(&self, path: &str, params: &Q) -> Result<R>
    where
        Q: Serialize + std::fmt::Debug,
        R: DeserializeOwned,
    {
        let url = self.base.endpoint(path);
        debug!(%url, "GET");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        trace!(status = %status, "Response");
        if !status.is_success() {
            return Err(parse_error_response(response).await.into());
        }

        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&body).map_err(|e| {
            Error::from(ProtocolError::new(
                status.as_u16(),
                Some(format!("invalid response body: {e}")),
            ))
        })
    }

    pub(crate) fn transport_error(&self, err: reqwest::Error) -> Error {
        transport_error(err, self.timeout)
    }
}

/// Map a `reqwest` failure onto the transport error kinds.
pub(crate) fn transport_error(err: reqwest::Error, timeout: Option<Duration>) -> Error {
    let kind = if err.is_timeout() {
        TransportError::Timeout {
            duration_ms: timeout.map_or(0, |t| t.as_millis() as u64),
        }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    kind.into()
}

/// Build a protocol error from a non-success response.
async fn parse_error_response(response: reqwest::Response) -> ProtocolError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ProtocolError::new(status, error_message(&body))
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"error": ..}` and `{"detail": ..}` JSON bodies and falls
/// back to the raw text.
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "detail", "message"] {
            if let Some(serde_json::Value::String(message)) = map.get(key) {
                return Some(message.clone());
            }
        }
    }

    Some(body.chars().take(200).collect())
}
