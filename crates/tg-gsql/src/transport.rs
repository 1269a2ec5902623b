//! HTTP transport seam for GSQL sessions.
//!
//! [`Session`](crate::Session) only needs "POST these headers and body, give
//! me the `Set-Cookie` value and a body stream". [`HttpTransport`] provides
//! that over `reqwest`; tests substitute a scripted implementation.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::header::{HeaderMap, SET_COOKIE};
use tracing::{trace, warn};

use crate::error::GsqlError;

/// Connect timeout for the GSQL endpoint.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Streamed response body.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, GsqlError>> + Send>>;

/// A POST request to the GSQL server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GsqlRequest {
    /// Absolute URL.
    pub url: String,
    /// Header name/value pairs, sent as-is.
    pub headers: Vec<(&'static str, String)>,
    /// Request body.
    pub body: String,
}

impl GsqlRequest {
    /// Value of the first header with the given name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response to a [`GsqlRequest`].
pub struct GsqlResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw `Set-Cookie` header value, if any.
    pub set_cookie: Option<String>,
    /// Response body.
    pub body: BodyStream,
}

impl fmt::Debug for GsqlResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GsqlResponse")
            .field("status", &self.status)
            .field("set_cookie", &self.set_cookie)
            .finish_non_exhaustive()
    }
}

/// Something that can POST a [`GsqlRequest`].
pub trait Transport: Send + Sync {
    /// Send the request and return once response headers are available.
    ///
    /// # Errors
    ///
    /// Returns [`GsqlError::Transport`] if the request cannot be delivered.
    fn post(
        &self,
        request: GsqlRequest,
    ) -> impl Future<Output = Result<GsqlResponse, GsqlError>> + Send;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the default connect timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self, GsqlError> {
        let client = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn post(&self, request: GsqlRequest) -> Result<GsqlResponse, GsqlError> {
        trace!(url = %request.url, bytes = request.body.len(), "POST");

        let mut builder = self.client.post(&request.url).body(request.body);
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let set_cookie = raw_set_cookie(response.headers());

        let body = response
            .bytes_stream()
            .map(|item| item.map_err(|e| GsqlError::StreamRead(e.to_string())));

        Ok(GsqlResponse {
            status,
            set_cookie,
            body: Box::pin(body),
        })
    }
}

/// `Set-Cookie` as sent; the GSQL server puts raw JSON there.
fn raw_set_cookie(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(SET_COOKIE)?;
    match value.to_str() {
        Ok(raw) => Some(raw.to_owned()),
        Err(e) => {
            warn!(error = %e, "ignoring non-ASCII Set-Cookie");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let request = GsqlRequest {
            url: "http://localhost:14240/gsqlserver/gsql/login".into(),
            headers: vec![("Content-Language", "en-US".into())],
            body: String::new(),
        };
        assert_eq!(request.header("content-language"), Some("en-US"));
        assert_eq!(request.header("Cookie"), None);
    }

    #[test]
    fn set_cookie_is_read_raw() {
        let mut headers = HeaderMap::new();
        headers.insert(
            SET_COOKIE,
            HeaderValue::from_static(r#"{"clientCommit":"abc","gShellTest":true}"#),
        );
        assert_eq!(
            raw_set_cookie(&headers).as_deref(),
            Some(r#"{"clientCommit":"abc","gShellTest":true}"#)
        );
        assert_eq!(raw_set_cookie(&HeaderMap::new()), None);
    }

    #[test]
    fn non_ascii_set_cookie_is_dropped() {
        let mut headers = HeaderMap::new();
        headers.insert(
            SET_COOKIE,
            HeaderValue::from_bytes(b"{\"clientCommit\":\"caf\xe9\"}").expect("header"),
        );
        assert_eq!(raw_set_cookie(&headers), None);
    }

    #[test]
    fn http_transport_builds() {
        assert!(HttpTransport::new().is_ok());
    }
}
