//! Scripted in-memory transport for protocol tests.

use bytes::Bytes;
use parking_lot::Mutex;

use crate::cookie::GsqlCookie;
use crate::error::GsqlError;
use crate::transport::{GsqlRequest, GsqlResponse, Transport};

/// Canned answer produced by a [`ScriptedTransport`] responder.
pub(crate) struct Reply {
    status: u16,
    set_cookie: Option<String>,
    chunks: Vec<Result<Bytes, GsqlError>>,
}

impl Reply {
    /// Single-chunk JSON body.
    pub(crate) fn json(body: &serde_json::Value) -> Self {
        Self::chunks(&[&body.to_string()])
    }

    /// Body delivered as the given transport chunks.
    pub(crate) fn chunks(chunks: &[&str]) -> Self {
        Self {
            status: 200,
            set_cookie: None,
            chunks: chunks
                .iter()
                .map(|c| Ok(Bytes::copy_from_slice(c.as_bytes())))
                .collect(),
        }
    }

    /// Attach a raw `Set-Cookie` value.
    pub(crate) fn with_set_cookie(mut self, raw: &str) -> Self {
        self.set_cookie = Some(raw.to_string());
        self
    }

    /// Fail the body stream after the chunks delivered so far.
    pub(crate) fn then_fail(mut self, message: &str) -> Self {
        self.chunks.push(Err(GsqlError::StreamRead(message.to_string())));
        self
    }
}

type Responder = Box<dyn Fn(&GsqlRequest) -> Result<Reply, GsqlError> + Send + Sync>;

/// Transport answering from a closure and recording every request.
pub(crate) struct ScriptedTransport {
    responder: Responder,
    requests: Mutex<Vec<GsqlRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(
        responder: impl Fn(&GsqlRequest) -> Result<Reply, GsqlError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, in order.
    pub(crate) fn requests(&self) -> Vec<GsqlRequest> {
        self.requests.lock().clone()
    }
}

impl Transport for ScriptedTransport {
    async fn post(&self, request: GsqlRequest) -> Result<GsqlResponse, GsqlError> {
        let reply = (self.responder)(&request);
        self.requests.lock().push(request);
        let reply = reply?;
        Ok(GsqlResponse {
            status: reply.status,
            set_cookie: reply.set_cookie,
            body: Box::pin(futures::stream::iter(reply.chunks)),
        })
    }
}

/// Cookie sent with a recorded request.
pub(crate) fn cookie_of(request: &GsqlRequest) -> GsqlCookie {
    let raw = request.header("Cookie").unwrap_or_default();
    serde_json::from_str(raw).unwrap_or_default()
}

/// Whether the request targets the login endpoint.
pub(crate) fn is_login(request: &GsqlRequest) -> bool {
    request.url.ends_with("/gsqlserver/gsql/login")
}
