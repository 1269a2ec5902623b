//! GSQL session: version negotiation and streamed command execution.
//!
//! A [`Session`] starts unestablished. [`Session::negotiate`] walks the
//! version table until the server accepts one fingerprint; afterwards
//! [`Session::execute`] submits commands and renders their streamed output,
//! picking up cookie replacements the server sends in-band.
//!
//! ```text
//!  login (v1) ──► incompatible
//!  login (v2) ──► incompatible
//!  login (v3) ──► accepted ──► Set-Cookie ──► established
//!                                              │
//!  file "ls" ◄─────────────── cookie ──────────┘
//!     └── __GSQL__COOKIES__ ──► cookie replaced for the next command
//! ```

use std::fmt;
use std::io::Write;
use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use bytes::Bytes;
use futures::StreamExt;
use serde::Deserialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::cookie::GsqlCookie;
use crate::error::GsqlError;
use crate::stream::{self, Segment, Utf8Chunker};
use crate::transport::{BodyStream, GsqlRequest, GsqlResponse, Transport};
use crate::versions::{VERSION_TABLE, VersionEntry};

/// Path prefix of the GSQL HTTP API.
pub const GSQL_PATH: &str = "/gsqlserver/gsql/";

/// Negotiation endpoint, relative to [`GSQL_PATH`].
pub const LOGIN_ENDPOINT: &str = "login";

/// Command submission endpoint, relative to [`GSQL_PATH`].
pub const FILE_ENDPOINT: &str = "file";

/// Internal account allowed through even when the server flags an error.
pub const RESERVED_USER: &str = "__GSQL__secret";

/// Client identity the server's compatibility check expects.
pub const USER_AGENT: &str = "Java/1.8.0";

/// Bound on waiting for the response headers and for each body read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Where and as whom to open a session.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerTarget {
    /// Host, with or without scheme (`http://` is assumed when missing).
    pub host: String,
    /// GSQL port.
    pub gs_port: String,
    /// User name.
    pub user: String,
    /// Password.
    pub password: String,
}

impl ServerTarget {
    /// Create a target.
    pub fn new(
        host: impl Into<String>,
        gs_port: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            gs_port: gs_port.into(),
            user: user.into(),
            password: password.into(),
        }
    }

    /// Base URL, `scheme://host:port`.
    #[must_use]
    pub fn endpoint(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if host.contains("://") {
            format!("{host}:{}", self.gs_port)
        } else {
            format!("http://{host}:{}", self.gs_port)
        }
    }

    /// `base64(user:password)`, used both as login body and Basic credential.
    #[must_use]
    pub fn basic_token(&self) -> String {
        BASE64.encode(format!("{}:{}", self.user, self.password))
    }
}

impl fmt::Debug for ServerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerTarget")
            .field("host", &self.host)
            .field("gs_port", &self.gs_port)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    is_client_compatible: bool,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    welcome_message: String,
}

enum Attempt {
    Accepted { cookie: GsqlCookie, welcome: String },
    Rejected,
}

/// One connection to a GSQL server.
pub struct Session<T> {
    target: ServerTarget,
    endpoint: String,
    version: Option<&'static str>,
    cookie: GsqlCookie,
    transport: T,
    read_timeout: Duration,
}

impl<T> fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.endpoint)
            .field("user", &self.target.user)
            .field("version", &self.version)
            .field("cookie", &self.cookie)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Session<T> {
    /// Create an unestablished session.
    pub fn new(target: ServerTarget, transport: T) -> Self {
        let endpoint = target.endpoint();
        Self {
            target,
            endpoint,
            version: None,
            cookie: GsqlCookie::seed(""),
            transport,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Override the per-read timeout.
    #[must_use]
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Base URL of the server.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Negotiated version, once established.
    #[must_use]
    pub fn version(&self) -> Option<&'static str> {
        self.version
    }

    /// Whether negotiation has succeeded.
    #[must_use]
    pub fn is_established(&self) -> bool {
        self.version.is_some()
    }

    /// Current session cookie.
    #[must_use]
    pub fn cookie(&self) -> &GsqlCookie {
        &self.cookie
    }

    /// Underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Negotiate against the built-in [`VERSION_TABLE`].
    ///
    /// # Errors
    ///
    /// See [`Session::negotiate`].
    pub async fn login<W: Write>(&mut self, out: &mut W) -> Result<&'static str, GsqlError> {
        self.negotiate(VERSION_TABLE, out).await
    }

    /// Try each table entry in order until the server accepts one.
    ///
    /// The welcome message of the accepting server is written to `out`.
    ///
    /// # Errors
    ///
    /// - [`GsqlError::CredentialsRejected`] when a compatible server refuses
    ///   the credentials; later versions are not tried.
    /// - [`GsqlError::Incompatible`] when every entry was rejected.
    /// - [`GsqlError::Transport`] / [`GsqlError::StreamRead`] on I/O failure.
    pub async fn negotiate<W: Write>(
        &mut self,
        table: &[VersionEntry],
        out: &mut W,
    ) -> Result<&'static str, GsqlError> {
        for entry in table {
            match self.attempt_login(entry).await? {
                Attempt::Accepted { cookie, welcome } => {
                    self.cookie = cookie;
                    self.version = Some(entry.version);
                    info!(version = entry.version, endpoint = %self.endpoint, "session established");
                    if !welcome.is_empty() {
                        writeln!(out, "{welcome}")?;
                    }
                    return Ok(entry.version);
                }
                Attempt::Rejected => {}
            }
        }
        Err(GsqlError::Incompatible {
            attempts: table.len(),
        })
    }

    async fn attempt_login(&self, entry: &VersionEntry) -> Result<Attempt, GsqlError> {
        debug!(version = entry.version, "trying client version");

        let seed = GsqlCookie::seed(entry.commit);
        let request = self.request(LOGIN_ENDPOINT, self.target.basic_token(), &seed)?;
        let response = self.send(request).await?;
        let set_cookie = response.set_cookie;
        let body = self.read_to_string(response.body).await?;

        let login: LoginResponse = match serde_json::from_str(&body) {
            Ok(login) => login,
            Err(e) => {
                let error = GsqlError::MalformedResponse(e.to_string());
                warn!(version = entry.version, %error, "skipping version");
                return Ok(Attempt::Rejected);
            }
        };

        if !login.is_client_compatible {
            debug!(version = entry.version, "server rejected client version");
            return Ok(Attempt::Rejected);
        }

        if login.error && self.target.user != RESERVED_USER {
            let message = if login.message.is_empty() {
                "authentication failed".to_string()
            } else {
                login.message
            };
            return Err(GsqlError::CredentialsRejected(message));
        }

        let cookie = match set_cookie {
            Some(raw) => GsqlCookie::from_server(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "ignoring unparsable Set-Cookie");
                seed
            }),
            None => seed,
        };

        Ok(Attempt::Accepted {
            cookie,
            welcome: login.welcome_message,
        })
    }

    /// Submit a command and render its output to `out` as it arrives.
    ///
    /// # Errors
    ///
    /// Returns [`GsqlError::NotEstablished`] before negotiation, or a
    /// transport/read error. Output written before a read failure stays
    /// written; the session remains usable.
    pub async fn execute<W: Write>(&mut self, command: &str, out: &mut W) -> Result<(), GsqlError> {
        if !self.is_established() {
            return Err(GsqlError::NotEstablished);
        }

        let request = self.request(FILE_ENDPOINT, command.to_string(), &self.cookie)?;
        let response = self.send(request).await?;
        debug!(status = response.status, "command accepted");

        let mut body = response.body;
        let mut chunker = Utf8Chunker::new();
        while let Some(bytes) = self.next_chunk(&mut body).await? {
            for chunk in chunker.push(&bytes) {
                self.render(&chunk, out)?;
            }
        }
        if let Some(rest) = chunker.finish() {
            self.render(&rest, out)?;
        }
        out.flush()?;
        Ok(())
    }

    fn render<W: Write>(&mut self, chunk: &str, out: &mut W) -> Result<(), GsqlError> {
        let Some(segment) = stream::classify(chunk) else {
            return Ok(());
        };
        match segment {
            Segment::Progress(progress) => {
                out.write_all(progress.as_bytes())?;
                out.flush()?;
            }
            Segment::Text(text) => writeln!(out, "{text}")?,
            Segment::CookieUpdate(raw) => match GsqlCookie::from_server(raw) {
                Ok(cookie) => {
                    debug!(commit = %cookie.client_commit, "session cookie refreshed");
                    self.cookie = cookie;
                }
                Err(e) => warn!(error = %e, "ignoring unparsable cookie update"),
            },
            Segment::Control(control) => {
                debug!(len = control.len(), "ignoring control message");
            }
        }
        Ok(())
    }

    fn request(
        &self,
        endpoint: &str,
        body: String,
        cookie: &GsqlCookie,
    ) -> Result<GsqlRequest, GsqlError> {
        Ok(GsqlRequest {
            url: format!("{}{GSQL_PATH}{endpoint}", self.endpoint),
            headers: vec![
                ("Content-Language", "en-US".to_string()),
                ("Authorization", format!("Basic {}", self.target.basic_token())),
                ("Content-Type", "application/x-www-form-urlencoded".to_string()),
                ("Cookie", cookie.to_header_value()?),
                ("User-Agent", USER_AGENT.to_string()),
            ],
            body,
        })
    }

    async fn send(&self, request: GsqlRequest) -> Result<GsqlResponse, GsqlError> {
        timeout(self.read_timeout, self.transport.post(request))
            .await
            .map_err(|_| {
                GsqlError::Transport(format!(
                    "no response within {}s",
                    self.read_timeout.as_secs()
                ))
            })?
    }

    async fn next_chunk(&self, body: &mut BodyStream) -> Result<Option<Bytes>, GsqlError> {
        match timeout(self.read_timeout, body.next()).await {
            Err(_) => Err(GsqlError::StreamRead(format!(
                "no data received within {}s",
                self.read_timeout.as_secs()
            ))),
            Ok(None) => Ok(None),
            Ok(Some(item)) => item.map(Some),
        }
    }

    async fn read_to_string(&self, mut body: BodyStream) -> Result<String, GsqlError> {
        let mut buf = Vec::new();
        while let Some(bytes) = self.next_chunk(&mut body).await? {
            buf.extend_from_slice(&bytes);
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
