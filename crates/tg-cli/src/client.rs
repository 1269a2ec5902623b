//! REST clients for tgcloud and the TigerGraph admin API.
//!
//! Both are thin `reqwest` wrappers with a fixed request timeout. Status
//! codes the commands react to (success, 401) are returned as values;
//! anything else becomes a [`CliError`].

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, trace};

use crate::error::CliError;

/// tgcloud API base URL.
pub const TGCLOUD_BASE_URL: &str = "https://tgcloud.io/api";

/// tigertool base URL, which handles tgcloud logins.
pub const TIGERTOOL_URL: &str = "https://tigertool.tigergraph.com";

/// Default request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Installation root assumed when the server does not reveal one.
pub const DEFAULT_INSTALL_ROOT: &str = "/home/tigergraph";

/// Outcome of a tgcloud call that may need a fresh login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloudReply<T> {
    /// The call succeeded.
    Ok(T),
    /// The bearer token was rejected.
    Unauthorized,
}

/// Outcome of a tgcloud login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials accepted; the bearer token without its `Bearer ` prefix.
    Token(String),
    /// Credentials rejected; the raw response body.
    Rejected(String),
}

/// One tgcloud instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CloudMachine {
    /// Instance ID.
    #[serde(rename = "ID")]
    pub id: String,
    /// Instance name.
    #[serde(default)]
    pub name: String,
    /// Solution tag.
    #[serde(default)]
    pub tag: String,
    /// Lifecycle state, e.g. `running` or `terminated`.
    #[serde(default)]
    pub state: String,
    /// Creation time as reported by tgcloud.
    #[serde(default)]
    pub created_at: String,
}

impl CloudMachine {
    /// Whether the instance has been terminated.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.state == "terminated"
    }
}

/// Lifecycle operations on a tgcloud instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineOp {
    /// Start a stopped instance.
    Start,
    /// Stop a running instance.
    Stop,
    /// Archive an instance.
    Archive,
    /// Destroy an instance.
    Terminate,
}

impl MachineOp {
    fn method(self) -> Method {
        match self {
            Self::Terminate => Method::DELETE,
            Self::Start | Self::Stop | Self::Archive => Method::POST,
        }
    }

    fn path(self, id: &str) -> String {
        match self {
            Self::Start => format!("/solution/start/{id}"),
            Self::Stop => format!("/solution/stop/{id}"),
            Self::Archive => format!("/solution/archive/{id}"),
            Self::Terminate => format!("/solution/destroy/{id}"),
        }
    }
}

/// Token part of an `Authorization`-style `"Bearer <token>"` value.
#[must_use]
pub fn bearer_token(value: &str) -> Option<&str> {
    value.split(' ').nth(1).filter(|t| !t.is_empty())
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SolutionList {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: Vec<CloudMachine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SolutionReply {
    #[serde(default)]
    message: String,
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, CliError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// tgcloud and tigertool client.
#[derive(Debug, Clone)]
pub struct CloudClient {
    http: reqwest::Client,
    api_base: String,
    tool_base: String,
}

impl CloudClient {
    /// Create a client for the given API and tigertool base URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(api_base: impl Into<String>, tool_base: impl Into<String>) -> Result<Self, CliError> {
        Ok(Self {
            http: http_client(DEFAULT_REQUEST_TIMEOUT)?,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            tool_base: tool_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Exchange account credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or an accepted login carries
    /// no usable token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, CliError> {
        let url = format!("{}/login", self.tool_base);
        debug!(%url, "tgcloud login");

        let response = self
            .http
            .post(&url)
            .json(&json!({ "username": email, "password": password }))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Ok(LoginOutcome::Rejected(body));
        }
        let login: LoginResponse = serde_json::from_str(&body)?;
        bearer_token(&login.token)
            .map(|token| LoginOutcome::Token(token.to_string()))
            .ok_or_else(|| CliError::Decode("login response carries no bearer token".into()))
    }

    /// List the account's instances.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or tgcloud reports an error.
    pub async fn list(&self, token: &str) -> Result<CloudReply<Vec<CloudMachine>>, CliError> {
        let Some(body) = self.call(Method::GET, "/solution", token).await? else {
            return Ok(CloudReply::Unauthorized);
        };
        let list: SolutionList = serde_json::from_str(&body)?;
        if list.error {
            return Err(CliError::Decode(format!("tgcloud error: {}", list.message)));
        }
        Ok(CloudReply::Ok(list.result))
    }

    /// Run a lifecycle operation and return tgcloud's message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn machine_op(
        &self,
        token: &str,
        op: MachineOp,
        id: &str,
    ) -> Result<CloudReply<String>, CliError> {
        let Some(body) = self.call(op.method(), &op.path(id), token).await? else {
            return Ok(CloudReply::Unauthorized);
        };
        let reply: SolutionReply = serde_json::from_str(&body)?;
        Ok(CloudReply::Ok(reply.message))
    }

    /// `None` on 401.
    async fn call(&self, method: Method, path: &str, token: &str) -> Result<Option<String>, CliError> {
        let url = format!("{}{path}", self.api_base);
        debug!(%method, %url, "tgcloud request");

        let response = self
            .http
            .request(method, &url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        trace!(status = status.as_u16(), %body, "tgcloud response");

        match status {
            StatusCode::OK => Ok(Some(body)),
            StatusCode::UNAUTHORIZED => Ok(None),
            other => Err(CliError::Http(format!("{}: {body}", other.as_u16()))),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct LogResponse {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    results: Vec<LogEntry>,
}

#[derive(Debug, Deserialize)]
struct LogEntry {
    #[serde(default)]
    path: String,
}

#[derive(Debug, Deserialize)]
struct ServiceResponse {
    #[serde(default)]
    message: String,
}

/// Installation root derived from a log file path.
#[must_use]
pub fn install_root_from_log_path(path: &str) -> &str {
    path.split("/log/").next().unwrap_or(path)
}

/// Client for a server's admin API (`/api/...` on the GSQL port).
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: reqwest::Client,
    base: String,
    session: Option<String>,
}

impl AdminClient {
    /// Create a client for `scheme://host:port`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(base: impl Into<String>) -> Result<Self, CliError> {
        Ok(Self {
            http: http_client(DEFAULT_REQUEST_TIMEOUT)?,
            base: base.into(),
            session: None,
        })
    }

    /// Authenticate and keep the session cookie for later calls.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Status`] if the server refuses the credentials.
    pub async fn login(&mut self, user: &str, password: &str) -> Result<(), CliError> {
        let url = format!("{}/api/auth/login", self.base);
        debug!(%url, user, "admin login");

        let response = self
            .http
            .post(&url)
            .json(&json!({ "username": user, "password": password }))
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(CliError::Status {
                context: "Authentication",
                status: response.status().as_u16(),
            });
        }

        self.session = response
            .headers()
            .get(reqwest::header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_owned);
        Ok(())
    }

    /// Installation root of the server, from the path of its first log file.
    ///
    /// Falls back to [`DEFAULT_INSTALL_ROOT`] when the server does not say.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent.
    pub async fn install_root(&self) -> Result<String, CliError> {
        let response = self
            .request(Method::GET, &format!("{}/api/log", self.base))
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            debug!(status = response.status().as_u16(), "log listing unavailable");
            return Ok(DEFAULT_INSTALL_ROOT.to_string());
        }

        let logs: LogResponse = response.json().await.unwrap_or_default();
        let root = logs
            .results
            .first()
            .filter(|_| !logs.error)
            .map(|entry| install_root_from_log_path(&entry.path))
            .filter(|root| !root.is_empty())
            .unwrap_or(DEFAULT_INSTALL_ROOT);
        Ok(root.to_string())
    }

    /// Start or stop the GPE, GSE and RESTPP services, returning the
    /// server's message.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Status`] on a non-200 answer.
    pub async fn services(&self, ops: &str) -> Result<String, CliError> {
        let url = format!(
            "{}/api/service/{ops}?serviceName=gpe&serviceName=gse&serviceName=restpp",
            self.base
        );
        let response = self.request(Method::POST, &url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(CliError::Status {
                context: "Service operation",
                status: response.status().as_u16(),
            });
        }
        let reply: ServiceResponse = response.json().await?;
        Ok(reply.message)
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        match &self.session {
            Some(cookie) => builder.header(reqwest::header::COOKIE, cookie),
            None => builder,
        }
    }
}
