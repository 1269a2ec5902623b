//! The GSQL session cookie.
//!
//! The GSQL server does not speak RFC 6265: it expects a JSON document in the
//! `Cookie` request header and sends replacements as raw JSON in `Set-Cookie`
//! or in-band in a streamed response. The value is therefore handled as a
//! plain header string, never through a cookie jar.

use serde::{Deserialize, Serialize};

use crate::error::GsqlError;

/// Session flags exchanged with the GSQL server on every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GsqlCookie {
    /// Client build fingerprint taken from the version table.
    pub client_commit: String,
    /// Artifact was issued to the GSQL client.
    pub from_gsql_client: bool,
    /// Artifact originates from GraphStudio.
    pub from_graph_studio: bool,
    /// Client runs in gshell test context.
    #[serde(rename = "gShellTest")]
    pub gshell_test: bool,
    /// Artifact was issued by the GSQL server.
    pub from_gsql_server: bool,
    /// Load balancer affinity token, echoed verbatim.
    #[serde(
        rename = "ApplicationGatewayAffinity",
        skip_serializing_if = "Option::is_none"
    )]
    pub gateway_affinity: Option<String>,
    /// CORS variant of the affinity token, echoed verbatim.
    #[serde(
        rename = "ApplicationGatewayAffinityCORS",
        skip_serializing_if = "Option::is_none"
    )]
    pub gateway_affinity_cors: Option<String>,
}

impl GsqlCookie {
    /// Initial cookie for a negotiation attempt with the given fingerprint.
    #[must_use]
    pub fn seed(client_commit: impl Into<String>) -> Self {
        Self {
            client_commit: client_commit.into(),
            from_gsql_client: false,
            from_graph_studio: false,
            gshell_test: true,
            from_gsql_server: false,
            gateway_affinity: None,
            gateway_affinity_cors: None,
        }
    }

    /// Decode a cookie sent by the server and re-assert our provenance flags.
    ///
    /// The server replaces the cookie wholesale; only the flags describing
    /// where the artifact came from and which tool is running are forced.
    /// Anything after the leading JSON document is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` does not start with a valid cookie document.
    pub fn from_server(raw: &str) -> Result<Self, GsqlError> {
        let cookie = serde_json::Deserializer::from_str(raw.trim())
            .into_iter::<Self>()
            .next()
            .ok_or_else(|| GsqlError::MalformedResponse("empty cookie".to_string()))??;
        Ok(cookie.with_client_provenance())
    }

    /// Force the provenance flags the client asserts on accepted artifacts.
    #[must_use]
    pub fn with_client_provenance(mut self) -> Self {
        self.from_gsql_client = true;
        self.from_gsql_server = true;
        self.from_graph_studio = false;
        self.gshell_test = true;
        self
    }

    /// Serialize to the single-line header value sent in `Cookie`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_header_value(&self) -> Result<String, GsqlError> {
        Ok(serde_json::to_string(self)?)
    }
}
