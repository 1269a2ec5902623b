//! CLI error types.

use thiserror::Error;
use tg_config::ConfigError;
use tg_gsql::GsqlError;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// GSQL session failure.
    #[error(transparent)]
    Gsql(#[from] GsqlError),

    /// Reading or writing the local configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An HTTP request to tgcloud or a server failed.
    #[error("request failed: {0}")]
    Http(String),

    /// The server answered with an unexpected status.
    #[error("{context} failed with status: {status}")]
    Status {
        /// What was being attempted.
        context: &'static str,
        /// HTTP status code.
        status: u16,
    },

    /// A response body could not be decoded.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// No tgcloud bearer token has been saved yet.
    #[error("bearer token not found, please login first")]
    NotLoggedIn,

    /// The requested server alias is not configured.
    #[error("Alias {0} not found. Try: tg conf list")]
    UnknownAlias(String),

    /// Invalid argument or input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for CliError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_names_the_step() {
        let err = CliError::Status {
            context: "Authentication",
            status: 403,
        };
        assert_eq!(err.to_string(), "Authentication failed with status: 403");
    }

    #[test]
    fn unknown_alias_suggests_listing() {
        let err = CliError::UnknownAlias("prod".into());
        assert_eq!(err.to_string(), "Alias prod not found. Try: tg conf list");
    }

    #[test]
    fn gsql_errors_pass_through() {
        let err = CliError::from(GsqlError::Incompatible { attempts: 17 });
        assert_eq!(
            err.to_string(),
            "unable to establish compatible connection after 17 attempt(s)"
        );
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        assert!(matches!(CliError::from(io_err), CliError::Io(_)));
    }
}
