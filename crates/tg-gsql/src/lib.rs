//! # tg-gsql
//!
//! Client side of the GSQL remote shell protocol.
//!
//! - [`versions`] - ordered table of client build fingerprints
//! - [`cookie`] - the JSON session cookie and its provenance rules
//! - [`session`] - version negotiation and streamed command execution
//! - [`stream`] - classification of streamed output chunks
//! - [`repl`] - the interactive `GSQL >` prompt
//! - [`transport`] - HTTP seam, with a `reqwest` implementation
//!
//! ```rust,no_run
//! use tg_gsql::{HttpTransport, ServerTarget, Session};
//!
//! # async fn example() -> Result<(), tg_gsql::GsqlError> {
//! let target = ServerTarget::new("http://127.0.0.1", "14240", "tigergraph", "tigergraph");
//! let mut session = Session::new(target, HttpTransport::new()?);
//! let mut stdout = std::io::stdout();
//! session.login(&mut stdout).await?;
//! session.execute("ls", &mut stdout).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cookie;
pub mod error;
pub mod repl;
pub mod session;
pub mod stream;
pub mod transport;
pub mod versions;

#[cfg(test)]
mod testing;

pub use cookie::GsqlCookie;
pub use error::GsqlError;
pub use session::{ServerTarget, Session};
pub use transport::{GsqlRequest, GsqlResponse, HttpTransport, Transport};
pub use versions::{VERSION_TABLE, VersionEntry};
