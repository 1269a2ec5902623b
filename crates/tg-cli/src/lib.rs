//! # tg-cli
//!
//! TigerGraph command-line interface.
//!
//! Provides commands for:
//! - tgcloud login and instance lifecycle
//! - An interactive GSQL shell on a server
//! - Server backup discovery and service control
//! - Machine alias and tgcloud account configuration
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐  GSQL (/gsqlserver/gsql/*)   ┌──────────────────┐
//! │          │─────────────────────────────►│                  │
//! │  tg-cli  │  admin API (/api/*)          │ TigerGraph server│
//! │          │─────────────────────────────►│                  │
//! │          │                              └──────────────────┘
//! │          │  REST + bearer token         ┌──────────────────┐
//! │          │─────────────────────────────►│ tgcloud/tigertool│
//! └──────────┘                              └──────────────────┘
//!      │
//!      └── tg-config (~/.tgcli: config.toml, creds.bank)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod client;
pub mod commands;
pub mod error;
pub mod output;
mod terminal;

pub use cli::{Cli, CloudCommands, Commands, ConfCommands, Format, ServerCommands};
pub use client::{AdminClient, CloudClient};
pub use error::CliError;
pub use output::OutputFormat;
