//! CLI command implementations.
//!
//! Each submodule implements one command group:
//! - [`version`] - Installed version and support links
//! - [`cloud`] - tgcloud login and instance lifecycle
//! - [`server`] - GSQL shell, backup and services on a server
//! - [`conf`] - Machine aliases and tgcloud account

pub mod cloud;
pub mod conf;
pub mod server;
pub mod version;

pub use cloud::CloudCommand;
pub use conf::ConfCommand;
pub use server::ServerCommand;
pub use version::VersionCommand;

use std::io::{BufRead, IsTerminal, Write};

use crate::error::CliError;
use crate::terminal;

/// How passwords are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecretInput {
    /// A line from the command's input, like any other answer.
    #[default]
    Line,
    /// Keystrokes from the terminal, not echoed.
    Hidden,
}

impl SecretInput {
    /// `Hidden` when stdin is a terminal, `Line` when it is piped.
    #[must_use]
    pub fn detect() -> Self {
        if std::io::stdin().is_terminal() {
            Self::Hidden
        } else {
            Self::Line
        }
    }
}

/// Print `question` and read one trimmed line of answer.
///
/// End of input reads as an empty answer.
pub(crate) fn ask<R, W>(input: &mut R, out: &mut W, question: &str) -> Result<String, CliError>
where
    R: BufRead,
    W: Write,
{
    write!(out, "{question}")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// The given value, or the answer to `question`, or `default` when the
/// answer is empty.
pub(crate) fn given_or_ask<R, W>(
    given: Option<&str>,
    input: &mut R,
    out: &mut W,
    question: &str,
    default: &str,
) -> Result<String, CliError>
where
    R: BufRead,
    W: Write,
{
    if let Some(value) = given {
        return Ok(value.to_string());
    }
    let answer = ask(input, out, question)?;
    Ok(if answer.is_empty() {
        default.to_string()
    } else {
        answer
    })
}

/// Like [`given_or_ask`], but the answer is read as `mode` says.
pub(crate) fn given_or_ask_secret<R, W>(
    given: Option<&str>,
    mode: SecretInput,
    input: &mut R,
    out: &mut W,
    question: &str,
    default: &str,
) -> Result<String, CliError>
where
    R: BufRead,
    W: Write,
{
    if let Some(value) = given {
        return Ok(value.to_string());
    }
    let answer = match mode {
        SecretInput::Line => ask(input, out, question)?,
        SecretInput::Hidden => {
            write!(out, "{question}")?;
            out.flush()?;
            let answer = terminal::read_hidden_line()?;
            writeln!(out)?;
            answer.trim().to_string()
        }
    };
    Ok(if answer.is_empty() {
        default.to_string()
    } else {
        answer
    })
}
