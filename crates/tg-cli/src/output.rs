//! Output formatting for CLI commands.
//!
//! Supports human-readable and JSON output formats.

use std::io::Write;

use serde::Serialize;
use tg_config::{ConfigStore, MachineConfig, TgCloudConfig};

use crate::cli::Format;
use crate::client::CloudMachine;
use crate::error::CliError;

/// Output formatter that handles both human-readable and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Write a value in the selected format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer(&mut *writer, value)?;
                writeln!(writer)?;
            }
            Format::Stdout => value.write_table(writer)?,
        }
        Ok(())
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Stdout)
    }
}

/// Trait for types that can be displayed for humans.
pub trait TableDisplay {
    /// Write the value as human-readable text.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Hide a password, keeping its first and last character when it is long
/// enough.
#[must_use]
pub fn mask_password(password: &str) -> String {
    let chars: Vec<char> = password.chars().collect();
    match chars.as_slice() {
        [first, middle @ .., last] if chars.len() > 3 => {
            format!("{first}{}{last}", "*".repeat(middle.len()))
        }
        short => "*".repeat(short.len()),
    }
}

/// Result of `cloud login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginReport {
    /// Whether the login failed.
    pub error: bool,
    /// Outcome message.
    pub message: String,
    /// Bearer token on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Response body of a rejected login.
    #[serde(skip)]
    pub detail: String,
}

impl LoginReport {
    /// Successful login.
    #[must_use]
    pub fn success(token: String) -> Self {
        Self {
            error: false,
            message: "Login successful".to_string(),
            token: Some(token),
            detail: String::new(),
        }
    }

    /// Rejected login with the server's response body.
    #[must_use]
    pub fn failure(detail: String) -> Self {
        Self {
            error: true,
            message: "Login failed".to_string(),
            token: None,
            detail,
        }
    }
}

impl TableDisplay for LoginReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.error {
            writeln!(writer, "Error logging in: {}", self.detail)?;
        } else {
            writeln!(writer, "Login Successful! 😊")?;
        }
        Ok(())
    }
}

/// tgcloud instances for `cloud list`.
#[derive(Debug, Clone, Serialize)]
pub struct MachineList {
    /// Always false; failures are reported as errors.
    pub error: bool,
    /// Instances.
    pub result: Vec<CloudMachine>,
}

impl MachineList {
    /// Wrap a listing, optionally dropping terminated instances.
    #[must_use]
    pub fn new(machines: Vec<CloudMachine>, active_only: bool) -> Self {
        let result = machines
            .into_iter()
            .filter(|m| !(active_only && m.is_terminated()))
            .collect();
        Self {
            error: false,
            result,
        }
    }
}

impl TableDisplay for MachineList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let title = "tgcloud solutions";
        writeln!(writer)?;
        writeln!(writer, "{title}")?;
        writeln!(writer, "{}", "=".repeat(title.len()))?;
        writeln!(
            writer,
            "{:<15} {:<20} {:<15} {:<10}",
            "ID", "Machine", "Solution", "Status"
        )?;
        writeln!(writer, "{}", "-".repeat(65))?;
        for machine in &self.result {
            writeln!(
                writer,
                "{:<15} {:<20} {:<15} {:<10}",
                machine.id, machine.name, machine.tag, machine.state
            )?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

/// Stored configuration for `conf list`, with passwords masked.
#[derive(Debug, Clone)]
pub struct ConfigListing {
    /// tgcloud account, if configured.
    pub tgcloud: Option<TgCloudConfig>,
    /// Machines sorted by alias, with a default marker.
    pub machines: Vec<(String, MachineConfig, bool)>,
}

impl ConfigListing {
    /// Snapshot the store, masking every password.
    #[must_use]
    pub fn from_store(store: &ConfigStore) -> Self {
        let account = store.tgcloud();
        let tgcloud = account.is_configured().then(|| TgCloudConfig {
            user: account.user.clone(),
            password: mask_password(&account.password),
        });
        let default = store.default_alias();
        let machines = store
            .machines()
            .iter()
            .map(|(alias, machine)| {
                let masked = MachineConfig {
                    password: mask_password(&machine.password),
                    ..machine.clone()
                };
                (alias.clone(), masked, default == Some(alias.as_str()))
            })
            .collect();
        Self { tgcloud, machines }
    }
}

impl TableDisplay for ConfigListing {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "======= TGCloud Account ======")?;
        match &self.tgcloud {
            Some(account) => {
                writeln!(writer, "tgcloud username: {}", account.user)?;
                writeln!(writer, "tgcloud password: {}", account.password)?;
            }
            None => writeln!(writer, "tgcloud user not set. Use: tg conf tgcloud")?,
        }

        writeln!(writer, "======= TigerGraph Instances ======")?;
        if self.machines.is_empty() {
            writeln!(writer, "No conf available. Use: tg conf add")?;
            return Ok(());
        }
        for (alias, machine, is_default) in &self.machines {
            let tag = if *is_default { " (default)" } else { "" };
            writeln!(writer, "Machine: alias = {alias}{tag}")?;
            writeln!(writer, "   host: {}", machine.host)?;
            writeln!(writer, "   user: {}", machine.user)?;
            writeln!(writer, "   password: {}", machine.password)?;
            writeln!(writer, "   GSQL Port: {}", machine.gs_port)?;
            writeln!(writer, "   REST Port: {}", machine.rest_port)?;
            writeln!(writer)?;
        }
        Ok(())
    }
}
