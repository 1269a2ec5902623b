//! Version command implementation.

use std::io::Write;

use crate::error::CliError;

/// Installed version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shown while no update source is wired in.
pub const UNKNOWN_AVAILABLE_VERSION: &str = "N/A";

/// Version command executor.
#[derive(Debug, Default)]
pub struct VersionCommand;

impl VersionCommand {
    /// Create a new version command.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Execute the version command.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn execute<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "TigerGraph CLI")?;
        writeln!(writer, "  Version Installed: {VERSION}")?;
        writeln!(writer, "  Version Available: {UNKNOWN_AVAILABLE_VERSION}")?;
        writeln!(writer, "Support:")?;
        writeln!(writer, "   TigerGraph Community: https://community.tigergraph.com")?;
        writeln!(writer, "   TigerGraph Discord: https://discord.gg/GkEmvDqB")?;
        writeln!(writer, "Copyright (c) 2014-2024 TigerGraph. All rights reserved.")?;
        Ok(())
    }
}
