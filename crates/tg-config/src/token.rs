//! Bearer token file for the tgcloud API.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;

/// File name of the token inside the config directory.
pub const TOKEN_FILE: &str = "creds.bank";

/// The stored tgcloud bearer token.
///
/// Only the token itself is kept, without the `Bearer ` prefix. On unix the
/// file is readable by its owner only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    /// Token file at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the token, `None` if none has been saved yet.
    pub fn read(&self) -> Result<Option<String>, ConfigError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ConfigError::io(&self.path, e)),
        }
    }

    /// Replace the stored token.
    pub fn write(&self, token: &str) -> Result<(), ConfigError> {
        let mut file = open_private(&self.path).map_err(|e| ConfigError::io(&self.path, e))?;
        file.write_all(token.as_bytes())
            .map_err(|e| ConfigError::io(&self.path, e))?;
        debug!(path = %self.path.display(), "saved bearer token");
        Ok(())
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
