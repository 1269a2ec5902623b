//! Server command implementation: GSQL shell, backup, services.

use std::io::{BufRead, Write};

use tg_config::{ConfigStore, MachineConfig};
use tg_gsql::{HttpTransport, ServerTarget, Session, repl};
use tracing::debug;

use crate::cli::{BackupType, ConnectionArgs, ServerCommands, ServiceOp};
use crate::client::AdminClient;
use crate::error::CliError;

/// Machine to connect to.
///
/// An alias selects a stored machine; without one, the default alias is
/// used unless connection flags were given. Explicit flags always win over
/// stored values.
///
/// # Errors
///
/// Returns [`CliError::UnknownAlias`] if the alias is not configured.
pub fn resolve_machine(store: &ConfigStore, conn: &ConnectionArgs) -> Result<MachineConfig, CliError> {
    let stored = match conn.alias.as_deref() {
        Some(alias) => Some(
            store
                .machine(alias)
                .ok_or_else(|| CliError::UnknownAlias(alias.to_string()))?,
        ),
        None if conn.has_explicit_target() => None,
        None => store.default_alias().and_then(|alias| store.machine(alias)),
    };

    let base = stored.cloned().unwrap_or_default();
    Ok(MachineConfig {
        host: conn.host.clone().unwrap_or(base.host),
        user: conn.user.clone().unwrap_or(base.user),
        password: conn.password.clone().unwrap_or(base.password),
        gs_port: conn.gs_port.clone().unwrap_or(base.gs_port),
        rest_port: base.rest_port,
    })
}

fn target_of(machine: &MachineConfig) -> ServerTarget {
    ServerTarget::new(
        machine.host.as_str(),
        machine.gs_port.as_str(),
        machine.user.as_str(),
        machine.password.as_str(),
    )
}

/// Server command executor.
#[derive(Debug)]
pub struct ServerCommand {
    store: ConfigStore,
}

impl ServerCommand {
    /// Create a new server command.
    #[must_use]
    pub fn new(store: ConfigStore) -> Self {
        Self { store }
    }

    /// Execute a server subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be resolved, the server cannot
    /// be reached, or it refuses the session.
    pub async fn execute<R, W>(
        &self,
        input: &mut R,
        writer: &mut W,
        command: &ServerCommands,
    ) -> Result<(), CliError>
    where
        R: BufRead,
        W: Write,
    {
        match command {
            ServerCommands::Gsql { conn } => {
                let machine = resolve_machine(&self.store, conn)?;
                self.gsql(input, writer, &machine).await
            }
            ServerCommands::Backup {
                conn,
                rest_port,
                backup_type,
            } => {
                let mut machine = resolve_machine(&self.store, conn)?;
                if let Some(port) = rest_port {
                    machine.rest_port.clone_from(port);
                }
                self.backup(writer, &machine, *backup_type).await
            }
            ServerCommands::Services { conn, ops } => {
                let machine = resolve_machine(&self.store, conn)?;
                self.services(writer, &machine, *ops).await
            }
        }
    }

    async fn gsql<R, W>(&self, input: &mut R, writer: &mut W, machine: &MachineConfig) -> Result<(), CliError>
    where
        R: BufRead,
        W: Write,
    {
        let mut session = Session::new(target_of(machine), HttpTransport::new()?);
        session.login(writer).await?;
        writeln!(writer, "Connected to TigerGraph at {}", session.endpoint())?;
        repl::run(&mut session, input, writer).await?;
        Ok(())
    }

    async fn backup<W: Write>(
        &self,
        writer: &mut W,
        machine: &MachineConfig,
        backup_type: BackupType,
    ) -> Result<(), CliError> {
        writeln!(writer, "Starting backup with type: {}", backup_type.option())?;
        debug!(rest_port = %machine.rest_port, "backup target");

        let mut admin = AdminClient::new(target_of(machine).endpoint())?;
        admin.login(&machine.user, &machine.password).await?;
        let root = admin.install_root().await?;
        writeln!(writer, "Using TigerGraph path: {root}")?;
        Ok(())
    }

    async fn services<W: Write>(
        &self,
        writer: &mut W,
        machine: &MachineConfig,
        ops: ServiceOp,
    ) -> Result<(), CliError> {
        let mut admin = AdminClient::new(target_of(machine).endpoint())?;
        admin.login(&machine.user, &machine.password).await?;
        let message = admin.services(ops.as_str()).await?;
        writeln!(writer, "{message}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(dir: &std::path::Path, default: bool) -> ConfigStore {
        let mut store = ConfigStore::open(dir).expect("store");
        store
            .add_machine(
                "prod",
                MachineConfig {
                    host: "https://prod.example.com".into(),
                    user: "admin".into(),
                    password: "s3cret".into(),
                    gs_port: "443".into(),
                    rest_port: "9443".into(),
                },
                default,
            )
            .expect("add");
        store
    }

    #[test]
    fn no_alias_and_no_default_uses_builtin_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_with(dir.path(), false);
        let machine = resolve_machine(&store, &ConnectionArgs::default()).expect("resolve");
        assert_eq!(machine, MachineConfig::default());
    }

    #[test]
    fn default_alias_is_used_when_nothing_is_given() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_with(dir.path(), true);
        let machine = resolve_machine(&store, &ConnectionArgs::default()).expect("resolve");
        assert_eq!(machine.host, "https://prod.example.com");
        assert_eq!(machine.rest_port, "9443");
    }

    #[test]
    fn explicit_flags_bypass_the_default_alias() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_with(dir.path(), true);
        let conn = ConnectionArgs {
            host: Some("http://10.0.0.9".into()),
            ..ConnectionArgs::default()
        };
        let machine = resolve_machine(&store, &conn).expect("resolve");
        assert_eq!(machine.host, "http://10.0.0.9");
        assert_eq!(machine.user, "tigergraph");
    }

    #[test]
    fn flags_override_alias_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_with(dir.path(), false);
        let conn = ConnectionArgs {
            alias: Some("prod".into()),
            user: Some("reader".into()),
            ..ConnectionArgs::default()
        };
        let machine = resolve_machine(&store, &conn).expect("resolve");
        assert_eq!(machine.user, "reader");
        assert_eq!(machine.password, "s3cret");
        assert_eq!(machine.gs_port, "443");
    }

    #[test]
    fn unknown_alias_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_with(dir.path(), false);
        let conn = ConnectionArgs {
            alias: Some("staging".into()),
            ..ConnectionArgs::default()
        };
        let err = resolve_machine(&store, &conn).expect_err("must fail");
        assert!(matches!(err, CliError::UnknownAlias(a) if a == "staging"));
    }
}
