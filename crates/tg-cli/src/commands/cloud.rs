//! tgcloud command implementation.
//!
//! Login stores the bearer token in the config directory; every other
//! operation reads it back and reports a re-login hint when tgcloud
//! rejects it.

use std::io::{BufRead, Write};

use serde_json::json;
use tg_config::ConfigStore;
use tracing::info;

use crate::cli::{CloudCommands, Format};
use crate::client::{CloudClient, CloudReply, LoginOutcome, MachineOp};
use crate::commands::{ask, given_or_ask_secret, SecretInput};
use crate::error::CliError;
use crate::output::{LoginReport, MachineList, OutputFormat};

/// Printed by `cloud create`.
pub const CREATE_NOT_AVAILABLE: &str =
    "tgcli Create Machine: 🚧 Work in progress 🚧 will be in next release 🙏 🚀 !";

/// tgcloud command executor.
#[derive(Debug)]
pub struct CloudCommand {
    client: CloudClient,
    store: ConfigStore,
    secret_input: SecretInput,
}

impl CloudCommand {
    /// Create a new cloud command.
    #[must_use]
    pub fn new(client: CloudClient, store: ConfigStore) -> Self {
        Self {
            client,
            store,
            secret_input: SecretInput::default(),
        }
    }

    /// Read passwords as `mode` says.
    #[must_use]
    pub fn with_secret_input(mut self, mode: SecretInput) -> Self {
        self.secret_input = mode;
        self
    }

    /// The config store, as left by the last command.
    #[must_use]
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Execute a cloud subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if a request fails, no token is stored, or the
    /// token or config cannot be written.
    pub async fn execute<R, W>(
        &mut self,
        input: &mut R,
        writer: &mut W,
        command: &CloudCommands,
    ) -> Result<(), CliError>
    where
        R: BufRead,
        W: Write,
    {
        match command {
            CloudCommands::Login {
                email,
                password,
                save,
                output,
            } => {
                let email = match email {
                    Some(email) => email.clone(),
                    None => ask(input, writer, "What is your tgcloud email? ")?,
                };
                let password = given_or_ask_secret(
                    password.as_deref(),
                    self.secret_input,
                    input,
                    writer,
                    "What is your tgcloud password? ",
                    "",
                )?;
                self.login(writer, &email, &password, save.is_yes(), *output)
                    .await
            }
            CloudCommands::Start(args) => self.machine_op(writer, MachineOp::Start, &args.id).await,
            CloudCommands::Stop(args) => self.machine_op(writer, MachineOp::Stop, &args.id).await,
            CloudCommands::Archive(args) => {
                self.machine_op(writer, MachineOp::Archive, &args.id).await
            }
            CloudCommands::Terminate(args) => {
                self.machine_op(writer, MachineOp::Terminate, &args.id).await
            }
            CloudCommands::List {
                active_only,
                output,
            } => self.list(writer, active_only.is_yes(), *output).await,
            CloudCommands::Create { .. } => {
                writeln!(writer, "{CREATE_NOT_AVAILABLE}")?;
                Ok(())
            }
        }
    }

    async fn login<W: Write>(
        &mut self,
        writer: &mut W,
        email: &str,
        password: &str,
        save: bool,
        output: Format,
    ) -> Result<(), CliError> {
        let format = OutputFormat::new(output);
        if !format.is_json() {
            writeln!(writer, "Logging into your account...")?;
        }

        let report = match self.client.login(email, password).await? {
            LoginOutcome::Token(token) => {
                self.store.token_file().write(&token)?;
                if save {
                    self.store.set_tgcloud(email, password)?;
                }
                info!(email, saved = save, "tgcloud login succeeded");
                LoginReport::success(token)
            }
            LoginOutcome::Rejected(body) => LoginReport::failure(body),
        };
        format.write(writer, &report)
    }

    fn token(&self) -> Result<String, CliError> {
        self.store.token_file().read()?.ok_or(CliError::NotLoggedIn)
    }

    async fn machine_op<W: Write>(
        &self,
        writer: &mut W,
        op: MachineOp,
        id: &str,
    ) -> Result<(), CliError> {
        let token = self.token()?;
        match self.client.machine_op(&token, op, id).await? {
            CloudReply::Ok(message) => writeln!(writer, "tgcloud response: {message}")?,
            CloudReply::Unauthorized => writeln!(writer, "tgcloud response: Please re-login")?,
        }
        Ok(())
    }

    async fn list<W: Write>(
        &self,
        writer: &mut W,
        active_only: bool,
        output: Format,
    ) -> Result<(), CliError> {
        let format = OutputFormat::new(output);
        let token = self.token()?;
        match self.client.list(&token).await? {
            CloudReply::Ok(machines) => format.write(writer, &MachineList::new(machines, active_only)),
            CloudReply::Unauthorized if format.is_json() => {
                serde_json::to_writer(
                    &mut *writer,
                    &json!({"error": true, "message": "Re-Login to tgcloud"}),
                )?;
                writeln!(writer)?;
                Ok(())
            }
            CloudReply::Unauthorized => {
                writeln!(writer, "You should re-login using 'tg cloud login'")?;
                Ok(())
            }
        }
    }
}
