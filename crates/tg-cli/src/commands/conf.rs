//! Configuration command implementation.

use std::io::{BufRead, Write};

use tg_config::{ConfigError, ConfigStore, MachineConfig};

use crate::cli::{ConfCommands, YesNo};
use crate::client::{CloudClient, LoginOutcome};
use crate::commands::{ask, given_or_ask, given_or_ask_secret, SecretInput};
use crate::error::CliError;
use crate::output::{ConfigListing, TableDisplay};

/// Conf command executor.
#[derive(Debug)]
pub struct ConfCommand {
    store: ConfigStore,
    cloud: CloudClient,
    secret_input: SecretInput,
}

/// Values for a new machine alias; `None` means ask.
#[derive(Debug, Clone, Default)]
struct NewMachine<'a> {
    alias: Option<&'a str>,
    user: Option<&'a str>,
    password: Option<&'a str>,
    host: Option<&'a str>,
    gs_port: Option<&'a str>,
    rest_port: Option<&'a str>,
    default: Option<YesNo>,
}

impl ConfCommand {
    /// Create a new conf command.
    #[must_use]
    pub fn new(store: ConfigStore, cloud: CloudClient) -> Self {
        Self {
            store,
            cloud,
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

    /// Execute a conf subcommand.
    ///
    /// Values missing from the command line are asked for on `input`.
    ///
    /// # Errors
    ///
    /// Returns an error on an empty, duplicate or unknown alias, or if the
    /// config cannot be written.
    pub async fn execute<R, W>(
        &mut self,
        input: &mut R,
        writer: &mut W,
        command: &ConfCommands,
    ) -> Result<(), CliError>
    where
        R: BufRead,
        W: Write,
    {
        match command {
            ConfCommands::Add {
                alias,
                user,
                password,
                host,
                gs_port,
                rest_port,
                default,
            } => {
                let values = NewMachine {
                    alias: alias.as_deref(),
                    user: user.as_deref(),
                    password: password.as_deref(),
                    host: host.as_deref(),
                    gs_port: gs_port.as_deref(),
                    rest_port: rest_port.as_deref(),
                    default: *default,
                };
                self.add(input, writer, &values)
            }
            ConfCommands::Delete { alias } => self.delete(input, writer, alias.as_deref()),
            ConfCommands::List => ConfigListing::from_store(&self.store).write_table(writer),
            ConfCommands::Tgcloud { email, password } => {
                self.tgcloud(input, writer, email.as_deref(), password.as_deref())
                    .await
            }
        }
    }

    fn add<R, W>(&mut self, input: &mut R, writer: &mut W, values: &NewMachine<'_>) -> Result<(), CliError>
    where
        R: BufRead,
        W: Write,
    {
        let alias = given_or_ask(values.alias, input, writer, "What is your machine alias? ", "")?;
        let alias = alias.trim();
        if alias.is_empty() {
            return Err(ConfigError::EmptyAlias.into());
        }
        if self.store.machine(alias).is_some() {
            return Err(ConfigError::DuplicateAlias(alias.to_string()).into());
        }

        let defaults = MachineConfig::default();
        let machine = MachineConfig {
            host: given_or_ask(
                values.host,
                input,
                writer,
                &format!("What is your machine address? ({}) ", defaults.host),
                &defaults.host,
            )?,
            user: given_or_ask(
                values.user,
                input,
                writer,
                &format!("What is your machine user? ({}) ", defaults.user),
                &defaults.user,
            )?,
            password: given_or_ask_secret(
                values.password,
                self.secret_input,
                input,
                writer,
                "What is your machine password? ",
                &defaults.password,
            )?,
            gs_port: given_or_ask(
                values.gs_port,
                input,
                writer,
                &format!("What is your machine gsPort? [{}] ", defaults.gs_port),
                &defaults.gs_port,
            )?,
            rest_port: given_or_ask(
                values.rest_port,
                input,
                writer,
                &format!("What is your machine restPort? [{}] ", defaults.rest_port),
                &defaults.rest_port,
            )?,
        };
        let make_default = match values.default {
            Some(answer) => answer.is_yes(),
            None => {
                let answer = ask(
                    input,
                    writer,
                    "Would you like to set this machine as default? (y/n) [n] ",
                )?;
                answer.eq_ignore_ascii_case("y")
            }
        };

        self.store.add_machine(alias, machine, make_default)?;
        if make_default {
            writeln!(writer, "Setting up the alias {alias} as default: success")?;
        }
        writeln!(writer, "Saving alias {alias}: success")?;
        Ok(())
    }

    fn delete<R, W>(&mut self, input: &mut R, writer: &mut W, alias: Option<&str>) -> Result<(), CliError>
    where
        R: BufRead,
        W: Write,
    {
        let alias = given_or_ask(alias, input, writer, "What is the machine alias to delete? ", "")?;
        let alias = alias.trim();
        if alias.is_empty() {
            return Err(ConfigError::EmptyAlias.into());
        }
        if self.store.machine(alias).is_none() {
            return Err(ConfigError::UnknownAlias(alias.to_string()).into());
        }

        if self.store.default_alias() == Some(alias) {
            let answer = ask(
                input,
                writer,
                "⚠️  You are about to delete the default alias, proceed? (y/n) ",
            )?
            .to_ascii_lowercase();
            if answer != "y" && answer != "yes" {
                writeln!(writer, "Aborting...")?;
                return Ok(());
            }
        }

        self.store.delete_machine(alias)?;
        writeln!(writer, "Alias deleted!")?;
        Ok(())
    }

    async fn tgcloud<R, W>(
        &mut self,
        input: &mut R,
        writer: &mut W,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<(), CliError>
    where
        R: BufRead,
        W: Write,
    {
        let email = given_or_ask(email, input, writer, "What is your tgcloud email? ", "")?;
        let password = given_or_ask_secret(
            password,
            self.secret_input,
            input,
            writer,
            "What is your tgcloud password? ",
            "",
        )?;
        if email.is_empty() || password.is_empty() {
            return Err(CliError::InvalidArgument(
                "Email and password are required".to_string(),
            ));
        }

        writeln!(writer, "Trying your credentials...")?;
        match self.cloud.login(&email, &password).await? {
            LoginOutcome::Token(token) => {
                self.store.token_file().write(&token)?;
                self.store.set_tgcloud(&email, &password)?;
                writeln!(writer, "Login Successful! 😊")?;
                writeln!(writer, "Credentials saved to configuration")?;
            }
            LoginOutcome::Rejected(body) => writeln!(writer, "Error logging in: {body}")?,
        }
        Ok(())
    }
}
