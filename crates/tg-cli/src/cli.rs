//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::client::{TGCLOUD_BASE_URL, TIGERTOOL_URL};

/// TigerGraph CLI tool for cloud and server management.
#[derive(Parser, Debug, Clone)]
#[command(name = "tg")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging.
    #[arg(short, long)]
    pub debug: bool,

    /// Configuration directory.
    #[arg(long, env = "TGCLI_CONFIG_DIR", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// tgcloud API base URL.
    #[arg(long, env = "TGCLOUD_BASE_URL", default_value = TGCLOUD_BASE_URL, hide = true)]
    pub cloud_url: String,

    /// tigertool base URL used for tgcloud login.
    #[arg(long, env = "TIGERTOOL_URL", default_value = TIGERTOOL_URL, hide = true)]
    pub tigertool_url: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show version information.
    Version,

    /// TigerGraph Cloud operations.
    Cloud {
        /// Cloud subcommand to execute.
        #[command(subcommand)]
        command: CloudCommands,
    },

    /// TigerGraph server operations.
    Server {
        /// Server subcommand to execute.
        #[command(subcommand)]
        command: ServerCommands,
    },

    /// Configuration management.
    Conf {
        /// Conf subcommand to execute.
        #[command(subcommand)]
        command: ConfCommands,
    },
}

/// `y` / `n` flag values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum YesNo {
    /// Yes.
    Y,
    /// No.
    N,
}

impl YesNo {
    /// Whether the answer is yes.
    #[must_use]
    pub const fn is_yes(self) -> bool {
        matches!(self, Self::Y)
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable output.
    #[default]
    Stdout,
    /// JSON output for scripting.
    Json,
}

/// tgcloud subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum CloudCommands {
    /// Login to tgcloud.io.
    Login {
        /// Email address for tgcloud.io.
        #[arg(short, long)]
        email: Option<String>,

        /// Password for tgcloud.io.
        #[arg(short, long)]
        password: Option<String>,

        /// Save credentials to the config.
        #[arg(short, long, value_enum, default_value_t = YesNo::N)]
        save: YesNo,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = Format::Stdout)]
        output: Format,
    },

    /// Start a tgcloud instance.
    Start(MachineIdArgs),

    /// Stop a tgcloud instance.
    Stop(MachineIdArgs),

    /// Terminate a tgcloud instance.
    Terminate(MachineIdArgs),

    /// Archive a tgcloud instance.
    Archive(MachineIdArgs),

    /// List tgcloud instances.
    List {
        /// Hide terminated instances.
        #[arg(short = 'a', long = "activeonly", value_enum, default_value_t = YesNo::Y)]
        active_only: YesNo,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = Format::Stdout)]
        output: Format,
    },

    /// Create a tgcloud instance.
    Create {
        /// Starter kit.
        #[arg(short, long)]
        id: Option<String>,
    },
}

/// Target instance of a tgcloud operation.
#[derive(Args, Debug, Clone)]
pub struct MachineIdArgs {
    /// tgcloud machine ID.
    #[arg(short, long)]
    pub id: String,
}

/// Where to reach a TigerGraph server: an alias, or explicit flags.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Server alias from the config.
    #[arg(short, long)]
    pub alias: Option<String>,

    /// TigerGraph user [default: tigergraph].
    #[arg(short, long)]
    pub user: Option<String>,

    /// TigerGraph password [default: tigergraph].
    #[arg(short, long)]
    pub password: Option<String>,

    /// TigerGraph host [default: http://127.0.0.1].
    #[arg(long)]
    pub host: Option<String>,

    /// GSQL port [default: 14240].
    #[arg(long = "gs-port", alias = "gsPort")]
    pub gs_port: Option<String>,
}

impl ConnectionArgs {
    /// Whether any connection detail was given explicitly.
    #[must_use]
    pub fn has_explicit_target(&self) -> bool {
        self.user.is_some() || self.password.is_some() || self.host.is_some() || self.gs_port.is_some()
    }
}

/// What to include in a backup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum BackupType {
    /// Schema and data.
    #[default]
    All,
    /// Schema only.
    Schema,
    /// Data only.
    Data,
}

impl BackupType {
    /// Option passed to the backup tool.
    #[must_use]
    pub const fn option(self) -> &'static str {
        match self {
            Self::All => "",
            Self::Schema => "-S",
            Self::Data => "-D",
        }
    }
}

/// Service operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ServiceOp {
    /// Start GPE, GSE and RESTPP.
    #[default]
    Start,
    /// Stop GPE, GSE and RESTPP.
    Stop,
}

impl ServiceOp {
    /// Path segment of the service endpoint.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

/// Server subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ServerCommands {
    /// Open an interactive GSQL shell.
    Gsql {
        /// Connection options.
        #[command(flatten)]
        conn: ConnectionArgs,
    },

    /// Back up a TigerGraph server.
    Backup {
        /// Connection options.
        #[command(flatten)]
        conn: ConnectionArgs,

        /// REST port [default: 9000].
        #[arg(long = "rest-port", alias = "restPort")]
        rest_port: Option<String>,

        /// Backup type.
        #[arg(short = 't', long = "type", value_enum, ignore_case = true, default_value_t = BackupType::All)]
        backup_type: BackupType,
    },

    /// Start or stop the GPE, GSE and RESTPP services.
    Services {
        /// Connection options.
        #[command(flatten)]
        conn: ConnectionArgs,

        /// Operation.
        #[arg(long, value_enum, default_value_t = ServiceOp::Start)]
        ops: ServiceOp,
    },
}

/// Configuration subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ConfCommands {
    /// Add a server alias.
    Add {
        /// Alias name.
        #[arg(short, long)]
        alias: Option<String>,

        /// TigerGraph user.
        #[arg(short, long)]
        user: Option<String>,

        /// TigerGraph password.
        #[arg(short, long)]
        password: Option<String>,

        /// TigerGraph host.
        #[arg(long)]
        host: Option<String>,

        /// GSQL port.
        #[arg(long = "gs-port", alias = "gsPort")]
        gs_port: Option<String>,

        /// REST port.
        #[arg(long = "rest-port", alias = "restPort")]
        rest_port: Option<String>,

        /// Make this the default alias.
        #[arg(short, long, value_enum)]
        default: Option<YesNo>,
    },

    /// Delete a server alias.
    Delete {
        /// Alias to delete.
        #[arg(short, long)]
        alias: Option<String>,
    },

    /// List the tgcloud account and server aliases.
    List,

    /// Verify and store tgcloud credentials.
    Tgcloud {
        /// tgcloud email.
        #[arg(short, long)]
        email: Option<String>,

        /// tgcloud password.
        #[arg(short, long)]
        password: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn parses_version() {
        let cli = Cli::parse_from(["tg", "version"]);
        assert!(matches!(cli.command, Commands::Version));
        assert!(!cli.debug);
        assert_eq!(cli.cloud_url, TGCLOUD_BASE_URL);
    }

    #[test]
    fn debug_flag_is_top_level() {
        let cli = Cli::parse_from(["tg", "-d", "conf", "add", "-a", "prod", "-d", "y"]);
        assert!(cli.debug);
        match cli.command {
            Commands::Conf {
                command: ConfCommands::Add { alias, default, .. },
            } => {
                assert_eq!(alias.as_deref(), Some("prod"));
                assert_eq!(default, Some(YesNo::Y));
            }
            other => panic!("expected conf add, got {other:?}"),
        }
    }

    #[test]
    fn cloud_list_defaults_to_active_only() {
        let cli = Cli::parse_from(["tg", "cloud", "list"]);
        match cli.command {
            Commands::Cloud {
                command: CloudCommands::List { active_only, output },
            } => {
                assert_eq!(active_only, YesNo::Y);
                assert_eq!(output, Format::Stdout);
            }
            other => panic!("expected cloud list, got {other:?}"),
        }
    }

    #[test]
    fn cloud_start_requires_id() {
        assert!(Cli::try_parse_from(["tg", "cloud", "start"]).is_err());
        let cli = Cli::parse_from(["tg", "cloud", "start", "-i", "abc"]);
        assert!(matches!(
            cli.command,
            Commands::Cloud { command: CloudCommands::Start(MachineIdArgs { id }) } if id == "abc"
        ));
    }

    #[test]
    fn gsql_accepts_legacy_port_spelling() {
        let cli = Cli::parse_from(["tg", "server", "gsql", "--host", "http://h", "--gsPort", "1"]);
        match cli.command {
            Commands::Server {
                command: ServerCommands::Gsql { conn },
            } => {
                assert_eq!(conn.gs_port.as_deref(), Some("1"));
                assert!(conn.has_explicit_target());
            }
            other => panic!("expected server gsql, got {other:?}"),
        }
    }

    #[test_case("ALL", BackupType::All, "" ; "all")]
    #[test_case("SCHEMA", BackupType::Schema, "-S" ; "schema")]
    #[test_case("DATA", BackupType::Data, "-D" ; "data")]
    fn backup_type_maps_to_option(flag: &str, expected: BackupType, option: &str) {
        let cli = Cli::parse_from(["tg", "server", "backup", "-t", flag]);
        match cli.command {
            Commands::Server {
                command: ServerCommands::Backup { backup_type, .. },
            } => {
                assert_eq!(backup_type, expected);
                assert_eq!(backup_type.option(), option);
            }
            other => panic!("expected server backup, got {other:?}"),
        }
    }

    #[test]
    fn services_ops_is_validated() {
        assert!(Cli::try_parse_from(["tg", "server", "services", "--ops", "restart"]).is_err());
        let cli = Cli::parse_from(["tg", "server", "services", "--ops", "stop"]);
        assert!(matches!(
            cli.command,
            Commands::Server { command: ServerCommands::Services { ops: ServiceOp::Stop, .. } }
        ));
    }
}
