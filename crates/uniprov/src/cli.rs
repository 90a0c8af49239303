//! Clap derive structures for the `uniprov` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// uniprov -- list and force-provision UniFi devices
#[derive(Debug, Parser)]
#[command(
    name = "uniprov",
    version,
    about = "List and force-provision devices on a UniFi network controller",
    long_about = "Talks to a UniFi OS controller (UDM, UCG, Cloud Key) through its\n\
        Network application proxy. Devices can be named by MAC, IP address,\n\
        or hostname; IPs are matched against every port the controller knows.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "UNIPROV_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller URL (overrides profile)
    #[arg(long, short = 'c', env = "UNIPROV_CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// Site name (the short id, e.g. "default")
    #[arg(long, short = 's', env = "UNIPROV_SITE", global = true)]
    pub site: Option<String>,

    /// Username for login
    #[arg(long, short = 'u', env = "UNIPROV_USERNAME", global = true)]
    pub username: Option<String>,

    /// Name of the environment variable holding the password
    #[arg(long, env = "UNIPROV_PASSWORD_ENV", global = true)]
    pub password_env: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "UNIPROV_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "UNIPROV_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds [default: 30]
    #[arg(long, env = "UNIPROV_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the sites on the controller
    Sites,

    /// List the devices of a site
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Make a device re-fetch and reapply its configuration
    #[command(alias = "fp")]
    ForceProvision(ForceProvisionArgs),

    /// Look up a host's MAC in the local neighbour table (no controller)
    LocalMac(LocalMacArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Also show every extra port (name, IP, MAC)
    #[arg(long, short = 'x')]
    pub verbose_ports: bool,
}

#[derive(Debug, Args)]
pub struct ForceProvisionArgs {
    /// Device MAC, IP address, or hostname
    pub device: String,
}

#[derive(Debug, Args)]
pub struct LocalMacArgs {
    /// Host MAC, IP address, or hostname
    pub host: String,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
