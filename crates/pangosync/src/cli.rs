//! Clap derive structures for the `pangosync` CLI.
//!
//! Also compiled by `build.rs` for man page generation, so this module
//! must only depend on clap and clap_complete.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// pangosync -- keep Pangolin resources in line with Traefik and static forwards
#[derive(Debug, Parser)]
#[command(
    name = "pangosync",
    version,
    about = "Sync Traefik routers and static forwards into Pangolin resources",
    long_about = "Reconciles the forwards you want (static HTTP/TCP/UDP definitions plus\n\
        hostnames discovered from Traefik routers) against the resources a Pangolin\n\
        control plane actually holds: creates what is missing, updates drifted\n\
        targets, and optionally deletes orphans.",
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
    /// Settings file (TOML, or YAML by extension)
    #[arg(long, short = 'C', env = "PANGOSYNC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Pangolin API base URL (overrides settings)
    #[arg(long, env = "PANGOSYNC_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Pangolin organization id (overrides settings)
    #[arg(long, env = "PANGOSYNC_ORG_ID", global = true)]
    pub org: Option<String>,

    /// Pangolin API key
    #[arg(long, env = "PANGOSYNC_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PANGOSYNC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "PANGOSYNC_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides settings)
    #[arg(long, env = "PANGOSYNC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
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

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one reconciliation pass
    #[command(alias = "s")]
    Sync(SyncArgs),

    /// List control-plane resources
    #[command(alias = "res")]
    Resources,

    /// List control-plane sites
    Sites,

    /// List registered domains
    Domains,

    /// List hostnames discovered from Traefik sites
    Hosts(HostsArgs),

    /// Inspect the settings file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Delete resources that no forward accounts for
    #[arg(long, conflicts_with = "no_cleanup")]
    pub cleanup: bool,

    /// Never delete resources, whatever the settings say
    #[arg(long)]
    pub no_cleanup: bool,

    /// Update targets of existing resources that drifted
    #[arg(long, short = 'u')]
    pub update: bool,

    /// Exit with status 6 if any forward or deletion failed
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Args)]
pub struct HostsArgs {
    /// Only this Traefik site
    #[arg(long, short = 's')]
    pub site: Option<String>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the settings file path
    Path,

    /// Display the resolved settings (secrets redacted)
    Show,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
