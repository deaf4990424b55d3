//! Clap derive structures for the `airwatch` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.
//! Also compiled by build.rs for man page generation, so it depends on
//! nothing but clap and clap_complete.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// airwatch -- rule-based WiFi alert engine
#[derive(Debug, Parser)]
#[command(
    name = "airwatch",
    version,
    about = "Detect rogue access points, MAC spoofing and weak WiFi encryption",
    long_about = "Analyze snapshots of nearby wireless devices and access points.\n\n\
        Each snapshot is evaluated against the rule catalog (rogue_ap,\n\
        mac_spoofing, weak_encryption). Alerts are deduplicated by identity,\n\
        can be acknowledged, and expire after their rule's suppression window.",
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
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "AIRWATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

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
    /// Plain text, one identifier per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Alert vocabulary ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RuleArg {
    #[value(name = "rogue_ap")]
    RogueAp,
    #[value(name = "mac_spoofing")]
    MacSpoofing,
    #[value(name = "weak_encryption")]
    WeakEncryption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeverityArg {
    Low,
    Medium,
    High,
    Critical,
}

/// Which alerts `analyze` prints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ShowMode {
    /// Alerts raised by the last snapshot's cycle
    #[default]
    New,
    /// Active set after all cycles
    Active,
    /// Every alert raised during this run
    History,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one analysis cycle per snapshot file and print alerts
    #[command(alias = "a")]
    Analyze(AnalyzeArgs),

    /// Poll a snapshot file and stream newly raised alerts
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Inspect the effective rule catalog
    Rules(RulesArgs),

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Alert filters ────────────────────────────────────────────────────

/// Filters applied to alert listings.
#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    /// Only alerts with this severity
    #[arg(long)]
    pub severity: Option<SeverityArg>,

    /// Only alerts raised by this rule
    #[arg(long)]
    pub rule: Option<RuleArg>,

    /// Only acknowledged (true) or unacknowledged (false) alerts
    #[arg(long)]
    pub acknowledged: Option<bool>,

    /// Only alerts created at or after this RFC 3339 timestamp
    #[arg(long)]
    pub since: Option<String>,

    /// Only alerts created at or before this RFC 3339 timestamp
    #[arg(long)]
    pub until: Option<String>,

    /// Maximum alerts to print (default 100, capped at 1000)
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,
}

// ── Analyze ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Snapshot JSON files, analyzed in order [default: the configured source]
    #[arg(value_name = "SNAPSHOT")]
    pub snapshots: Vec<PathBuf>,

    /// Acknowledge an alert id after the cycles (repeatable)
    #[arg(long = "ack", value_name = "ID")]
    pub ack: Vec<String>,

    /// Which alerts to print
    #[arg(long, default_value = "new")]
    pub show: ShowMode,

    #[command(flatten)]
    pub filter: FilterArgs,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Snapshot JSON file [default: the configured source]
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Poll interval, e.g. 30s or 5m [default: source.poll_interval_secs]
    #[arg(long, short = 'i')]
    pub interval: Option<String>,

    /// Stop after this many cycles
    #[arg(long, short = 'n', value_parser = clap::value_parser!(u64).range(1..))]
    pub cycles: Option<u64>,
}

// ── Rules ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RulesCommand {
    /// List rules after config overrides
    #[command(alias = "ls")]
    List,

    /// Show one rule in detail
    Show {
        /// Rule id
        rule: RuleArg,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display the resolved configuration (file + environment)
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
