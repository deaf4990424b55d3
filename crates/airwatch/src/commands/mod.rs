//! Command dispatch: bridges CLI args -> engine operations -> output formatting.

pub mod analyze;
pub mod config_cmd;
pub mod rules;
pub mod util;
pub mod watch;

use clap::ValueEnum;

use airwatch_config::Config;

use crate::cli::{ColorMode, Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Resolved invocation settings shared by every handler.
pub struct Context {
    pub global: GlobalOpts,
    pub config: Config,
    pub format: OutputFormat,
    pub color: bool,
}

impl Context {
    /// Merge CLI flags over `[defaults]` from the config file.
    pub fn new(global: GlobalOpts, config: Config) -> Result<Self, CliError> {
        let format = match global.output {
            Some(format) => format,
            None => OutputFormat::from_str(&config.defaults.output, true).map_err(|_| {
                CliError::ConfigValidation {
                    field: "defaults.output".into(),
                    reason: format!(
                        "expected table, json, json-compact, yaml or plain, got '{}'",
                        config.defaults.output
                    ),
                }
            })?,
        };
        let color_mode = match global.color {
            Some(mode) => mode,
            None => ColorMode::from_str(&config.defaults.color, true).map_err(|_| {
                CliError::ConfigValidation {
                    field: "defaults.color".into(),
                    reason: format!(
                        "expected auto, always or never, got '{}'",
                        config.defaults.color
                    ),
                }
            })?,
        };

        Ok(Self {
            color: output::should_color(color_mode),
            format,
            global,
            config,
        })
    }

    pub fn quiet(&self) -> bool {
        self.global.quiet
    }
}

/// Dispatch a config-dependent command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        Command::Analyze(args) => analyze::handle(args, ctx).await,
        Command::Watch(args) => watch::handle(args, ctx).await,
        Command::Rules(args) => rules::handle(&args, ctx),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
