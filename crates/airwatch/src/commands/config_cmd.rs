//! Config file management. Runs before the config is loaded so that a
//! broken file can still be located and replaced.

use std::path::PathBuf;

use airwatch_config::{Config, config_path, load_config, save_config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::Context;

pub fn handle(args: ConfigArgs, global: GlobalOpts) -> Result<(), CliError> {
    let path = resolved_path(&global);

    match args.command {
        ConfigCommand::Path => {
            println!("{}", path.display());
            Ok(())
        }

        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            let written = save_config(&Config::default(), Some(path.as_path()))?;
            if !global.quiet {
                eprintln!("Wrote {}", written.display());
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let config = load_config(Some(path.as_path()))?;
            let ctx = Context::new(global, config)?;
            let out = match ctx.format {
                OutputFormat::Table | OutputFormat::Plain => {
                    toml::to_string_pretty(&ctx.config)?.trim_end().to_owned()
                }
                format => output::render_single(
                    format,
                    &ctx.config,
                    |_| String::new(),
                    |_| String::new(),
                ),
            };
            output::print_output(&out, ctx.quiet());
            Ok(())
        }
    }
}

fn resolved_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}
