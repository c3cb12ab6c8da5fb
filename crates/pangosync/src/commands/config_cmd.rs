//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::settings_path(global).display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let settings = config::load(global)?.redacted();
            let toml = settings.to_toml()?;
            let out = output::render_single(
                &global.output,
                &settings,
                |_| toml.clone(),
                |_| toml.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
