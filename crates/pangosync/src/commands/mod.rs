//! Command dispatch: bridges CLI args -> engine/API calls -> output formatting.

pub mod config_cmd;
pub mod domains;
pub mod hosts;
pub mod resources;
pub mod sites;
pub mod sync;

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;

/// Dispatch a command that needs validated settings.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    // Discovery reads Traefik only; no Pangolin URL or key required.
    if let Command::Hosts(args) = cmd {
        let settings = config::load(global)?;
        return hosts::handle(args, &settings, global).await;
    }

    let settings = config::load_validated(global)?;
    let plane = config::pangolin_client(&settings, global)?;
    match cmd {
        Command::Sync(args) => sync::handle(args, &settings, plane, global).await,
        Command::Resources => resources::handle(plane, global).await,
        Command::Sites => sites::handle(&plane, global).await,
        Command::Domains => domains::handle(&plane, global).await,
        Command::Hosts(_) | Command::Config(_) | Command::Completions(_) => {
            unreachable!("handled before dispatch")
        }
    }
}
