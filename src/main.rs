mod cli;
mod commands;
mod config;
mod data_source;
mod progress;
mod provider;
mod resource;
mod state_reader;
mod ui;
mod workspace;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    /// Declared configuration file, before `~` expansion
    pub config: String,
    /// State file, before `~` expansion
    pub state: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config: cli.config,
        state: cli.state,
    };

    match cli.command {
        Command::Validate => commands::validate::run(&ctx),
        Command::Plan(args) => commands::plan::run(&ctx, args),
        Command::Apply(args) => commands::apply::run(&ctx, args),
        Command::Destroy(args) => commands::destroy::run(&ctx, args),
        Command::Refresh => commands::refresh::run(&ctx),
        Command::Import { address, id } => commands::import::run(&ctx, &address, &id),
        Command::State(cmd) => commands::state::run(&ctx, cmd),
        Command::Regions { check } => commands::inspect::regions(check.as_deref()),
        Command::Schema { type_name } => commands::inspect::schema(type_name.as_deref()),
        Command::Completions { shell } => {
            generate(shell, &mut Cli::command(), "quismon-iac", &mut io::stdout());
            Ok(())
        }
    }
}
