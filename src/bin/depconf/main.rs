//! depconf CLI - configure C/C++ dependencies for a build

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use depconf::resolver::ConfigError;
use depconf::util::diagnostic::emit;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("depconf=debug")
    } else {
        EnvFilter::new("depconf=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(color)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli, color) {
        match e.downcast_ref::<ConfigError>() {
            Some(err) => emit(&err.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, color: bool) -> Result<()> {
    match cli.command {
        Commands::Configure(args) => commands::configure::execute(args, color),
        Commands::List(args) => commands::list::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
