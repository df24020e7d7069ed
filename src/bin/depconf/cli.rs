//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use depconf::core::{ParamValue, Params};

/// depconf - resolve configuration modules into compile and link flags
#[derive(Parser)]
#[command(name = "depconf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a module and print its compile/link flags
    Configure(ConfigureArgs),

    /// List registered configuration modules
    List(ListArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct ConfigureArgs {
    /// Module to configure
    pub module: String,

    /// Skip graphics dependencies (fonts, OpenGL, GLUT)
    #[arg(long)]
    pub without_graphics: bool,

    /// Extra module parameter
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = Params::parse_pair)]
    pub params: Vec<(String, ParamValue)>,

    /// Home override for a module
    #[arg(long = "home", value_name = "MODULE=PATH", value_parser = parse_home)]
    pub homes: Vec<(String, PathBuf)>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Show compile flags only
    #[arg(long, conflicts_with = "link")]
    pub compile: bool,

    /// Show link flags only
    #[arg(long)]
    pub link: bool,

    /// Print the resolution order without probing
    #[arg(long)]
    pub plan: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Report availability for this platform instead of the configured one
    #[arg(long)]
    pub platform: Option<String>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

fn parse_home(s: &str) -> Result<(String, PathBuf), String> {
    match s.split_once('=') {
        Some((module, path)) if !module.is_empty() && !path.is_empty() => {
            Ok((module.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected MODULE=PATH, got `{}`", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_home() {
        assert_eq!(
            parse_home("fah-viewer=/opt/viewer").unwrap(),
            ("fah-viewer".to_string(), PathBuf::from("/opt/viewer"))
        );
        assert!(parse_home("fah-viewer").is_err());
        assert!(parse_home("=/opt").is_err());
    }

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
