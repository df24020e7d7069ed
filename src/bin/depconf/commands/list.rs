//! `depconf list` command
//!
//! Lists registered configuration modules and whether they apply here.

use anyhow::{Context, Result};

use crate::cli::ListArgs;
use depconf::core::Platform;
use depconf::modules::builtin_registry;
use depconf::ops::{list_modules, load_project_config};

pub fn execute(args: ListArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let config = load_project_config(&cwd);
    let registry = builtin_registry()?;

    let platform = args
        .platform
        .or(config.probe.platform)
        .map(|os| Platform::from_os(&os))
        .unwrap_or_else(Platform::host);

    println!("Configuration Modules ({}):", platform);
    println!();

    for summary in list_modules(&registry, platform) {
        let status = if summary.available {
            "available"
        } else {
            "unavailable"
        };

        println!("  {}", summary.name);
        println!("    Status:     {}", status);
        if !summary.dependencies.is_empty() {
            println!("    Requires:   {}", summary.dependencies.join(", "));
        }
        if !summary.tools.is_empty() {
            println!("    Loads:      {}", summary.tools.join(", "));
        }
        println!();
    }

    Ok(())
}
