//! `depconf configure` command

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::{ConfigureArgs, OutputFormat};
use depconf::core::{ConfigState, ParamValue, Params, WITH_GRAPHICS};
use depconf::modules::builtin_registry;
use depconf::ops::{configure_module, load_project_config, plan, system_probe, ConfigureOptions};
use depconf::util::diagnostic::{emit, Diagnostic};

#[derive(Serialize)]
struct Report<'a> {
    module: &'a str,
    params: &'a Params,
    settings: &'a ConfigState,
}

pub fn execute(args: ConfigureArgs, color: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let config = load_project_config(&cwd);
    let registry = builtin_registry()?;

    let mut params = Params::new();
    for (key, value) in args.params {
        params.set(key, value);
    }
    if args.without_graphics {
        params.set(WITH_GRAPHICS, ParamValue::Bool(false));
    } else if params.get(WITH_GRAPHICS).is_none() {
        params.set(WITH_GRAPHICS, ParamValue::Bool(true));
    }

    if args.plan {
        let probe = system_probe(&config, &args.homes);
        for key in plan(&registry, &probe, &args.module, &params)? {
            println!("{}", key);
        }
        return Ok(());
    }

    let opts = ConfigureOptions {
        module: args.module,
        params,
        homes: args.homes,
    };
    let state = configure_module(&registry, &config, &opts)?;

    match args.format {
        OutputFormat::Json => {
            if args.compile || args.link {
                emit(
                    &Diagnostic::warning("--compile and --link have no effect with --format json")
                        .with_suggestion("read the `settings` object of the report instead"),
                    color,
                );
            }
            let report = Report {
                module: &opts.module,
                params: &opts.params,
                settings: &state,
            };
            let json =
                serde_json::to_string_pretty(&report).context("failed to serialize state")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            if !args.link {
                println!("# Compile flags for `{}`:", opts.module);
                for flag in state.compile_flags() {
                    println!("  {}", flag);
                }
            }

            if !args.compile && !args.link {
                println!();
            }

            if !args.compile {
                println!("# Link flags for `{}`:", opts.module);
                for flag in state.link_flags() {
                    println!("  {}", flag);
                }
            }
        }
    }

    Ok(())
}
