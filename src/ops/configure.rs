//! One-shot configuration of a module.
//!
//! Builds the probe from merged configuration, runs a single resolution
//! and hands back the final state for the compile and link steps.

use std::path::{Path, PathBuf};

use crate::core::{ConfigState, Params, Platform};
use crate::probe::{Probe, SystemProbe};
use crate::resolver::{ConfigError, ModuleSummary, Registry, ResolutionKey, Resolver};
use crate::util::config::{global_config_path, load_config, project_config_path, Config};

/// Options for configuring one module.
#[derive(Debug, Clone, Default)]
pub struct ConfigureOptions {
    /// Module to resolve
    pub module: String,

    /// Parameters passed to the module
    pub params: Params,

    /// Home overrides given on the command line, in order
    pub homes: Vec<(String, PathBuf)>,
}

/// Load configuration for a project rooted at `project_root`.
pub fn load_project_config(project_root: &Path) -> Config {
    let project = project_config_path(project_root);
    match global_config_path() {
        Some(global) => load_config(&global, &project),
        None => load_config(Path::new(""), &project),
    }
}

/// Build the system probe, with command-line homes taking precedence over
/// the `[home]` table and the environment.
pub fn system_probe(config: &Config, homes: &[(String, PathBuf)]) -> SystemProbe {
    homes
        .iter()
        .fold(SystemProbe::from_config(config), |probe, (module, path)| {
            probe.with_home(module.clone(), path.clone())
        })
}

/// Resolve `name` with `params` into a fresh state.
pub fn configure(
    registry: &Registry,
    probe: &dyn Probe,
    name: &str,
    params: &Params,
) -> Result<ConfigState, ConfigError> {
    let mut state = ConfigState::new();
    let mut resolver = Resolver::new(registry, probe);
    resolver.resolve(name, &mut state, params).inspect_err(|err| {
        tracing::debug!(
            "configuring `{}` failed at `{}`",
            name,
            err.module().unwrap_or(name)
        )
    })?;
    tracing::debug!("`{}` produced {} settings", name, state.len());
    Ok(state)
}

/// Resolve the module described by `opts` against the real system.
pub fn configure_module(
    registry: &Registry,
    config: &Config,
    opts: &ConfigureOptions,
) -> Result<ConfigState, ConfigError> {
    let probe = system_probe(config, &opts.homes);
    configure(registry, &probe, &opts.module, &opts.params)
}

/// The keys a resolution of `name` would visit, dependencies first.
pub fn plan(
    registry: &Registry,
    probe: &dyn Probe,
    name: &str,
    params: &Params,
) -> Result<Vec<ResolutionKey>, ConfigError> {
    Resolver::new(registry, probe).plan(name, params)
}

/// Summaries of every registered module on `platform`.
pub fn list_modules(registry: &Registry, platform: Platform) -> Vec<ModuleSummary> {
    registry.summaries(platform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::builtin_registry;
    use crate::probe::MockProbe;

    #[test]
    fn test_configure_returns_fresh_state() {
        let registry = builtin_registry().unwrap();
        let probe = MockProbe::new()
            .with_headers(["GL/glut.h"])
            .with_libraries(["glut"]);

        let state = configure(&registry, &probe, "glut", &Params::new()).unwrap();
        assert_eq!(state.link_flags(), ["-lglut"]);
    }

    #[test]
    fn test_configure_unknown_module() {
        let registry = builtin_registry().unwrap();
        let probe = MockProbe::new();

        let err = configure(&registry, &probe, "glu", &Params::new()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownModule {
                name: "glu".to_string(),
                suggestions: vec!["glut".to_string()],
            }
        );
    }

    #[test]
    fn test_command_line_home_wins() {
        let mut config = Config::default();
        config.probe.system_dirs = Some(false);
        config.home.insert("glut".into(), PathBuf::from("/from/config"));

        let probe = system_probe(&config, &[("glut".into(), PathBuf::from("/from/cli"))]);
        assert_eq!(probe.home_override("glut"), Some(PathBuf::from("/from/cli")));
    }

    #[test]
    fn test_list_marks_every_builtin_available() {
        let registry = builtin_registry().unwrap();
        let summaries = list_modules(&registry, Platform::Other);

        assert_eq!(summaries.len(), registry.len());
        assert!(summaries.iter().all(|s| s.available));
    }
}
