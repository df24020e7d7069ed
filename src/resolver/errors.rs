//! Configuration error types and diagnostics.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::Platform;
use crate::util::diagnostic::Diagnostic;

/// Error raised while registering or resolving configuration modules.
///
/// Every variant is fatal to the current build invocation. The state is not
/// rolled back, so callers must not continue with a partial configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum ConfigError {
    #[error("unknown configuration module `{name}`")]
    #[diagnostic(code(depconf::unknown_module))]
    UnknownModule {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("configuration module `{name}` is already registered")]
    #[diagnostic(code(depconf::duplicate_module))]
    DuplicateModule { name: String },

    #[error("configuration module `{name}` is not available on {platform}")]
    #[diagnostic(code(depconf::module_unavailable))]
    ModuleUnavailable { name: String, platform: Platform },

    #[error("missing header `{header}` required by `{module}`")]
    #[diagnostic(
        code(depconf::missing_header),
        help("install the development package or set a home override for the module")
    )]
    MissingHeader { header: String, module: String },

    #[error("no library found for `{module}` (tried: {})", .tried.join(", "))]
    #[diagnostic(
        code(depconf::missing_library),
        help("install the library or set a home override for the module")
    )]
    MissingLibrary { module: String, tried: Vec<String> },

    #[error("missing framework `{framework}` required by `{module}`")]
    #[diagnostic(code(depconf::missing_framework))]
    MissingFramework { framework: String, module: String },

    #[error("cyclic module dependency: {}", .cycle.join(" -> "))]
    #[diagnostic(code(depconf::cyclic_dependency))]
    CyclicDependency { cycle: Vec<String> },
}

impl ConfigError {
    /// Name of the module the error is about, when there is exactly one.
    pub fn module(&self) -> Option<&str> {
        match self {
            ConfigError::UnknownModule { name, .. }
            | ConfigError::DuplicateModule { name }
            | ConfigError::ModuleUnavailable { name, .. } => Some(name),
            ConfigError::MissingHeader { module, .. }
            | ConfigError::MissingLibrary { module, .. }
            | ConfigError::MissingFramework { module, .. } => Some(module),
            ConfigError::CyclicDependency { .. } => None,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.to_string());
        if let Some(code) = MietteDiagnostic::code(self) {
            diag = diag.with_code(code.to_string());
        }

        match self {
            ConfigError::UnknownModule { suggestions, .. } => {
                if !suggestions.is_empty() {
                    diag = diag.with_context(format!(
                        "did you mean: {}?",
                        suggestions.join(", ")
                    ));
                }
                diag.with_suggestion(hints::LIST_MODULES)
            }

            ConfigError::DuplicateModule { name } => diag.with_suggestion(format!(
                "Give one of the `{}` modules a different name",
                name
            )),

            ConfigError::ModuleUnavailable { name, .. } => diag
                .with_suggestion(format!("Drop `{}` from the configuration on this platform", name))
                .with_suggestion(hints::PLATFORM_OVERRIDE),

            ConfigError::MissingHeader { module, .. } => diag
                .with_suggestion(format!(
                    "Install the development headers for `{}`",
                    module
                ))
                .with_suggestion(home_suggestion(module)),

            ConfigError::MissingLibrary { module, tried } => {
                for name in tried {
                    diag = diag.with_context(format!("tried library `{}`", name));
                }
                diag.with_suggestion(format!("Install the `{}` library", module))
                    .with_suggestion(home_suggestion(module))
            }

            ConfigError::MissingFramework { framework, .. } => diag
                .with_context(format!("looked for `{}.framework`", framework))
                .with_suggestion(hints::FRAMEWORK_DIRS),

            ConfigError::CyclicDependency { .. } => diag.with_suggestion(
                "Break the cycle by removing one of the module dependencies".to_string(),
            ),
        }
    }
}

/// Suggestion text shared by several diagnostics.
pub mod hints {
    pub const LIST_MODULES: &str = "Run `depconf list` to see registered modules";

    pub const PLATFORM_OVERRIDE: &str =
        "Set `probe.platform` in .depconf/config.toml if the target platform was misdetected";

    pub const FRAMEWORK_DIRS: &str =
        "Add the framework's parent directory to `probe.framework_dirs`";
}

fn home_suggestion(module: &str) -> String {
    format!(
        "Point depconf at a local install: `--home {}=PATH` or `{}`",
        module,
        crate::probe::home_env_var(module)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library_diagnostic() {
        let err = ConfigError::MissingLibrary {
            module: "glut".to_string(),
            tried: vec!["freeglut_static".to_string(), "glut32".to_string()],
        };

        let output = err.to_diagnostic().format(false);

        assert!(output.contains("no library found for `glut`"));
        assert!(output.contains("tried library `freeglut_static`"));
        assert!(output.contains("tried library `glut32`"));
        assert!(output.contains("GLUT_HOME"));
        assert!(output.contains("depconf::missing_library"));
    }

    #[test]
    fn test_unknown_module_diagnostic() {
        let err = ConfigError::UnknownModule {
            name: "glu".to_string(),
            suggestions: vec!["glut".to_string()],
        };

        let output = err.to_diagnostic().format(false);

        assert!(output.contains("unknown configuration module `glu`"));
        assert!(output.contains("did you mean: glut?"));
        assert!(output.contains("depconf list"));
    }

    #[test]
    fn test_cycle_display() {
        let err = ConfigError::CyclicDependency {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "cyclic module dependency: a -> b -> a");
        assert_eq!(err.module(), None);
    }
}
