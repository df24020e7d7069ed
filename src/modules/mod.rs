//! Configuration modules.
//!
//! A module is a named, composable unit that probes for one dependency and
//! records what the build needs to use it. Modules never call each other
//! directly: they declare the modules they depend on, and the resolver
//! resolves those first.
//!
//! Three reusable kinds cover the built-in set:
//! - [`LibraryModule`] - headers and libraries with fallback names and an
//!   optional home override
//! - [`PlatformModule`] - one branch per target platform
//! - [`CompositeModule`] - a bundle of other modules, some graphics-only

pub mod builtin;
pub mod composite;
pub mod library;
pub mod platform;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::{ConfigState, Params, Platform};
use crate::probe::Probe;
use crate::resolver::ConfigError;

pub use builtin::{builtin_registry, register_builtin};
pub use composite::CompositeModule;
pub use library::{LibraryModule, LibrarySpec, ProbeOrder};
pub use platform::{Branch, CompatLibrary, MacOsBranch, PlatformModule, PosixBranch, WindowsBranch};

/// The interface every configuration module implements.
pub trait ConfigModule {
    /// Unique module name.
    fn name(&self) -> &str;

    /// Modules to resolve, in order, before `configure` runs with `params`.
    fn dependencies(&self, _params: &Params) -> Vec<Requirement> {
        Vec::new()
    }

    /// Every module this module may depend on, under any parameters.
    fn declared_dependencies(&self) -> Vec<String> {
        self.dependencies(&Params::new())
            .into_iter()
            .map(|r| r.name)
            .collect()
    }

    /// Companion modules that must be registered whenever this one is used.
    fn generate(&self) -> Vec<String> {
        Vec::new()
    }

    /// Whether the module is usable on `platform`.
    fn exists(&self, _platform: Platform) -> bool {
        true
    }

    /// Settings that must precede everything the dependencies append,
    /// such as a home override. Runs before any dependency is resolved.
    fn prepare(&self, _state: &mut ConfigState, _probe: &dyn Probe) {}

    /// Probe the environment and append to `state`.
    fn configure(
        &self,
        state: &mut ConfigState,
        probe: &dyn Probe,
        params: &Params,
    ) -> Result<(), ConfigError>;
}

/// A request to resolve `name` with `params`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Requirement {
    pub name: String,
    pub params: Params,
}

impl Requirement {
    pub fn new(name: impl Into<String>) -> Self {
        Requirement {
            name: name.into(),
            params: Params::new(),
        }
    }

    pub fn with_params(name: impl Into<String>, params: Params) -> Self {
        Requirement {
            name: name.into(),
            params,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.params)
    }
}

/// A dependency on another module, forwarding some of the caller's params.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    pub name: String,
    pub forward: Vec<String>,
}

impl DependencySpec {
    pub fn new(name: impl Into<String>) -> Self {
        DependencySpec {
            name: name.into(),
            forward: Vec::new(),
        }
    }

    pub fn forwarding(name: impl Into<String>, keys: &[&str]) -> Self {
        DependencySpec {
            name: name.into(),
            forward: keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn requirement(&self, params: &Params) -> Requirement {
        Requirement::with_params(self.name.clone(), params.subset(&self.forward))
    }
}

/// Where a module's artifacts live under a home override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeSpec {
    pub inc_suffix: String,
    pub lib_suffix: String,
}

impl HomeSpec {
    pub fn new(inc_suffix: impl Into<String>, lib_suffix: impl Into<String>) -> Self {
        HomeSpec {
            inc_suffix: inc_suffix.into(),
            lib_suffix: lib_suffix.into(),
        }
    }

    pub fn include_dir(&self, home: &Path) -> PathBuf {
        join_suffix(home, &self.inc_suffix)
    }

    pub fn lib_dir(&self, home: &Path) -> PathBuf {
        join_suffix(home, &self.lib_suffix)
    }

    /// Look up the override for `module` and, when present, append its
    /// include and library directories. Returns the home that was applied.
    pub fn apply(
        &self,
        module: &str,
        state: &mut ConfigState,
        probe: &dyn Probe,
    ) -> Option<PathBuf> {
        let home = probe.home_override(module)?;
        tracing::debug!("`{}` uses home override {}", module, home.display());
        state.add_include_path(self.include_dir(&home));
        state.add_lib_path(self.lib_dir(&home));
        Some(home)
    }
}

impl Default for HomeSpec {
    fn default() -> Self {
        HomeSpec::new("/include", "/lib")
    }
}

/// `home` + `"/src"` is `home/src`; an empty suffix is `home` itself.
fn join_suffix(home: &Path, suffix: &str) -> PathBuf {
    let suffix = suffix.trim_start_matches('/');
    if suffix.is_empty() {
        home.to_path_buf()
    } else {
        home.join(suffix)
    }
}

type ConfigureFn = dyn Fn(&mut ConfigState, &dyn Probe, &Params) -> Result<(), ConfigError>;
type ExistsFn = dyn Fn(Platform) -> bool;

/// A module assembled from closures.
pub struct FnModule {
    name: String,
    configure: Box<ConfigureFn>,
    exists: Box<ExistsFn>,
    tools: Vec<String>,
    requires: Vec<Requirement>,
}

impl FnModule {
    pub fn new<F>(name: impl Into<String>, configure: F) -> Self
    where
        F: Fn(&mut ConfigState, &dyn Probe, &Params) -> Result<(), ConfigError> + 'static,
    {
        FnModule {
            name: name.into(),
            configure: Box::new(configure),
            exists: Box::new(|_| true),
            tools: Vec::new(),
            requires: Vec::new(),
        }
    }

    pub fn with_exists<F>(mut self, exists: F) -> Self
    where
        F: Fn(Platform) -> bool + 'static,
    {
        self.exists = Box::new(exists);
        self
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools.extend(tools.into_iter().map(Into::into));
        self
    }

    pub fn with_dependency(mut self, requirement: Requirement) -> Self {
        self.requires.push(requirement);
        self
    }
}

impl fmt::Debug for FnModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnModule")
            .field("name", &self.name)
            .field("tools", &self.tools)
            .field("requires", &self.requires)
            .finish_non_exhaustive()
    }
}

impl ConfigModule for FnModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self, _params: &Params) -> Vec<Requirement> {
        self.requires.clone()
    }

    fn generate(&self) -> Vec<String> {
        self.tools.clone()
    }

    fn exists(&self, platform: Platform) -> bool {
        (self.exists)(platform)
    }

    fn configure(
        &self,
        state: &mut ConfigState,
        probe: &dyn Probe,
        params: &Params,
    ) -> Result<(), ConfigError> {
        (self.configure)(state, probe, params)
    }
}
