//! Platform-conditional module.
//!
//! Exactly one branch runs per configure call, selected from the target
//! platform. Branches are plain data, so what each platform requires is
//! visible in one place:
//!
//! - macOS: a framework bundle plus its header, no library entry
//! - Windows: header, library fallback chain, defines, and a compatibility
//!   library for new enough compilers
//! - everything else: header plus library

use std::path::{Path, PathBuf};

use crate::core::{CompilerVersion, ConfigState, Define, Params, Platform};
use crate::probe::{probe_library_chain, Probe};
use crate::resolver::ConfigError;

use super::{ConfigModule, HomeSpec};

/// Default root of the system framework bundles.
pub const SYSTEM_FRAMEWORKS: &str = "/System/Library/Frameworks";

/// The branch a platform module takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    MacOs,
    /// `native` is false for a MinGW cross build from another host.
    Windows { native: bool },
    Posix,
}

impl Branch {
    pub fn select(platform: Platform, cross_mingw: bool) -> Self {
        match platform {
            Platform::MacOs => Branch::MacOs,
            Platform::Windows => Branch::Windows { native: true },
            Platform::Other if cross_mingw => Branch::Windows { native: false },
            Platform::Other => Branch::Posix,
        }
    }
}

/// macOS branch: framework linkage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacOsBranch {
    pub framework: String,
    pub header: String,
    pub framework_root: PathBuf,
}

impl MacOsBranch {
    pub fn new(framework: impl Into<String>, header: impl Into<String>) -> Self {
        MacOsBranch {
            framework: framework.into(),
            header: header.into(),
            framework_root: PathBuf::from(SYSTEM_FRAMEWORKS),
        }
    }

    /// Header directory inside the bundle under the default root.
    pub fn headers_dir(&self) -> PathBuf {
        self.headers_dir_in(&self.framework_root)
    }

    /// Header directory inside the bundle under `root`.
    pub fn headers_dir_in(&self, root: &Path) -> PathBuf {
        root.join(format!("{}.framework", self.framework))
            .join("Headers")
    }
}

/// Extra library needed once the compiler reaches `min_version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatLibrary {
    pub library: String,
    pub min_version: CompilerVersion,
}

/// Windows branch: preferred static library with fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowsBranch {
    pub header: String,
    /// Library candidates, preferred first
    pub libraries: Vec<String>,
    /// Defines applied once a library was selected
    pub defines: Vec<Define>,
    pub compat: Option<CompatLibrary>,
}

/// Default branch: header plus library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosixBranch {
    pub header: String,
    pub libraries: Vec<String>,
}

/// Module with one configuration branch per platform.
#[derive(Debug, Clone)]
pub struct PlatformModule {
    name: String,
    home: Option<HomeSpec>,
    tools: Vec<String>,
    macos: MacOsBranch,
    windows: WindowsBranch,
    posix: PosixBranch,
}

impl PlatformModule {
    pub fn new(
        name: impl Into<String>,
        macos: MacOsBranch,
        windows: WindowsBranch,
        posix: PosixBranch,
    ) -> Self {
        PlatformModule {
            name: name.into(),
            home: None,
            tools: Vec::new(),
            macos,
            windows,
            posix,
        }
    }

    pub fn home(mut self, spec: HomeSpec) -> Self {
        self.home = Some(spec);
        self
    }

    pub fn tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools.extend(tools.into_iter().map(Into::into));
        self
    }

    fn missing_header(&self, header: &str) -> ConfigError {
        ConfigError::MissingHeader {
            header: header.to_string(),
            module: self.name.clone(),
        }
    }

    fn missing_library(&self, tried: &[String]) -> ConfigError {
        ConfigError::MissingLibrary {
            module: self.name.clone(),
            tried: tried.to_vec(),
        }
    }

    /// The preferred name, linked without probing under a home override.
    fn primary(&self, libraries: &[String]) -> Result<String, ConfigError> {
        libraries
            .first()
            .cloned()
            .ok_or_else(|| self.missing_library(libraries))
    }

    fn configure_macos(
        &self,
        state: &mut ConfigState,
        probe: &dyn Probe,
        trusted: bool,
    ) -> Result<(), ConfigError> {
        let branch = &self.macos;
        if !trusted {
            if !probe.has_framework(&branch.framework) {
                return Err(ConfigError::MissingFramework {
                    framework: branch.framework.clone(),
                    module: self.name.clone(),
                });
            }
            if !probe.has_header(&branch.header) {
                return Err(self.missing_header(&branch.header));
            }
        }
        let headers = match probe.framework_dir(&branch.framework) {
            Some(root) if !trusted => branch.headers_dir_in(&root),
            _ => branch.headers_dir(),
        };
        state.add_include_path(headers);
        state.add_framework(branch.framework.clone());
        Ok(())
    }

    fn configure_windows(
        &self,
        state: &mut ConfigState,
        probe: &dyn Probe,
        trusted: bool,
        native: bool,
    ) -> Result<(), ConfigError> {
        let branch = &self.windows;

        let selected = if trusted {
            self.primary(&branch.libraries)?
        } else {
            if !probe.has_header(&branch.header) {
                return Err(self.missing_header(&branch.header));
            }
            probe_library_chain(probe, &branch.libraries)
                .selected(&branch.libraries)
                .ok_or_else(|| self.missing_library(&branch.libraries))?
        };
        state.add_library(selected);

        for define in &branch.defines {
            state.add_define(define.clone());
        }

        // Only MSVC's runtime split the stdio symbols out.
        if let (true, Some(compat)) = (native, &branch.compat) {
            let version = probe.compiler_version();
            if version >= compat.min_version {
                tracing::debug!(
                    "compiler {} >= {}: `{}` needs `{}`",
                    version,
                    compat.min_version,
                    self.name,
                    compat.library
                );
                if !trusted && !probe.has_library(&compat.library) {
                    return Err(self.missing_library(std::slice::from_ref(&compat.library)));
                }
                state.add_library(compat.library.clone());
            }
        }
        Ok(())
    }

    fn configure_posix(
        &self,
        state: &mut ConfigState,
        probe: &dyn Probe,
        trusted: bool,
    ) -> Result<(), ConfigError> {
        let branch = &self.posix;
        let selected = if trusted {
            self.primary(&branch.libraries)?
        } else {
            if !probe.has_header(&branch.header) {
                return Err(self.missing_header(&branch.header));
            }
            probe_library_chain(probe, &branch.libraries)
                .selected(&branch.libraries)
                .ok_or_else(|| self.missing_library(&branch.libraries))?
        };
        state.add_library(selected);
        Ok(())
    }
}

impl ConfigModule for PlatformModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate(&self) -> Vec<String> {
        self.tools.clone()
    }

    fn prepare(&self, state: &mut ConfigState, probe: &dyn Probe) {
        if let Some(ref spec) = self.home {
            spec.apply(&self.name, state, probe);
        }
    }

    fn configure(
        &self,
        state: &mut ConfigState,
        probe: &dyn Probe,
        _params: &Params,
    ) -> Result<(), ConfigError> {
        let branch = Branch::select(probe.platform(), probe.is_cross_mingw());
        let trusted = self
            .home
            .as_ref()
            .and_then(|spec| spec.apply(&self.name, state, probe))
            .is_some();

        tracing::debug!("`{}` takes the {:?} branch", self.name, branch);

        match branch {
            Branch::MacOs => self.configure_macos(state, probe, trusted),
            Branch::Windows { native } => self.configure_windows(state, probe, trusted, native),
            Branch::Posix => self.configure_posix(state, probe, trusted),
        }
    }
}
