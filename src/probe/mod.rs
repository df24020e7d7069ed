//! Probe capability - yes/no questions about the target environment.
//!
//! Configuration modules never touch the filesystem or the compiler
//! directly. They ask a `Probe`, which makes them testable against a
//! scripted environment (`MockProbe`) and usable against the real one
//! (`SystemProbe`).

pub mod mock;
pub mod system;

use std::path::PathBuf;

use crate::core::{CompilerVersion, Platform};

pub use mock::{MockProbe, ProbeCall};
pub use system::SystemProbe;

/// Environment queries consumed by configuration modules.
///
/// Every query is synchronous and expected to return promptly.
pub trait Probe {
    /// Does header `name` (e.g. `GL/glut.h`) exist on the include path?
    fn has_header(&self, name: &str) -> bool;

    /// Does library `name` (without `lib` prefix or extension) exist?
    fn has_library(&self, name: &str) -> bool;

    /// Does the macOS framework bundle `name` exist?
    fn has_framework(&self, name: &str) -> bool;

    /// Directory the bundle `name` was found in, when the probe knows it.
    fn framework_dir(&self, _name: &str) -> Option<PathBuf> {
        None
    }

    /// Target platform.
    fn platform(&self) -> Platform;

    /// Version of the C/C++ compiler.
    fn compiler_version(&self) -> CompilerVersion;

    /// User-supplied install root for `module`, if any.
    fn home_override(&self, module: &str) -> Option<PathBuf>;

    /// Whether a non-Windows host is cross-compiling for Windows with MinGW.
    fn is_cross_mingw(&self) -> bool {
        false
    }
}

/// Outcome of probing a library under a primary name and its fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    /// Found under the primary name.
    Found,
    /// Not found under any name.
    NotFound,
    /// Found under an alternate name.
    FoundAs(String),
}

impl ProbeResult {
    pub fn is_found(&self) -> bool {
        !matches!(self, ProbeResult::NotFound)
    }

    /// The library name to link, given the names that were probed.
    pub fn selected(&self, names: &[String]) -> Option<String> {
        match self {
            ProbeResult::Found => names.first().cloned(),
            ProbeResult::FoundAs(name) => Some(name.clone()),
            ProbeResult::NotFound => None,
        }
    }
}

/// Probe `names` in order and stop at the first library that exists.
///
/// The first entry is the primary name. A missing name is not an error
/// here; the caller decides what an exhausted list means.
pub fn probe_library_chain(probe: &dyn Probe, names: &[String]) -> ProbeResult {
    for (i, name) in names.iter().enumerate() {
        if probe.has_library(name) {
            return if i == 0 {
                ProbeResult::Found
            } else {
                ProbeResult::FoundAs(name.clone())
            };
        }
        tracing::debug!("library `{}` not found", name);
    }
    ProbeResult::NotFound
}

/// Environment variable holding the home override for `module`:
/// `fah-viewer` reads `FAH_VIEWER_HOME`.
pub fn home_env_var(module: &str) -> String {
    let mut var: String = module
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    var.push_str("_HOME");
    var
}
