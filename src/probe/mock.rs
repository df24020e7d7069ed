//! Scripted probe for tests.
//!
//! `MockProbe` answers from fixed sets and records every query in order, so
//! tests can assert both what a module asked and what it never asked.
//!
//! # Example
//!
//! ```
//! use depconf::core::Platform;
//! use depconf::probe::{MockProbe, Probe, ProbeCall};
//!
//! let probe = MockProbe::new()
//!     .with_platform(Platform::Windows)
//!     .with_headers(["GL/glut.h"]);
//!
//! assert!(probe.has_header("GL/glut.h"));
//! assert_eq!(probe.calls(), vec![ProbeCall::Header("GL/glut.h".into())]);
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::core::{CompilerVersion, Platform};

use super::Probe;

/// A recorded probe query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeCall {
    Header(String),
    Library(String),
    Framework(String),
    Platform,
    CompilerVersion,
    HomeOverride(String),
}

impl ProbeCall {
    /// Whether this query looked for an artifact (header, library, framework)
    /// rather than reading environment facts.
    pub fn is_artifact(&self) -> bool {
        matches!(
            self,
            ProbeCall::Header(_) | ProbeCall::Library(_) | ProbeCall::Framework(_)
        )
    }
}

/// In-memory probe with a fixed environment.
#[derive(Debug, Default)]
pub struct MockProbe {
    headers: HashSet<String>,
    libraries: HashSet<String>,
    frameworks: HashSet<String>,
    framework_root: Option<PathBuf>,
    platform: Option<Platform>,
    compiler: CompilerVersion,
    homes: HashMap<String, PathBuf>,
    cross_mingw: bool,
    calls: RefCell<Vec<ProbeCall>>,
}

impl MockProbe {
    /// An empty Linux-like environment where nothing is installed.
    pub fn new() -> Self {
        MockProbe::default()
    }

    pub fn with_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers.extend(headers.into_iter().map(Into::into));
        self
    }

    pub fn with_libraries<I, S>(mut self, libraries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.libraries.extend(libraries.into_iter().map(Into::into));
        self
    }

    pub fn with_frameworks<I, S>(mut self, frameworks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.frameworks.extend(frameworks.into_iter().map(Into::into));
        self
    }

    /// Report every installed framework as living under `root`.
    pub fn with_framework_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.framework_root = Some(root.into());
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_compiler_version(mut self, major: u32, minor: u32) -> Self {
        self.compiler = CompilerVersion::new(major, minor);
        self
    }

    pub fn with_home(mut self, module: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.homes.insert(module.into(), path.into());
        self
    }

    pub fn with_cross_mingw(mut self, cross_mingw: bool) -> Self {
        self.cross_mingw = cross_mingw;
        self
    }

    /// Every query made so far, in order.
    pub fn calls(&self) -> Vec<ProbeCall> {
        self.calls.borrow().clone()
    }

    /// Header, library and framework queries made so far, in order.
    pub fn artifact_calls(&self) -> Vec<ProbeCall> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.is_artifact())
            .cloned()
            .collect()
    }

    /// Forget recorded queries.
    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: ProbeCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Probe for MockProbe {
    fn has_header(&self, name: &str) -> bool {
        self.record(ProbeCall::Header(name.to_string()));
        self.headers.contains(name)
    }

    fn has_library(&self, name: &str) -> bool {
        self.record(ProbeCall::Library(name.to_string()));
        self.libraries.contains(name)
    }

    fn has_framework(&self, name: &str) -> bool {
        self.record(ProbeCall::Framework(name.to_string()));
        self.frameworks.contains(name)
    }

    fn framework_dir(&self, name: &str) -> Option<PathBuf> {
        self.framework_root
            .clone()
            .filter(|_| self.frameworks.contains(name))
    }

    fn platform(&self) -> Platform {
        self.record(ProbeCall::Platform);
        self.platform.unwrap_or(Platform::Other)
    }

    fn compiler_version(&self) -> CompilerVersion {
        self.record(ProbeCall::CompilerVersion);
        self.compiler
    }

    fn home_override(&self, module: &str) -> Option<PathBuf> {
        self.record(ProbeCall::HomeOverride(module.to_string()));
        self.homes.get(module).cloned()
    }

    fn is_cross_mingw(&self) -> bool {
        self.cross_mingw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_queries_in_order() {
        let probe = MockProbe::new().with_libraries(["GL"]);

        assert!(!probe.has_header("GL/gl.h"));
        assert!(probe.has_library("GL"));
        assert_eq!(probe.platform(), Platform::Other);

        assert_eq!(
            probe.calls(),
            vec![
                ProbeCall::Header("GL/gl.h".into()),
                ProbeCall::Library("GL".into()),
                ProbeCall::Platform,
            ]
        );
        assert_eq!(probe.artifact_calls().len(), 2);

        probe.clear_calls();
        assert!(probe.calls().is_empty());
    }

    #[test]
    fn test_home_override() {
        let probe = MockProbe::new().with_home("fah-viewer", "/opt/viewer");
        assert_eq!(
            probe.home_override("fah-viewer"),
            Some(PathBuf::from("/opt/viewer"))
        );
        assert_eq!(probe.home_override("glut"), None);
    }
}
