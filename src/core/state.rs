//! Configuration state - the accumulated build settings.
//!
//! One `ConfigState` exists per build invocation. Every module appends to
//! it; nothing is ever removed. Each setting kind keeps insertion order,
//! because later search paths and libraries may depend on earlier ones.
//!
//! Appending a value that is already recorded for the same kind is a no-op,
//! which keeps repeated resolution idempotent.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Kind of accumulated setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SettingKind {
    /// Header search directory (-I)
    IncludePath,
    /// Library search directory (-L)
    LibPath,
    /// Library to link (-l)
    Library,
    /// macOS framework (-framework)
    Framework,
    /// Preprocessor define (-D)
    Define,
    /// Extra compiler flag
    CompilerFlag,
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SettingKind::IncludePath => "include-path",
            SettingKind::LibPath => "lib-path",
            SettingKind::Library => "library",
            SettingKind::Framework => "framework",
            SettingKind::Define => "define",
            SettingKind::CompilerFlag => "compiler-flag",
        };
        f.write_str(s)
    }
}

/// A preprocessor define.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Define {
    /// Simple flag: -DFOO
    Flag(String),
    /// Key-value: -DFOO=bar
    KeyValue { name: String, value: String },
}

impl Define {
    /// Create a simple flag define.
    pub fn flag(name: impl Into<String>) -> Self {
        Define::Flag(name.into())
    }

    /// Create a key-value define.
    pub fn key_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Define::KeyValue {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse `NAME` or `NAME=VALUE`.
    pub fn parse(s: &str) -> Self {
        match s.split_once('=') {
            Some((name, value)) => Define::key_value(name, value),
            None => Define::flag(s),
        }
    }

    /// Get the define name.
    pub fn name(&self) -> &str {
        match self {
            Define::Flag(n) => n,
            Define::KeyValue { name, .. } => name,
        }
    }

    /// Convert to compiler flag format.
    pub fn to_flag(&self) -> String {
        format!("-D{}", self)
    }
}

impl fmt::Display for Define {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Define::Flag(name) => f.write_str(name),
            Define::KeyValue { name, value } => write!(f, "{}={}", name, value),
        }
    }
}

/// Ordered, append-only record of build settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigState {
    settings: BTreeMap<SettingKind, Vec<String>>,
}

impl ConfigState {
    /// Create an empty state.
    pub fn new() -> Self {
        ConfigState::default()
    }

    /// Append a value for `kind`.
    ///
    /// Returns `false` (and leaves the state untouched) when the value is
    /// already recorded for that kind.
    pub fn push(&mut self, kind: SettingKind, value: impl Into<String>) -> bool {
        let value = value.into();
        let values = self.settings.entry(kind).or_default();
        if values.contains(&value) {
            tracing::trace!("skipping duplicate {} `{}`", kind, value);
            return false;
        }
        values.push(value);
        true
    }

    /// All values recorded for `kind`, in insertion order.
    pub fn get(&self, kind: SettingKind) -> &[String] {
        self.settings.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, kind: SettingKind, value: &str) -> bool {
        self.get(kind).iter().any(|v| v == value)
    }

    pub fn add_include_path(&mut self, path: impl AsRef<Path>) -> bool {
        self.push(SettingKind::IncludePath, path.as_ref().display().to_string())
    }

    pub fn add_lib_path(&mut self, path: impl AsRef<Path>) -> bool {
        self.push(SettingKind::LibPath, path.as_ref().display().to_string())
    }

    pub fn add_library(&mut self, name: impl Into<String>) -> bool {
        self.push(SettingKind::Library, name)
    }

    pub fn add_framework(&mut self, name: impl Into<String>) -> bool {
        self.push(SettingKind::Framework, name)
    }

    pub fn add_define(&mut self, define: Define) -> bool {
        self.push(SettingKind::Define, define.to_string())
    }

    pub fn add_compiler_flag(&mut self, flag: impl Into<String>) -> bool {
        self.push(SettingKind::CompilerFlag, flag)
    }

    pub fn include_paths(&self) -> &[String] {
        self.get(SettingKind::IncludePath)
    }

    pub fn lib_paths(&self) -> &[String] {
        self.get(SettingKind::LibPath)
    }

    pub fn libraries(&self) -> &[String] {
        self.get(SettingKind::Library)
    }

    pub fn frameworks(&self) -> &[String] {
        self.get(SettingKind::Framework)
    }

    /// Recorded defines, parsed back into `Define` values.
    pub fn defines(&self) -> Vec<Define> {
        self.get(SettingKind::Define)
            .iter()
            .map(|d| Define::parse(d))
            .collect()
    }

    /// Total number of recorded values across all kinds.
    pub fn len(&self) -> usize {
        self.settings.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flags for the compile step: `-I`, `-D`, then extra compiler flags.
    pub fn compile_flags(&self) -> Vec<String> {
        let mut flags: Vec<String> = self
            .include_paths()
            .iter()
            .map(|p| format!("-I{}", p))
            .collect();
        flags.extend(self.defines().iter().map(Define::to_flag));
        flags.extend(self.get(SettingKind::CompilerFlag).iter().cloned());
        flags
    }

    /// Flags for the link step: `-L`, `-l`, then `-framework`.
    pub fn link_flags(&self) -> Vec<String> {
        let mut flags: Vec<String> = self
            .lib_paths()
            .iter()
            .map(|p| format!("-L{}", p))
            .collect();
        flags.extend(self.libraries().iter().map(|l| format!("-l{}", l)));
        for framework in self.frameworks() {
            flags.push("-framework".to_string());
            flags.push(framework.clone());
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_order_and_skips_duplicates() {
        let mut state = ConfigState::new();
        assert!(state.add_library("cbang"));
        assert!(state.add_library("glut"));
        assert!(!state.add_library("cbang"));

        assert_eq!(state.libraries(), ["cbang", "glut"]);
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut state = ConfigState::new();
        state.push(SettingKind::Library, "GL");
        state.push(SettingKind::Framework, "GL");

        assert_eq!(state.libraries(), ["GL"]);
        assert_eq!(state.frameworks(), ["GL"]);
        assert!(state.get(SettingKind::CompilerFlag).is_empty());
    }

    #[test]
    fn test_define_round_trip() {
        let mut state = ConfigState::new();
        state.add_define(Define::flag("FREEGLUT_STATIC"));
        state.add_define(Define::key_value("DEBUG", "1"));

        let defines = state.defines();
        assert_eq!(defines[0], Define::flag("FREEGLUT_STATIC"));
        assert_eq!(defines[1].name(), "DEBUG");
        assert_eq!(defines[1].to_flag(), "-DDEBUG=1");
    }

    #[test]
    fn test_compile_and_link_flags() {
        let mut state = ConfigState::new();
        state.add_include_path("/opt/viewer/src");
        state.add_define(Define::flag("FREEGLUT_STATIC"));
        state.add_lib_path("/opt/viewer");
        state.add_library("glut32");
        state.add_framework("GLUT");

        assert_eq!(
            state.compile_flags(),
            vec!["-I/opt/viewer/src", "-DFREEGLUT_STATIC"]
        );
        assert_eq!(
            state.link_flags(),
            vec!["-L/opt/viewer", "-lglut32", "-framework", "GLUT"]
        );
    }

    #[test]
    fn test_serializes_with_kebab_case_kinds() {
        let mut state = ConfigState::new();
        state.add_include_path("/usr/include");

        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"include-path":["/usr/include"]}"#);
    }
}
