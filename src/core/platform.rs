//! Target platform and compiler version.
//!
//! Modules branch on these two values only, so both are closed, structured
//! types rather than strings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Target platform, as seen by configuration modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Apple macOS (frameworks instead of plain libraries)
    MacOs,
    /// Microsoft Windows
    Windows,
    /// Linux and every other POSIX-like target
    Other,
}

impl Platform {
    /// Platform of the running host.
    pub fn host() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map an OS identifier (`std::env::consts::OS` or a build-tool name such
    /// as `darwin`/`win32`) to a platform.
    pub fn from_os(os: &str) -> Self {
        match os.to_ascii_lowercase().as_str() {
            "macos" | "darwin" | "osx" => Platform::MacOs,
            "windows" | "win32" | "win64" => Platform::Windows,
            _ => Platform::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
            Platform::Other => "other",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiler version as `(major, minor)`.
///
/// Ordering is lexicographic, so thresholds compare naturally:
/// `CompilerVersion::new(14, 0) <= version`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompilerVersion {
    pub major: u32,
    pub minor: u32,
}

impl CompilerVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        CompilerVersion { major, minor }
    }

    /// Parse `"14"`, `"14.0"` or `"14.0.24215"` (extra components ignored).
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.trim().split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = match parts.next() {
            Some(minor) => minor.parse().ok()?,
            None => 0,
        };
        Some(CompilerVersion { major, minor })
    }
}

impl fmt::Display for CompilerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
