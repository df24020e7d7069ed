//! Configuration file support for depconf.
//!
//! depconf reads two configuration file locations:
//! - Global: `~/.depconf/config.toml` - User-wide defaults
//! - Project: `.depconf/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// depconf configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Probe settings
    pub probe: ProbeConfig,

    /// Home overrides keyed by module name
    pub home: BTreeMap<String, PathBuf>,
}

/// Settings for the system probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Extra header search roots, searched before system dirs
    pub include_dirs: Vec<PathBuf>,

    /// Extra library search roots, searched before system dirs
    pub lib_dirs: Vec<PathBuf>,

    /// Extra framework roots (macOS)
    pub framework_dirs: Vec<PathBuf>,

    /// Also search the platform's default directories (default: on)
    pub system_dirs: Option<bool>,

    /// Target platform override (e.g. "linux", "darwin", "win32")
    pub platform: Option<String>,

    /// Compiler version override (e.g. "14.0")
    pub compiler_version: Option<String>,

    /// Cross-compiling for Windows with MinGW (default: off)
    pub cross_mingw: Option<bool>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            include_dirs: Vec::new(),
            lib_dirs: Vec::new(),
            framework_dirs: Vec::new(),
            system_dirs: None,
            platform: None,
            compiler_version: None,
            cross_mingw: None,
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    ///
    /// Search dirs from `other` are placed in front of the existing ones.
    pub fn merge(&mut self, other: Config) {
        let probe = other.probe;

        if !probe.include_dirs.is_empty() {
            self.probe.include_dirs = prepend(probe.include_dirs, &self.probe.include_dirs);
        }
        if !probe.lib_dirs.is_empty() {
            self.probe.lib_dirs = prepend(probe.lib_dirs, &self.probe.lib_dirs);
        }
        if !probe.framework_dirs.is_empty() {
            self.probe.framework_dirs = prepend(probe.framework_dirs, &self.probe.framework_dirs);
        }
        if probe.system_dirs.is_some() {
            self.probe.system_dirs = probe.system_dirs;
        }
        if probe.platform.is_some() {
            self.probe.platform = probe.platform;
        }
        if probe.compiler_version.is_some() {
            self.probe.compiler_version = probe.compiler_version;
        }
        if probe.cross_mingw.is_some() {
            self.probe.cross_mingw = probe.cross_mingw;
        }

        self.home.extend(other.home);
    }
}

fn prepend(mut front: Vec<PathBuf>, back: &[PathBuf]) -> Vec<PathBuf> {
    let rest: Vec<PathBuf> = back.iter().filter(|p| !front.contains(p)).cloned().collect();
    front.extend(rest);
    front
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.depconf/config.toml)
/// 2. Global config (~/.depconf/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global depconf config directory (~/.depconf).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".depconf"))
}

/// Get the global config path (~/.depconf/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.depconf/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".depconf").join("config.toml")
}
