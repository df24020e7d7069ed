//! Probe backed by the real filesystem and compiler.

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::core::{CompilerVersion, Platform};
use crate::util::config::Config;
use crate::util::process::{find_c_compiler, ProcessBuilder};

use super::{home_env_var, Probe};

static VERSION_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[Vv]ersion (\d+)\.(\d+)").expect("valid regex"));

static BARE_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)").expect("valid regex"));

/// Probe that searches directories on disk and asks the installed compiler.
#[derive(Debug)]
pub struct SystemProbe {
    include_dirs: Vec<PathBuf>,
    lib_dirs: Vec<PathBuf>,
    framework_dirs: Vec<PathBuf>,
    platform: Platform,
    compiler: OnceCell<CompilerVersion>,
    cross_mingw: bool,
    homes: BTreeMap<String, PathBuf>,
}

impl SystemProbe {
    /// Build a probe from merged configuration.
    ///
    /// Configured directories are searched first, followed by the
    /// environment (`CPATH`, `INCLUDE`, `LIBRARY_PATH`, `LIB`) and the
    /// platform defaults unless `probe.system_dirs` is off.
    pub fn from_config(config: &Config) -> Self {
        let probe = &config.probe;

        let platform = probe
            .platform
            .as_deref()
            .map(Platform::from_os)
            .unwrap_or_else(Platform::host);

        let compiler = OnceCell::new();
        if let Some(ref version) = probe.compiler_version {
            match CompilerVersion::parse(version) {
                Some(v) => {
                    let _ = compiler.set(v);
                }
                None => tracing::warn!(
                    "Ignoring unparsable compiler_version `{}`; detecting instead",
                    version
                ),
            }
        }

        let mut include_dirs = probe.include_dirs.clone();
        let mut lib_dirs = probe.lib_dirs.clone();
        let mut framework_dirs = probe.framework_dirs.clone();

        if probe.system_dirs.unwrap_or(true) {
            include_dirs.extend(env_dirs(&["CPATH", "C_INCLUDE_PATH", "INCLUDE"]));
            lib_dirs.extend(env_dirs(&["LIBRARY_PATH", "LIB"]));

            let (inc, lib, fw) = default_dirs(platform);
            include_dirs.extend(inc);
            lib_dirs.extend(lib);
            framework_dirs.extend(fw);
        }

        SystemProbe {
            include_dirs,
            lib_dirs,
            framework_dirs,
            platform,
            compiler,
            cross_mingw: probe.cross_mingw.unwrap_or(false),
            homes: config.home.clone(),
        }
    }

    /// Set a home override that beats config and environment.
    pub fn with_home(mut self, module: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.homes.insert(module.into(), path.into());
        self
    }

    /// On macOS `GLUT/glut.h` also resolves to `GLUT.framework/Headers/glut.h`.
    fn framework_header(&self, name: &str) -> Option<&PathBuf> {
        if self.platform != Platform::MacOs {
            return None;
        }
        let (framework, header) = name.split_once('/')?;
        let relative = PathBuf::from(format!("{}.framework", framework))
            .join("Headers")
            .join(header);
        self.framework_dirs
            .iter()
            .find(|dir| dir.join(&relative).is_file())
    }

    /// File names that satisfy a request for library `name`.
    fn library_file_names(&self, name: &str) -> Vec<String> {
        if self.platform == Platform::Windows || self.cross_mingw {
            vec![
                format!("{}.lib", name),
                format!("lib{}.a", name),
                format!("lib{}.dll.a", name),
            ]
        } else if self.platform == Platform::MacOs {
            vec![
                format!("lib{}.dylib", name),
                format!("lib{}.a", name),
                format!("lib{}.tbd", name),
            ]
        } else {
            vec![format!("lib{}.so", name), format!("lib{}.a", name)]
        }
    }
}

impl Probe for SystemProbe {
    fn has_header(&self, name: &str) -> bool {
        let found = self
            .include_dirs
            .iter()
            .find(|dir| dir.join(name).is_file())
            .or_else(|| self.framework_header(name));
        tracing::debug!("header `{}`: {}", name, describe(found));
        found.is_some()
    }

    fn has_library(&self, name: &str) -> bool {
        let candidates = self.library_file_names(name);
        let found = self
            .lib_dirs
            .iter()
            .find(|dir| candidates.iter().any(|file| dir.join(file).is_file()));
        tracing::debug!("library `{}`: {}", name, describe(found));
        found.is_some()
    }

    fn has_framework(&self, name: &str) -> bool {
        let found = self.framework_dir(name);
        tracing::debug!("framework `{}`: {}", name, describe(found.as_ref()));
        found.is_some()
    }

    fn framework_dir(&self, name: &str) -> Option<PathBuf> {
        if self.platform != Platform::MacOs {
            return None;
        }
        let bundle = format!("{}.framework", name);
        self.framework_dirs
            .iter()
            .find(|dir| dir.join(&bundle).is_dir())
            .cloned()
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    fn compiler_version(&self) -> CompilerVersion {
        *self.compiler.get_or_init(detect_compiler_version)
    }

    fn home_override(&self, module: &str) -> Option<PathBuf> {
        if let Some(home) = self.homes.get(module) {
            return Some(home.clone());
        }
        std::env::var_os(home_env_var(module))
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn is_cross_mingw(&self) -> bool {
        self.cross_mingw
    }
}

fn describe(found: Option<&PathBuf>) -> String {
    match found {
        Some(dir) => format!("found in {}", dir.display()),
        None => "not found".to_string(),
    }
}

fn env_dirs(vars: &[&str]) -> Vec<PathBuf> {
    vars.iter()
        .filter_map(|var| std::env::var_os(var))
        .flat_map(|value| std::env::split_paths(&value).collect::<Vec<_>>())
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

/// Platform default include, library and framework directories.
fn default_dirs(platform: Platform) -> (Vec<PathBuf>, Vec<PathBuf>, Vec<PathBuf>) {
    let paths = |list: &[&str]| list.iter().map(PathBuf::from).collect::<Vec<_>>();

    match platform {
        Platform::MacOs => (
            paths(&["/usr/local/include", "/opt/homebrew/include", "/usr/include"]),
            paths(&["/usr/local/lib", "/opt/homebrew/lib", "/usr/lib"]),
            paths(&["/Library/Frameworks", "/System/Library/Frameworks"]),
        ),
        // MSVC publishes its search paths through INCLUDE and LIB only.
        Platform::Windows => (Vec::new(), Vec::new(), Vec::new()),
        Platform::Other => {
            let mut lib = paths(&[
                "/usr/local/lib",
                "/usr/local/lib64",
                "/usr/lib",
                "/usr/lib64",
                "/lib",
            ]);
            lib.push(
                Path::new("/usr/lib").join(format!("{}-linux-gnu", std::env::consts::ARCH)),
            );
            (paths(&["/usr/local/include", "/usr/include"]), lib, Vec::new())
        }
    }
}

/// Ask the C compiler for its version, `0.0` when unknown.
fn detect_compiler_version() -> CompilerVersion {
    let Some(cc) = find_c_compiler() else {
        tracing::debug!("no C compiler found; assuming version 0.0");
        return CompilerVersion::default();
    };

    let is_msvc = cc
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.eq_ignore_ascii_case("cl"));

    // cl prints its banner on stderr when run without arguments
    let cmd = if is_msvc {
        ProcessBuilder::new(&cc)
    } else {
        ProcessBuilder::new(&cc).arg("--version")
    };

    let output = match cmd.exec() {
        Ok(output) => output,
        Err(e) => {
            tracing::debug!("{:#}", e);
            return CompilerVersion::default();
        }
    };

    let banner = format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    let version = parse_version_banner(&banner, is_msvc).unwrap_or_default();
    tracing::debug!("compiler `{}` version {}", cc.display(), version);
    version
}

/// Extract a version from a compiler banner.
///
/// For MSVC the `cl` version (19.x) is translated to the toolset version
/// (14.x) that library compatibility is keyed on.
pub fn parse_version_banner(banner: &str, is_msvc: bool) -> Option<CompilerVersion> {
    let caps = VERSION_WORD_RE
        .captures(banner)
        .or_else(|| BARE_VERSION_RE.captures(banner))?;
    let major: u32 = caps[1].parse().ok()?;
    let minor: u32 = caps[2].parse().ok()?;

    let version = CompilerVersion::new(major, minor);
    Some(if is_msvc { msvc_toolset(version) } else { version })
}

fn msvc_toolset(cl: CompilerVersion) -> CompilerVersion {
    if cl.major >= 19 {
        CompilerVersion::new(14, cl.minor / 10)
    } else {
        CompilerVersion::new(cl.major.saturating_sub(6), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::config::ProbeConfig;
    use tempfile::TempDir;

    fn isolated_config(root: &Path, platform: &str) -> Config {
        Config {
            probe: ProbeConfig {
                include_dirs: vec![root.join("include")],
                lib_dirs: vec![root.join("lib")],
                framework_dirs: vec![root.join("Frameworks")],
                system_dirs: Some(false),
                platform: Some(platform.to_string()),
                compiler_version: Some("12.3".to_string()),
                cross_mingw: None,
            },
            home: BTreeMap::new(),
        }
    }

    fn touch(path: PathBuf) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_header_and_library_lookup() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path().join("include/GL/glut.h"));
        touch(tmp.path().join("lib/libglut.so"));

        let probe = SystemProbe::from_config(&isolated_config(tmp.path(), "linux"));

        assert!(probe.has_header("GL/glut.h"));
        assert!(!probe.has_header("GL/gl.h"));
        assert!(probe.has_library("glut"));
        assert!(!probe.has_library("glut32"));
        assert_eq!(probe.platform(), Platform::Other);
        assert_eq!(probe.compiler_version(), CompilerVersion::new(12, 3));
    }

    #[test]
    fn test_windows_library_names() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path().join("lib/glut32.lib"));
        touch(tmp.path().join("lib/libfreeglut_static.a"));

        let probe = SystemProbe::from_config(&isolated_config(tmp.path(), "win32"));

        assert!(probe.has_library("glut32"));
        assert!(probe.has_library("freeglut_static"));
        assert!(!probe.has_library("glut"));
    }

    #[test]
    fn test_frameworks_only_on_macos() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("Frameworks/GLUT.framework")).unwrap();

        let mac = SystemProbe::from_config(&isolated_config(tmp.path(), "darwin"));
        assert!(mac.has_framework("GLUT"));
        assert!(!mac.has_framework("OpenGL"));

        let linux = SystemProbe::from_config(&isolated_config(tmp.path(), "linux"));
        assert!(!linux.has_framework("GLUT"));
        assert_eq!(linux.framework_dir("GLUT"), None);
    }

    #[test]
    fn test_framework_dir_reports_matching_root() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("Frameworks/GLUT.framework")).unwrap();

        let mac = SystemProbe::from_config(&isolated_config(tmp.path(), "darwin"));
        assert_eq!(mac.framework_dir("GLUT"), Some(tmp.path().join("Frameworks")));
        assert_eq!(mac.framework_dir("OpenGL"), None);
    }

    #[test]
    fn test_framework_headers_on_macos() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path().join("Frameworks/GLUT.framework/Headers/glut.h"));

        let mac = SystemProbe::from_config(&isolated_config(tmp.path(), "darwin"));
        assert!(mac.has_header("GLUT/glut.h"));
        assert!(!mac.has_header("GLUT/freeglut.h"));

        let linux = SystemProbe::from_config(&isolated_config(tmp.path(), "linux"));
        assert!(!linux.has_header("GLUT/glut.h"));
    }

    #[test]
    fn test_home_override_precedence() {
        let tmp = TempDir::new().unwrap();
        let mut config = isolated_config(tmp.path(), "linux");
        config
            .home
            .insert("cbang".to_string(), PathBuf::from("/from/config"));

        let probe = SystemProbe::from_config(&config).with_home("glut", "/from/cli");

        assert_eq!(probe.home_override("glut"), Some(PathBuf::from("/from/cli")));
        assert_eq!(
            probe.home_override("cbang"),
            Some(PathBuf::from("/from/config"))
        );
    }

    #[test]
    fn test_parse_version_banner() {
        assert_eq!(
            parse_version_banner("gcc (Ubuntu 11.4.0-1ubuntu1~22.04) 11.4.0", false),
            Some(CompilerVersion::new(11, 4))
        );
        assert_eq!(
            parse_version_banner("Ubuntu clang version 14.0.0-1ubuntu1.1", false),
            Some(CompilerVersion::new(14, 0))
        );
        assert_eq!(
            parse_version_banner(
                "Microsoft (R) C/C++ Optimizing Compiler Version 19.29.30133 for x64",
                true
            ),
            Some(CompilerVersion::new(14, 2))
        );
        assert_eq!(
            parse_version_banner("Microsoft (R) C/C++ Optimizing Compiler Version 18.00.40629", true),
            Some(CompilerVersion::new(12, 0))
        );
        assert_eq!(parse_version_banner("no digits here", false), None);
    }
}
