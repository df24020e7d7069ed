//! Generic library/header module.
//!
//! Covers the common shape "require these headers and these libraries,
//! optionally from a home override, optionally only on some platforms".
//! Library names are tried in order; the first one found is linked.

use crate::core::{ConfigState, Define, Params, Platform};
use crate::probe::{probe_library_chain, Probe, ProbeResult};
use crate::resolver::ConfigError;

use super::{ConfigModule, DependencySpec, HomeSpec, Requirement};

/// Whether headers or libraries are probed first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProbeOrder {
    #[default]
    HeadersFirst,
    LibrariesFirst,
}

/// One required library: a primary name plus fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrarySpec {
    /// Candidate names, primary first
    pub names: Vec<String>,
    /// Define applied when a fallback name was selected
    pub fallback_define: Option<Define>,
}

impl LibrarySpec {
    pub fn new(name: impl Into<String>) -> Self {
        LibrarySpec {
            names: vec![name.into()],
            fallback_define: None,
        }
    }

    pub fn with_fallbacks<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_fallback_define(mut self, define: Define) -> Self {
        self.fallback_define = Some(define);
        self
    }

    pub fn primary(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }
}

/// Headers + libraries module.
#[derive(Debug, Clone)]
pub struct LibraryModule {
    name: String,
    home: Option<HomeSpec>,
    requires: Vec<DependencySpec>,
    tools: Vec<String>,
    headers: Vec<String>,
    libraries: Vec<LibrarySpec>,
    defines: Vec<Define>,
    order: ProbeOrder,
    platforms: Option<Vec<Platform>>,
}

impl LibraryModule {
    pub fn new(name: impl Into<String>) -> Self {
        LibraryModule {
            name: name.into(),
            home: None,
            requires: Vec::new(),
            tools: Vec::new(),
            headers: Vec::new(),
            libraries: Vec::new(),
            defines: Vec::new(),
            order: ProbeOrder::default(),
            platforms: None,
        }
    }

    /// Honor a home override with the given suffixes.
    pub fn home(mut self, spec: HomeSpec) -> Self {
        self.home = Some(spec);
        self
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.headers.push(header.into());
        self
    }

    pub fn library(self, name: impl Into<String>) -> Self {
        self.library_spec(LibrarySpec::new(name))
    }

    pub fn library_spec(mut self, spec: LibrarySpec) -> Self {
        self.libraries.push(spec);
        self
    }

    /// Define applied whenever the module is satisfied.
    pub fn define(mut self, define: Define) -> Self {
        self.defines.push(define);
        self
    }

    pub fn requires(mut self, dependency: DependencySpec) -> Self {
        self.requires.push(dependency);
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

    pub fn order(mut self, order: ProbeOrder) -> Self {
        self.order = order;
        self
    }

    /// Restrict the module to the listed platforms.
    pub fn only_on(mut self, platforms: &[Platform]) -> Self {
        self.platforms = Some(platforms.to_vec());
        self
    }

    fn require_headers(&self, probe: &dyn Probe) -> Result<(), ConfigError> {
        for header in &self.headers {
            if !probe.has_header(header) {
                return Err(ConfigError::MissingHeader {
                    header: header.clone(),
                    module: self.name.clone(),
                });
            }
        }
        Ok(())
    }

    fn missing_library(&self, spec: &LibrarySpec) -> ConfigError {
        ConfigError::MissingLibrary {
            module: self.name.clone(),
            tried: spec.names.clone(),
        }
    }

    fn require_libraries(
        &self,
        state: &mut ConfigState,
        probe: &dyn Probe,
    ) -> Result<(), ConfigError> {
        for spec in &self.libraries {
            let result = probe_library_chain(probe, &spec.names);
            let Some(selected) = result.selected(&spec.names) else {
                return Err(self.missing_library(spec));
            };
            if let (ProbeResult::FoundAs(_), Some(define)) = (&result, &spec.fallback_define) {
                state.add_define(define.clone());
            }
            tracing::debug!("`{}` links `{}`", self.name, selected);
            state.add_library(selected);
        }
        Ok(())
    }
}

impl ConfigModule for LibraryModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self, params: &Params) -> Vec<Requirement> {
        self.requires.iter().map(|d| d.requirement(params)).collect()
    }

    fn generate(&self) -> Vec<String> {
        self.tools.clone()
    }

    fn exists(&self, platform: Platform) -> bool {
        match self.platforms {
            Some(ref platforms) => platforms.contains(&platform),
            None => true,
        }
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
        // Re-applying after `prepare` appends nothing.
        let home = self
            .home
            .as_ref()
            .and_then(|spec| spec.apply(&self.name, state, probe));

        if home.is_some() {
            // The override is trusted: link primary names, probe nothing.
            for spec in &self.libraries {
                let Some(primary) = spec.primary() else {
                    return Err(self.missing_library(spec));
                };
                state.add_library(primary);
            }
        } else {
            match self.order {
                ProbeOrder::HeadersFirst => {
                    self.require_headers(probe)?;
                    self.require_libraries(state, probe)?;
                }
                ProbeOrder::LibrariesFirst => {
                    self.require_libraries(state, probe)?;
                    self.require_headers(probe)?;
                }
            }
        }

        for define in &self.defines {
            state.add_define(define.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{MockProbe, ProbeCall};

    fn freetype() -> LibraryModule {
        LibraryModule::new("freetype2")
            .home(HomeSpec::default())
            .header("ft2build.h")
            .library("freetype")
    }

    #[test]
    fn test_headers_and_library_found() {
        let probe = MockProbe::new()
            .with_headers(["ft2build.h"])
            .with_libraries(["freetype"]);
        let mut state = ConfigState::new();

        freetype()
            .configure(&mut state, &probe, &Params::new())
            .unwrap();

        assert_eq!(state.libraries(), ["freetype"]);
        assert!(state.include_paths().is_empty());
        assert_eq!(
            probe.artifact_calls(),
            vec![
                ProbeCall::Header("ft2build.h".into()),
                ProbeCall::Library("freetype".into()),
            ]
        );
    }

    #[test]
    fn test_missing_header() {
        let probe = MockProbe::new().with_libraries(["freetype"]);
        let mut state = ConfigState::new();

        let err = freetype()
            .configure(&mut state, &probe, &Params::new())
            .unwrap_err();

        assert_eq!(
            err,
            ConfigError::MissingHeader {
                header: "ft2build.h".into(),
                module: "freetype2".into()
            }
        );
        // Headers come first, so the library was never probed
        assert!(!probe.calls().contains(&ProbeCall::Library("freetype".into())));
    }

    #[test]
    fn test_fallback_selects_first_available_name() {
        let module = LibraryModule::new("glut").library_spec(
            LibrarySpec::new("glut")
                .with_fallbacks(["glut32", "freeglut"])
                .with_fallback_define(Define::flag("GLUT_ALTERNATE")),
        );
        let probe = MockProbe::new().with_libraries(["glut32", "freeglut"]);
        let mut state = ConfigState::new();

        module
            .configure(&mut state, &probe, &Params::new())
            .unwrap();

        assert_eq!(state.libraries(), ["glut32"]);
        assert_eq!(state.defines(), vec![Define::flag("GLUT_ALTERNATE")]);
    }

    #[test]
    fn test_primary_name_does_not_apply_fallback_define() {
        let module = LibraryModule::new("glut").library_spec(
            LibrarySpec::new("glut")
                .with_fallbacks(["glut32"])
                .with_fallback_define(Define::flag("GLUT_ALTERNATE")),
        );
        let probe = MockProbe::new().with_libraries(["glut", "glut32"]);
        let mut state = ConfigState::new();

        module
            .configure(&mut state, &probe, &Params::new())
            .unwrap();

        assert_eq!(state.libraries(), ["glut"]);
        assert!(state.defines().is_empty());
    }

    #[test]
    fn test_exhausted_fallbacks() {
        let module =
            LibraryModule::new("glut").library_spec(LibrarySpec::new("glut").with_fallbacks(["glut32"]));
        let mut state = ConfigState::new();

        let err = module
            .configure(&mut state, &MockProbe::new(), &Params::new())
            .unwrap_err();

        assert_eq!(
            err,
            ConfigError::MissingLibrary {
                module: "glut".into(),
                tried: vec!["glut".into(), "glut32".into()],
            }
        );
        assert!(state.libraries().is_empty());
    }

    #[test]
    fn test_home_override_skips_probing() {
        let module = LibraryModule::new("fah-viewer")
            .home(HomeSpec::new("/src", ""))
            .library("fah-viewer-resources")
            .library("fah-viewer")
            .header("fah/viewer/SimulationInfo.h");
        let probe = MockProbe::new().with_home("fah-viewer", "/opt/viewer");
        let mut state = ConfigState::new();

        module
            .configure(&mut state, &probe, &Params::new())
            .unwrap();

        assert_eq!(state.include_paths(), ["/opt/viewer/src"]);
        assert_eq!(state.lib_paths(), ["/opt/viewer"]);
        assert_eq!(state.libraries(), ["fah-viewer-resources", "fah-viewer"]);
        assert!(probe.artifact_calls().is_empty());
    }

    #[test]
    fn test_prepare_applies_home_once() {
        let module = LibraryModule::new("fah-viewer")
            .home(HomeSpec::new("/src", ""))
            .library("fah-viewer");
        let probe = MockProbe::new().with_home("fah-viewer", "/opt/viewer");
        let mut state = ConfigState::new();

        module.prepare(&mut state, &probe);
        state.add_include_path("/opt/cbang/src");
        module
            .configure(&mut state, &probe, &Params::new())
            .unwrap();

        assert_eq!(state.include_paths(), ["/opt/viewer/src", "/opt/cbang/src"]);
        assert_eq!(state.lib_paths(), ["/opt/viewer"]);
    }

    #[test]
    fn test_empty_library_spec_is_missing() {
        let empty = LibrarySpec {
            names: Vec::new(),
            fallback_define: None,
        };
        let expected = ConfigError::MissingLibrary {
            module: "bare".into(),
            tried: Vec::new(),
        };

        let module = LibraryModule::new("bare").library_spec(empty.clone());
        let err = module
            .configure(&mut ConfigState::new(), &MockProbe::new(), &Params::new())
            .unwrap_err();
        assert_eq!(err, expected);

        let homed = LibraryModule::new("bare")
            .home(HomeSpec::default())
            .library_spec(empty);
        let probe = MockProbe::new().with_home("bare", "/opt/bare");
        let err = homed
            .configure(&mut ConfigState::new(), &probe, &Params::new())
            .unwrap_err();
        assert_eq!(err, expected);
    }

    #[test]
    fn test_libraries_first_order() {
        let module = LibraryModule::new("cbang")
            .header("cbang/Exception.h")
            .library("cbang")
            .order(ProbeOrder::LibrariesFirst);
        let probe = MockProbe::new()
            .with_headers(["cbang/Exception.h"])
            .with_libraries(["cbang"]);

        module
            .configure(&mut ConfigState::new(), &probe, &Params::new())
            .unwrap();

        assert_eq!(
            probe.artifact_calls(),
            vec![
                ProbeCall::Library("cbang".into()),
                ProbeCall::Header("cbang/Exception.h".into()),
            ]
        );
    }

    #[test]
    fn test_platform_restriction() {
        let module = LibraryModule::new("osx-only").only_on(&[Platform::MacOs]);
        assert!(module.exists(Platform::MacOs));
        assert!(!module.exists(Platform::Other));
        assert!(freetype().exists(Platform::Windows));
    }
}
