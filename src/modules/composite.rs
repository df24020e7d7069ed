//! Composite module - a named bundle of other modules.
//!
//! Members are resolved in declaration order. Graphics-only members are
//! skipped unless the caller asks for graphics, so a headless build never
//! probes for fonts, OpenGL or a windowing toolkit.

use crate::core::{ConfigState, Params};
use crate::probe::Probe;
use crate::resolver::ConfigError;

use super::{ConfigModule, Requirement};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Member {
    name: String,
    graphics_only: bool,
}

/// Module whose only job is to pull in other modules.
#[derive(Debug, Clone)]
pub struct CompositeModule {
    name: String,
    members: Vec<Member>,
}

impl CompositeModule {
    pub fn new(name: impl Into<String>) -> Self {
        CompositeModule {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Always resolved.
    pub fn member(mut self, name: impl Into<String>) -> Self {
        self.members.push(Member {
            name: name.into(),
            graphics_only: false,
        });
        self
    }

    /// Resolved only with `with_graphics`.
    pub fn graphics_member(mut self, name: impl Into<String>) -> Self {
        self.members.push(Member {
            name: name.into(),
            graphics_only: true,
        });
        self
    }
}

impl ConfigModule for CompositeModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self, params: &Params) -> Vec<Requirement> {
        let graphics = params.with_graphics();
        self.members
            .iter()
            .filter(|m| graphics || !m.graphics_only)
            .map(|m| Requirement::new(m.name.clone()))
            .collect()
    }

    fn declared_dependencies(&self) -> Vec<String> {
        self.members.iter().map(|m| m.name.clone()).collect()
    }

    fn configure(
        &self,
        _state: &mut ConfigState,
        _probe: &dyn Probe,
        params: &Params,
    ) -> Result<(), ConfigError> {
        tracing::debug!(
            "`{}` members satisfied (graphics: {})",
            self.name,
            params.with_graphics()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deps() -> CompositeModule {
        CompositeModule::new("viewer-deps")
            .member("cbang")
            .graphics_member("freetype2")
            .graphics_member("opengl")
            .graphics_member("glut")
            .member("fah-gromacs")
    }

    fn names(reqs: Vec<Requirement>) -> Vec<String> {
        reqs.into_iter().map(|r| r.name).collect()
    }

    #[test]
    fn test_graphics_members_in_order() {
        assert_eq!(
            names(deps().dependencies(&Params::graphics(true))),
            ["cbang", "freetype2", "opengl", "glut", "fah-gromacs"]
        );
    }

    #[test]
    fn test_headless_skips_graphics_members() {
        assert_eq!(
            names(deps().dependencies(&Params::graphics(false))),
            ["cbang", "fah-gromacs"]
        );
    }

    #[test]
    fn test_declared_dependencies_cover_all_members() {
        assert_eq!(deps().declared_dependencies().len(), 5);
    }
}
