//! Built-in module set for the molecular viewer and its dependencies.
//!
//! ```text
//! fah-viewer
//! └── fah-viewer-deps
//!     ├── cbang
//!     ├── freetype2   (graphics)
//!     ├── opengl      (graphics)
//!     ├── glut        (graphics)
//!     └── fah-gromacs
//! ```

use crate::core::{CompilerVersion, Define, WITH_GRAPHICS};
use crate::resolver::{ConfigError, Registry};

use super::{
    CompatLibrary, CompositeModule, DependencySpec, HomeSpec, LibraryModule, MacOsBranch,
    PlatformModule, PosixBranch, ProbeOrder, WindowsBranch,
};

/// MSVC toolset from which the stdio compatibility library is required.
pub const LEGACY_STDIO_MIN_VERSION: CompilerVersion = CompilerVersion::new(14, 0);

/// C! utility library.
pub fn cbang() -> LibraryModule {
    LibraryModule::new("cbang")
        .home(HomeSpec::new("/src", "/lib"))
        .library("cbang")
        .header("cbang/Exception.h")
        .order(ProbeOrder::LibrariesFirst)
}

/// FreeType font rendering.
pub fn freetype2() -> LibraryModule {
    LibraryModule::new("freetype2")
        .home(HomeSpec::default())
        .header("ft2build.h")
        .library("freetype")
}

/// OpenGL API binding.
pub fn opengl() -> PlatformModule {
    PlatformModule::new(
        "opengl",
        MacOsBranch::new("OpenGL", "OpenGL/gl.h"),
        WindowsBranch {
            header: "GL/gl.h".to_string(),
            libraries: vec!["opengl32".to_string()],
            defines: Vec::new(),
            compat: None,
        },
        PosixBranch {
            header: "GL/gl.h".to_string(),
            libraries: vec!["GL".to_string()],
        },
    )
    .home(HomeSpec::default())
}

/// GLUT windowing toolkit.
pub fn glut() -> PlatformModule {
    PlatformModule::new(
        "glut",
        MacOsBranch::new("GLUT", "GLUT/glut.h"),
        WindowsBranch {
            header: "GL/glut.h".to_string(),
            libraries: vec!["freeglut_static".to_string(), "glut32".to_string()],
            defines: vec![Define::flag("FREEGLUT_STATIC")],
            compat: Some(CompatLibrary {
                library: "legacy_stdio_definitions".to_string(),
                min_version: LEGACY_STDIO_MIN_VERSION,
            }),
        },
        PosixBranch {
            header: "GL/glut.h".to_string(),
            libraries: vec!["glut".to_string()],
        },
    )
    .home(HomeSpec::default())
}

/// Trajectory readers from GROMACS.
pub fn fah_gromacs() -> LibraryModule {
    LibraryModule::new("fah-gromacs")
        .home(HomeSpec::default())
        .library("fah-gromacs")
        .header("gromacs/xtcio.h")
        .order(ProbeOrder::LibrariesFirst)
}

/// Everything the viewer links against.
pub fn fah_viewer_deps() -> CompositeModule {
    CompositeModule::new("fah-viewer-deps")
        .member("cbang")
        .graphics_member("freetype2")
        .graphics_member("opengl")
        .graphics_member("glut")
        .member("fah-gromacs")
}

/// The viewer library itself.
pub fn fah_viewer() -> LibraryModule {
    LibraryModule::new("fah-viewer")
        .home(HomeSpec::new("/src", ""))
        .requires(DependencySpec::forwarding("fah-viewer-deps", &[WITH_GRAPHICS]))
        .tools(["freetype2", "opengl", "glut", "fah-gromacs"])
        .library("fah-viewer-resources")
        .library("fah-viewer")
        .header("fah/viewer/SimulationInfo.h")
        .order(ProbeOrder::LibrariesFirst)
}

/// Register every built-in module.
pub fn register_builtin(registry: &mut Registry) -> Result<(), ConfigError> {
    registry.register(Box::new(cbang()))?;
    registry.register(Box::new(freetype2()))?;
    registry.register(Box::new(opengl()))?;
    registry.register(Box::new(glut()))?;
    registry.register(Box::new(fah_gromacs()))?;
    registry.register(Box::new(fah_viewer_deps()))?;
    registry.register(Box::new(fah_viewer()))?;
    Ok(())
}

/// A registry holding exactly the built-in modules, validated.
pub fn builtin_registry() -> Result<Registry, ConfigError> {
    let mut registry = Registry::new();
    register_builtin(&mut registry)?;
    registry.validate()?;
    Ok(registry)
}
