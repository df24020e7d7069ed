//! depconf - dependency configuration for C/C++ builds
//!
//! This crate resolves named configuration modules (a library, a graphics
//! API, a bundle of both) against a probe of the build environment and
//! accumulates the include paths, library paths, link libraries and
//! defines the compile and link steps need.

pub mod core;
pub mod modules;
pub mod ops;
pub mod probe;
pub mod resolver;
pub mod util;

pub use core::{ConfigState, Define, Params, Platform};
pub use modules::{builtin_registry, ConfigModule};
pub use probe::{MockProbe, Probe, SystemProbe};
pub use resolver::{ConfigError, Registry, Resolver};
