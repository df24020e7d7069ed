//! Core data structures for depconf.
//!
//! This module contains the foundational types threaded through every
//! configuration module:
//! - Configuration state (include/lib paths, libraries, defines)
//! - Target platform and compiler version
//! - Module parameters

pub mod params;
pub mod platform;
pub mod state;

pub use params::{ParamValue, Params, WITH_GRAPHICS};
pub use platform::{CompilerVersion, Platform};
pub use state::{ConfigState, Define, SettingKind};
