//! Module resolution.
//!
//! A [`Registry`] holds every known configuration module. A [`Resolver`]
//! walks a module's dependencies against one probe, memoizing each
//! `(name, params)` pair so that no module is configured twice per build.

pub mod errors;
pub mod registry;
pub mod resolve;

pub use errors::ConfigError;
pub use registry::{ModuleSummary, Registry};
pub use resolve::{ResolutionKey, ResolutionState, Resolver};
