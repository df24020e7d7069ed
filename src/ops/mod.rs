//! High-level operations.
//!
//! This module contains the implementation of depconf commands.

pub mod configure;

pub use configure::{
    configure, configure_module, list_modules, load_project_config, plan, system_probe,
    ConfigureOptions,
};
