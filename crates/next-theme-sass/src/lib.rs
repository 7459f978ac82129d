//! Theme fragment compilation for the next theme plugin.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! This crate provides:
//! - Plugin configuration (`PluginConfig`, `ModifyVars`, `ResolveDirs`)
//! - Resource location through Node-style `node_modules` lookup
//! - Variable-override rendering into an SCSS preamble
//! - SCSS compilation with charset stripping and non-ASCII escaping
//! - The construction-time builder producing the normalize and icon fragments

mod compile;
mod config;
mod error;
mod fragments;
mod overrides;
mod resolve;

pub use compile::{GrassCompiler, StylesheetCompiler, escape_css_char, postprocess_css};
pub use config::{
    DEFAULT_LIBRARY_NAME, DEFAULT_NORMALIZE_RELATIVE_PATH, ModifyVars, PluginConfig, ResolveDirs,
};
pub use error::ThemeError;
pub use fragments::{CSS_PREFIX_PREAMBLE, FragmentBuilder, ThemeFragments};
pub use overrides::render_overrides;
pub use resolve::{ModuleResolver, NodeModulesResolver, locate};
