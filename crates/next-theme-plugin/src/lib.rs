//! Bundler plugin injecting theme stylesheets into entry CSS assets.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! At construction the plugin compiles up to two fragments from the theme
//! (see `next_theme_sass`). For every compilation it then rewrites each CSS
//! asset that belongs to an entry point (or a prepared, dynamically named
//! chunk) as `normalize + original + icons`, keeping the three parts apart in
//! a [`ConcatSource`].
//!
//! The host side is modelled by [`Compiler`] and [`Compilation`], which
//! expose either hook objects or legacy named events. The plugin picks the
//! right registration style itself.
//!
//! # Example
//!
//! ```rust,ignore
//! use next_theme_plugin::{Compiler, CompilerOptions, ThemePlugin};
//! use next_theme_sass::PluginConfig;
//!
//! let config = PluginConfig::from_json_str(r#"{"theme": "@alifd/theme-1"}"#)?;
//! let plugin = ThemePlugin::new(&config)?;
//!
//! let mut compiler = Compiler::new(CompilerOptions::with_entries(["app"]));
//! plugin.apply(&mut compiler)?;
//! ```

mod error;
mod host;
mod matcher;
mod plugin;
mod registrar;
mod source;

pub use error::{HostError, PluginError};
pub use host::{
    AsyncSeriesHook, COMPILATION_EVENT, Chunk, ChunkAssetsTap, Compilation, CompilationHooks,
    CompilationTap, Compiler, CompilerHooks, CompilerOptions, EntryDescription, EntryMap,
    OPTIMIZE_CHUNK_ASSETS_EVENT, PreparedChunk, SyncHook,
};
pub use matcher::{eligible_names, is_eligible};
pub use plugin::{PLUGIN_NAME, ThemePlugin, concat_assets};
pub use registrar::{HookRegistrar, LegacyRegistrar, TapRegistrar, registrar_for};
pub use source::{ConcatSource, Source, SourcePiece};
