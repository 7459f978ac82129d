//! Error types for the theme plugin and its host.
//!
//! Copyright (c) 2025 Posit, PBC

use next_theme_sass::ThemeError;
use thiserror::Error;

/// Errors raised by the theme plugin itself.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Fragment construction failed; the build cannot start.
    #[error(transparent)]
    Theme(#[from] ThemeError),

    /// A chunk lists a file that is not in the compilation's asset table.
    #[error("chunk file `{0}` is missing from the compilation assets")]
    MissingAsset(String),
}

/// Errors raised while registering or running hooks on the host.
#[derive(Debug, Error)]
pub enum HostError {
    /// A legacy `plugin(event, ..)` call named an event the host does not emit.
    #[error("unknown event `{0}`")]
    UnknownEvent(String),

    /// A hook-object registration was attempted on a host without hook objects.
    #[error("{0} does not expose hook objects")]
    MissingHooks(&'static str),

    /// A tapped plugin failed.
    #[error("plugin {plugin} failed: {source}")]
    Plugin {
        plugin: String,
        #[source]
        source: PluginError,
    },
}
