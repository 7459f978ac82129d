//! Construction-time compilation of the normalize and icon fragments.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! # Architecture
//!
//! The flow for one build configuration is:
//! 1. Render `modifyVars` into an override preamble
//! 2. Normalize fragment: `[theme/variables.scss] + preamble + <library>/<normalize>`
//!    compiled with the normalize file's directory as include path
//! 3. Icon fragment: `$css-prefix + preamble + theme/icons.scss` compiled with
//!    the icon file's directory as include path
//!
//! Both fragments are compiled exactly once and then shared read-only by every
//! compilation of the build.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use next_theme_runtime::{SystemRuntime, default_runtime};
use tracing::{debug, info};

use crate::compile::{GrassCompiler, StylesheetCompiler};
use crate::config::PluginConfig;
use crate::error::ThemeError;
use crate::overrides::render_overrides;
use crate::resolve::{ModuleResolver, NodeModulesResolver, join_request, locate};

/// Class prefix assignment placed ahead of the icon sources. User overrides
/// come after it and may shadow it.
pub const CSS_PREFIX_PREAMBLE: &str = "$css-prefix: \"next-\";\n";

const VARIABLES_FILE: &str = "variables.scss";
const ICONS_FILE: &str = "icons.scss";

/// The compiled fragments of one build configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeFragments {
    /// Reset stylesheet prepended to eligible assets.
    pub normalize: Option<Arc<str>>,
    /// Icon-font stylesheet appended to eligible assets.
    pub icons: Option<Arc<str>>,
}

impl ThemeFragments {
    /// Build fragments on the local file system with grass.
    pub fn from_config(config: &PluginConfig) -> Result<Self, ThemeError> {
        let runtime = default_runtime();
        let resolver = NodeModulesResolver::new(&runtime);
        let compiler = GrassCompiler::new(&runtime);
        FragmentBuilder::new(&runtime, &resolver, &compiler).build(config)
    }

    /// True when neither fragment was requested.
    pub fn is_empty(&self) -> bool {
        self.normalize.is_none() && self.icons.is_none()
    }
}

/// Orchestrates location, override rendering and compilation.
pub struct FragmentBuilder<'a> {
    runtime: &'a dyn SystemRuntime,
    resolver: &'a dyn ModuleResolver,
    compiler: &'a dyn StylesheetCompiler,
}

impl<'a> FragmentBuilder<'a> {
    pub fn new(
        runtime: &'a dyn SystemRuntime,
        resolver: &'a dyn ModuleResolver,
        compiler: &'a dyn StylesheetCompiler,
    ) -> Self {
        Self {
            runtime,
            resolver,
            compiler,
        }
    }

    /// Compute the fragments requested by `config`.
    ///
    /// # Errors
    ///
    /// Any unresolved resource, unreadable file or compile error aborts the
    /// whole build; nothing is skipped silently.
    pub fn build(&self, config: &PluginConfig) -> Result<ThemeFragments, ThemeError> {
        let cwd = self.runtime.cwd().map_err(|e| ThemeError::Read {
            path: PathBuf::from("."),
            message: e.to_string(),
        })?;
        let base_dirs = config.resolve_dirs();
        let preamble = render_overrides(config.modify_vars.as_ref());
        let theme = config.theme_dir();

        let normalize = if config.prepend_normalize_css {
            let request = join_request(config.library(), config.normalize_path());
            let normalize_path = locate(self.resolver, &request, &base_dirs, &cwd)?;
            let normalize_scss = self.read(&normalize_path)?;

            let variables_scss = match theme {
                Some(theme) => {
                    let request = join_request(theme, VARIABLES_FILE);
                    let variables_path = locate(self.resolver, &request, &base_dirs, &cwd)?;
                    self.read(&variables_path)?
                }
                None => String::new(),
            };

            let source = format!("{}{}{}", variables_scss, preamble, normalize_scss);
            let css = self
                .compiler
                .compile(&source, &[containing_dir(&normalize_path)])?;
            info!(
                path = %normalize_path.display(),
                bytes = css.len(),
                "compiled normalize fragment"
            );
            Some(Arc::from(css))
        } else {
            debug!("normalize fragment disabled");
            None
        };

        let icons = match theme {
            Some(theme) => {
                let request = join_request(theme, ICONS_FILE);
                let icons_path = locate(self.resolver, &request, &base_dirs, &cwd)?;
                let icons_scss = self.read(&icons_path)?;

                let source = format!("{}{}{}", CSS_PREFIX_PREAMBLE, preamble, icons_scss);
                let css = self
                    .compiler
                    .compile(&source, &[containing_dir(&icons_path)])?;
                info!(path = %icons_path.display(), bytes = css.len(), "compiled icon fragment");
                Some(Arc::from(css))
            }
            None => None,
        };

        Ok(ThemeFragments { normalize, icons })
    }

    fn read(&self, path: &Path) -> Result<String, ThemeError> {
        self.runtime
            .file_read_string(path)
            .map_err(|e| ThemeError::Read {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }
}

fn containing_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}
