//! Variable-override preamble rendering.
//!
//! Copyright (c) 2025 Posit, PBC

use crate::config::ModifyVars;

/// Render `modifyVars` into SCSS placed ahead of a theme source.
///
/// Variables become one `<name>: <value>;` line each, in insertion order, so
/// that a later assignment of the same name wins once compiled. An import
/// path becomes a single `@import` directive. Nothing is validated here; bad
/// names or values surface as compile errors.
///
/// # Example
///
/// ```
/// use next_theme_sass::{ModifyVars, render_overrides};
///
/// let vars = ModifyVars::variables([("$brand", "#1a7bf6")]);
/// assert_eq!(render_overrides(Some(&vars)), "$brand: #1a7bf6;\n");
/// assert_eq!(render_overrides(None), "");
/// ```
pub fn render_overrides(modify_vars: Option<&ModifyVars>) -> String {
    match modify_vars {
        None => String::new(),
        Some(ModifyVars::Variables(vars)) => vars
            .iter()
            .map(|(name, value)| format!("{}: {};\n", name, value))
            .collect(),
        Some(ModifyVars::ImportPath(path)) if path.is_empty() => String::new(),
        Some(ModifyVars::ImportPath(path)) => format!("@import \"{}\";\n", path),
    }
}
