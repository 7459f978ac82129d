//! Plugin options.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Options are usually handed over by the host build tool as a JSON object:
//!
//! ```json
//! {
//!   "theme": "@alifd/theme-design-pro",
//!   "modifyVars": { "$color-brand1-6": "#1a7bf6" },
//!   "prependNormalizeCSS": true,
//!   "libraryName": "@alifd/next",
//!   "normalizeCSSRelativePath": "reset.scss",
//!   "resolve": ["./packages/app", "./packages/shared"]
//! }
//! ```
//!
//! `modifyVars` may also be a single string, which is treated as the path of
//! an SCSS file to `@import` ahead of the theme sources. `resolve` may be a
//! single directory or an ordered list of directories.

use std::fmt;

use serde::Deserialize;
use serde::de::{self, MapAccess, Visitor};

use crate::error::ThemeError;

/// Package under which the normalize stylesheet is looked up by default.
pub const DEFAULT_LIBRARY_NAME: &str = "@alifd/next";

/// Location of the normalize stylesheet inside the library by default.
pub const DEFAULT_NORMALIZE_RELATIVE_PATH: &str = "reset.scss";

fn default_true() -> bool {
    true
}

fn default_library_name() -> String {
    DEFAULT_LIBRARY_NAME.to_string()
}

fn default_normalize_relative_path() -> String {
    DEFAULT_NORMALIZE_RELATIVE_PATH.to_string()
}

/// Options recognized by the theme plugin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PluginConfig {
    /// Theme package (or directory) containing `variables.scss` and `icons.scss`.
    #[serde(default)]
    pub theme: Option<String>,

    /// Variable overrides or an import-path override.
    #[serde(default)]
    pub modify_vars: Option<ModifyVars>,

    /// Whether to compute and prepend the normalize fragment.
    #[serde(default = "default_true", rename = "prependNormalizeCSS")]
    pub prepend_normalize_css: bool,

    /// Root package under which the normalize stylesheet lives.
    #[serde(default = "default_library_name")]
    pub library_name: String,

    /// Path of the normalize stylesheet relative to `library_name`.
    #[serde(
        default = "default_normalize_relative_path",
        rename = "normalizeCSSRelativePath"
    )]
    pub normalize_css_relative_path: String,

    /// Base directories tried, in order, before the working directory.
    #[serde(default)]
    pub resolve: Option<ResolveDirs>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            theme: None,
            modify_vars: None,
            prepend_normalize_css: true,
            library_name: default_library_name(),
            normalize_css_relative_path: default_normalize_relative_path(),
            resolve: None,
        }
    }
}

impl PluginConfig {
    /// Parse options from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ThemeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse options from an already-parsed JSON value.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, ThemeError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn with_modify_vars(mut self, modify_vars: ModifyVars) -> Self {
        self.modify_vars = Some(modify_vars);
        self
    }

    pub fn with_prepend_normalize_css(mut self, prepend: bool) -> Self {
        self.prepend_normalize_css = prepend;
        self
    }

    pub fn with_library_name(mut self, library_name: impl Into<String>) -> Self {
        self.library_name = library_name.into();
        self
    }

    pub fn with_normalize_css_relative_path(mut self, path: impl Into<String>) -> Self {
        self.normalize_css_relative_path = path.into();
        self
    }

    pub fn with_resolve(mut self, resolve: ResolveDirs) -> Self {
        self.resolve = Some(resolve);
        self
    }

    /// The configured theme, treating an empty string as unset.
    pub fn theme_dir(&self) -> Option<&str> {
        self.theme.as_deref().filter(|t| !t.is_empty())
    }

    /// The library name, falling back to the default when empty.
    pub fn library(&self) -> &str {
        if self.library_name.is_empty() {
            DEFAULT_LIBRARY_NAME
        } else {
            &self.library_name
        }
    }

    /// The normalize path, falling back to the default when empty.
    pub fn normalize_path(&self) -> &str {
        if self.normalize_css_relative_path.is_empty() {
            DEFAULT_NORMALIZE_RELATIVE_PATH
        } else {
            &self.normalize_css_relative_path
        }
    }

    /// Configured base directories in resolution order.
    pub fn resolve_dirs(&self) -> Vec<&str> {
        self.resolve
            .as_ref()
            .map(ResolveDirs::dirs)
            .unwrap_or_default()
    }
}

/// One base directory or an ordered list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ResolveDirs {
    One(String),
    Many(Vec<String>),
}

impl ResolveDirs {
    /// Non-empty directories in the order they should be tried.
    pub fn dirs(&self) -> Vec<&str> {
        let dirs: Vec<&str> = match self {
            ResolveDirs::One(dir) => vec![dir.as_str()],
            ResolveDirs::Many(dirs) => dirs.iter().map(String::as_str).collect(),
        };
        dirs.into_iter().filter(|d| !d.is_empty()).collect()
    }
}

impl From<&str> for ResolveDirs {
    fn from(dir: &str) -> Self {
        ResolveDirs::One(dir.to_string())
    }
}

impl From<Vec<String>> for ResolveDirs {
    fn from(dirs: Vec<String>) -> Self {
        ResolveDirs::Many(dirs)
    }
}

/// Variable overrides applied ahead of every theme source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModifyVars {
    /// `name -> value` assignments in insertion order.
    Variables(Vec<(String, String)>),
    /// Path of an SCSS file to import.
    ImportPath(String),
}

impl ModifyVars {
    /// Build a variable mapping from `(name, value)` pairs, keeping their order.
    pub fn variables<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        ModifyVars::Variables(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn import(path: impl Into<String>) -> Self {
        ModifyVars::ImportPath(path.into())
    }
}

struct ModifyVarsVisitor;

impl<'de> Visitor<'de> for ModifyVarsVisitor {
    type Value = ModifyVars;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of SCSS variables or an import path string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(ModifyVars::ImportPath(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(ModifyVars::ImportPath(v))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        // Entries arrive in document order, which is what later-wins
        // variable semantics depend on.
        let mut vars = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((name, value)) = map.next_entry::<String, serde_json::Value>()? {
            let rendered = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(de::Error::custom(format!(
                        "value of `{}` must be a string, number or boolean, got {}",
                        name, other
                    )));
                }
            };
            vars.push((name, rendered));
        }
        Ok(ModifyVars::Variables(vars))
    }
}

impl<'de> Deserialize<'de> for ModifyVars {
    fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ModifyVarsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_from_empty_object() {
        let config = PluginConfig::from_json_str("{}").unwrap();
        assert_eq!(config, PluginConfig::default());
        assert!(config.prepend_normalize_css);
        assert_eq!(config.library_name, "@alifd/next");
        assert_eq!(config.normalize_css_relative_path, "reset.scss");
        assert!(config.theme.is_none());
        assert!(config.resolve_dirs().is_empty());
    }

    #[test]
    fn test_full_options() {
        let config = PluginConfig::from_json_value(json!({
            "theme": "@alifd/theme-1",
            "modifyVars": { "$brand": "red", "$radius": 4 },
            "prependNormalizeCSS": false,
            "libraryName": "@alifd/next-lite",
            "normalizeCSSRelativePath": "lib/core/reset.scss",
            "resolve": ["a", "b"]
        }))
        .unwrap();

        assert_eq!(config.theme_dir(), Some("@alifd/theme-1"));
        assert_eq!(
            config.modify_vars,
            Some(ModifyVars::variables([("$brand", "red"), ("$radius", "4")]))
        );
        assert!(!config.prepend_normalize_css);
        assert_eq!(config.library(), "@alifd/next-lite");
        assert_eq!(config.normalize_path(), "lib/core/reset.scss");
        assert_eq!(config.resolve_dirs(), vec!["a", "b"]);
    }

    #[test]
    fn test_modify_vars_keeps_document_order() {
        let config = PluginConfig::from_json_str(
            r#"{"modifyVars": {"$z": "1", "$a": "2", "$m": "3"}}"#,
        )
        .unwrap();

        let Some(ModifyVars::Variables(vars)) = config.modify_vars else {
            panic!("expected variables");
        };
        let names: Vec<_> = vars.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["$z", "$a", "$m"]);
    }

    #[test]
    fn test_modify_vars_string_is_import_path() {
        let config =
            PluginConfig::from_json_str(r#"{"modifyVars": "./src/theme-vars.scss"}"#).unwrap();
        assert_eq!(
            config.modify_vars,
            Some(ModifyVars::import("./src/theme-vars.scss"))
        );
    }

    #[test]
    fn test_modify_vars_rejects_nested_values() {
        let err = PluginConfig::from_json_str(r#"{"modifyVars": {"$a": {"b": 1}}}"#).unwrap_err();
        assert!(matches!(err, ThemeError::InvalidConfig(_)));
    }

    #[test]
    fn test_resolve_single_string() {
        let config = PluginConfig::from_json_str(r#"{"resolve": "packages/app"}"#).unwrap();
        assert_eq!(config.resolve, Some(ResolveDirs::One("packages/app".into())));
        assert_eq!(config.resolve_dirs(), vec!["packages/app"]);
    }

    #[test]
    fn test_unknown_option_rejected() {
        let err = PluginConfig::from_json_str(r#"{"prependNormalizeCss": false}"#).unwrap_err();
        assert!(err.to_string().contains("prependNormalizeCss"));
    }

    #[test]
    fn test_empty_strings_fall_back() {
        let config = PluginConfig::default()
            .with_theme("")
            .with_library_name("")
            .with_normalize_css_relative_path("")
            .with_resolve(ResolveDirs::Many(vec![String::new(), "x".into()]));

        assert_eq!(config.theme_dir(), None);
        assert_eq!(config.library(), DEFAULT_LIBRARY_NAME);
        assert_eq!(config.normalize_path(), DEFAULT_NORMALIZE_RELATIVE_PATH);
        assert_eq!(config.resolve_dirs(), vec!["x"]);
    }

    #[test]
    fn test_non_boolean_prepend_normalize_rejected() {
        let err = PluginConfig::from_json_str(r#"{"prependNormalizeCSS": "yes"}"#).unwrap_err();
        assert!(matches!(err, ThemeError::InvalidConfig(_)));
    }
}
