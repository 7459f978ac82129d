//! SCSS compilation and CSS post-processing.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Compiled fragments are spliced byte-for-byte into assets that already
//! carry their own charset, and may pass through tooling that does not keep
//! the encoding intact. Two rewrites make the output safe for that:
//!
//! 1. A leading `@charset "UTF-8";` line is removed.
//! 2. `content: "X"` declarations whose value is a single non-ASCII
//!    character (icon-font code points) are rewritten to a hex escape,
//!    e.g. `content: "\e601"`.

use std::path::PathBuf;

use next_theme_runtime::SystemRuntime;
use next_theme_runtime::sass_native::compile_scss;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::ThemeError;

/// Leading charset declaration emitted by the compiler for non-ASCII output.
///
/// Also swallows a byte-order mark in front of it and the line break after it.
static LEADING_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\x{FEFF}?@charset "UTF-8";\r?\n?"#).unwrap());

/// `content` declarations holding exactly one non-ASCII character.
///
/// Captures the character in group 1.
static NON_ASCII_CONTENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"content:\s*['"]([^\x00-\x7F])['"]"#).unwrap());

/// Synchronous SCSS compilation service.
///
/// Implementors provide the raw engine call; `compile` applies the
/// post-processing every fragment needs.
pub trait StylesheetCompiler: Send + Sync {
    /// Compile `source` with `include_dirs` as import search paths, returning
    /// the engine's CSS untouched.
    fn compile_raw(&self, source: &str, include_dirs: &[PathBuf]) -> Result<String, ThemeError>;

    /// Compile and post-process `source`.
    fn compile(&self, source: &str, include_dirs: &[PathBuf]) -> Result<String, ThemeError> {
        let css = self.compile_raw(source, include_dirs)?;
        Ok(postprocess_css(&css))
    }
}

/// Compiler backed by grass, reading imports through a `SystemRuntime`.
pub struct GrassCompiler<'a> {
    runtime: &'a dyn SystemRuntime,
}

impl<'a> GrassCompiler<'a> {
    pub fn new(runtime: &'a dyn SystemRuntime) -> Self {
        Self { runtime }
    }
}

impl StylesheetCompiler for GrassCompiler<'_> {
    fn compile_raw(&self, source: &str, include_dirs: &[PathBuf]) -> Result<String, ThemeError> {
        compile_scss(self.runtime, source, include_dirs).map_err(|e| ThemeError::Compile {
            message: e.to_string(),
        })
    }
}

/// Strip the leading charset declaration and escape single non-ASCII
/// `content` values.
///
/// # Example
///
/// ```
/// use next_theme_sass::postprocess_css;
///
/// let css = postprocess_css("@charset \"UTF-8\";\n.a{content:\"☺\"}");
/// assert_eq!(css, ".a{content: \"\\263a\"}");
/// ```
pub fn postprocess_css(css: &str) -> String {
    let css = LEADING_CHARSET.replace(css, "");
    let css = css.strip_prefix('\u{FEFF}').unwrap_or(&*css);
    NON_ASCII_CONTENT
        .replace_all(css, |caps: &Captures| {
            let ch = caps[1].chars().next().unwrap_or_default();
            format!("content: \"{}\"", escape_css_char(ch))
        })
        .into_owned()
}

/// CSS hex escape of a character: backslash plus lowercase hex code point,
/// zero-padded to at least four digits.
pub fn escape_css_char(ch: char) -> String {
    format!("\\{:04x}", u32::from(ch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use next_theme_runtime::NativeRuntime;

    #[test]
    fn test_charset_and_content_exact() {
        let css = postprocess_css("@charset \"UTF-8\";\n.a{content:\"☺\"}");
        assert_eq!(css, ".a{content: \"\\263a\"}");
    }

    #[test]
    fn test_single_quotes_and_whitespace() {
        let css = postprocess_css(".icon:before { content:   '\u{e601}'; }");
        assert_eq!(css, ".icon:before { content: \"\\e601\"; }");
    }

    #[test]
    fn test_ascii_and_multi_char_content_untouched() {
        let input = ".a { content: \"x\"; }\n.b { content: \"☺☺\"; }\n.c { content: \"\"; }";
        assert_eq!(postprocess_css(input), input);
    }

    #[test]
    fn test_padding_and_astral_characters() {
        assert_eq!(escape_css_char('\u{e9}'), "\\00e9");
        assert_eq!(escape_css_char('\u{263a}'), "\\263a");
        assert_eq!(escape_css_char('\u{1f600}'), "\\1f600");
    }

    #[test]
    fn test_charset_only_stripped_at_start() {
        let input = ".a { color: red; }\n@charset \"UTF-8\";\n";
        assert_eq!(postprocess_css(input), input);
    }

    #[test]
    fn test_bom_stripped() {
        assert_eq!(postprocess_css("\u{feff}.a{}"), ".a{}");
    }

    #[test]
    fn test_grass_round_trip() {
        let runtime = NativeRuntime::new();
        let compiler = GrassCompiler::new(&runtime);

        let css = compiler
            .compile("@charset \"UTF-8\";\n.a{content:\"☺\"}", &[])
            .unwrap();

        assert!(!css.contains("@charset"));
        assert!(css.starts_with(".a"));
        assert!(css.contains("content: \"\\263a\""));
        assert!(css.is_ascii());
    }

    #[test]
    fn test_compile_error_is_propagated() {
        let runtime = NativeRuntime::new();
        let compiler = GrassCompiler::new(&runtime);

        let err = compiler.compile(".a { color: $missing; }", &[]).unwrap_err();
        assert!(matches!(err, ThemeError::Compile { .. }));
    }
}
