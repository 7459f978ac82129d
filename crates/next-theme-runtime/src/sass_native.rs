//! SASS compilation using the grass crate.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! This module provides SCSS compilation using grass, a pure Rust
//! implementation that targets dart-sass.
//!
//! Key components:
//! - `RuntimeFs`: Adapter implementing `grass::Fs` for our `SystemRuntime`
//! - `compile_scss`: High-level function for SCSS compilation

use std::fmt::Debug;
use std::io;
use std::path::{Path, PathBuf};

use grass::{Options, OutputStyle};

use crate::traits::{RuntimeError, RuntimeResult, SystemRuntime};

/// Adapter that implements `grass::Fs` using a `SystemRuntime`.
///
/// `@import` lookups made by the compiler are served by the same runtime that
/// located the theme sources.
pub struct RuntimeFs<'a> {
    runtime: &'a dyn SystemRuntime,
}

impl<'a> RuntimeFs<'a> {
    /// Create a new RuntimeFs adapter wrapping the given runtime.
    pub fn new(runtime: &'a dyn SystemRuntime) -> Self {
        Self { runtime }
    }
}

impl Debug for RuntimeFs<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeFs")
            .field("runtime", &"<SystemRuntime>")
            .finish()
    }
}

impl grass::Fs for RuntimeFs<'_> {
    fn is_dir(&self, path: &Path) -> bool {
        self.runtime.is_dir(path).unwrap_or(false)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.runtime.is_file(path).unwrap_or(false)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.runtime.file_read(path).map_err(|e| match e {
            RuntimeError::Io(io_err) => io_err,
            other => io::Error::other(other.to_string()),
        })
    }
}

/// Compile SCSS source to CSS using grass.
///
/// # Arguments
///
/// * `runtime` - The runtime to use for file system access
/// * `scss` - The SCSS source code to compile
/// * `load_paths` - Directories to search for @use/@import resolution
///
/// # Returns
///
/// Compiled CSS string on success, `RuntimeError::SassError` on failure.
pub fn compile_scss(
    runtime: &dyn SystemRuntime,
    scss: &str,
    load_paths: &[PathBuf],
) -> RuntimeResult<String> {
    let fs = RuntimeFs::new(runtime);

    let options = Options::default()
        .fs(&fs)
        .load_paths(load_paths)
        .style(OutputStyle::Expanded);

    tracing::trace!(bytes = scss.len(), load_paths = ?load_paths, "compiling scss");

    grass::from_string(scss, &options).map_err(|e| RuntimeError::SassError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NativeRuntime;

    #[test]
    fn test_compile_simple_scss() {
        let runtime = NativeRuntime::new();
        let scss = "$primary: #007bff; .btn { color: $primary; }";

        let css = compile_scss(&runtime, scss, &[]).unwrap();

        assert!(css.contains(".btn"));
        assert!(css.contains("#007bff"));
    }

    #[test]
    fn test_later_assignment_wins() {
        let runtime = NativeRuntime::new();
        let scss = "$brand: red;\n$brand: green;\n.a { color: $brand; }";

        let css = compile_scss(&runtime, scss, &[]).unwrap();

        assert!(css.contains("green"));
        assert!(!css.contains("red"));
    }

    #[test]
    fn test_import_from_load_path() {
        let runtime = NativeRuntime::new();
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("_mixins.scss"), "$gap: 4px;").unwrap();

        let scss = "@import \"mixins\";\n.row { margin: $gap; }";
        let css = compile_scss(&runtime, scss, &[temp.path().to_path_buf()]).unwrap();

        assert!(css.contains("margin: 4px"));
    }

    #[test]
    fn test_compile_scss_error() {
        let runtime = NativeRuntime::new();
        let scss = ".btn { color: $undefined-variable; }";

        let result = compile_scss(&runtime, scss, &[]);

        assert!(matches!(result, Err(RuntimeError::SassError(_))));
    }

    #[test]
    fn test_runtime_fs_debug() {
        let runtime = NativeRuntime::new();
        let fs = RuntimeFs::new(&runtime);
        let debug_str = format!("{:?}", fs);
        assert!(debug_str.contains("RuntimeFs"));
    }
}
