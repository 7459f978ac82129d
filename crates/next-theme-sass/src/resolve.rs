//! Theme resource location.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Theme sources are addressed by module-style requests such as
//! `@alifd/next/reset.scss` or `@alifd/theme-1/icons.scss`. A request is
//! resolved against each configured base directory in turn and finally
//! against the working directory, using the same `node_modules` lookup a
//! JavaScript toolchain would use.

use std::path::{Component, Path, PathBuf};

use next_theme_runtime::SystemRuntime;
use tracing::{debug, error};

use crate::error::ThemeError;

/// Resolves a module-style request relative to a base directory.
pub trait ModuleResolver: Send + Sync {
    /// Return the absolute path of `request` as seen from `basedir`, or
    /// `None` if it cannot be found there.
    fn resolve(&self, request: &str, basedir: &Path) -> Option<PathBuf>;
}

/// Node-style resolver: relative requests are joined onto the base
/// directory, bare requests are searched in `node_modules` of the base
/// directory and each of its ancestors.
pub struct NodeModulesResolver<'a> {
    runtime: &'a dyn SystemRuntime,
    extensions: Vec<String>,
}

impl<'a> NodeModulesResolver<'a> {
    pub fn new(runtime: &'a dyn SystemRuntime) -> Self {
        Self {
            runtime,
            extensions: vec![".scss".to_string(), ".css".to_string()],
        }
    }

    /// Replace the extensions tried when the exact request is not a file.
    pub fn with_extensions<S: Into<String>>(
        mut self,
        extensions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    fn load_as_file(&self, candidate: &Path) -> Option<PathBuf> {
        if self.runtime.is_file(candidate).unwrap_or(false) {
            return Some(candidate.to_path_buf());
        }
        self.extensions.iter().find_map(|ext| {
            let mut with_ext = candidate.as_os_str().to_owned();
            with_ext.push(ext);
            let with_ext = PathBuf::from(with_ext);
            self.runtime
                .is_file(&with_ext)
                .unwrap_or(false)
                .then_some(with_ext)
        })
    }
}

impl ModuleResolver for NodeModulesResolver<'_> {
    fn resolve(&self, request: &str, basedir: &Path) -> Option<PathBuf> {
        if is_relative_request(request) || Path::new(request).is_absolute() {
            return self.load_as_file(&normalize(&basedir.join(request)));
        }

        node_modules_paths(basedir)
            .into_iter()
            .find_map(|dir| self.load_as_file(&normalize(&dir.join(request))))
    }
}

/// Locate `request`, trying each of `base_dirs` in order and then `cwd`.
///
/// Relative base directories are interpreted relative to `cwd`. Falling back
/// to `cwd` happens even when explicit base directories were given.
pub fn locate(
    resolver: &dyn ModuleResolver,
    request: &str,
    base_dirs: &[&str],
    cwd: &Path,
) -> Result<PathBuf, ThemeError> {
    let mut searched = Vec::with_capacity(base_dirs.len() + 1);

    for dir in base_dirs {
        let basedir = normalize(&cwd.join(dir));
        debug!(request, basedir = %basedir.display(), "resolving theme resource");
        if let Some(found) = resolver.resolve(request, &basedir) {
            debug!(request, path = %found.display(), "resolved theme resource");
            return Ok(found);
        }
        searched.push(basedir);
    }

    if let Some(found) = resolver.resolve(request, cwd) {
        debug!(request, path = %found.display(), "resolved theme resource from working directory");
        return Ok(found);
    }
    searched.push(cwd.to_path_buf());

    error!(request, "Can not find the file: {}", request);
    Err(ThemeError::ResourceNotFound {
        request: request.to_string(),
        searched,
    })
}

/// Join two request segments and normalize the result lexically.
///
/// `.` segments and repeated separators are dropped and `..` folds into the
/// preceding segment. So `./theme` joined with `icons.scss` becomes the bare
/// request `theme/icons.scss`, while leading `..` segments and an absolute
/// root are kept.
pub(crate) fn join_request(base: &str, relative: &str) -> String {
    let absolute = base.starts_with(['/', '\\'])
        || (base.is_empty() && relative.starts_with(['/', '\\']));
    let mut segments: Vec<&str> = Vec::new();
    for segment in base.split(['/', '\\']).chain(relative.split(['/', '\\'])) {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

fn is_relative_request(request: &str) -> bool {
    request == "."
        || request == ".."
        || request.starts_with("./")
        || request.starts_with("../")
        || request.starts_with(".\\")
        || request.starts_with("..\\")
}

/// `node_modules` directories visible from `basedir`, nearest first.
fn node_modules_paths(basedir: &Path) -> Vec<PathBuf> {
    basedir
        .ancestors()
        .filter(|dir| dir.file_name().is_none_or(|name| name != "node_modules"))
        .map(|dir| dir.join("node_modules"))
        .collect()
}

/// Lexically remove `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
