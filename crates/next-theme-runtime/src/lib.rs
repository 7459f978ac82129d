/*
 * next-theme-runtime
 * Copyright (c) 2025 Posit, PBC
 *
 * Runtime abstraction layer for theme file access.
 *
 * Theme sources are read from an installed component library on disk and fed
 * to an embedded SCSS compiler. Everything that touches the file system goes
 * through the `SystemRuntime` trait so the compiler, the resolver and the
 * fragment builder all see the same view of the world:
 *
 * - NativeRuntime: Full file system access using std
 * - sass_native: grass-backed SCSS compilation reading through a runtime
 */

mod native;
pub mod sass_native;
mod traits;

pub use traits::{PathKind, RuntimeError, RuntimeResult, SystemRuntime};

pub use native::NativeRuntime;

/// Create a default runtime for the current platform.
pub fn default_runtime() -> NativeRuntime {
    NativeRuntime::new()
}
