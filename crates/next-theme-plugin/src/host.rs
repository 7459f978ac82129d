//! Host build tool model.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! A [`Compiler`] owns the build options (notably the entry map) and emits a
//! "compilation" event for every [`Compilation`] it runs. A compilation in
//! turn runs an asynchronous "optimize chunk assets" phase over its chunks.
//!
//! Hosts come in two shapes:
//! - hook objects: `compiler.hooks.compilation.tap(..)` and
//!   `compilation.hooks.optimize_chunk_assets.tap_async(..)`
//! - legacy named events: `compiler.plugin("compilation", ..)` and
//!   `compilation.plugin("optimize-chunk-assets", ..)`
//!
//! Both shapes run taps in registration order.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::trace;

use crate::error::{HostError, PluginError};
use crate::source::Source;

/// Legacy event fired when a compilation is created.
pub const COMPILATION_EVENT: &str = "compilation";

/// Legacy event fired for the asynchronous chunk asset optimization phase.
pub const OPTIMIZE_CHUNK_ASSETS_EVENT: &str = "optimize-chunk-assets";

/// Entry name to entry definition.
pub type EntryMap = BTreeMap<String, EntryDescription>;

/// Definition of one entry point.
///
/// Accepts the usual option shapes: a single request, a list of requests, or
/// an object with an `import` field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "EntryShape")]
pub struct EntryDescription {
    pub import: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EntryShape {
    One(String),
    Many(Vec<String>),
    Object {
        #[serde(default)]
        import: Vec<String>,
    },
}

impl From<EntryShape> for EntryDescription {
    fn from(shape: EntryShape) -> Self {
        let import = match shape {
            EntryShape::One(request) => vec![request],
            EntryShape::Many(requests) => requests,
            EntryShape::Object { import } => import,
        };
        Self { import }
    }
}

impl EntryDescription {
    pub fn new<S: Into<String>>(imports: impl IntoIterator<Item = S>) -> Self {
        Self {
            import: imports.into_iter().map(Into::into).collect(),
        }
    }
}

/// Build options visible to plugins.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompilerOptions {
    #[serde(default)]
    pub entry: Arc<EntryMap>,
}

impl CompilerOptions {
    /// Options with one entry per name and no imports.
    pub fn with_entries<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            entry: Arc::new(
                names
                    .into_iter()
                    .map(|n| (n.into(), EntryDescription::default()))
                    .collect(),
            ),
        }
    }
}

/// A chunk prepared with a name before chunk graph construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparedChunk {
    pub name: Option<String>,
}

impl PreparedChunk {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self { name: None }
    }
}

/// An output chunk and the asset files it produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chunk {
    pub name: Option<String>,
    pub files: Vec<String>,
}

impl Chunk {
    pub fn new<S: Into<String>>(name: Option<&str>, files: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.map(str::to_string),
            files: files.into_iter().map(Into::into).collect(),
        }
    }
}

/// Synchronous tap on the "compilation" event.
pub type CompilationTap = Arc<dyn Fn(&mut Compilation) -> Result<(), HostError> + Send + Sync>;

/// Asynchronous tap on the "optimize chunk assets" phase.
///
/// The returned future completing is the tap's completion signal; the host
/// does not proceed to the next tap or phase before that.
#[async_trait]
pub trait ChunkAssetsTap: Send + Sync {
    async fn call(
        &self,
        compilation: &mut Compilation,
        chunks: &[Chunk],
    ) -> Result<(), PluginError>;
}

/// Named synchronous taps.
#[derive(Default, Clone)]
pub struct SyncHook {
    taps: Vec<(String, CompilationTap)>,
}

impl SyncHook {
    pub fn tap(&mut self, name: impl Into<String>, tap: CompilationTap) {
        self.taps.push((name.into(), tap));
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }
}

/// Named asynchronous taps run one after another.
#[derive(Default, Clone)]
pub struct AsyncSeriesHook {
    taps: Vec<(String, Arc<dyn ChunkAssetsTap>)>,
}

impl AsyncSeriesHook {
    pub fn tap_async(&mut self, name: impl Into<String>, tap: Arc<dyn ChunkAssetsTap>) {
        self.taps.push((name.into(), tap));
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }
}

/// Hook objects of a compiler.
#[derive(Default, Clone)]
pub struct CompilerHooks {
    pub compilation: SyncHook,
}

/// Hook objects of a compilation.
#[derive(Default, Clone)]
pub struct CompilationHooks {
    pub optimize_chunk_assets: AsyncSeriesHook,
}

/// One run of the build: its assets, chunks and hooks.
#[derive(Default)]
pub struct Compilation {
    /// Options of the compiler running this compilation, as of its start.
    pub options: CompilerOptions,
    /// Output file name to content.
    pub assets: BTreeMap<String, Source>,
    /// Chunks produced by this run.
    pub chunks: Vec<Chunk>,
    /// Chunks prepared with names at compile time, if the host tracks them.
    pub prepared_chunks: Option<Vec<PreparedChunk>>,
    hooks: Option<CompilationHooks>,
    legacy_optimize: AsyncSeriesHook,
}

impl Compilation {
    /// A compilation exposing hook objects.
    pub fn new() -> Self {
        Self {
            hooks: Some(CompilationHooks::default()),
            ..Self::default()
        }
    }

    /// A compilation exposing only legacy named events.
    pub fn legacy() -> Self {
        Self::default()
    }

    pub fn with_asset(mut self, file: impl Into<String>, source: impl Into<Source>) -> Self {
        self.assets.insert(file.into(), source.into());
        self
    }

    pub fn with_chunk(mut self, chunk: Chunk) -> Self {
        self.chunks.push(chunk);
        self
    }

    pub fn with_prepared_chunks(mut self, prepared: Vec<PreparedChunk>) -> Self {
        self.prepared_chunks = Some(prepared);
        self
    }

    pub fn hooks(&self) -> Option<&CompilationHooks> {
        self.hooks.as_ref()
    }

    pub fn hooks_mut(&mut self) -> Option<&mut CompilationHooks> {
        self.hooks.as_mut()
    }

    /// Legacy event registration.
    pub fn plugin(&mut self, event: &str, tap: Arc<dyn ChunkAssetsTap>) -> Result<(), HostError> {
        match event {
            OPTIMIZE_CHUNK_ASSETS_EVENT => {
                self.legacy_optimize.tap_async(event, tap);
                Ok(())
            }
            other => Err(HostError::UnknownEvent(other.to_string())),
        }
    }

    /// Number of taps registered for the optimize phase, in either style.
    pub fn optimize_tap_count(&self) -> usize {
        self.hooks
            .as_ref()
            .map_or(0, |h| h.optimize_chunk_assets.len())
            + self.legacy_optimize.len()
    }

    /// Run the optimize chunk assets phase over a snapshot of the chunks.
    pub async fn optimize_chunk_assets(&mut self) -> Result<(), HostError> {
        let chunks = self.chunks.clone();
        let mut taps = self
            .hooks
            .as_ref()
            .map(|h| h.optimize_chunk_assets.taps.clone())
            .unwrap_or_default();
        taps.extend(self.legacy_optimize.taps.iter().cloned());

        for (name, tap) in taps {
            trace!(plugin = %name, chunks = chunks.len(), "optimize chunk assets");
            tap.call(&mut *self, &chunks)
                .await
                .map_err(|source| HostError::Plugin {
                    plugin: name,
                    source,
                })?;
        }
        Ok(())
    }
}

/// The build driver plugins attach to.
#[derive(Default)]
pub struct Compiler {
    pub options: CompilerOptions,
    hooks: Option<CompilerHooks>,
    legacy_compilation: SyncHook,
}

impl Compiler {
    /// A compiler exposing hook objects.
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            options,
            hooks: Some(CompilerHooks::default()),
            legacy_compilation: SyncHook::default(),
        }
    }

    /// A compiler exposing only legacy named events.
    pub fn legacy(options: CompilerOptions) -> Self {
        Self {
            options,
            hooks: None,
            legacy_compilation: SyncHook::default(),
        }
    }

    pub fn hooks(&self) -> Option<&CompilerHooks> {
        self.hooks.as_ref()
    }

    pub fn hooks_mut(&mut self) -> Option<&mut CompilerHooks> {
        self.hooks.as_mut()
    }

    /// Legacy event registration.
    pub fn plugin(&mut self, event: &str, tap: CompilationTap) -> Result<(), HostError> {
        match event {
            COMPILATION_EVENT => {
                self.legacy_compilation.tap(event, tap);
                Ok(())
            }
            other => Err(HostError::UnknownEvent(other.to_string())),
        }
    }

    /// Number of taps registered for the compilation event, in either style.
    pub fn compilation_tap_count(&self) -> usize {
        self.hooks.as_ref().map_or(0, |h| h.compilation.len()) + self.legacy_compilation.len()
    }

    /// A fresh compilation of the same shape as this compiler.
    pub fn new_compilation(&self) -> Compilation {
        if self.hooks.is_some() {
            Compilation::new()
        } else {
            Compilation::legacy()
        }
    }

    /// Fire the compilation event, then run the optimize phase.
    pub async fn run_compilation(&self, compilation: &mut Compilation) -> Result<(), HostError> {
        compilation.options = self.options.clone();
        let modern = self.hooks.iter().flat_map(|h| h.compilation.taps.iter());
        for (name, tap) in modern.chain(self.legacy_compilation.taps.iter()) {
            trace!(plugin = %name, "compilation");
            tap(&mut *compilation)?;
        }
        compilation.optimize_chunk_assets().await
    }
}
