//! The theme plugin and its concatenation hook.
//!
//! Copyright (c) 2025 Posit, PBC

use std::collections::BTreeSet;
use std::mem;
use std::sync::Arc;

use async_trait::async_trait;
use next_theme_sass::{PluginConfig, ThemeFragments};
use tracing::debug;

use crate::error::{HostError, PluginError};
use crate::host::{Chunk, ChunkAssetsTap, Compilation, Compiler, EntryMap};
use crate::matcher::is_eligible;
use crate::registrar::registrar_for;
use crate::source::{ConcatSource, Source};

/// Name under which the plugin taps host hooks.
pub const PLUGIN_NAME: &str = "NextThemePlugin";

/// Injects the theme's normalize and icon stylesheets into entry CSS.
///
/// Fragments are compiled when the plugin is created and shared by every
/// compilation the plugin is later applied to.
#[derive(Debug, Clone)]
pub struct ThemePlugin {
    fragments: Arc<ThemeFragments>,
}

impl ThemePlugin {
    /// Compile the fragments requested by `config`.
    ///
    /// # Errors
    ///
    /// Fails if a theme resource cannot be located, read or compiled.
    pub fn new(config: &PluginConfig) -> Result<Self, PluginError> {
        let fragments = ThemeFragments::from_config(config)?;
        Ok(Self::from_fragments(fragments))
    }

    /// Use fragments that were compiled elsewhere.
    pub fn from_fragments(fragments: ThemeFragments) -> Self {
        Self {
            fragments: Arc::new(fragments),
        }
    }

    pub fn fragments(&self) -> &ThemeFragments {
        &self.fragments
    }

    /// Attach to `compiler`. Registers nothing when there is nothing to inject.
    pub fn apply(&self, compiler: &mut Compiler) -> Result<(), HostError> {
        if self.fragments.is_empty() {
            debug!(plugin = PLUGIN_NAME, "no fragments compiled, skipping registration");
            return Ok(());
        }

        let hook = ConcatHook {
            fragments: self.fragments.clone(),
        };
        registrar_for(compiler).register_optimize_hook(PLUGIN_NAME, Arc::new(hook))
    }
}

/// Reads the entry map from the running compilation, so entries changed
/// after `apply` are honored.
struct ConcatHook {
    fragments: Arc<ThemeFragments>,
}

#[async_trait]
impl ChunkAssetsTap for ConcatHook {
    async fn call(
        &self,
        compilation: &mut Compilation,
        chunks: &[Chunk],
    ) -> Result<(), PluginError> {
        let entry = compilation.options.entry.clone();
        concat_assets(&self.fragments, &entry, compilation, chunks)
    }
}

/// Rewrite every eligible file of `chunks` as `normalize + original + icons`.
///
/// A file listed by more than one chunk is rewritten once.
///
/// # Errors
///
/// Returns [`PluginError::MissingAsset`] when a chunk lists an eligible file
/// that is absent from the asset table.
pub fn concat_assets(
    fragments: &ThemeFragments,
    entry: &EntryMap,
    compilation: &mut Compilation,
    chunks: &[Chunk],
) -> Result<(), PluginError> {
    let prepared = compilation.prepared_chunks.as_deref();
    let eligible: BTreeSet<&str> = chunks
        .iter()
        .flat_map(|chunk| chunk.files.iter())
        .map(String::as_str)
        .filter(|file| is_eligible(file, entry, prepared))
        .collect();

    for file in eligible {
        let asset = compilation
            .assets
            .get_mut(file)
            .ok_or_else(|| PluginError::MissingAsset(file.to_string()))?;
        let original = mem::take(asset);

        let mut concat = ConcatSource::default();
        if let Some(normalize) = &fragments.normalize {
            concat.add(normalize.clone());
        }
        concat.add(original);
        if let Some(icons) = &fragments.icons {
            concat.add(icons.clone());
        }

        debug!(file, parts = concat.children().len(), "injected theme fragments");
        *asset = Source::Concat(concat);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{CompilerOptions, PreparedChunk};

    fn fragments(normalize: Option<&str>, icons: Option<&str>) -> ThemeFragments {
        ThemeFragments {
            normalize: normalize.map(Arc::from),
            icons: icons.map(Arc::from),
        }
    }

    fn app_compilation(compiler: &Compiler) -> Compilation {
        compiler
            .new_compilation()
            .with_asset("app.css", ".a{color:red}")
            .with_asset("app.js", "run()")
            .with_asset("vendor.css", ".v{}")
            .with_chunk(Chunk::new(Some("app"), ["app.js", "app.css"]))
            .with_chunk(Chunk::new(Some("vendor"), ["vendor.css"]))
    }

    fn build(plugin: &ThemePlugin, compiler: &mut Compiler) -> Compilation {
        plugin.apply(compiler).unwrap();
        let mut compilation = app_compilation(compiler);
        pollster::block_on(compiler.run_compilation(&mut compilation)).unwrap();
        compilation
    }

    #[test]
    fn test_normalize_only() {
        let plugin = ThemePlugin::from_fragments(fragments(Some(".reset{margin:0}"), None));
        let mut compiler = Compiler::new(CompilerOptions::with_entries(["app"]));

        let compilation = build(&plugin, &mut compiler);

        let asset = &compilation.assets["app.css"];
        assert_eq!(asset.source(), ".reset{margin:0}.a{color:red}");
        let Source::Concat(concat) = asset else {
            panic!("expected a concatenation");
        };
        assert_eq!(concat.children().len(), 2);
    }

    #[test]
    fn test_both_fragments() {
        let plugin = ThemePlugin::from_fragments(fragments(Some("N"), Some("I")));
        let mut compiler = Compiler::new(CompilerOptions::with_entries(["app"]));

        let compilation = build(&plugin, &mut compiler);

        assert_eq!(compilation.assets["app.css"].source(), "N.a{color:red}I");
    }

    #[test]
    fn test_icons_only() {
        let plugin = ThemePlugin::from_fragments(fragments(None, Some("I")));
        let mut compiler = Compiler::new(CompilerOptions::with_entries(["app"]));

        let compilation = build(&plugin, &mut compiler);

        assert_eq!(compilation.assets["app.css"].source(), ".a{color:red}I");
    }

    #[test]
    fn test_non_entry_assets_untouched() {
        let plugin = ThemePlugin::from_fragments(fragments(Some("N"), Some("I")));
        let mut compiler = Compiler::new(CompilerOptions::with_entries(["app"]));

        let compilation = build(&plugin, &mut compiler);

        assert_eq!(compilation.assets["app.js"], Source::from("run()"));
        assert_eq!(compilation.assets["vendor.css"], Source::from(".v{}"));
    }

    #[test]
    fn test_no_fragments_registers_nothing() {
        let plugin = ThemePlugin::from_fragments(ThemeFragments::default());
        let mut compiler = Compiler::new(CompilerOptions::with_entries(["app"]));

        let compilation = build(&plugin, &mut compiler);

        assert_eq!(compiler.compilation_tap_count(), 0);
        assert_eq!(compilation.optimize_tap_count(), 0);
        assert_eq!(compilation.assets["app.css"], Source::from(".a{color:red}"));
    }

    #[test]
    fn test_legacy_and_modern_hosts_agree() {
        let plugin = ThemePlugin::from_fragments(fragments(Some("N"), Some("I")));
        let mut modern = Compiler::new(CompilerOptions::with_entries(["app"]));
        let mut legacy = Compiler::legacy(CompilerOptions::with_entries(["app"]));

        let a = build(&plugin, &mut modern);
        let b = build(&plugin, &mut legacy);

        assert!(legacy.hooks().is_none());
        assert_eq!(legacy.compilation_tap_count(), 1);
        assert_eq!(a.assets, b.assets);
    }

    #[test]
    fn test_injected_once_per_compilation() {
        let plugin = ThemePlugin::from_fragments(fragments(Some("N"), Some("I")));
        let mut compiler = Compiler::new(CompilerOptions::with_entries(["app"]));
        plugin.apply(&mut compiler).unwrap();

        for _ in 0..2 {
            let mut compilation = app_compilation(&compiler)
                .with_chunk(Chunk::new(None, ["app.css"]));
            pollster::block_on(compiler.run_compilation(&mut compilation)).unwrap();

            assert_eq!(compilation.optimize_tap_count(), 1);
            assert_eq!(compilation.assets["app.css"].source(), "N.a{color:red}I");
        }
    }

    #[test]
    fn test_fragments_shared_across_compilations() {
        let plugin = ThemePlugin::from_fragments(fragments(Some("N"), None));
        let mut compiler = Compiler::new(CompilerOptions::with_entries(["app"]));

        let first = build(&plugin, &mut compiler);
        let mut second = app_compilation(&compiler);
        pollster::block_on(compiler.run_compilation(&mut second)).unwrap();

        let normalize = plugin.fragments().normalize.clone().unwrap();
        for compilation in [&first, &second] {
            let Source::Concat(concat) = &compilation.assets["app.css"] else {
                panic!("expected a concatenation");
            };
            let Source::Raw(part) = &concat.children()[0] else {
                panic!("expected raw fragment");
            };
            assert!(Arc::ptr_eq(part, &normalize));
        }
    }

    #[test]
    fn test_entries_added_after_apply_are_seen() {
        let plugin = ThemePlugin::from_fragments(fragments(Some("N"), None));
        let mut compiler = Compiler::new(CompilerOptions::with_entries(["app"]));
        plugin.apply(&mut compiler).unwrap();
        compiler.options = CompilerOptions::with_entries(["app", "vendor"]);

        let mut compilation = app_compilation(&compiler);
        pollster::block_on(compiler.run_compilation(&mut compilation)).unwrap();

        assert_eq!(compilation.assets["vendor.css"].source(), "N.v{}");
        assert_eq!(compilation.options.entry.len(), 2);
    }

    #[test]
    fn test_prepared_chunks_are_eligible() {
        let theme = fragments(Some("N"), None);
        let entry = CompilerOptions::with_entries(["app"]).entry;
        let mut compilation = Compilation::new()
            .with_asset("chunk1.css", ".c{}")
            .with_asset("chunk2.css", ".d{}")
            .with_prepared_chunks(vec![PreparedChunk::named("chunk1")]);
        let chunks = [Chunk::new(Some("chunk1"), ["chunk1.css", "chunk2.css"])];

        concat_assets(&theme, &entry, &mut compilation, &chunks).unwrap();

        assert_eq!(compilation.assets["chunk1.css"].source(), "N.c{}");
        assert_eq!(compilation.assets["chunk2.css"].source(), ".d{}");
    }

    #[test]
    fn test_missing_asset() {
        let theme = fragments(Some("N"), None);
        let entry = CompilerOptions::with_entries(["app"]).entry;
        let mut compilation = Compilation::new();
        let chunks = [Chunk::new(Some("app"), ["app.css"])];

        let err = concat_assets(&theme, &entry, &mut compilation, &chunks).unwrap_err();

        assert!(matches!(err, PluginError::MissingAsset(f) if f == "app.css"));
    }
}
