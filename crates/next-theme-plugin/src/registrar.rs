//! Registration of the optimize-chunk-assets tap on either host shape.
//!
//! Copyright (c) 2025 Posit, PBC

use std::sync::Arc;

use tracing::debug;

use crate::error::HostError;
use crate::host::{
    COMPILATION_EVENT, ChunkAssetsTap, Compilation, Compiler, OPTIMIZE_CHUNK_ASSETS_EVENT,
};

/// Registers a tap that runs in every compilation's optimize phase.
pub trait HookRegistrar {
    fn register_optimize_hook(
        &mut self,
        plugin: &'static str,
        hook: Arc<dyn ChunkAssetsTap>,
    ) -> Result<(), HostError>;
}

/// Registration through hook objects.
pub struct TapRegistrar<'a> {
    compiler: &'a mut Compiler,
}

impl<'a> TapRegistrar<'a> {
    pub fn new(compiler: &'a mut Compiler) -> Self {
        Self { compiler }
    }
}

impl HookRegistrar for TapRegistrar<'_> {
    fn register_optimize_hook(
        &mut self,
        plugin: &'static str,
        hook: Arc<dyn ChunkAssetsTap>,
    ) -> Result<(), HostError> {
        let hooks = self
            .compiler
            .hooks_mut()
            .ok_or(HostError::MissingHooks("compiler"))?;
        hooks.compilation.tap(
            plugin,
            Arc::new(move |compilation: &mut Compilation| -> Result<(), HostError> {
                compilation
                    .hooks_mut()
                    .ok_or(HostError::MissingHooks("compilation"))?
                    .optimize_chunk_assets
                    .tap_async(plugin, hook.clone());
                Ok(())
            }),
        );
        Ok(())
    }
}

/// Registration through legacy named events.
pub struct LegacyRegistrar<'a> {
    compiler: &'a mut Compiler,
}

impl<'a> LegacyRegistrar<'a> {
    pub fn new(compiler: &'a mut Compiler) -> Self {
        Self { compiler }
    }
}

impl HookRegistrar for LegacyRegistrar<'_> {
    fn register_optimize_hook(
        &mut self,
        _plugin: &'static str,
        hook: Arc<dyn ChunkAssetsTap>,
    ) -> Result<(), HostError> {
        self.compiler.plugin(
            COMPILATION_EVENT,
            Arc::new(move |compilation: &mut Compilation| -> Result<(), HostError> {
                compilation.plugin(OPTIMIZE_CHUNK_ASSETS_EVENT, hook.clone())
            }),
        )
    }
}

/// Pick the registration style the compiler supports.
pub fn registrar_for(compiler: &mut Compiler) -> Box<dyn HookRegistrar + '_> {
    if compiler.hooks().is_some() {
        debug!("registering through hook objects");
        Box::new(TapRegistrar::new(compiler))
    } else {
        debug!("registering through legacy events");
        Box::new(LegacyRegistrar::new(compiler))
    }
}
