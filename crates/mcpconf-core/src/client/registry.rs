//! Translator registry keyed by platform id.
//!
//! Lookups take a shared lock; registration takes an exclusive one, so a
//! registry can be shared across threads behind an `Arc`.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{
    ClaudeCodeTranslator, ClaudeDesktopTranslator, CodexTranslator, OpenCodeTranslator,
    Translator, VsCodeTranslator,
};
use crate::error::{Error, Result};

#[derive(Debug, Default)]
pub struct TranslatorRegistry {
    translators: RwLock<HashMap<String, Arc<dyn Translator>>>,
}

impl TranslatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in translator.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        let builtins: Vec<Arc<dyn Translator>> = vec![
            Arc::new(ClaudeCodeTranslator::new()),
            Arc::new(ClaudeDesktopTranslator::new()),
            Arc::new(VsCodeTranslator::new()),
            Arc::new(OpenCodeTranslator::new()),
            Arc::new(CodexTranslator::new()),
        ];
        for translator in builtins {
            registry.register(translator);
        }
        registry
    }

    /// Register a translator, returning the one it replaced, if any.
    pub fn register(&self, translator: Arc<dyn Translator>) -> Option<Arc<dyn Translator>> {
        let platform = translator.platform().to_string();
        tracing::debug!(platform = %platform, "registering translator");
        self.write().insert(platform, translator)
    }

    /// Look up a translator by platform id.
    pub fn get(&self, platform: &str) -> Option<Arc<dyn Translator>> {
        self.read().get(platform).cloned()
    }

    /// Like [`get`](Self::get), but a missing platform is an error.
    pub fn require(&self, platform: &str) -> Result<Arc<dyn Translator>> {
        self.get(platform).ok_or_else(|| Error::UnknownPlatform {
            name: platform.to_string(),
        })
    }

    /// Registered platform ids, sorted.
    pub fn platforms(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    // Every mutation is a single insert, so a panic elsewhere cannot leave
    // the map half-updated.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<dyn Translator>>> {
        self.translators.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<dyn Translator>>> {
        self.translators.write().unwrap_or_else(PoisonError::into_inner)
    }
}
