//! Application-level emoji context.
//!
//! `EmojiContext` is constructed once at startup and handed by reference to
//! the rendering and UI collaborators. It owns:
//! * the [`EmojiRegistry`] (shared with the processor cache),
//! * the [`ProcessorCache`] used once per render pass,
//! * the user [`Config`] (usage statistics, hidden categories, builtin policy).
//!
//! Lifecycle is tied to reload events: [`EmojiContext::reload`] rebuilds the
//! catalog, drops cached processors that still reference the previous
//! catalog, and prunes usage statistics for emojis that no longer exist.
//!
//! Invariants:
//! * The registry's builtin policy mirrors `config.emoji.use_builtin`.
//! * Usage statistics only reference names known after the last reload (the
//!   list may still carry entries recorded before the first reload).

use anyhow::Result;
use core_config::Config;
use core_registry::{
    AssetHandle, CategoryLocalizer, Emoji, EmojiRegistry, NoLocalization, ReloadSummary,
};
use core_text::{ProcessorCache, TextProcessor};
use parking_lot::{RwLock, RwLockReadGuard};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

mod suggest;
pub use suggest::completion_prefix;

/// Pseudo-category resolved from usage statistics rather than asset paths.
pub const CATEGORY_FREQUENTLY_USED: &str = "frequently_used";

pub struct EmojiContext {
    registry: Arc<EmojiRegistry>,
    cache: ProcessorCache,
    config: RwLock<Config>,
    localizer: Box<dyn CategoryLocalizer>,
}

impl EmojiContext {
    /// Context with the shipped builtin set and no user assets loaded yet.
    pub fn new(config: Config) -> Self {
        Self::with_registry(Arc::new(EmojiRegistry::new()), config)
    }

    pub fn with_registry(registry: Arc<EmojiRegistry>, config: Config) -> Self {
        registry.set_use_builtin(config.use_builtin());
        let cache = ProcessorCache::with_idle(Arc::clone(&registry), config.cache_idle());
        Self {
            registry,
            cache,
            config: RwLock::new(config),
            localizer: Box::new(NoLocalization),
        }
    }

    pub fn with_localizer(mut self, localizer: impl CategoryLocalizer + 'static) -> Self {
        self.localizer = Box::new(localizer);
        self
    }

    pub fn registry(&self) -> &Arc<EmojiRegistry> {
        &self.registry
    }

    pub fn cache(&self) -> &ProcessorCache {
        &self.cache
    }

    pub fn config(&self) -> RwLockReadGuard<'_, Config> {
        self.config.read()
    }

    /// Processed form of `text` for one render pass.
    pub fn process(&self, text: Option<&str>) -> Arc<TextProcessor> {
        self.cache.get(text)
    }

    /// Rebuild the catalog from a freshly discovered asset stream.
    pub fn reload(&self, assets: impl IntoIterator<Item = AssetHandle>) -> ReloadSummary {
        let summary = self.registry.reload(assets);
        self.cache.clear();
        let registry = &self.registry;
        let pruned = self
            .config
            .write()
            .retain_frequently_used(|entry| registry.contains(&entry.name));
        debug!(target: "runtime", pruned, "usage_pruned_after_reload");
        summary
    }

    pub fn set_use_builtin(&self, enabled: bool) {
        self.config.write().set_use_builtin(enabled);
        self.registry.set_use_builtin(enabled);
    }

    // ---------------------------------------------------------------------------------------------
    // Categories
    // ---------------------------------------------------------------------------------------------

    /// Categories shown in a picker: the frequently used pseudo-category first
    /// (when it has members), then registry categories in sorted order, all
    /// minus the hidden set.
    pub fn visible_categories(&self) -> Vec<String> {
        let has_frequent = !self.frequently_used().is_empty();
        let config = self.config.read();
        let mut out = Vec::new();
        if has_frequent && !config.is_category_hidden(CATEGORY_FREQUENTLY_USED) {
            out.push(CATEGORY_FREQUENTLY_USED.to_string());
        }
        out.extend(
            self.registry
                .categories()
                .into_iter()
                .filter(|c| !config.is_category_hidden(c)),
        );
        out
    }

    /// Emojis of one category; resolves the frequently used pseudo-category.
    pub fn category_emojis(&self, category: &str) -> Option<Vec<Arc<Emoji>>> {
        if category == CATEGORY_FREQUENTLY_USED {
            return Some(self.frequently_used());
        }
        self.registry.emojis_in_category(category)
    }

    pub fn category_display_name(&self, category: &str) -> String {
        self.registry.display_name(category, self.localizer.as_ref())
    }

    /// Returns true when the hidden set changed.
    pub fn set_category_hidden(&self, category: &str, hidden: bool) -> bool {
        self.config.write().set_category_hidden(category, hidden)
    }

    // ---------------------------------------------------------------------------------------------
    // Usage statistics
    // ---------------------------------------------------------------------------------------------

    /// Usage entries that resolve in the registry, most used first.
    pub fn frequently_used(&self) -> Vec<Arc<Emoji>> {
        let usage: Vec<(u32, String)> = self
            .config
            .read()
            .frequently_used()
            .iter()
            .map(|e| (e.count, e.name.clone()))
            .collect();
        let mut entries: Vec<(u32, Arc<Emoji>)> = usage
            .into_iter()
            .filter_map(|(count, name)| self.registry.lookup(&name).map(|emoji| (count, emoji)))
            .collect();
        entries.sort_by(|a, b| b.0.cmp(&a.0));
        entries.into_iter().map(|(_, emoji)| emoji).collect()
    }

    /// Count one use of `name`. Unknown names are ignored (`None`).
    pub fn record_usage(&self, name: &str) -> Option<u32> {
        if !self.registry.contains(name) {
            return None;
        }
        Some(self.config.write().record_usage(name))
    }

    // ---------------------------------------------------------------------------------------------
    // Suggestions
    // ---------------------------------------------------------------------------------------------

    /// Completion candidates for the token being typed at the end of `input`.
    pub fn suggestions(&self, input: &str) -> Vec<String> {
        let Some(partial) = completion_prefix(input) else {
            return Vec::new();
        };
        let needle = format!(":{}", partial.to_ascii_lowercase());
        self.registry
            .all_codes()
            .into_iter()
            .filter(|code| code.starts_with(&needle))
            .collect()
    }

    pub fn save_config(&self, path: &Path) -> Result<()> {
        self.config.read().save_to(path)?;
        info!(target: "runtime", path = %path.display(), "context_config_saved");
        Ok(())
    }
}
