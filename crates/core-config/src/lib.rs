//! Configuration loading, typed access and persistence.
//!
//! Parses `emote.toml` (or an override path provided by the binary). Every
//! section is optional; absent fields fall back to defaults and unknown fields
//! are ignored so the file can evolve without immediate warnings.
//!
//! The emoji core only reads and filters through this crate: the usage list
//! and hidden category set are opaque collections intersected against the
//! registry at query time. Field access goes through explicit accessors on
//! [`Config`] rather than string-keyed lookups.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use std::{fs, path::Path, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "emote.toml";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
pub struct EmojiConfig {
    /// Raise the default log filter to `debug`, which makes per-asset registry
    /// events visible.
    #[serde(default)]
    pub debug: bool,
    /// Treat builtin emojis like user emojis for suggestions and random picks.
    #[serde(default)]
    pub use_builtin: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    #[serde(default = "CacheConfig::default_idle_secs")]
    pub idle_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            idle_secs: Self::default_idle_secs(),
        }
    }
}

impl CacheConfig {
    const fn default_idle_secs() -> u64 {
        60
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
pub struct CategoriesConfig {
    #[serde(default)]
    pub hidden: BTreeSet<String>,
}

/// One "frequently used" statistic entry.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct UsageEntry {
    pub name: String,
    #[serde(default)]
    pub count: u32,
}

impl UsageEntry {
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub emoji: EmojiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub categories: CategoriesConfig,
    #[serde(default)]
    pub frequently_used: Vec<UsageEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("emote").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Ok(Config {
            raw: Some(content),
            file,
        }),
        Err(e) => {
            // Unparsable file falls back to defaults; the file is left untouched.
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}

impl Config {
    pub fn debug_enabled(&self) -> bool {
        self.file.emoji.debug
    }

    pub fn use_builtin(&self) -> bool {
        self.file.emoji.use_builtin
    }

    pub fn set_use_builtin(&mut self, enabled: bool) {
        self.file.emoji.use_builtin = enabled;
    }

    /// Sliding idle window for cached text processors. Zero is clamped to one second.
    pub fn cache_idle(&self) -> Duration {
        Duration::from_secs(self.file.cache.idle_secs.max(1))
    }

    pub fn hidden_categories(&self) -> &BTreeSet<String> {
        &self.file.categories.hidden
    }

    pub fn is_category_hidden(&self, category: &str) -> bool {
        self.file.categories.hidden.contains(category)
    }

    /// Returns true when the hidden set changed.
    pub fn set_category_hidden(&mut self, category: &str, hidden: bool) -> bool {
        if hidden {
            self.file.categories.hidden.insert(category.to_string())
        } else {
            self.file.categories.hidden.remove(category)
        }
    }

    pub fn frequently_used(&self) -> &[UsageEntry] {
        &self.file.frequently_used
    }

    /// Increment the usage counter for `name`, creating the entry on first use.
    /// Returns the new count.
    pub fn record_usage(&mut self, name: &str) -> u32 {
        if let Some(entry) = self
            .file
            .frequently_used
            .iter_mut()
            .find(|e| e.name == name)
        {
            entry.count = entry.count.saturating_add(1);
            return entry.count;
        }
        self.file.frequently_used.push(UsageEntry::new(name, 1));
        1
    }

    /// Drop usage entries rejected by `keep`. Returns how many were removed.
    pub fn retain_frequently_used<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&UsageEntry) -> bool,
    {
        let before = self.file.frequently_used.len();
        self.file.frequently_used.retain(|e| keep(e));
        let removed = before - self.file.frequently_used.len();
        if removed > 0 {
            info!(target: "config", removed, "frequently_used_pruned");
        }
        removed
    }

    /// Serialize the current state back to `path`, creating the parent directory.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config dir {}", parent.display()))?;
        }
        let text = toml::to_string_pretty(&self.file).context("serializing config")?;
        fs::write(path, text).with_context(|| format!("writing config {}", path.display()))?;
        info!(target: "config", path = %path.display(), "config_saved");
        Ok(())
    }
}
