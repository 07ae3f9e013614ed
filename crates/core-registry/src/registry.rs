//! Canonical emoji catalog: normalized name → [`Emoji`], category → sorted names.
//!
//! Invariants (hold after every completed reload):
//! - Every name listed under a category exists in the name map and vice versa.
//! - A name appears in exactly one category list; lists are sorted ascending
//!   and contain no duplicates.
//! - Names are unique. Collisions between distinct assets are resolved by
//!   claiming `raw0`, `raw1`, ... through the map's entry API, so the
//!   check-and-insert for a candidate name is a single atomic step even when
//!   registrations run on several threads.
//!
//! Reads never wait for a reload. A reload clears the maps before repopulating
//! them, so readers may briefly observe an empty (or partial) catalog.

use crate::asset::{AssetHandle, ParsedAsset};
use crate::builtin::builtin_assets;
use crate::emoji::Emoji;
use crate::error::{RegisterError, Registration};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::hash::BuildHasher;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub const CATEGORY_LANG_KEY_PREFIX: &str = "emote.category.";

// -------------------------------------------------------------------------------------------------
// Localization hook
// -------------------------------------------------------------------------------------------------
/// Pluggable lookup for localized category names. Keys have the form
/// `emote.category.<id>`; returning `None` selects the humanized fallback.
pub trait CategoryLocalizer: Send + Sync {
    fn localize(&self, key: &str) -> Option<String>;
}

/// Default localizer: never has a translation.
pub struct NoLocalization;

impl CategoryLocalizer for NoLocalization {
    fn localize(&self, _key: &str) -> Option<String> {
        None
    }
}

impl<S: BuildHasher + Send + Sync> CategoryLocalizer for HashMap<String, String, S> {
    fn localize(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Capitalize the first char and turn underscores into spaces.
pub fn humanize_category(category: &str) -> String {
    let mut chars = category.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    first
        .to_uppercase()
        .chain(chars)
        .map(|c| if c == '_' { ' ' } else { c })
        .collect()
}

// -------------------------------------------------------------------------------------------------
// Reload summary
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReloadSummary {
    /// Catalog size after the reload, builtins included.
    pub total: usize,
    /// User assets stored (bare, renamed or replacing a builtin).
    pub loaded: usize,
    pub renamed: usize,
    pub replaced_builtin: usize,
    pub duplicates: usize,
    pub invalid: usize,
    pub elapsed: Duration,
}

#[derive(Default)]
struct ReloadTally {
    loaded: AtomicUsize,
    renamed: AtomicUsize,
    replaced_builtin: AtomicUsize,
    duplicates: AtomicUsize,
    invalid: AtomicUsize,
}

impl ReloadTally {
    fn record(&self, outcome: &Result<Registration, RegisterError>) {
        let counter = match outcome {
            Ok(Registration::Inserted(_)) => None,
            Ok(Registration::Renamed { .. }) => Some(&self.renamed),
            Ok(Registration::ReplacedBuiltin(_)) => Some(&self.replaced_builtin),
            Ok(Registration::AlreadyDefined(_)) => Some(&self.duplicates),
            Err(RegisterError::InvalidAsset { .. }) => Some(&self.invalid),
        };
        if let Some(counter) = counter {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        if matches!(outcome, Ok(reg) if reg.is_new()) {
            self.loaded.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn finish(&self, total: usize, elapsed: Duration) -> ReloadSummary {
        ReloadSummary {
            total,
            loaded: self.loaded.load(Ordering::Relaxed),
            renamed: self.renamed.load(Ordering::Relaxed),
            replaced_builtin: self.replaced_builtin.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            invalid: self.invalid.load(Ordering::Relaxed),
            elapsed,
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Registry
// -------------------------------------------------------------------------------------------------
pub struct EmojiRegistry {
    names: DashMap<String, Arc<Emoji>>,
    categories: DashMap<String, Vec<String>>,
    seeds: Vec<Arc<Emoji>>,
    use_builtin: AtomicBool,
    generation: AtomicU64,
    reload_lock: Mutex<()>,
}

impl Default for EmojiRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EmojiRegistry {
    /// Registry seeded with the shipped builtin set.
    pub fn new() -> Self {
        Self::with_builtins(builtin_assets())
    }

    /// Registry seeded with a caller-provided builtin set (may be empty).
    pub fn with_builtins(assets: impl IntoIterator<Item = AssetHandle>) -> Self {
        let seeds = assets
            .into_iter()
            .filter_map(|asset| match ParsedAsset::parse(&asset) {
                Ok(parsed) => Some(Arc::new(Emoji::new(
                    parsed.name,
                    asset,
                    parsed.category,
                    parsed.kind,
                    true,
                ))),
                Err(e) => {
                    error!(target: "registry", error = %e, "builtin_invalid");
                    None
                }
            })
            .collect();
        let registry = Self {
            names: DashMap::new(),
            categories: DashMap::new(),
            seeds,
            use_builtin: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            reload_lock: Mutex::new(()),
        };
        registry.seed_builtins();
        registry.finalize();
        registry
    }

    /// When enabled, builtins count as user emojis for [`Self::all_codes`] and
    /// [`Self::random_emoji`].
    pub fn set_use_builtin(&self, enabled: bool) {
        self.use_builtin.store(enabled, Ordering::Relaxed);
    }

    pub fn uses_builtin(&self) -> bool {
        self.use_builtin.load(Ordering::Relaxed)
    }

    /// Reload counter. Bumped when a reload starts and again once it has
    /// finalized, so any value observed mid-reload is stale afterwards.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn is_suggestable(&self, emoji: &Emoji) -> bool {
        self.uses_builtin() || !emoji.is_builtin()
    }

    fn seed_builtins(&self) {
        for seed in &self.seeds {
            if let Entry::Vacant(slot) = self.names.entry(seed.name().to_string()) {
                self.file_in_category(seed);
                slot.insert(seed.clone());
            }
        }
    }

    fn file_in_category(&self, emoji: &Emoji) {
        let mut names = self
            .categories
            .entry(emoji.category().to_string())
            .or_default();
        if !names.iter().any(|n| n == emoji.name()) {
            names.push(emoji.name().to_string());
        }
    }

    fn unfile_from_category(&self, emoji: &Emoji) {
        if let Some(mut names) = self.categories.get_mut(emoji.category()) {
            names.retain(|n| n != emoji.name());
        }
    }

    /// Register one asset. Safe to call from several threads at once.
    ///
    /// Collision policy, evaluated per candidate name (`raw`, `raw0`, `raw1`, ...):
    /// free → claim it; held by the same asset → `AlreadyDefined`; bare name
    /// held by a builtin → the user asset replaces it; otherwise → next suffix.
    /// A builtin holding a suffixed candidate is never evicted.
    pub fn register(&self, asset: &AssetHandle) -> Result<Registration, RegisterError> {
        let parsed = match ParsedAsset::parse(asset) {
            Ok(p) => p,
            Err(e) => {
                error!(target: "registry", asset = %asset, "asset_invalid");
                return Err(e);
            }
        };
        let make = |name: String| {
            Arc::new(Emoji::new(
                name,
                asset.clone(),
                parsed.category.clone(),
                parsed.kind,
                false,
            ))
        };

        let mut suffix: Option<u32> = None;
        loop {
            let candidate = match suffix {
                None => parsed.name.clone(),
                Some(n) => format!("{}{n}", parsed.name),
            };
            // The entry guard holds the shard lock for `candidate` until this arm ends,
            // so no other registration can claim the same name in between.
            match self.names.entry(candidate) {
                Entry::Vacant(slot) => {
                    let emoji = make(slot.key().clone());
                    self.file_in_category(&emoji);
                    slot.insert(emoji.clone());
                    debug!(
                        target: "registry",
                        asset = %asset,
                        code = emoji.code(),
                        category = emoji.category(),
                        "emoji_loaded"
                    );
                    return Ok(match suffix {
                        None => Registration::Inserted(emoji),
                        Some(_) => {
                            debug!(
                                target: "registry",
                                requested = parsed.name.as_str(),
                                assigned = emoji.name(),
                                "name_collision_resolved"
                            );
                            Registration::Renamed {
                                requested: parsed.name.clone(),
                                emoji,
                            }
                        }
                    });
                }
                Entry::Occupied(mut slot) => {
                    let existing = slot.get().clone();
                    if existing.asset() == asset {
                        warn!(target: "registry", asset = %asset, "asset_already_defined");
                        return Ok(Registration::AlreadyDefined(existing));
                    }
                    if suffix.is_none() && existing.is_builtin() {
                        let emoji = make(slot.key().clone());
                        self.unfile_from_category(&existing);
                        self.file_in_category(&emoji);
                        slot.insert(emoji.clone());
                        debug!(
                            target: "registry",
                            asset = %asset,
                            code = emoji.code(),
                            "builtin_replaced"
                        );
                        return Ok(Registration::ReplacedBuiltin(emoji));
                    }
                    suffix = Some(suffix.map_or(0, |n| n + 1));
                }
            }
        }
    }

    /// Sort every category list and drop categories left empty. Must run after
    /// every `register` call of the cycle has returned.
    pub fn finalize(&self) {
        self.categories.iter_mut().for_each(|mut entry| {
            let names = entry.value_mut();
            names.sort_unstable();
            names.dedup();
        });
        self.categories.retain(|_, names| !names.is_empty());
    }

    fn clear(&self) {
        self.names.clear();
        self.categories.clear();
    }

    /// Clear and repopulate the catalog from `assets`. Registration runs in
    /// parallel; categories are finalized once every registration has joined.
    /// Per-asset failures are counted, never propagated.
    pub fn reload(&self, assets: impl IntoIterator<Item = AssetHandle>) -> ReloadSummary {
        let _serialized = self.reload_lock.lock();
        let started = Instant::now();
        let assets: Vec<AssetHandle> = assets.into_iter().collect();
        info!(target: "registry.reload", assets = assets.len(), "reload_started");

        self.generation.fetch_add(1, Ordering::AcqRel);
        self.clear();
        self.seed_builtins();

        let tally = ReloadTally::default();
        assets
            .par_iter()
            .for_each(|asset| tally.record(&self.register(asset)));
        // par_iter().for_each returns only after every worker finished: finalize barrier.
        self.finalize();
        self.generation.fetch_add(1, Ordering::AcqRel);

        let summary = tally.finish(self.names.len(), started.elapsed());
        if summary.total > 0 {
            info!(
                target: "registry.reload",
                total = summary.total,
                loaded = summary.loaded,
                renamed = summary.renamed,
                replaced_builtin = summary.replaced_builtin,
                duplicates = summary.duplicates,
                invalid = summary.invalid,
                elapsed_ms = summary.elapsed.as_millis() as u64,
                "reload_complete"
            );
        } else {
            info!(
                target: "registry.reload",
                invalid = summary.invalid,
                elapsed_ms = summary.elapsed.as_millis() as u64,
                "reload_complete_empty"
            );
        }
        summary
    }

    // ---------------------------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<Emoji>> {
        self.names.get(name).map(|e| e.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn categories(&self) -> BTreeSet<String> {
        self.categories.iter().map(|e| e.key().clone()).collect()
    }

    /// Emojis of `category` in sorted name order, `None` for an unknown category.
    pub fn emojis_in_category(&self, category: &str) -> Option<Vec<Arc<Emoji>>> {
        // Clone the list first so no category shard lock is held during lookups.
        let names = self.categories.get(category)?.value().clone();
        Some(names.iter().filter_map(|n| self.lookup(n)).collect())
    }

    /// Emojis offered to suggestion consumers, sorted by name.
    pub fn suggestable_emojis(&self) -> Vec<Arc<Emoji>> {
        let mut out: Vec<Arc<Emoji>> = self
            .names
            .iter()
            .filter(|e| self.is_suggestable(e.value()))
            .map(|e| e.value().clone())
            .collect();
        out.sort_unstable_by(|a, b| a.name().cmp(b.name()));
        out
    }

    /// Display codes (`:name:`) for autocomplete, builtins filtered by policy.
    pub fn all_codes(&self) -> Vec<String> {
        self.suggestable_emojis()
            .iter()
            .map(|e| e.code().to_string())
            .collect()
    }

    pub fn random_emoji(&self, include_builtin_if_no_user_emojis: bool) -> Option<Arc<Emoji>> {
        self.random_emoji_with(include_builtin_if_no_user_emojis, &mut fastrand::Rng::new())
    }

    /// Uniform pick over suggestable emojis. With none available and the flag
    /// set, falls back to a uniform pick over the whole catalog.
    pub fn random_emoji_with(
        &self,
        include_builtin_if_no_user_emojis: bool,
        rng: &mut fastrand::Rng,
    ) -> Option<Arc<Emoji>> {
        let mut pool = self.suggestable_emojis();
        if pool.is_empty() && include_builtin_if_no_user_emojis {
            pool = self.names.iter().map(|e| e.value().clone()).collect();
            pool.sort_unstable_by(|a, b| a.name().cmp(b.name()));
        }
        if pool.is_empty() {
            return None;
        }
        let idx = rng.usize(..pool.len());
        Some(pool.swap_remove(idx))
    }

    /// Localized category name, or the humanized id when no translation exists.
    pub fn display_name(&self, category: &str, localizer: &dyn CategoryLocalizer) -> String {
        let key = format!("{CATEGORY_LANG_KEY_PREFIX}{category}");
        localizer
            .localize(&key)
            .unwrap_or_else(|| humanize_category(category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::CATEGORY_DEFAULT;
    use pretty_assertions::assert_eq;

    fn asset(path: &str) -> AssetHandle {
        AssetHandle::new("pack", path)
    }

    fn empty_registry() -> EmojiRegistry {
        EmojiRegistry::with_builtins(Vec::new())
    }

    #[test]
    fn registered_name_is_retrievable_with_code() {
        let reg = empty_registry();
        let out = reg.register(&asset("emoji/smile.png")).unwrap();
        assert!(matches!(out, Registration::Inserted(_)));
        assert!(reg.contains("smile"));
        let emoji = reg.lookup("smile").unwrap();
        assert_eq!(emoji.code(), ":smile:");
        assert_eq!(emoji.category(), CATEGORY_DEFAULT);
        assert!(!emoji.is_animated());
        assert!(!emoji.is_builtin());
    }

    #[test]
    fn collision_assigns_lowest_free_suffix() {
        let reg = empty_registry();
        reg.register(&asset("emoji/a/smile.png")).unwrap();
        let second = reg.register(&asset("emoji/b/smile.gif")).unwrap();
        let third = reg.register(&asset("emoji/c/Smile.png")).unwrap();
        assert!(
            matches!(&second, Registration::Renamed { requested, emoji } if requested == "smile" && emoji.name() == "smile0")
        );
        assert_eq!(third.emoji().name(), "smile1");
        assert_eq!(reg.lookup("smile").unwrap().asset(), &asset("emoji/a/smile.png"));
        assert!(reg.lookup("smile0").unwrap().is_animated());
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn identical_asset_twice_is_noop() {
        let reg = empty_registry();
        reg.register(&asset("emoji/smile.png")).unwrap();
        reg.register(&asset("emoji/x/smile.png")).unwrap();
        let again = reg.register(&asset("emoji/x/smile.png")).unwrap();
        assert!(matches!(again, Registration::AlreadyDefined(_)));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn invalid_extension_is_rejected() {
        let reg = empty_registry();
        let err = reg.register(&asset("emoji/notes.txt")).unwrap_err();
        assert_eq!(
            err,
            RegisterError::InvalidAsset {
                asset: "pack:emoji/notes.txt".into()
            }
        );
        assert!(reg.is_empty());
    }

    #[test]
    fn user_asset_replaces_builtin_and_moves_category() {
        let reg = EmojiRegistry::new();
        assert!(reg.lookup("huh").unwrap().is_builtin());
        let out = reg.register(&asset("emoji/reactions/huh.png")).unwrap();
        assert!(matches!(out, Registration::ReplacedBuiltin(_)));
        reg.finalize();
        let huh = reg.lookup("huh").unwrap();
        assert!(!huh.is_builtin());
        assert_eq!(huh.category(), "reactions");
        let other: Vec<String> = reg
            .emojis_in_category(CATEGORY_DEFAULT)
            .unwrap()
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        assert!(!other.contains(&"huh".to_string()));
    }

    #[test]
    fn builtin_on_suffixed_name_is_skipped_not_replaced() {
        let reg = EmojiRegistry::with_builtins([AssetHandle::new("emote", "emoji/dup0.png")]);
        reg.register(&asset("emoji/a/dup.png")).unwrap();
        let out = reg.register(&asset("emoji/b/dup.png")).unwrap();
        match out {
            Registration::Renamed { requested, emoji } => {
                assert_eq!(requested, "dup");
                assert_eq!(emoji.name(), "dup1");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(reg.lookup("dup0").unwrap().is_builtin());

        let bare = reg.register(&asset("emoji/c/dup0.png")).unwrap();
        assert!(matches!(bare, Registration::ReplacedBuiltin(_)));
    }

    #[test]
    fn reload_advances_generation() {
        let reg = empty_registry();
        let before = reg.generation();
        reg.reload(vec![asset("emoji/smile.png")]);
        assert_eq!(reg.generation(), before + 2);
    }

    #[test]
    fn categories_sorted_after_finalize() {
        let reg = empty_registry();
        for name in ["zeta", "alpha", "mid"] {
            reg.register(&asset(&format!("emoji/food/{name}.png"))).unwrap();
        }
        reg.finalize();
        let names: Vec<String> = reg
            .emojis_in_category("food")
            .unwrap()
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
        assert!(reg.emojis_in_category("nope").is_none());
        assert_eq!(reg.categories().into_iter().collect::<Vec<_>>(), vec!["food"]);
    }

    #[test]
    fn random_and_codes_exclude_builtins_by_default() {
        let reg = EmojiRegistry::new();
        let mut rng = fastrand::Rng::with_seed(7);
        assert!(reg.random_emoji_with(false, &mut rng).is_none());
        assert!(reg.random_emoji_with(true, &mut rng).unwrap().is_builtin());
        assert!(reg.all_codes().is_empty());

        reg.register(&asset("emoji/smile.png")).unwrap();
        for _ in 0..16 {
            let pick = reg.random_emoji_with(true, &mut rng).unwrap();
            assert_eq!(pick.name(), "smile");
        }
        assert_eq!(reg.all_codes(), vec![":smile:".to_string()]);

        reg.set_use_builtin(true);
        assert_eq!(reg.all_codes().len(), 6);
    }

    #[test]
    fn display_name_prefers_localization() {
        let reg = empty_registry();
        assert_eq!(reg.display_name("food_and_drink", &NoLocalization), "Food and drink");
        let mut lang = HashMap::new();
        lang.insert("emote.category.food_and_drink".to_string(), "Essen".to_string());
        assert_eq!(reg.display_name("food_and_drink", &lang), "Essen");
        assert_eq!(humanize_category(""), "");
    }
}
