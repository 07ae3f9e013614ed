//! Idle-expiring cache of [`TextProcessor`]s keyed by source text.
//!
//! Entries expire once the time since their *last access* exceeds the idle
//! window (sliding TTL). Expired entries are dropped lazily: a hit on an
//! expired entry rebuilds it, and `get` sweeps the whole map at most once per
//! idle window.
//!
//! Every slot records the registry generation its processor was built
//! against. A slot from another generation counts as expired, so a processor
//! built while a reload was running never outlives that reload.
//!
//! A miss is get-or-compute without single flight. Concurrent misses on one
//! key may each build a processor; the last write stays cached. Hits only
//! take the shard's read lock. If the shard is busy when a fresh processor is
//! stored, it is returned uncached.

use crate::processor::TextProcessor;
use core_registry::EmojiRegistry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

pub const DEFAULT_IDLE: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct CacheSlot {
    processor: Arc<TextProcessor>,
    generation: u64,
    last_access: Mutex<Instant>,
}

impl CacheSlot {
    fn touch(&self, now: Instant) {
        let mut last = self.last_access.lock();
        *last = (*last).max(now);
    }

    fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(*self.last_access.lock())
    }
}

pub struct ProcessorCache {
    registry: Arc<EmojiRegistry>,
    entries: DashMap<String, CacheSlot>,
    idle: Duration,
    last_sweep: Mutex<Instant>,
}

impl ProcessorCache {
    pub fn new(registry: Arc<EmojiRegistry>) -> Self {
        Self::with_idle(registry, DEFAULT_IDLE)
    }

    pub fn with_idle(registry: Arc<EmojiRegistry>, idle: Duration) -> Self {
        Self {
            registry,
            entries: DashMap::new(),
            idle,
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    pub fn idle(&self) -> Duration {
        self.idle
    }

    pub fn registry(&self) -> &Arc<EmojiRegistry> {
        &self.registry
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, text: Option<&str>) -> Arc<TextProcessor> {
        self.get_at(text, Instant::now())
    }

    /// [`Self::get`] against an explicit clock reading.
    pub fn get_at(&self, text: Option<&str>, now: Instant) -> Arc<TextProcessor> {
        let Some(text) = text.filter(|t| !t.is_empty()) else {
            return TextProcessor::empty();
        };
        self.maybe_sweep(now);

        let generation = self.registry.generation();
        if let Some(slot) = self.entries.get(text)
            && !self.is_stale(&slot, generation, now)
        {
            slot.touch(now);
            return Arc::clone(&slot.processor);
        }

        let processor = Arc::new(TextProcessor::new(text, &self.registry));
        self.store(text, &processor, generation, now);
        processor
    }

    /// Cache `processor`, built against registry `generation`. Skipped when the
    /// shard is busy.
    fn store(&self, text: &str, processor: &Arc<TextProcessor>, generation: u64, now: Instant) {
        match self.entries.try_entry(text.to_string()) {
            Some(entry) => {
                entry.insert(CacheSlot {
                    processor: Arc::clone(processor),
                    generation,
                    last_access: Mutex::new(now),
                });
            }
            None => trace!(target: "text.cache", "cache_store_skipped_contended"),
        }
    }

    fn is_stale(&self, slot: &CacheSlot, generation: u64, now: Instant) -> bool {
        slot.generation != generation || slot.idle_for(now) > self.idle
    }

    fn maybe_sweep(&self, now: Instant) {
        let Some(mut last) = self.last_sweep.try_lock() else {
            return; // another caller is sweeping
        };
        if now.saturating_duration_since(*last) < self.idle {
            return;
        }
        *last = now;
        drop(last);
        self.sweep(now);
    }

    /// Drop every entry idle for longer than the window or built against an
    /// older catalog. Returns the number removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let generation = self.registry.generation();
        let before = self.entries.len();
        self.entries.retain(|_, slot| !self.is_stale(slot, generation, now));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(target: "text.cache", removed, remaining = self.entries.len(), "cache_swept");
        }
        removed
    }

    /// Drop every cached processor, e.g. after the catalog was reloaded.
    pub fn clear(&self) {
        let removed = self.entries.len();
        self.entries.clear();
        debug!(target: "text.cache", removed, "cache_cleared");
    }
}
