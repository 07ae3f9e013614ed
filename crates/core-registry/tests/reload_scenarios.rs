//! Reload cycle behavior: clearing, builtin persistence, summary and finalize ordering.

use core_registry::{AssetHandle, CATEGORY_DEFAULT, EmojiRegistry};
use proptest::prelude::*;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::Level;
use tracing::subscriber::with_default;
use tracing_subscriber::fmt::MakeWriter;

fn asset(path: &str) -> AssetHandle {
    AssetHandle::new("pack", path)
}

#[derive(Clone)]
struct BufferWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

struct LockedWriter<'a> {
    guard: MutexGuard<'a, Vec<u8>>,
}

impl<'a> Write for LockedWriter<'a> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for BufferWriter {
    type Writer = LockedWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LockedWriter {
            guard: self.inner.lock().expect("log buffer poisoned"),
        }
    }
}

#[test]
fn reload_replaces_previous_user_emojis_and_keeps_builtins() {
    let reg = EmojiRegistry::new();
    assert_eq!(reg.len(), 5);

    reg.reload(vec![asset("emoji/smile.png"), asset("emoji/food/taco.gif")]);
    assert!(reg.contains("smile"));
    assert!(reg.contains("taco"));
    assert!(reg.contains("cutie"));
    assert_eq!(reg.len(), 7);

    reg.reload(vec![asset("emoji/wave.png")]);
    assert!(!reg.contains("smile"));
    assert!(!reg.contains("taco"));
    assert!(reg.emojis_in_category("food").is_none());
    assert!(reg.contains("wave"));
    assert!(reg.contains("cutie"));
    assert_eq!(reg.len(), 6);
}

#[test]
fn builtin_returns_after_user_override_disappears() {
    let reg = EmojiRegistry::new();
    reg.reload(vec![asset("emoji/huh.png")]);
    assert!(!reg.lookup("huh").unwrap().is_builtin());
    reg.reload(Vec::new());
    assert!(reg.lookup("huh").unwrap().is_builtin());
}

#[test]
fn summary_counts_each_outcome() {
    let reg = EmojiRegistry::new();
    let summary = reg.reload(vec![
        asset("emoji/smile.png"),
        asset("emoji/other/Smile.png"),
        asset("emoji/readme.md"),
        asset("emoji/huh.gif"),
    ]);
    assert_eq!(summary.loaded, 3);
    assert_eq!(summary.renamed, 1);
    assert_eq!(summary.replaced_builtin, 1);
    assert_eq!(summary.invalid, 1);
    assert_eq!(summary.duplicates, 0);
    assert_eq!(summary.total, 7);
}

#[test]
fn reload_logs_one_completion_summary() {
    let reg = EmojiRegistry::with_builtins(Vec::new());
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(true)
        .with_ansi(false)
        .without_time()
        .with_writer(BufferWriter {
            inner: buffer.clone(),
        })
        .finish();

    with_default(subscriber, || {
        reg.reload(vec![asset("emoji/smile.png")]);
        reg.reload(Vec::new());
    });

    let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    assert_eq!(log_output.matches("reload_complete total=").count(), 1);
    assert!(log_output.contains("INFO registry.reload:"));
    assert!(log_output.contains("reload_complete_empty"));
}

#[test]
fn flat_assets_land_in_default_category() {
    let reg = EmojiRegistry::with_builtins(Vec::new());
    reg.reload(vec![asset("emoji/b.png"), asset("emoji/a.png")]);
    let names: Vec<String> = reg
        .emojis_in_category(CATEGORY_DEFAULT)
        .unwrap()
        .iter()
        .map(|e| e.name().to_string())
        .collect();
    assert_eq!(names, vec!["a", "b"]);
}

proptest! {
    #[test]
    fn categories_sorted_and_unique_after_reload(
        entries in prop::collection::vec(("[a-c]{1}", "[A-Za-z0-9_ -]{1,6}", prop::bool::ANY), 0..40)
    ) {
        let reg = EmojiRegistry::new();
        let assets: Vec<AssetHandle> = entries
            .iter()
            .map(|(cat, name, gif)| asset(&format!("emoji/{cat}/{name}.{}", if *gif { "gif" } else { "png" })))
            .collect();
        reg.reload(assets);

        let mut seen = std::collections::BTreeSet::new();
        for category in reg.categories() {
            let names: Vec<String> = reg
                .emojis_in_category(&category)
                .unwrap()
                .iter()
                .map(|e| e.name().to_string())
                .collect();
            let mut sorted = names.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(&names, &sorted);
            for n in names {
                prop_assert!(seen.insert(n), "name listed in two categories");
            }
        }
        prop_assert_eq!(seen.len(), reg.len());
    }
}
