//! End-to-end properties of processed text as seen by the renderer.

use core_registry::{AssetHandle, EmojiRegistry};
use core_text::{PLACEHOLDER, ProcessorCache, TextProcessor};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn registry() -> Arc<EmojiRegistry> {
    let reg = EmojiRegistry::with_builtins(Vec::new());
    reg.reload(
        ["smile", "wave", "cat_2"]
            .iter()
            .map(|n| AssetHandle::new("pack", format!("emoji/{n}.png"))),
    );
    Arc::new(reg)
}

#[test]
fn processed_text_after_reload_resolves_known_tokens() {
    let reg = registry();
    let p = TextProcessor::new(":wave: hello :cat_2: :dog:", &reg);
    assert_eq!(
        p.processed_text(),
        format!("{PLACEHOLDER} hello {PLACEHOLDER} :dog:")
    );
    let names: Vec<&str> = p.literals().map(|(_, l)| l.emoji().name()).collect();
    assert_eq!(names, vec!["wave", "cat_2"]);
}

#[test]
fn concurrent_cache_access_converges() {
    let cache = ProcessorCache::with_idle(registry(), Duration::from_secs(60));
    let texts = ["a :smile:", "b \\:wave:", "c :nope:", ""];

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let cache = &cache;
            scope.spawn(move || {
                for _ in 0..200 {
                    for text in texts {
                        let p = cache.get(Some(text));
                        assert_eq!(p.source_text(), text);
                    }
                }
            });
        }
    });

    // Contended misses may skip the store; a quiet pass settles every key.
    for text in texts {
        cache.get(Some(text));
    }
    assert_eq!(cache.len(), 3);
    let p = cache.get(Some("b \\:wave:"));
    assert_eq!(p.processed_text(), "b :wave:");
}

proptest! {
    // Every index entry points at a placeholder (icon) or at the opening colon
    // of a literal code (escaped), and entries come in ascending order.
    #[test]
    fn index_positions_point_at_substitutions(
        parts in prop::collection::vec(
            prop_oneof![
                Just(":smile:".to_string()),
                Just("\\:wave:".to_string()),
                Just(":unknown:".to_string()),
                "[a-zé ✨:]{0,4}",
            ],
            0..12,
        )
    ) {
        let reg = registry();
        let src: String = parts.concat();
        let p = TextProcessor::new(&src, &reg);
        let chars: Vec<char> = p.processed_text().chars().collect();
        let mut last: Option<usize> = None;
        for (pos, lit) in p.literals() {
            if let Some(prev) = last {
                prop_assert!(pos > prev);
            }
            last = Some(pos);
            if lit.is_escaped() {
                let code: String = chars[pos..pos + lit.emoji().code().chars().count()].iter().collect();
                prop_assert_eq!(code, lit.emoji().code());
            } else {
                prop_assert_eq!(chars[pos], PLACEHOLDER);
            }
        }
        let placeholders = chars.iter().filter(|c| **c == PLACEHOLDER).count();
        let icons = p.literals().filter(|(_, l)| !l.is_escaped()).count();
        prop_assert_eq!(placeholders, icons);
    }
}
