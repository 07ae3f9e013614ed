//! Directory-backed asset discovery.
//!
//! Each root directory is one resource pack: files below `<root>/emoji/` are
//! offered to the registry as `emoji/<relative path>` under a namespace
//! derived from the root's directory name. Files are not filtered by
//! extension here; the registry decides what is a valid emoji asset.
//!
//! Unreadable subdirectories are logged and skipped so that one bad folder
//! never aborts a reload.

use anyhow::Result;
use core_registry::{AssetHandle, normalize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const EMOJI_DIR: &str = "emoji";
pub const FALLBACK_NAMESPACE: &str = "user";

pub fn namespace_for(root: &Path) -> String {
    root.file_name()
        .map(|n| normalize(&n.to_string_lossy()))
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| FALLBACK_NAMESPACE.to_string())
}

/// Enumerate every file under each root's `emoji/` directory. Each asset is
/// reported once, in a stable order.
pub fn discover(roots: &[PathBuf]) -> Result<Vec<AssetHandle>> {
    let mut found = BTreeSet::new();
    for root in roots {
        let emoji_dir = root.join(EMOJI_DIR);
        if !emoji_dir.is_dir() {
            warn!(target: "loader", root = %root.display(), "emoji_dir_missing");
            continue;
        }
        let namespace = namespace_for(&fs::canonicalize(root)?);
        let before = found.len();
        walk(&emoji_dir, EMOJI_DIR, &namespace, &mut found);
        debug!(
            target: "loader",
            root = %root.display(),
            namespace = namespace.as_str(),
            assets = found.len() - before,
            "root_scanned"
        );
    }
    Ok(found.into_iter().collect())
}

fn walk(dir: &Path, rel: &str, namespace: &str, out: &mut BTreeSet<AssetHandle>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(target: "loader", dir = %dir.display(), error = %e, "dir_unreadable");
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name();
        let rel_path = format!("{rel}/{}", name.to_string_lossy());
        if path.is_dir() {
            walk(&path, &rel_path, namespace, out);
        } else if path.is_file() {
            out.insert(AssetHandle::new(namespace, rel_path));
        }
    }
}
