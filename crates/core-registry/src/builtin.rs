//! Emojis shipped with the application. Seeded once per registry and kept
//! across reloads unless a user asset claims the same name.

use crate::asset::AssetHandle;

pub const BUILTIN_NAMESPACE: &str = "emote";

pub const BUILTIN_PATHS: &[&str] = &[
    "emoji/cutie.png",
    "emoji/huh.png",
    "emoji/minecraft.gif",
    "emoji/stupid_exited.png",
    "emoji/waving_hand.gif",
];

pub fn builtin_assets() -> Vec<AssetHandle> {
    BUILTIN_PATHS
        .iter()
        .map(|path| AssetHandle::new(BUILTIN_NAMESPACE, *path))
        .collect()
}
