//! Asset handles and the path → (name, category, media kind) derivation.
//!
//! Contract:
//! - Input paths look like `emoji/[<category>/]<name>.<ext>` with `<ext>` one of
//!   `png` / `gif` (case-insensitive).
//! - Names and categories are normalized: lowercase, every char outside
//!   `[a-z0-9_]` becomes `_`.
//! - Any other extension, or an empty file stem, is rejected with
//!   [`RegisterError::InvalidAsset`].

use crate::error::RegisterError;
use std::fmt;

pub const EMOJI_PATH_PREFIX: &str = "emoji/";
pub const CATEGORY_DEFAULT: &str = "other";
pub const STATIC_EXTENSION: &str = "png";
pub const ANIMATED_EXTENSION: &str = "gif";

/// Opaque handle to one discovered image resource. Equality is identity:
/// the same namespace + path always denotes the same asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetHandle {
    namespace: String,
    path: String,
}

impl AssetHandle {
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            path: path.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Static,
    Animated,
}

impl MediaKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case(STATIC_EXTENSION) {
            Some(Self::Static)
        } else if ext.eq_ignore_ascii_case(ANIMATED_EXTENSION) {
            Some(Self::Animated)
        } else {
            None
        }
    }
}

/// Normalize a raw file stem or directory name into a registry key.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_lowercase)
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Name, category and media kind derived from an asset path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAsset {
    pub name: String,
    pub category: String,
    pub kind: MediaKind,
}

impl ParsedAsset {
    pub fn parse(asset: &AssetHandle) -> Result<Self, RegisterError> {
        let invalid = || RegisterError::InvalidAsset {
            asset: asset.to_string(),
        };
        let path = asset.path();
        let file = path.rsplit('/').next().unwrap_or(path);
        let (stem, ext) = file.rsplit_once('.').ok_or_else(invalid)?;
        let kind = MediaKind::from_extension(ext).ok_or_else(invalid)?;
        if stem.is_empty() {
            return Err(invalid());
        }

        // Directory segment right after the prefix, if the file is nested at all.
        let rest = path.strip_prefix(EMOJI_PATH_PREFIX).unwrap_or(path);
        let category = match rest.split_once('/') {
            Some((dir, _)) if !dir.is_empty() => normalize(dir),
            _ => CATEGORY_DEFAULT.to_string(),
        };

        Ok(Self {
            name: normalize(stem),
            category,
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse(path: &str) -> Result<ParsedAsset, RegisterError> {
        ParsedAsset::parse(&AssetHandle::new("pack", path))
    }

    #[test]
    fn flat_path_uses_default_category() {
        let p = parse("emoji/Smile.png").unwrap();
        assert_eq!(p.name, "smile");
        assert_eq!(p.category, CATEGORY_DEFAULT);
        assert_eq!(p.kind, MediaKind::Static);
    }

    #[test]
    fn nested_path_takes_first_directory_as_category() {
        let p = parse("emoji/Food Stuff/deep/Hot-Dog.GIF").unwrap();
        assert_eq!(p.name, "hot_dog");
        assert_eq!(p.category, "food_stuff");
        assert_eq!(p.kind, MediaKind::Animated);
    }

    #[test]
    fn unknown_extension_is_invalid() {
        assert!(matches!(
            parse("emoji/readme.txt"),
            Err(RegisterError::InvalidAsset { .. })
        ));
        assert!(parse("emoji/noext").is_err());
        assert!(parse("emoji/.png").is_err());
    }

    #[test]
    fn only_last_extension_is_stripped() {
        let p = parse("emoji/party.face.png").unwrap();
        assert_eq!(p.name, "party_face");
    }

    #[test]
    fn non_ascii_chars_become_underscores() {
        assert_eq!(normalize("Café✨"), "caf__");
    }

    proptest! {
        #[test]
        fn normalized_names_stay_in_alphabet(raw in "\\PC{1,24}") {
            let n = normalize(&raw);
            prop_assert!(n.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
            prop_assert_eq!(normalize(&n), n.clone());
        }
    }
}
