use crate::asset::{AssetHandle, MediaKind};

/// Immutable catalog record. Created once during registration and replaced
/// wholesale on the next reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emoji {
    name: String,
    code: String,
    asset: AssetHandle,
    category: String,
    kind: MediaKind,
    builtin: bool,
}

impl Emoji {
    pub fn new(
        name: impl Into<String>,
        asset: AssetHandle,
        category: impl Into<String>,
        kind: MediaKind,
        builtin: bool,
    ) -> Self {
        let name = name.into();
        Self {
            code: code_for(&name),
            name,
            asset,
            category: category.into(),
            kind,
            builtin,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display token, always `:name:`.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn asset(&self) -> &AssetHandle {
        &self.asset
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn is_animated(&self) -> bool {
        self.kind == MediaKind::Animated
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin
    }
}

pub fn code_for(name: &str) -> String {
    format!(":{name}:")
}
