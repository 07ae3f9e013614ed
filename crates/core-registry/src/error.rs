use std::sync::Arc;
use thiserror::Error;

use crate::emoji::Emoji;

/// Per-asset registration failure. A failed asset is skipped; the reload
/// carries on with the rest of the stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("invalid emoji asset {asset}: expected a .png or .gif file with a non-empty name")]
    InvalidAsset { asset: String },
}

/// Successful outcome of [`crate::EmojiRegistry::register`].
#[derive(Debug, Clone)]
pub enum Registration {
    /// Stored under its normalized name.
    Inserted(Arc<Emoji>),
    /// The normalized name belonged to a different asset; stored under the
    /// lowest free numeric suffix instead.
    Renamed {
        requested: String,
        emoji: Arc<Emoji>,
    },
    /// A user asset took over the name of a builtin emoji for this cycle.
    ReplacedBuiltin(Arc<Emoji>),
    /// The identical asset was already registered; nothing changed.
    AlreadyDefined(Arc<Emoji>),
}

impl Registration {
    pub fn emoji(&self) -> &Arc<Emoji> {
        match self {
            Self::Inserted(e)
            | Self::ReplacedBuiltin(e)
            | Self::AlreadyDefined(e)
            | Self::Renamed { emoji: e, .. } => e,
        }
    }

    pub fn is_new(&self) -> bool {
        !matches!(self, Self::AlreadyDefined(_))
    }
}
