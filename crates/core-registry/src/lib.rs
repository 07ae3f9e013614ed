//! Emoji catalog: asset path derivation, the immutable [`Emoji`] record and the
//! concurrent [`EmojiRegistry`].
//!
//! The registry is rebuilt from scratch on every reload event. Asset discovery
//! lives outside this crate; callers hand over a stream of [`AssetHandle`]s and
//! the registry takes care of normalization, collision resolution and
//! categorization.

pub mod asset;
pub mod builtin;
pub mod emoji;
pub mod error;
pub mod registry;

pub use asset::{AssetHandle, CATEGORY_DEFAULT, MediaKind, ParsedAsset, normalize};
pub use emoji::Emoji;
pub use error::{RegisterError, Registration};
pub use registry::{
    CategoryLocalizer, EmojiRegistry, NoLocalization, ReloadSummary, humanize_category,
};
