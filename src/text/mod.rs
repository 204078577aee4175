//! Text fragment extraction and in-place replacement.
//!
//! The pipeline has two traversals over the same tree:
//!
//! 1. [`collect`] walks the tree in document order and produces one
//!    [`Fragment`] per non-blank text leaf, tagged with a [`TagDescriptor`] of
//!    the element holding it.
//! 2. [`rebuild`] walks the tree again and builds a copy in which each text
//!    leaf is replaced by the [`TransformedFragment`] with the same trimmed
//!    text and an equivalent descriptor.
//!
//! Leaves are paired by content and context rather than node identity, so
//! the transform stage in between is free to run fragments concurrently and
//! out of order.

mod collect;
mod fragment;
mod matching;
mod rebuild;

pub use collect::{Collector, DEFAULT_SKIP_TAGS, SkipTags, collect};
pub use fragment::{Fragment, FragmentKey, TagDescriptor, TransformedFragment};
pub use matching::{FragmentIndex, MatchKey, MatchPolicy, TagSignature, find_transformed};
pub use rebuild::{Reconstructor, rebuild};
