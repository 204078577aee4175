//! # markover
//!
//! Rewrite the visible text of an HTML fragment without disturbing its
//! markup.
//!
//! Every non-blank text leaf is collected as a [`Fragment`] tagged with the
//! element that contains it. A caller-supplied async transform produces a
//! replacement for each fragment, all of them running concurrently. The tree
//! is then rebuilt with each leaf replaced by the transform result for the
//! fragment with the same text and an equivalent parent element. Elements,
//! attributes, comments and skipped subtrees such as `<script>` come out as
//! they went in.
//!
//! ## Quick Start
//!
//! ```
//! use markover::{MarkOverOptions, mark_over, sync_transform};
//!
//! let options = MarkOverOptions::new(r#"<p class="a">Hello</p><pre>raw</pre>"#)
//!     .skip_tags(["PRE"]);
//! let html = futures::executor::block_on(mark_over(
//!     options,
//!     sync_transform(|fragment| fragment.text.to_uppercase()),
//! ))
//! .unwrap();
//!
//! assert_eq!(html, r#"<p class="a">HELLO</p><pre>raw</pre>"#);
//! ```
//!
//! ## Matching
//!
//! Leaves are paired with transform results by trimmed text plus the parent's
//! tag name, id and class set. Two leaves with identical text inside
//! indistinguishable elements receive the same replacement under the default
//! [`MatchPolicy::FirstMatch`]; [`MatchPolicy::DocumentOrder`] pairs them by
//! position instead.

pub mod dom;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod text;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use engine::{NodeKind, Runtime, TreeEngine};
pub use error::{BoxError, Error, Result};
pub use pipeline::{
    MarkOverOptions, mark_over, mark_over_in, mark_over_with, sync_transform, transform_all,
};
pub use text::{
    DEFAULT_SKIP_TAGS, Fragment, FragmentKey, MatchPolicy, SkipTags, TagDescriptor,
    TransformedFragment,
};
