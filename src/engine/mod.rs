//! Tree engines the text pipeline runs against.
//!
//! The collector and reconstructor are written once against [`TreeEngine`].
//! [`ArenaDom`](crate::dom::ArenaDom) implements it everywhere; with the
//! `wasm` feature on `wasm32`, `BrowserDom` implements it on top of the
//! host page's `DOMParser`.

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod browser;
mod native;
mod runtime;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use browser::BrowserDom;
pub use runtime::Runtime;

use std::borrow::Cow;

use crate::error::Result;
use crate::text::TagDescriptor;

/// Coarse node classification used by the traversals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    /// Comments, doctypes, documents and anything else without text of its own.
    Other,
}

/// A parsed HTML tree the text pipeline can read and extend.
///
/// Mutating operations only ever create new nodes or attach new nodes to
/// other new nodes; nodes returned by [`TreeEngine::parse_body`] are never
/// modified.
pub trait TreeEngine {
    type Node: Clone;

    /// Parse an HTML fragment and return the engine with the body element
    /// holding the fragment's content.
    fn parse_body(html: &str) -> Result<(Self, Self::Node)>
    where
        Self: Sized;

    fn kind(&self, node: &Self::Node) -> NodeKind;

    /// Tag name as the DOM `tagName` reports it: upper-cased for HTML
    /// elements, verbatim for foreign ones.
    fn tag_name(&self, node: &Self::Node) -> Option<Cow<'_, str>>;

    /// Value of the `id` attribute, if present.
    fn element_id(&self, node: &Self::Node) -> Option<Cow<'_, str>>;

    /// Class tokens in attribute order, without duplicates.
    fn class_list(&self, node: &Self::Node) -> Vec<String>;

    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Content of a text node.
    fn text(&self, node: &Self::Node) -> Option<Cow<'_, str>>;

    /// Copy a node without its children.
    fn shallow_clone(&mut self, node: &Self::Node) -> Result<Self::Node>;

    /// Copy a node together with its subtree.
    fn deep_clone(&mut self, node: &Self::Node) -> Result<Self::Node>;

    fn create_text(&mut self, text: &str) -> Result<Self::Node>;

    fn append_child(&mut self, parent: &Self::Node, child: Self::Node) -> Result<()>;

    /// Serialize the children of `node` as HTML.
    fn inner_html(&self, node: &Self::Node) -> Result<String>;

    /// Structural descriptor of an element, or `None` for other node kinds.
    fn descriptor(&self, node: &Self::Node) -> Option<TagDescriptor> {
        if self.kind(node) != NodeKind::Element {
            return None;
        }
        let name = self.tag_name(node)?;
        let id = self.element_id(node);
        Some(TagDescriptor::new(
            name.into_owned(),
            id.as_deref(),
            self.class_list(node),
        ))
    }
}
