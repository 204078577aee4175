//! Arena DOM parsed by html5ever.
//!
//! This is the tree engine used everywhere outside the browser: markup is
//! parsed into an [`ArenaDom`] through [`ArenaSink`], and serialized back out
//! through html5ever's HTML serializer.

mod arena;
mod serialize;
mod tree_sink;

pub use arena::{ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId, Attribute, ChildrenIter};
pub use serialize::SerializableNode;
pub use tree_sink::{ArenaSink, NodeHandle};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

/// Parse a complete HTML document.
pub fn parse_document_html(html: &str) -> ArenaDom {
    parse_document(ArenaSink::new(), ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}

/// Parse an HTML fragment as the contents of `<body>`.
///
/// The fragment is wrapped in a minimal document shell; the returned id is
/// the `<body>` element holding the parsed content.
pub fn parse_body(html: &str) -> (ArenaDom, ArenaNodeId) {
    let wrapped = format!("<!DOCTYPE html><body>{html}</body>");
    let mut dom = parse_document_html(&wrapped);

    let body = match dom.find_by_tag("body") {
        Some(body) => body,
        // The tree builder always synthesizes a body; this only guards
        // against a sink that dropped it.
        None => {
            let body = dom.create_html_element("body");
            let root = dom.document();
            dom.append(root, body);
            body
        }
    };

    (dom, body)
}
