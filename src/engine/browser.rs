//! [`TreeEngine`] backed by the host page's DOM.

use std::borrow::Cow;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, DomParser, Element, Node, SupportedType};

use super::{NodeKind, TreeEngine};
use crate::error::{Error, Result};

/// A document parsed by the browser's `DOMParser`.
pub struct BrowserDom {
    document: Document,
}

fn js_error(value: JsValue) -> Error {
    Error::Engine(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

impl TreeEngine for BrowserDom {
    type Node = Node;

    fn parse_body(html: &str) -> Result<(Self, Node)> {
        let parser = DomParser::new().map_err(js_error)?;
        let document = parser
            .parse_from_string(
                &format!("<!DOCTYPE html><body>{html}</body>"),
                SupportedType::TextHtml,
            )
            .map_err(js_error)?;
        let body = document
            .body()
            .ok_or_else(|| Error::Engine("parsed document has no body".into()))?;
        Ok((Self { document }, body.into()))
    }

    fn kind(&self, node: &Node) -> NodeKind {
        match node.node_type() {
            Node::ELEMENT_NODE => NodeKind::Element,
            Node::TEXT_NODE => NodeKind::Text,
            _ => NodeKind::Other,
        }
    }

    fn tag_name(&self, node: &Node) -> Option<Cow<'_, str>> {
        node.dyn_ref::<Element>().map(|e| Cow::Owned(e.tag_name()))
    }

    fn element_id(&self, node: &Node) -> Option<Cow<'_, str>> {
        let element = node.dyn_ref::<Element>()?;
        element.has_attribute("id").then(|| Cow::Owned(element.id()))
    }

    fn class_list(&self, node: &Node) -> Vec<String> {
        let Some(element) = node.dyn_ref::<Element>() else {
            return Vec::new();
        };
        let list = element.class_list();
        (0..list.length()).filter_map(|i| list.item(i)).collect()
    }

    fn children(&self, node: &Node) -> Vec<Node> {
        let nodes = node.child_nodes();
        (0..nodes.length()).filter_map(|i| nodes.item(i)).collect()
    }

    fn text(&self, node: &Node) -> Option<Cow<'_, str>> {
        if node.node_type() != Node::TEXT_NODE {
            return None;
        }
        node.text_content().map(Cow::Owned)
    }

    fn shallow_clone(&mut self, node: &Node) -> Result<Node> {
        node.clone_node().map_err(js_error)
    }

    fn deep_clone(&mut self, node: &Node) -> Result<Node> {
        node.clone_node_with_deep(true).map_err(js_error)
    }

    fn create_text(&mut self, text: &str) -> Result<Node> {
        Ok(self.document.create_text_node(text).into())
    }

    fn append_child(&mut self, parent: &Node, child: Node) -> Result<()> {
        parent.append_child(&child).map(drop).map_err(js_error)
    }

    fn inner_html(&self, node: &Node) -> Result<String> {
        node.dyn_ref::<Element>()
            .map(Element::inner_html)
            .ok_or_else(|| Error::Engine("only elements can be serialized".into()))
    }
}
