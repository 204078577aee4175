//! [`TreeEngine`] for the html5ever arena DOM.

use std::borrow::Cow;

use html5ever::ns;

use super::{NodeKind, TreeEngine};
use crate::dom::{self, ArenaDom, ArenaNodeData, ArenaNodeId};
use crate::error::{Error, Result};

impl TreeEngine for ArenaDom {
    type Node = ArenaNodeId;

    fn parse_body(html: &str) -> Result<(Self, Self::Node)> {
        Ok(dom::parse_body(html))
    }

    fn kind(&self, node: &ArenaNodeId) -> NodeKind {
        match self.get(*node).map(|n| &n.data) {
            Some(ArenaNodeData::Element { .. }) => NodeKind::Element,
            Some(ArenaNodeData::Text(_)) => NodeKind::Text,
            _ => NodeKind::Other,
        }
    }

    fn tag_name(&self, node: &ArenaNodeId) -> Option<Cow<'_, str>> {
        let name = self.element_qual_name(*node)?;
        let local: &str = name.local.as_ref();
        if name.ns == ns!(html) {
            Some(Cow::Owned(local.to_ascii_uppercase()))
        } else {
            Some(Cow::Borrowed(local))
        }
    }

    fn element_id(&self, node: &ArenaNodeId) -> Option<Cow<'_, str>> {
        ArenaDom::element_id(self, *node).map(Cow::Borrowed)
    }

    fn class_list(&self, node: &ArenaNodeId) -> Vec<String> {
        self.element_classes(*node).to_vec()
    }

    fn children(&self, node: &ArenaNodeId) -> Vec<ArenaNodeId> {
        ArenaDom::children(self, *node).collect()
    }

    fn text(&self, node: &ArenaNodeId) -> Option<Cow<'_, str>> {
        self.text_content(*node).map(Cow::Borrowed)
    }

    fn shallow_clone(&mut self, node: &ArenaNodeId) -> Result<ArenaNodeId> {
        live(ArenaDom::shallow_clone(self, *node))
    }

    fn deep_clone(&mut self, node: &ArenaNodeId) -> Result<ArenaNodeId> {
        live(ArenaDom::deep_clone(self, *node))
    }

    fn create_text(&mut self, text: &str) -> Result<ArenaNodeId> {
        Ok(ArenaDom::create_text(self, text.to_string()))
    }

    fn append_child(&mut self, parent: &ArenaNodeId, child: ArenaNodeId) -> Result<()> {
        self.append(*parent, child);
        Ok(())
    }

    fn inner_html(&self, node: &ArenaNodeId) -> Result<String> {
        Ok(ArenaDom::inner_html(self, *node)?)
    }
}

fn live(id: ArenaNodeId) -> Result<ArenaNodeId> {
    if id.is_none() {
        return Err(Error::Engine("node does not belong to this arena".into()));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_tag_names_are_upper_cased() {
        let (dom, body) = ArenaDom::parse_body("<p>x</p><svg><foreignObject/></svg>").unwrap();
        let children = TreeEngine::children(&dom, &body);

        assert_eq!(dom.tag_name(&children[0]).as_deref(), Some("P"));
        assert_eq!(dom.tag_name(&children[1]).as_deref(), Some("svg"));
        assert_eq!(dom.tag_name(&body).as_deref(), Some("BODY"));
    }

    #[test]
    fn test_node_kinds() {
        let (dom, body) = ArenaDom::parse_body("<b>x</b>y<!-- z -->").unwrap();
        let kinds: Vec<_> = TreeEngine::children(&dom, &body)
            .iter()
            .map(|c| dom.kind(c))
            .collect();

        assert_eq!(kinds, [NodeKind::Element, NodeKind::Text, NodeKind::Other]);
    }

    #[test]
    fn test_descriptor_normalizes_empty_id_and_classes() {
        let (dom, body) = ArenaDom::parse_body(r#"<p id="" class="">x</p>"#).unwrap();
        let p = TreeEngine::children(&dom, &body)[0];
        let tag = dom.descriptor(&p).unwrap();

        assert_eq!(tag.name, "P");
        assert_eq!(tag.id, None);
        assert_eq!(tag.class_list, None);
    }

    #[test]
    fn test_descriptor_of_text_is_none() {
        let (dom, body) = ArenaDom::parse_body("loose").unwrap();
        let text = TreeEngine::children(&dom, &body)[0];

        assert!(dom.descriptor(&text).is_none());
    }

    #[test]
    fn test_clone_of_unknown_node_fails() {
        let mut dom = ArenaDom::new();

        assert!(matches!(
            TreeEngine::shallow_clone(&mut dom, &ArenaNodeId(999)),
            Err(Error::Engine(_))
        ));
    }
}
