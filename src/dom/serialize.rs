//! Serialization of arena nodes through html5ever's HTML serializer.

use std::collections::VecDeque;
use std::io;

use html5ever::QualName;
use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope, serialize};

use super::arena::{ArenaDom, ArenaNodeData, ArenaNodeId};

/// A node borrowed from its arena, ready to hand to [`serialize`].
#[derive(Clone, Copy)]
pub struct SerializableNode<'a> {
    dom: &'a ArenaDom,
    id: ArenaNodeId,
}

impl<'a> SerializableNode<'a> {
    pub fn new(dom: &'a ArenaDom, id: ArenaNodeId) -> Self {
        Self { dom, id }
    }
}

enum SerializeOp {
    Open(ArenaNodeId),
    Close(QualName),
}

impl SerializableNode<'_> {
    fn push_children(&self, ops: &mut VecDeque<SerializeOp>, id: ArenaNodeId) {
        let children: Vec<_> = self.dom.children(id).collect();
        for child in children.into_iter().rev() {
            ops.push_front(SerializeOp::Open(child));
        }
    }
}

impl Serialize for SerializableNode<'_> {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        let mut ops = VecDeque::new();
        match traversal_scope {
            TraversalScope::IncludeNode => ops.push_back(SerializeOp::Open(self.id)),
            TraversalScope::ChildrenOnly(_) => {
                ops.extend(self.dom.children(self.id).map(SerializeOp::Open));
            }
        }

        while let Some(op) = ops.pop_front() {
            let id = match op {
                SerializeOp::Open(id) => id,
                SerializeOp::Close(name) => {
                    serializer.end_elem(name)?;
                    continue;
                }
            };
            let Some(node) = self.dom.get(id) else {
                continue;
            };

            match &node.data {
                ArenaNodeData::Element { name, attrs, .. } => {
                    serializer.start_elem(
                        name.clone(),
                        attrs.iter().map(|a| (&a.name, a.value.as_str())),
                    )?;
                    ops.push_front(SerializeOp::Close(name.clone()));
                    self.push_children(&mut ops, id);
                }
                ArenaNodeData::Text(text) => serializer.write_text(text)?,
                ArenaNodeData::Comment(text) => serializer.write_comment(text)?,
                ArenaNodeData::Doctype { name, .. } => serializer.write_doctype(name)?,
                ArenaNodeData::Document => self.push_children(&mut ops, id),
            }
        }

        Ok(())
    }
}

impl ArenaDom {
    /// Serialize the children of `id` as HTML, like `Element.innerHTML`.
    pub fn inner_html(&self, id: ArenaNodeId) -> io::Result<String> {
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(self.element_qual_name(id).cloned()),
            ..Default::default()
        };
        let mut bytes = Vec::new();
        serialize(&mut bytes, &SerializableNode::new(self, id), opts)?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
