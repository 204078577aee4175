//! Arena-based DOM for HTML parsing.
//!
//! html5ever parses into this tree, the text pipeline reads and extends it,
//! and the serializer walks it back out to markup. Nodes are never freed:
//! rebuilding a fragment allocates fresh nodes next to the originals, so the
//! parsed tree stays intact for as long as the arena lives.

use html5ever::{LocalName, QualName, ns};

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaNodeId(pub u32);

impl ArenaNodeId {
    /// Sentinel value for no node.
    pub const NONE: ArenaNodeId = ArenaNodeId(u32::MAX);

    /// Check if this is a valid node ID.
    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    /// Check if this is the sentinel value.
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Node type in the arena DOM.
#[derive(Debug, Clone)]
pub enum ArenaNodeData {
    /// Document root.
    Document,
    /// Element with name and attributes.
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Pre-extracted id attribute.
        id: Option<String>,
        /// Pre-extracted class tokens, de-duplicated in attribute order.
        classes: Vec<String>,
    },
    /// Text content.
    Text(String),
    /// Comment.
    Comment(String),
    /// Document type declaration.
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

/// HTML attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

/// A node in the arena DOM.
#[derive(Debug)]
pub struct ArenaNode {
    pub data: ArenaNodeData,
    pub parent: ArenaNodeId,
    pub first_child: ArenaNodeId,
    pub last_child: ArenaNodeId,
    pub prev_sibling: ArenaNodeId,
    pub next_sibling: ArenaNodeId,
}

impl ArenaNode {
    fn new(data: ArenaNodeData) -> Self {
        Self {
            data,
            parent: ArenaNodeId::NONE,
            first_child: ArenaNodeId::NONE,
            last_child: ArenaNodeId::NONE,
            prev_sibling: ArenaNodeId::NONE,
            next_sibling: ArenaNodeId::NONE,
        }
    }
}

/// Arena-based DOM tree.
///
/// All nodes are stored in a contiguous vector. Parent/child/sibling links
/// use indices into this vector.
#[derive(Debug)]
pub struct ArenaDom {
    nodes: Vec<ArenaNode>,
    document: ArenaNodeId,
}

impl ArenaDom {
    /// Create a new empty DOM with a document root.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: ArenaNodeId::NONE,
        };
        dom.document = dom.alloc(ArenaNode::new(ArenaNodeData::Document));
        dom
    }

    fn alloc(&mut self, node: ArenaNode) -> ArenaNodeId {
        let id = ArenaNodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the document root ID.
    pub fn document(&self) -> ArenaNodeId {
        self.document
    }

    /// Get a node by ID.
    pub fn get(&self, id: ArenaNodeId) -> Option<&ArenaNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: ArenaNodeId) -> Option<&mut ArenaNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Create a new detached element node.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> ArenaNodeId {
        let (id, classes) = extract_id_and_classes(&attrs);
        self.alloc(ArenaNode::new(ArenaNodeData::Element {
            name,
            attrs,
            id,
            classes,
        }))
    }

    /// Add the attributes of `new_attrs` the element does not carry yet.
    ///
    /// The cached id and class list follow the merged attributes.
    pub fn add_missing_attrs(&mut self, target: ArenaNodeId, new_attrs: Vec<Attribute>) {
        let Some(ArenaNode {
            data:
                ArenaNodeData::Element {
                    attrs, id, classes, ..
                },
            ..
        }) = self.get_mut(target)
        else {
            return;
        };
        let before = attrs.len();
        for attr in new_attrs {
            if !attrs.iter().any(|a| a.name == attr.name) {
                attrs.push(attr);
            }
        }
        if attrs.len() != before {
            (*id, *classes) = extract_id_and_classes(attrs);
        }
    }

    /// Create a detached element in the HTML namespace.
    pub fn create_html_element(&mut self, local: &str) -> ArenaNodeId {
        self.create_element(QualName::new(None, ns!(html), LocalName::from(local)), Vec::new())
    }

    /// Create a new text node.
    pub fn create_text(&mut self, text: String) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Text(text)))
    }

    /// Create a new comment node.
    pub fn create_comment(&mut self, text: String) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Comment(text)))
    }

    /// Create a doctype node.
    pub fn create_doctype(
        &mut self,
        name: String,
        public_id: String,
        system_id: String,
    ) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Doctype {
            name,
            public_id,
            system_id,
        }))
    }

    /// Copy a node's data into a new detached node, without children.
    pub fn shallow_clone(&mut self, id: ArenaNodeId) -> ArenaNodeId {
        let data = match self.get(id) {
            Some(node) => node.data.clone(),
            None => return ArenaNodeId::NONE,
        };
        self.alloc(ArenaNode::new(data))
    }

    /// Copy a node and its whole subtree into new detached nodes.
    pub fn deep_clone(&mut self, id: ArenaNodeId) -> ArenaNodeId {
        let copy = self.shallow_clone(id);
        let mut stack = vec![(id, copy)];
        while let Some((source, target)) = stack.pop() {
            let children: Vec<_> = self.children(source).collect();
            for child in children {
                let child_copy = self.shallow_clone(child);
                self.append(target, child_copy);
                stack.push((child, child_copy));
            }
        }
        copy
    }

    /// Append a child to a parent node.
    pub fn append(&mut self, parent: ArenaNodeId, child: ArenaNodeId) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(ArenaNodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
        }

        if last_child.is_some()
            && let Some(last_node) = self.get_mut(last_child)
        {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert a node before a sibling.
    pub fn insert_before(&mut self, sibling: ArenaNodeId, new_node: ArenaNodeId) {
        let (parent, prev) = match self.get(sibling) {
            Some(n) => (n.parent, n.prev_sibling),
            None => return,
        };

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Append text to the parent's last child if it is a text node, or
    /// create a new text node otherwise.
    pub fn append_text(&mut self, parent: ArenaNodeId, text: &str) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(ArenaNodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let ArenaNodeData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    /// Insert text before a sibling, merging into a preceding text node.
    pub fn insert_text_before(&mut self, sibling: ArenaNodeId, text: &str) {
        let prev = self
            .get(sibling)
            .map(|n| n.prev_sibling)
            .unwrap_or(ArenaNodeId::NONE);

        if let Some(node) = self.get_mut(prev)
            && let ArenaNodeData::Text(ref mut existing) = node.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text.to_string());
        self.insert_before(sibling, text_node);
    }

    /// Get the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the DOM is empty (only has document root).
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: ArenaNodeId) -> ChildrenIter<'_> {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(ArenaNodeId::NONE);
        ChildrenIter {
            dom: self,
            current: first,
        }
    }

    /// Find the first node matching a predicate, in document order.
    pub fn find<F>(&self, predicate: F) -> Option<ArenaNodeId>
    where
        F: Fn(&ArenaNode) -> bool,
    {
        let mut stack = vec![self.document];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                if predicate(node) {
                    return Some(id);
                }
                let mut children: Vec<_> = self.children(id).collect();
                children.reverse();
                stack.extend(children);
            }
        }
        None
    }

    /// Find element by local name (first match).
    pub fn find_by_tag(&self, tag: &str) -> Option<ArenaNodeId> {
        self.find(|node| {
            if let ArenaNodeData::Element { name, .. } = &node.data {
                name.local.as_ref() == tag
            } else {
                false
            }
        })
    }
}

impl Default for ArenaDom {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull the `id` value and the de-duplicated class tokens out of `attrs`.
fn extract_id_and_classes(attrs: &[Attribute]) -> (Option<String>, Vec<String>) {
    let mut id = None;
    let mut classes: Vec<String> = Vec::new();
    for attr in attrs {
        if attr.name.local.as_ref() == "id" {
            id = Some(attr.value.clone());
        } else if attr.name.local.as_ref() == "class" {
            for token in attr.value.split_ascii_whitespace() {
                if !classes.iter().any(|c| c == token) {
                    classes.push(token.to_string());
                }
            }
        }
    }
    (id, classes)
}

/// Iterator over children of a node.
pub struct ChildrenIter<'a> {
    dom: &'a ArenaDom,
    current: ArenaNodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = ArenaNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .dom
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(ArenaNodeId::NONE);
        Some(id)
    }
}

/// Convenience methods for element nodes.
impl ArenaDom {
    /// Get element's qualified name.
    pub fn element_qual_name(&self, id: ArenaNodeId) -> Option<&QualName> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { name, .. } => Some(name),
            _ => None,
        })
    }

    /// Get element's local name (tag).
    pub fn element_name(&self, id: ArenaNodeId) -> Option<&LocalName> {
        self.element_qual_name(id).map(|name| &name.local)
    }

    /// Get element's id attribute.
    pub fn element_id(&self, id: ArenaNodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { id, .. } => id.as_deref(),
            _ => None,
        })
    }

    /// Get element's classes.
    pub fn element_classes(&self, id: ArenaNodeId) -> &[String] {
        static EMPTY: &[String] = &[];
        self.get(id)
            .and_then(|n| match &n.data {
                ArenaNodeData::Element { classes, .. } => Some(classes.as_slice()),
                _ => None,
            })
            .unwrap_or(EMPTY)
    }

    /// Check if node is an element.
    pub fn is_element(&self, id: ArenaNodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, ArenaNodeData::Element { .. }))
    }

    /// Get text content of a text node.
    pub fn text_content(&self, id: ArenaNodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_qname(local: &str) -> QualName {
        QualName::new(None, ns!(html), LocalName::from(local))
    }

    fn attr(name: &str, value: &str) -> Attribute {
        Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_create_elements() {
        let mut dom = ArenaDom::new();

        let div = dom.create_element(make_qname("div"), vec![attr("id", "main")]);
        dom.append(dom.document(), div);

        assert_eq!(dom.element_name(div).unwrap().as_ref(), "div");
        assert_eq!(dom.element_id(div), Some("main"));
        assert_eq!(dom.find_by_tag("div"), Some(div));
    }

    #[test]
    fn test_classes_are_deduplicated() {
        let mut dom = ArenaDom::new();
        let p = dom.create_element(make_qname("p"), vec![attr("class", " b a\tb  a c ")]);

        assert_eq!(dom.element_classes(p), ["b", "a", "c"]);
    }

    #[test]
    fn test_append_children() {
        let mut dom = ArenaDom::new();

        let parent = dom.create_element(make_qname("div"), vec![]);
        let child1 = dom.create_element(make_qname("p"), vec![]);
        let child2 = dom.create_element(make_qname("p"), vec![]);

        dom.append(dom.document(), parent);
        dom.append(parent, child1);
        dom.append(parent, child2);

        let children: Vec<_> = dom.children(parent).collect();
        assert_eq!(children, vec![child1, child2]);
    }

    #[test]
    fn test_text_merging() {
        let mut dom = ArenaDom::new();

        let p = dom.create_element(make_qname("p"), vec![]);
        dom.append(dom.document(), p);

        dom.append_text(p, "Hello, ");
        dom.append_text(p, "World!");

        let children: Vec<_> = dom.children(p).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(dom.text_content(children[0]), Some("Hello, World!"));
    }

    #[test]
    fn test_shallow_clone_drops_children() {
        let mut dom = ArenaDom::new();
        let p = dom.create_element(make_qname("p"), vec![attr("class", "x")]);
        dom.append_text(p, "body");

        let copy = dom.shallow_clone(p);

        assert_ne!(copy, p);
        assert_eq!(dom.element_classes(copy), ["x"]);
        assert_eq!(dom.children(copy).count(), 0);
        assert_eq!(dom.children(p).count(), 1);
    }

    #[test]
    fn test_deep_clone_copies_subtree() {
        let mut dom = ArenaDom::new();
        let ul = dom.create_element(make_qname("ul"), vec![]);
        let li = dom.create_element(make_qname("li"), vec![]);
        dom.append(ul, li);
        dom.append_text(li, "item");

        let copy = dom.deep_clone(ul);
        let copied_li = dom.children(copy).next().unwrap();
        let copied_text = dom.children(copied_li).next().unwrap();

        assert_ne!(copied_li, li);
        assert_eq!(dom.text_content(copied_text), Some("item"));
        assert!(dom.get(copy).unwrap().parent.is_none());
    }

    #[test]
    fn test_deep_clone_of_long_chain() {
        let mut dom = ArenaDom::new();
        let root = dom.create_element(make_qname("div"), vec![]);
        let mut tail = root;
        for _ in 0..20_000 {
            let span = dom.create_element(make_qname("span"), vec![]);
            dom.append(tail, span);
            tail = span;
        }
        dom.append_text(tail, "leaf");

        let mut node = dom.deep_clone(root);
        let mut depth = 0;
        while let Some(child) = dom.children(node).next() {
            node = child;
            depth += 1;
        }

        assert_eq!(depth, 20_001);
        assert_eq!(dom.text_content(node), Some("leaf"));
    }

    #[test]
    fn test_added_attrs_refresh_cached_id_and_classes() {
        let mut dom = ArenaDom::new();
        let body = dom.create_element(make_qname("body"), vec![attr("class", "a")]);

        dom.add_missing_attrs(
            body,
            vec![attr("id", "main"), attr("class", "ignored"), attr("lang", "en")],
        );

        assert_eq!(dom.element_id(body), Some("main"));
        assert_eq!(dom.element_classes(body), ["a"]);
    }
}
