//! Collection of visible text leaves.

use std::collections::HashSet;

use super::fragment::{Fragment, FragmentKey, TagDescriptor};
use crate::engine::{NodeKind, TreeEngine};

/// Elements whose subtrees never hold visible text.
pub const DEFAULT_SKIP_TAGS: &[&str] = &[
    "SCRIPT", "STYLE", "NOSCRIPT", "TEMPLATE", "IFRAME", "OBJECT", "EMBED", "CANVAS",
];

/// Tag names whose subtrees are excluded from collection and copied
/// verbatim on reconstruction.
///
/// Names are compared case-sensitively against what the tree engine
/// reports, which is upper case for HTML elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipTags {
    names: HashSet<String>,
}

impl SkipTags {
    /// The defaults plus `extra`.
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tags = Self::default();
        tags.extend(extra);
        tags
    }

    /// A skip set without the defaults.
    pub fn empty() -> Self {
        Self {
            names: HashSet::new(),
        }
    }

    pub fn contains(&self, tag_name: &str) -> bool {
        self.names.contains(tag_name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for SkipTags {
    fn default() -> Self {
        Self {
            names: DEFAULT_SKIP_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for SkipTags {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.names.extend(iter.into_iter().map(Into::into));
    }
}

/// Pre-order walk collecting one [`Fragment`] per non-blank text leaf.
pub struct Collector<'a, E: TreeEngine> {
    engine: &'a E,
    skip: &'a SkipTags,
    next_key: u64,
    fragments: Vec<Fragment>,
}

impl<'a, E: TreeEngine> Collector<'a, E> {
    pub fn new(engine: &'a E, skip: &'a SkipTags) -> Self {
        Self {
            engine,
            skip,
            next_key: 0,
            fragments: Vec::new(),
        }
    }

    /// Walk `root` and everything below it that is not skipped.
    ///
    /// The walk keeps its own stack, so nesting depth is bounded only by
    /// memory.
    pub fn visit(&mut self, root: &E::Node) {
        // Descriptors of elements entered so far; stack entries refer to
        // their parent by index.
        let mut tags: Vec<TagDescriptor> = Vec::new();
        let mut stack: Vec<(E::Node, Option<usize>)> = vec![(root.clone(), None)];

        while let Some((node, parent)) = stack.pop() {
            match self.engine.kind(&node) {
                NodeKind::Element => {
                    let Some(tag) = self.engine.descriptor(&node) else {
                        continue;
                    };
                    if self.skip.contains(&tag.name) {
                        continue;
                    }
                    let index = tags.len();
                    tags.push(tag);
                    let children = self.engine.children(&node);
                    stack.extend(children.into_iter().rev().map(|child| (child, Some(index))));
                }
                NodeKind::Text => {
                    let Some(tag) = parent.map(|index| &tags[index]) else {
                        continue;
                    };
                    self.push_leaf(&node, tag);
                }
                NodeKind::Other => {}
            }
        }
    }

    pub fn finish(self) -> Vec<Fragment> {
        self.fragments
    }

    fn push_leaf(&mut self, node: &E::Node, tag: &TagDescriptor) {
        let Some(raw) = self.engine.text(node) else {
            return;
        };
        let text = raw.trim();
        if text.is_empty() {
            return;
        }
        let key = FragmentKey(self.next_key);
        self.next_key += 1;
        self.fragments.push(Fragment {
            key,
            text: text.to_string(),
            tag: tag.clone(),
        });
    }
}

/// Collect the fragments under `root` in document order.
pub fn collect<E: TreeEngine>(engine: &E, root: &E::Node, skip: &SkipTags) -> Vec<Fragment> {
    let mut collector = Collector::new(engine, skip);
    collector.visit(root);
    let fragments = collector.finish();
    tracing::debug!(count = fragments.len(), "collected text fragments");
    fragments
}
