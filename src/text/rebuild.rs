//! Reconstruction of a tree with transformed text.

use super::collect::SkipTags;
use super::fragment::TransformedFragment;
use super::matching::{FragmentIndex, MatchKey, MatchPolicy, TagSignature};
use crate::engine::{NodeKind, TreeEngine};
use crate::error::{Error, Result};

/// Builds a copy of a tree in which every matched text leaf carries its
/// transformed text.
///
/// The source tree is only read. Elements are shallow-cloned and refilled,
/// skipped subtrees and non-text nodes are deep-cloned, blank text leaves are
/// cloned unchanged.
pub struct Reconstructor<'a, E: TreeEngine> {
    engine: &'a mut E,
    skip: &'a SkipTags,
    index: FragmentIndex<'a>,
    misses: usize,
}

impl<'a, E: TreeEngine> Reconstructor<'a, E> {
    pub fn new(
        engine: &'a mut E,
        skip: &'a SkipTags,
        fragments: &'a [TransformedFragment],
        policy: MatchPolicy,
    ) -> Self {
        Self {
            engine,
            skip,
            index: FragmentIndex::new(fragments, policy),
            misses: 0,
        }
    }

    /// Rebuild `root`. `root` itself is the parent context of its children.
    ///
    /// Each frame on the work stack is a source node, the copy it is
    /// appended to and the signature of its source parent. Frames are popped
    /// in document order, so copies are appended in source order.
    pub fn rebuild(&mut self, root: &E::Node) -> Result<E::Node> {
        let mut signatures: Vec<TagSignature> = Vec::new();
        let mut stack: Vec<(E::Node, Option<E::Node>, Option<usize>)> =
            vec![(root.clone(), None, None)];
        let mut rebuilt_root = None;

        while let Some((source, copy_parent, parent)) = stack.pop() {
            let copy = match self.engine.kind(&source) {
                NodeKind::Element => match self.engine.descriptor(&source) {
                    Some(tag) if !self.skip.contains(&tag.name) => {
                        let copy = self.engine.shallow_clone(&source)?;
                        let index = signatures.len();
                        signatures.push(tag.signature());
                        let children = self.engine.children(&source);
                        stack.extend(
                            children
                                .into_iter()
                                .rev()
                                .map(|child| (child, Some(copy.clone()), Some(index))),
                        );
                        copy
                    }
                    _ => self.engine.deep_clone(&source)?,
                },
                NodeKind::Text => {
                    let parent = parent.map(|index| &signatures[index]);
                    self.rebuild_text(&source, parent)?
                }
                NodeKind::Other => self.engine.deep_clone(&source)?,
            };
            match copy_parent {
                Some(copy_parent) => self.engine.append_child(&copy_parent, copy)?,
                None => rebuilt_root = Some(copy),
            }
        }

        rebuilt_root.ok_or_else(|| Error::Engine("rebuild produced no root".into()))
    }

    /// Number of non-blank leaves that kept their original text so far.
    pub fn misses(&self) -> usize {
        self.misses
    }

    fn rebuild_text(&mut self, node: &E::Node, parent: Option<&TagSignature>) -> Result<E::Node> {
        let replacement = {
            let raw = self.engine.text(node).unwrap_or_default();
            let text = raw.trim();
            if text.is_empty() {
                None
            } else {
                let found = parent.and_then(|tag| {
                    self.index.lookup(&MatchKey {
                        text: text.to_string(),
                        tag: tag.clone(),
                    })
                });
                match found {
                    Some(found) => Some(found.transformed.clone()),
                    None => {
                        tracing::trace!(text, "no transformed fragment for text leaf");
                        self.misses += 1;
                        Some(raw.into_owned())
                    }
                }
            }
        };
        match replacement {
            Some(text) => self.engine.create_text(&text),
            None => self.engine.deep_clone(node),
        }
    }
}

/// Rebuild `root` with `fragments` applied.
pub fn rebuild<E: TreeEngine>(
    engine: &mut E,
    root: &E::Node,
    fragments: &[TransformedFragment],
    skip: &SkipTags,
    policy: MatchPolicy,
) -> Result<E::Node> {
    let mut reconstructor = Reconstructor::new(engine, skip, fragments, policy);
    let rebuilt = reconstructor.rebuild(root)?;
    tracing::debug!(
        fragments = fragments.len(),
        misses = reconstructor.misses(),
        "rebuilt tree"
    );
    Ok(rebuilt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ArenaDom;
    use crate::text::collect;

    /// Collect, transform each fragment with `f`, rebuild, serialize.
    fn round_trip(
        html: &str,
        skip: &SkipTags,
        policy: MatchPolicy,
        f: impl Fn(&str) -> String,
    ) -> String {
        let (mut dom, body) = ArenaDom::parse_body(html).unwrap();
        let fragments: Vec<_> = collect(&dom, &body, skip)
            .into_iter()
            .map(|fragment| {
                let transformed = f(&fragment.text);
                TransformedFragment::new(fragment, transformed)
            })
            .collect();
        let rebuilt = rebuild(&mut dom, &body, &fragments, skip, policy).unwrap();
        dom.inner_html(rebuilt).unwrap()
    }

    #[test]
    fn test_replaces_text_in_place() {
        let out = round_trip(
            r#"<div><p class="a">Hello</p><p class="b">World</p></div>"#,
            &SkipTags::default(),
            MatchPolicy::FirstMatch,
            str::to_uppercase,
        );

        assert_eq!(out, r#"<div><p class="a">HELLO</p><p class="b">WORLD</p></div>"#);
    }

    #[test]
    fn test_source_tree_is_untouched() {
        let html = r#"<p title="t">Hello <i>you</i></p>"#;
        let (mut dom, body) = ArenaDom::parse_body(html).unwrap();
        let skip = SkipTags::default();
        let fragments: Vec<_> = collect(&dom, &body, &skip)
            .into_iter()
            .map(|f| TransformedFragment::new(f, "X"))
            .collect();

        let rebuilt = rebuild(&mut dom, &body, &fragments, &skip, MatchPolicy::FirstMatch).unwrap();

        assert_ne!(rebuilt, body);
        assert_eq!(dom.inner_html(body).unwrap(), html);
        assert_eq!(dom.inner_html(rebuilt).unwrap(), r#"<p title="t">X<i>X</i></p>"#);
    }

    #[test]
    fn test_whitespace_leaves_pass_through() {
        let out = round_trip(
            "<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>",
            &SkipTags::default(),
            MatchPolicy::FirstMatch,
            |t| format!("[{t}]"),
        );

        assert_eq!(out, "<ul>\n  <li>[a]</li>\n  <li>[b]</li>\n</ul>");
    }

    #[test]
    fn test_skipped_subtree_is_copied_verbatim() {
        // The span inside <code> has the same signature as the one outside;
        // only the one outside may change.
        let out = round_trip(
            "<span>x</span><code><span>x</span></code>",
            &SkipTags::new(["CODE"]),
            MatchPolicy::FirstMatch,
            |_| "y".to_string(),
        );

        assert_eq!(out, "<span>y</span><code><span>x</span></code>");
    }

    #[test]
    fn test_unmatched_leaf_keeps_untrimmed_original() {
        let (mut dom, body) = ArenaDom::parse_body("<p> keep me </p>").unwrap();
        let skip = SkipTags::default();

        let rebuilt = rebuild(&mut dom, &body, &[], &skip, MatchPolicy::FirstMatch).unwrap();

        assert_eq!(dom.inner_html(rebuilt).unwrap(), "<p> keep me </p>");
    }

    #[test]
    fn test_duplicate_leaves_collapse_under_first_match() {
        let counter = std::cell::Cell::new(0);
        let out = round_trip(
            r#"<li class="x">Same</li><li class="x">Same</li>"#,
            &SkipTags::default(),
            MatchPolicy::FirstMatch,
            |t| {
                counter.set(counter.get() + 1);
                format!("{t}{}", counter.get())
            },
        );

        assert_eq!(counter.get(), 2);
        assert_eq!(out, r#"<li class="x">Same1</li><li class="x">Same1</li>"#);
    }

    #[test]
    fn test_duplicate_leaves_differ_under_document_order() {
        let counter = std::cell::Cell::new(0);
        let out = round_trip(
            r#"<li class="x">Same</li><li class="x">Same</li>"#,
            &SkipTags::default(),
            MatchPolicy::DocumentOrder,
            |t| {
                counter.set(counter.get() + 1);
                format!("{t}{}", counter.get())
            },
        );

        assert_eq!(out, r#"<li class="x">Same1</li><li class="x">Same2</li>"#);
    }

    #[test]
    fn test_comments_are_copied() {
        let out = round_trip(
            "<p>a<!-- b --></p>",
            &SkipTags::default(),
            MatchPolicy::FirstMatch,
            str::to_uppercase,
        );

        assert_eq!(out, "<p>A<!-- b --></p>");
    }

    #[test]
    fn test_deeply_nested_markup() {
        let depth = 10_000;
        let html = format!("{}deep{}", "<span>".repeat(depth), "</span>".repeat(depth));
        let (mut dom, body) = ArenaDom::parse_body(&html).unwrap();
        let skip = SkipTags::default();
        let fragments: Vec<_> = collect(&dom, &body, &skip)
            .into_iter()
            .map(|f| TransformedFragment::new(f, "DEEP"))
            .collect();

        let rebuilt = rebuild(&mut dom, &body, &fragments, &skip, MatchPolicy::FirstMatch).unwrap();

        let mut node = rebuilt;
        for _ in 0..depth {
            let children: Vec<_> = dom.children(node).collect();
            assert_eq!(children.len(), 1);
            node = children[0];
        }
        assert_eq!(dom.text_content(node), Some("DEEP"));
    }

    #[test]
    fn test_nested_skipped_subtree_is_copied() {
        let depth = 10_000;
        let html = format!(
            "<pre>{}raw{}</pre>",
            "<span>".repeat(depth),
            "</span>".repeat(depth)
        );

        let out = round_trip(&html, &SkipTags::new(["PRE"]), MatchPolicy::FirstMatch, |_| {
            "changed".to_string()
        });

        assert!(out.contains(">raw<"));
        assert!(!out.contains("changed"));
    }

    #[test]
    fn test_replacement_text_is_escaped() {
        let out = round_trip(
            "<p>tag</p>",
            &SkipTags::default(),
            MatchPolicy::FirstMatch,
            |_| "<b>&</b>".to_string(),
        );

        assert_eq!(out, "<p>&lt;b&gt;&amp;&lt;/b&gt;</p>");
    }
}
