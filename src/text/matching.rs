//! Re-identification of text leaves after the transform stage.
//!
//! Transforms may finish in any order, so a rebuilt leaf is paired with its
//! transformed fragment by structural signature alone: the trimmed text plus
//! the normalized descriptor of the containing element.

use std::collections::{BTreeSet, HashMap};

use super::fragment::{TagDescriptor, TransformedFragment};

/// Normalized, hashable form of a [`TagDescriptor`].
///
/// A missing id and an empty id compare equal; classes compare as a set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagSignature {
    name: String,
    id: String,
    classes: BTreeSet<String>,
}

impl TagSignature {
    pub fn new<'c>(
        name: &str,
        id: Option<&str>,
        classes: impl IntoIterator<Item = &'c str>,
    ) -> Self {
        Self {
            name: name.to_string(),
            id: id.unwrap_or_default().to_string(),
            classes: classes.into_iter().map(str::to_string).collect(),
        }
    }
}

impl From<&TagDescriptor> for TagSignature {
    fn from(tag: &TagDescriptor) -> Self {
        tag.signature()
    }
}

/// The pair a text leaf is matched on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchKey {
    pub text: String,
    pub tag: TagSignature,
}

impl MatchKey {
    pub fn new(text: impl Into<String>, tag: &TagDescriptor) -> Self {
        Self {
            text: text.into(),
            tag: tag.signature(),
        }
    }
}

/// How leaves that share a [`MatchKey`] are resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Every leaf resolves to the first fragment with its key, in collection
    /// order. Identical siblings therefore all receive the same replacement.
    #[default]
    FirstMatch,
    /// The n-th leaf with a key resolves to the n-th fragment with that key.
    /// Leaves past the last fragment reuse the last one.
    DocumentOrder,
}

#[derive(Debug)]
struct Slot {
    positions: Vec<usize>,
    next: usize,
}

/// Lookup table from match keys to transformed fragments.
#[derive(Debug)]
pub struct FragmentIndex<'a> {
    fragments: &'a [TransformedFragment],
    slots: HashMap<MatchKey, Slot>,
    policy: MatchPolicy,
}

impl<'a> FragmentIndex<'a> {
    pub fn new(fragments: &'a [TransformedFragment], policy: MatchPolicy) -> Self {
        let mut slots: HashMap<MatchKey, Slot> = HashMap::new();
        for (position, item) in fragments.iter().enumerate() {
            slots
                .entry(MatchKey::new(item.fragment.text.as_str(), &item.fragment.tag))
                .or_insert_with(|| Slot {
                    positions: Vec::new(),
                    next: 0,
                })
                .positions
                .push(position);
        }

        Self {
            fragments,
            slots,
            policy,
        }
    }

    /// Resolve the fragment for a leaf with trimmed text `key.text` inside an
    /// element with signature `key.tag`.
    ///
    /// Under [`MatchPolicy::DocumentOrder`] every successful lookup advances
    /// the key's cursor, so leaves must be looked up in document order.
    pub fn lookup(&mut self, key: &MatchKey) -> Option<&'a TransformedFragment> {
        let fragments = self.fragments;
        let slot = self.slots.get_mut(key)?;
        let position = match self.policy {
            MatchPolicy::FirstMatch => slot.positions[0],
            MatchPolicy::DocumentOrder => {
                let last = slot.positions.len() - 1;
                let position = slot.positions[slot.next.min(last)];
                slot.next += 1;
                position
            }
        };
        fragments.get(position)
    }
}

/// Linear first-match scan over `fragments`.
///
/// Equivalent to [`FragmentIndex::lookup`] under [`MatchPolicy::FirstMatch`];
/// convenient for one-off lookups that do not warrant building an index.
pub fn find_transformed<'a>(
    fragments: &'a [TransformedFragment],
    text: &str,
    tag: &TagDescriptor,
) -> Option<&'a str> {
    fragments
        .iter()
        .find(|item| item.fragment.text == text && item.fragment.tag.matches(tag))
        .map(|item| item.transformed.as_str())
}
