//! Fragments: collected text leaves and their transformed counterparts.

use std::fmt;

use super::matching::TagSignature;

/// Caller-facing identifier of a collected fragment.
///
/// Keys are assigned in collection order starting at zero and are unique
/// within one collection. They play no part in matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct FragmentKey(pub u64);

impl fmt::Display for FragmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Description of the element directly containing a text leaf.
///
/// The derived `PartialEq` compares fields exactly. Use
/// [`TagDescriptor::matches`] for the lenient comparison the reconstructor
/// uses, where class order does not matter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct TagDescriptor {
    /// Tag name as reported by the tree engine (`P`, `LI`, `svg`).
    pub name: String,
    /// `None` when the element has no id or an empty one.
    pub id: Option<String>,
    /// `None` when the element has no classes.
    pub class_list: Option<Vec<String>>,
}

impl TagDescriptor {
    pub fn new(name: impl Into<String>, id: Option<&str>, classes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            id: id.filter(|id| !id.is_empty()).map(str::to_string),
            class_list: (!classes.is_empty()).then_some(classes),
        }
    }

    /// Key under which this descriptor is matched.
    pub fn signature(&self) -> TagSignature {
        TagSignature::new(
            &self.name,
            self.id.as_deref(),
            self.class_list.iter().flatten().map(String::as_str),
        )
    }

    /// Same tag name, same id (missing and empty are equal) and the same set
    /// of classes in any order.
    pub fn matches(&self, other: &TagDescriptor) -> bool {
        self.signature() == other.signature()
    }
}

/// One trimmed, non-empty text leaf and the element it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fragment {
    pub key: FragmentKey,
    pub text: String,
    pub tag: TagDescriptor,
}

/// A [`Fragment`] together with the text that replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransformedFragment {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub fragment: Fragment,
    pub transformed: String,
}

impl TransformedFragment {
    pub fn new(fragment: Fragment, transformed: impl Into<String>) -> Self {
        Self {
            fragment,
            transformed: transformed.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_new_normalizes_missing_values() {
        let tag = TagDescriptor::new("P", Some(""), Vec::new());

        assert_eq!(tag.id, None);
        assert_eq!(tag.class_list, None);
    }

    #[test]
    fn test_matches_ignores_class_order() {
        let a = TagDescriptor::new("LI", None, classes(&["x", "y"]));
        let b = TagDescriptor::new("LI", None, classes(&["y", "x"]));

        assert_ne!(a, b);
        assert!(a.matches(&b));
    }

    #[test]
    fn test_matches_requires_same_name_id_and_classes() {
        let base = TagDescriptor::new("P", Some("intro"), classes(&["a"]));

        assert!(!base.matches(&TagDescriptor::new("DIV", Some("intro"), classes(&["a"]))));
        assert!(!base.matches(&TagDescriptor::new("P", Some("outro"), classes(&["a"]))));
        assert!(!base.matches(&TagDescriptor::new("P", Some("intro"), classes(&["b"]))));
        assert!(!base.matches(&TagDescriptor::new("P", Some("intro"), classes(&["a", "b"]))));
    }

    #[test]
    fn test_missing_and_empty_id_match() {
        let missing = TagDescriptor {
            name: "P".into(),
            id: None,
            class_list: None,
        };
        let empty = TagDescriptor {
            name: "P".into(),
            id: Some(String::new()),
            class_list: Some(Vec::new()),
        };

        assert!(missing.matches(&empty));
    }

    #[test]
    fn test_key_display() {
        assert_eq!(FragmentKey(7).to_string(), "#7");
    }
}
