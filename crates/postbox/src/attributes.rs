//! Server-reported message metadata and the MIME structure tree.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};

use crate::types::{Flags, Uid};

/// Metadata the server reports for one fetched message.
///
/// Recorded verbatim from the fetch's attributes event; the assembler
/// never interprets it beyond carrying `uid` and `structure`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageAttributes {
    /// Unique identifier within the mailbox.
    pub uid: Uid,
    /// Flags currently set on the message.
    pub flags: Flags,
    /// Server-side arrival timestamp (INTERNALDATE).
    pub internal_date: Option<DateTime<FixedOffset>>,
    /// Message size in bytes (RFC822.SIZE).
    pub size: Option<u32>,
    /// BODYSTRUCTURE tree, when the fetch requested it.
    pub structure: Option<PartDescriptor>,
}

impl MessageAttributes {
    /// Creates attributes carrying only a UID.
    #[must_use]
    pub fn new(uid: Uid) -> Self {
        Self {
            uid,
            flags: Flags::new(),
            internal_date: None,
            size: None,
            structure: None,
        }
    }
}

/// One node of a message's MIME structure tree.
///
/// Leaves carry a section path (`part_id`) addressable in a body fetch;
/// multipart containers carry children instead.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartDescriptor {
    /// Section path such as `"1"` or `"2.3"`; absent on containers.
    pub part_id: Option<String>,
    /// Primary media type, e.g. `"text"` or `"multipart"`.
    pub mime_type: String,
    /// Media subtype, e.g. `"plain"` or `"mixed"`.
    pub subtype: String,
    /// Body parameters from BODYSTRUCTURE (charset, name, ...).
    pub params: HashMap<String, String>,
    /// Declared content transfer encoding, as the server sent it.
    pub encoding: String,
    /// Declared section size in bytes.
    pub size: Option<u32>,
    /// Child parts of a multipart container.
    pub children: Vec<PartDescriptor>,
}

impl PartDescriptor {
    /// Creates a descriptor with the given media type and a `7BIT`
    /// encoding default.
    #[must_use]
    pub fn new(mime_type: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            subtype: subtype.into(),
            encoding: "7BIT".to_string(),
            ..Self::default()
        }
    }

    /// Sets the section path.
    #[must_use]
    pub fn part_id(mut self, id: impl Into<String>) -> Self {
        self.part_id = Some(id.into());
        self
    }

    /// Sets the declared transfer encoding.
    #[must_use]
    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Adds a body parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Adds a child part.
    #[must_use]
    pub fn child(mut self, child: PartDescriptor) -> Self {
        self.children.push(child);
        self
    }

    /// Returns the declared charset parameter, matched
    /// case-insensitively.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("charset"))
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` for multipart containers.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.mime_type.eq_ignore_ascii_case("multipart")
    }
}

/// Flattens a structure tree into its addressable leaves, in document
/// order.
///
/// Containers recurse into their children; only nodes carrying a
/// section path are returned.
#[must_use]
pub fn flatten_parts(root: &PartDescriptor) -> Vec<&PartDescriptor> {
    let mut leaves = Vec::new();
    collect_leaves(root, &mut leaves);
    leaves
}

fn collect_leaves<'a>(node: &'a PartDescriptor, leaves: &mut Vec<&'a PartDescriptor>) {
    if node.children.is_empty() {
        if node.part_id.is_some() {
            leaves.push(node);
        }
        return;
    }
    for child in &node.children {
        collect_leaves(child, leaves);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_tree() -> PartDescriptor {
        PartDescriptor::new("multipart", "mixed")
            .child(
                PartDescriptor::new("multipart", "alternative")
                    .child(
                        PartDescriptor::new("text", "plain")
                            .part_id("1.1")
                            .param("charset", "utf-8"),
                    )
                    .child(PartDescriptor::new("text", "html").part_id("1.2")),
            )
            .child(
                PartDescriptor::new("application", "pdf")
                    .part_id("2")
                    .encoding("BASE64"),
            )
    }

    #[test]
    fn flatten_collects_leaves_in_document_order() {
        let tree = sample_tree();
        let parts = flatten_parts(&tree);
        let ids: Vec<_> = parts.iter().map(|p| p.part_id.as_deref().unwrap()).collect();
        assert_eq!(ids, ["1.1", "1.2", "2"]);
    }

    #[test]
    fn flatten_skips_containers() {
        let tree = sample_tree();
        assert!(flatten_parts(&tree).iter().all(|p| !p.is_multipart()));
    }

    #[test]
    fn flatten_skips_leaves_without_section_path() {
        let tree = PartDescriptor::new("multipart", "mixed")
            .child(PartDescriptor::new("text", "plain"));
        assert!(flatten_parts(&tree).is_empty());
    }

    #[test]
    fn single_part_message_is_its_own_leaf() {
        let root = PartDescriptor::new("text", "plain").part_id("1");
        let parts = flatten_parts(&root);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].part_id.as_deref(), Some("1"));
    }

    #[test]
    fn charset_lookup_is_case_insensitive() {
        let part = PartDescriptor::new("text", "plain").param("CHARSET", "ISO-8859-1");
        assert_eq!(part.charset(), Some("ISO-8859-1"));
    }

    #[test]
    fn charset_absent() {
        assert_eq!(PartDescriptor::new("text", "plain").charset(), None);
    }
}
