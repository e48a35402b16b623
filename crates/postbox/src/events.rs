//! Fetch events delivered by the protocol backend.
//!
//! One fetch yields a channel of per-message event channels. Each
//! message's channel carries zero or more body events, exactly one
//! attributes event and a terminal end event, in any relative order
//! except that end comes last. The enumerated event kinds replace the
//! string-keyed emitter of callback-style clients; termination is
//! explicit in the type.

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::attributes::MessageAttributes;

/// Chunked byte stream for one body section.
pub type BodyChunks = mpsc::Receiver<Bytes>;

/// Event stream for one fetched message.
pub type MessageEvents = mpsc::Receiver<FetchEvent>;

/// Stream of per-message event channels for one fetch operation.
pub type FetchStream = mpsc::Receiver<MessageEvents>;

/// Identifies one requested body section within a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartInfo {
    /// Section tag: `"TEXT"`, a numeric path like `"1.2"`, or a
    /// header-class tag matching the `HEADER` prefix.
    pub section: String,
    /// Declared byte length of the raw section.
    pub size: u64,
}

impl PartInfo {
    /// Creates part info for a section.
    #[must_use]
    pub fn new(section: impl Into<String>, size: u64) -> Self {
        Self {
            section: section.into(),
            size,
        }
    }

    /// Returns `true` for header-class sections.
    ///
    /// The prefix check is case-sensitive; servers echo the section tag
    /// back in the form the fetch requested it.
    #[must_use]
    pub fn is_header(&self) -> bool {
        self.section.starts_with("HEADER")
    }
}

/// One event in a message's fetch stream.
#[derive(Debug)]
pub enum FetchEvent {
    /// A body section began streaming.
    Body {
        /// Which section, and its declared size.
        info: PartInfo,
        /// The section's chunked content; drained to completion by the
        /// assembler.
        chunks: BodyChunks,
    },
    /// The message's attributes, sent exactly once.
    Attributes(MessageAttributes),
    /// Terminal event; nothing after it is observed.
    End,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_sections_match_prefix() {
        assert!(PartInfo::new("HEADER", 0).is_header());
        assert!(PartInfo::new("HEADER.FIELDS (FROM TO)", 0).is_header());
        assert!(!PartInfo::new("TEXT", 0).is_header());
        assert!(!PartInfo::new("1.2", 0).is_header());
    }

    #[test]
    fn header_prefix_check_is_case_sensitive() {
        assert!(!PartInfo::new("header", 0).is_header());
    }
}
