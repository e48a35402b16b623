//! Assembly of fetch events into one message record.
//!
//! A fetch emits, per message, body events whose chunk streams drain at
//! their own pace, one attributes event, and a terminal end event. The
//! assembler buffers all of it and yields a single [`Message`] once the
//! end event fires.

use bytes::BytesMut;
use tokio::task::JoinSet;

use postbox_mime::Headers;

use crate::attributes::MessageAttributes;
use crate::error::{Error, Result};
use crate::events::{BodyChunks, FetchEvent, MessageEvents, PartInfo};

/// Body of one fetched section.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PartBody {
    /// Raw accumulated text of a body-class section.
    Text(String),
    /// Parsed field map of a header-class section.
    Headers(Headers),
}

/// One fetched body section.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessagePart {
    /// Section tag the fetch requested (`"TEXT"`, `"1.2"`, `"HEADER"`, ...).
    pub section: String,
    /// Declared byte length of the raw section.
    pub size: u64,
    /// Accumulated body, structured for header-class sections.
    pub body: PartBody,
}

impl MessagePart {
    /// Returns the raw text for body-class sections.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            PartBody::Text(text) => Some(text),
            PartBody::Headers(_) => None,
        }
    }

    /// Returns the parsed fields for header-class sections.
    #[must_use]
    pub fn headers(&self) -> Option<&Headers> {
        match &self.body {
            PartBody::Text(_) => None,
            PartBody::Headers(headers) => Some(headers),
        }
    }
}

/// One fully fetched message.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    /// Server-reported metadata, recorded verbatim.
    pub attributes: MessageAttributes,
    /// Fetched sections, in drain-completion order.
    ///
    /// Completion order is not server send order; look sections up with
    /// [`Message::part`] rather than by position when more than one was
    /// requested.
    pub parts: Vec<MessagePart>,
    /// Fetch arrival index, stamped by the caller to restore the
    /// original ordering across concurrently assembled messages.
    pub seq_no: Option<usize>,
}

impl Message {
    /// Finds a fetched section by its tag.
    #[must_use]
    pub fn part(&self, section: &str) -> Option<&MessagePart> {
        self.parts.iter().find(|part| part.section == section)
    }
}

/// Assembles one message from its fetch event stream.
///
/// Body chunk streams drain concurrently; each completed drain appends
/// one part. The attributes payload is recorded verbatim. The end event
/// stops event intake: anything the source emits afterwards is never
/// observed, and in-flight drains are awaited before the message is
/// returned.
///
/// There is no internal timeout; a source that never terminates stalls
/// the operation until the caller's own deadline fires.
///
/// # Errors
///
/// Returns [`Error::Disconnected`] when the event channel closes before
/// the end event, and [`Error::Backend`] when the stream terminates
/// without an attributes event.
pub async fn assemble_message(mut events: MessageEvents) -> Result<Message> {
    let mut drains: JoinSet<MessagePart> = JoinSet::new();
    let mut attributes: Option<MessageAttributes> = None;
    let mut parts = Vec::new();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(FetchEvent::Body { info, chunks }) => {
                    drains.spawn(drain_section(info, chunks));
                }
                Some(FetchEvent::Attributes(attrs)) => {
                    attributes = Some(attrs);
                }
                Some(FetchEvent::End) => break,
                None => return Err(Error::Disconnected),
            },
            Some(drained) = drains.join_next(), if !drains.is_empty() => {
                parts.push(drained?);
            }
        }
    }

    // End received: stop listening, finish what is in flight.
    drop(events);
    while let Some(drained) = drains.join_next().await {
        parts.push(drained?);
    }

    let attributes =
        attributes.ok_or_else(|| Error::Backend("fetch ended without attributes".to_string()))?;

    tracing::trace!(uid = attributes.uid.get(), parts = parts.len(), "assembled message");

    Ok(Message {
        attributes,
        parts,
        seq_no: None,
    })
}

/// Drains one section's chunk stream and classifies the result.
async fn drain_section(info: PartInfo, mut chunks: BodyChunks) -> MessagePart {
    let mut buf = BytesMut::with_capacity(usize::try_from(info.size).unwrap_or_default());
    while let Some(chunk) = chunks.recv().await {
        buf.extend_from_slice(&chunk);
    }
    let text = String::from_utf8_lossy(&buf).into_owned();

    let body = if info.is_header() {
        PartBody::Headers(Headers::parse(&text))
    } else {
        PartBody::Text(text)
    };

    MessagePart {
        section: info.section,
        size: info.size,
        body,
    }
}
