//! # postbox
//!
//! An async convenience layer over an external IMAP session.
//!
//! The protocol engine — command framing, response parsing, TLS,
//! authentication — is supplied by the application through the
//! [`MailBackend`] trait. postbox turns that backend's per-message
//! fetch event streams into assembled [`Message`] records, decodes
//! individual MIME parts by their declared transfer encoding, and
//! wraps mailbox, search, flag and label operations in a typed async
//! API.
//!
//! ## Quick Start
//!
//! ```ignore
//! use postbox::{Client, FetchOptions, SearchCriterion, flatten_parts};
//!
//! let mut client = Client::new(backend);
//! client.open_box("INBOX", false).await?;
//!
//! // Search, then fetch headers and structure for every match.
//! let options = FetchOptions::new().body("HEADER").fetch_struct(true);
//! let messages = client
//!     .search_with_fetch(&[SearchCriterion::Unseen], &options)
//!     .await?;
//!
//! for message in &messages {
//!     let subject = message
//!         .part("HEADER")
//!         .and_then(|p| p.headers())
//!         .and_then(|h| h.get("subject"));
//!     println!("{}: {}", message.attributes.uid, subject.unwrap_or("(none)"));
//!
//!     // Download and decode the first attachment-ish leaf part.
//!     if let Some(structure) = &message.attributes.structure {
//!         if let Some(part) = flatten_parts(structure).last() {
//!             let data = client
//!                 .single_part_data(message.attributes.uid, part)
//!                 .await?;
//!             println!("decoded {} bytes", data.as_bytes().len());
//!         }
//!     }
//! }
//!
//! client.end().await?;
//! ```
//!
//! ## Modules
//!
//! - [`assemble_message`]: one fetch event stream in, one [`Message`] out
//! - [`decode_single`] / [`Client::single_part_data`]: part decoding with
//!   the single-part arity contract
//! - [`MailBackend`]: the protocol boundary
//! - [`Client`]: mailbox, search, flag and label operations

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod assemble;
mod attributes;
mod client;
mod error;
mod events;
mod parts;
mod session;
mod types;

pub use postbox_mime::{DecodedBody, Headers, TransferEncoding};

pub use assemble::{Message, MessagePart, PartBody, assemble_message};
pub use attributes::{MessageAttributes, PartDescriptor, flatten_parts};
pub use client::{Client, ClientConfig};
pub use error::{Error, Result};
pub use events::{BodyChunks, FetchEvent, FetchStream, MessageEvents, PartInfo};
pub use parts::decode_single;
pub use session::{
    BoxStatus, FetchOptions, FlagAction, MailBackend, MailboxAttribute, MailboxInfo,
    SearchCriterion,
};
pub use types::{Flag, Flags, Uid, UidValidity};
