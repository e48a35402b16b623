//! # postbox-mime
//!
//! Transfer-encoding and charset decoding for fetched IMAP message parts.
//!
//! ## Features
//!
//! - **Transfer encodings**: Base64, Quoted-Printable and legacy uuencode
//!   payload decoding behind a closed [`TransferEncoding`] enum
//! - **Decode dispatch**: [`decode_body`] turns one raw fetched section plus
//!   its declared encoding and charset into bytes or text
//! - **Headers**: [`Headers::parse`] unfolds raw header text into a
//!   lowercased name → ordered values map, RFC 2047 words decoded
//! - **Charsets**: [`convert_charset`] reinterprets bytes via `encoding_rs`
//!
//! ## Quick Start
//!
//! ```ignore
//! use postbox_mime::{decode_body, DecodedBody};
//!
//! // An attachment section declared BASE64 in BODYSTRUCTURE:
//! let decoded = decode_body("aGVsbG8=", "BASE64", None)?;
//! assert_eq!(decoded, DecodedBody::Binary(b"hello".to_vec()));
//!
//! // A text section declared quoted-printable with charset utf-8:
//! let decoded = decode_body("caf=C3=A9", "QUOTED-PRINTABLE", Some("UTF-8"))?;
//! assert_eq!(decoded.as_text(), Some("café"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod charset;
mod decode;
mod error;
mod header;

pub mod encoding;

pub use charset::convert_charset;
pub use decode::{DecodedBody, decode_body};
pub use encoding::TransferEncoding;
pub use error::{Error, Result};
pub use header::Headers;
