//! Decoding a fetched part against its structure descriptor.

use postbox_mime::{DecodedBody, decode_body};

use crate::assemble::Message;
use crate::attributes::PartDescriptor;
use crate::error::{Error, Result};

/// Decodes the single part of a one-part fetch result.
///
/// The caller fetches one section path at a time; any other part count
/// means the fetch and the descriptor disagree.
///
/// # Errors
///
/// Returns [`Error::Arity`] unless the assembly holds exactly one part,
/// [`Error::NotABody`] when that part is a parsed header section, and
/// decode errors per the declared transfer encoding (including
/// [`postbox_mime::Error::UnsupportedEncoding`] for encodings outside
/// the known set).
pub fn decode_single(message: &Message, descriptor: &PartDescriptor) -> Result<DecodedBody> {
    let [part] = message.parts.as_slice() else {
        return Err(Error::Arity {
            parts: message.parts.len(),
        });
    };
    let Some(raw) = part.text() else {
        return Err(Error::NotABody(part.section.clone()));
    };
    decode_body(raw, &descriptor.encoding, descriptor.charset()).map_err(Into::into)
}
