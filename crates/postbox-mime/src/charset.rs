//! Charset conversion for decoded body bytes.

use encoding_rs::{Encoding, UTF_8};

/// Converts bytes in the declared charset to a UTF-8 string.
///
/// Unknown charset labels fall back to UTF-8. Undecodable sequences are
/// replaced, never rejected.
#[must_use]
pub fn convert_charset(bytes: &[u8], label: &str) -> String {
    let encoding = Encoding::for_label(label.trim().as_bytes()).unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}
