//! Transfer-encoding dispatch for one fetched body section.
//!
//! Dispatch trusts the server-declared `BODYSTRUCTURE` metadata; content
//! is never sniffed.

use crate::charset::convert_charset;
use crate::encoding::{
    TransferEncoding, decode_base64, decode_quoted_printable, decode_uuencode,
};
use crate::error::{Error, Result};

/// A decoded body section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedBody {
    /// Raw bytes, for base64 and uuencode payloads.
    Binary(Vec<u8>),
    /// Text after charset reinterpretation.
    Text(String),
}

impl DecodedBody {
    /// Returns the decoded content as bytes regardless of variant.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Binary(bytes) => bytes,
            Self::Text(text) => text.as_bytes(),
        }
    }

    /// Returns the text content, if this section decoded to text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Binary(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

/// Decodes one fetched section per its declared transfer encoding.
///
/// `encoding` and `charset` come from the section's `BODYSTRUCTURE`
/// entry; both are matched case-insensitively. This is a pure function
/// of its inputs: single-pass classification, no retries, no
/// intermediate states.
///
/// # Errors
///
/// Returns [`Error::UnsupportedEncoding`] when the declared encoding is
/// outside the known set, or a decode error when the payload is
/// malformed for its declared encoding.
pub fn decode_body(raw: &str, encoding: &str, charset: Option<&str>) -> Result<DecodedBody> {
    let Some(declared) = TransferEncoding::parse(encoding) else {
        return Err(Error::UnsupportedEncoding(encoding.to_string()));
    };

    match declared {
        TransferEncoding::Base64 => decode_base64(raw).map(DecodedBody::Binary),
        TransferEncoding::QuotedPrintable => {
            let bytes = decode_quoted_printable(raw)?;
            if charset.is_some_and(|c| c.eq_ignore_ascii_case("utf-8")) {
                // Some servers declare utf-8 on parts that are already
                // quoted-printable; the double decode is intentional.
                String::from_utf8(bytes)
                    .map(DecodedBody::Text)
                    .map_err(Into::into)
            } else {
                Ok(DecodedBody::Text(
                    String::from_utf8_lossy(&bytes).into_owned(),
                ))
            }
        }
        TransferEncoding::SevenBit => Ok(DecodedBody::Text(raw.to_string())),
        TransferEncoding::EightBit | TransferEncoding::Binary => Ok(DecodedBody::Text(
            convert_charset(raw.as_bytes(), charset.unwrap_or("utf-8")),
        )),
        TransferEncoding::UuEncode => {
            // Legacy framing: one leading "begin" line, then the payload,
            // then a terminator run, an "end" line and a trailing newline.
            let lines: Vec<&str> = raw
                .split('\n')
                .map(|line| line.strip_suffix('\r').unwrap_or(line))
                .collect();
            let payload = if lines.len() > 4 {
                lines[1..lines.len() - 3].concat()
            } else {
                String::new()
            };
            decode_uuencode(&payload).map(DecodedBody::Binary)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base64_section_yields_bytes() {
        let decoded = decode_body("aGVsbG8=", "BASE64", None).unwrap();
        assert_eq!(decoded, DecodedBody::Binary(b"hello".to_vec()));
    }

    #[test]
    fn base64_dispatch_is_case_insensitive() {
        let decoded = decode_body("aGVsbG8=", "base64", None).unwrap();
        assert_eq!(decoded.as_bytes(), b"hello");
    }

    #[test]
    fn quoted_printable_with_utf8_charset_yields_text() {
        let decoded = decode_body("caf=C3=A9", "QUOTED-PRINTABLE", Some("UTF-8")).unwrap();
        assert_eq!(decoded, DecodedBody::Text("café".to_string()));
    }

    #[test]
    fn quoted_printable_charset_label_is_case_insensitive() {
        let decoded = decode_body("caf=C3=A9", "quoted-printable", Some("utf-8")).unwrap();
        assert_eq!(decoded.as_text(), Some("café"));
    }

    #[test]
    fn quoted_printable_without_charset_is_lossy() {
        // 0xE9 alone is not valid UTF-8; the platform default replaces it.
        let decoded = decode_body("caf=E9", "QUOTED-PRINTABLE", None).unwrap();
        assert_eq!(decoded.as_text(), Some("caf\u{FFFD}"));
    }

    #[test]
    fn quoted_printable_invalid_utf8_with_declared_utf8_errors() {
        assert!(decode_body("caf=E9", "QUOTED-PRINTABLE", Some("UTF-8")).is_err());
    }

    #[test]
    fn seven_bit_is_unchanged() {
        let decoded = decode_body("plain ascii", "7BIT", None).unwrap();
        assert_eq!(decoded.as_text(), Some("plain ascii"));
    }

    #[test]
    fn eight_bit_defaults_to_utf8() {
        let decoded = decode_body("café", "8BIT", None).unwrap();
        assert_eq!(decoded.as_text(), Some("café"));
    }

    #[test]
    fn eight_bit_reinterprets_via_declared_charset() {
        // The raw section is already UTF-8 text; a declared single-byte
        // charset reinterprets those bytes, mojibake included.
        let decoded = decode_body("café", "8BIT", Some("iso-8859-1")).unwrap();
        assert_eq!(decoded.as_text(), Some("cafÃ©"));
    }

    #[test]
    fn uuencode_drops_header_and_footer_lines() {
        // begin line + one data line ("Cat") + terminator + end + blank
        let raw = "begin 644 cat.txt\n#0V%T\n`\nend\n";
        let decoded = decode_body(raw, "UUENCODE", None).unwrap();
        assert_eq!(decoded, DecodedBody::Binary(b"Cat".to_vec()));
    }

    #[test]
    fn uuencode_short_body_decodes_to_empty() {
        let decoded = decode_body("begin\nend", "UUENCODE", None).unwrap();
        assert_eq!(decoded, DecodedBody::Binary(Vec::new()));
    }

    #[test]
    fn unknown_encoding_is_named_in_error() {
        let err = decode_body("data", "X-CUSTOM", None).unwrap_err();
        match err {
            Error::UnsupportedEncoding(name) => assert_eq!(name, "X-CUSTOM"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
