//! Content transfer encodings.
//!
//! Decoders for the transfer encodings a server can declare in
//! `BODYSTRUCTURE`: Base64, Quoted-Printable and the legacy uuencode
//! payload format, plus RFC 2047 encoded words for header values.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;

/// Transfer encoding declared for a body section.
///
/// The known set is closed; anything else is rejected at lookup time so
/// call sites never compare encoding strings themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferEncoding {
    /// 7-bit ASCII, no transformation.
    SevenBit,
    /// 8-bit text, charset reinterpretation only.
    EightBit,
    /// Raw binary, charset reinterpretation only.
    Binary,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
    /// Legacy uuencode framing.
    UuEncode,
}

impl TransferEncoding {
    /// Parses a declared encoding, case-insensitively.
    ///
    /// Returns `None` for anything outside the known set; the caller
    /// decides whether that is an error.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "7BIT" => Some(Self::SevenBit),
            "8BIT" => Some(Self::EightBit),
            "BINARY" => Some(Self::Binary),
            "BASE64" => Some(Self::Base64),
            "QUOTED-PRINTABLE" => Some(Self::QuotedPrintable),
            "UUENCODE" => Some(Self::UuEncode),
            _ => None,
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7BIT"),
            Self::EightBit => write!(f, "8BIT"),
            Self::Binary => write!(f, "BINARY"),
            Self::Base64 => write!(f, "BASE64"),
            Self::QuotedPrintable => write!(f, "QUOTED-PRINTABLE"),
            Self::UuEncode => write!(f, "UUENCODE"),
        }
    }
}

/// Decodes Base64 data.
///
/// ASCII whitespace is stripped first; fetched bodies arrive wrapped at
/// the transfer line length.
///
/// # Errors
///
/// Returns an error if the remaining input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD.decode(cleaned).map_err(Into::into)
}

/// Decodes Quoted-Printable text (RFC 2045) into raw bytes.
///
/// Soft line breaks (`=` at end of line) are removed; `=XX` escapes are
/// replaced by the byte they name. Charset interpretation of the result
/// is the caller's concern.
///
/// # Errors
///
/// Returns an error on a truncated or non-hex escape sequence.
pub fn decode_quoted_printable(text: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len());
    let mut bytes = text.bytes().peekable();

    while let Some(byte) = bytes.next() {
        if byte != b'=' {
            out.push(byte);
            continue;
        }

        match bytes.peek() {
            // Soft line break: "=\r\n" or "=\n"
            Some(b'\r') => {
                bytes.next();
                if bytes.peek() == Some(&b'\n') {
                    bytes.next();
                }
            }
            Some(b'\n') => {
                bytes.next();
            }
            // Hex escape
            _ => {
                let (Some(hi), Some(lo)) = (bytes.next(), bytes.next()) else {
                    return Err(Error::InvalidEncoding(
                        "truncated quoted-printable escape".to_string(),
                    ));
                };
                let (Some(hi), Some(lo)) = (hex_digit(hi), hex_digit(lo)) else {
                    return Err(Error::InvalidEncoding(format!(
                        "invalid quoted-printable escape ={}{}",
                        hi as char, lo as char
                    )));
                };
                out.push((hi << 4) | lo);
            }
        }
    }

    Ok(out)
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'A'..=b'F' => Some(b - b'A' + 10),
        b'a'..=b'f' => Some(b - b'a' + 10),
        _ => None,
    }
}

/// Decodes a uuencode payload with the framing lines already removed.
///
/// The payload is a concatenation of uuencode data lines: each starts
/// with a length character (0x20 + byte count, with `` ` `` as alternate
/// zero) followed by four-character groups carrying six bits each. A
/// zero-length run terminates the payload.
///
/// # Errors
///
/// Returns an error on characters outside the uuencode alphabet or a
/// truncated group.
pub fn decode_uuencode(payload: &str) -> Result<Vec<u8>> {
    let bytes = payload.as_bytes();
    let mut out = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let line_len = usize::from(uu_six_bits(bytes[pos])?);
        pos += 1;
        if line_len == 0 {
            break;
        }

        let mut produced = 0;
        while produced < line_len {
            if pos + 4 > bytes.len() {
                return Err(Error::InvalidEncoding(
                    "truncated uuencode group".to_string(),
                ));
            }
            let a = uu_six_bits(bytes[pos])?;
            let b = uu_six_bits(bytes[pos + 1])?;
            let c = uu_six_bits(bytes[pos + 2])?;
            let d = uu_six_bits(bytes[pos + 3])?;
            pos += 4;

            let group = [
                (a << 2) | (b >> 4),
                ((b & 0x0F) << 4) | (c >> 2),
                ((c & 0x03) << 6) | d,
            ];
            let take = (line_len - produced).min(3);
            out.extend_from_slice(&group[..take]);
            produced += take;
        }
    }

    Ok(out)
}

fn uu_six_bits(c: u8) -> Result<u8> {
    // Historical alphabet is 0x20..=0x60; '`' is an alternate encoding of zero.
    if (0x20..=0x60).contains(&c) {
        Ok((c - 0x20) & 0x3F)
    } else {
        Err(Error::InvalidEncoding(format!(
            "invalid uuencode character 0x{c:02x}"
        )))
    }
}

/// Decodes an RFC 2047 encoded word (`=?charset?encoding?text?=`).
///
/// Input that is not an encoded word is returned unchanged.
///
/// # Errors
///
/// Returns an error for a malformed encoded word or invalid payload.
pub fn decode_rfc2047(text: &str) -> Result<String> {
    if !text.starts_with("=?") || !text.ends_with("?=") {
        return Ok(text.to_string());
    }

    let inner = &text[2..text.len() - 2];
    let parts: Vec<&str> = inner.split('?').collect();
    let [charset, encoding, encoded] = parts.as_slice() else {
        return Err(Error::InvalidEncoding(
            "malformed RFC 2047 encoded word".to_string(),
        ));
    };

    let raw = match encoding.to_ascii_uppercase().as_str() {
        "B" => decode_base64(encoded)?,
        // Q encoding is quoted-printable with '_' standing for space
        "Q" => decode_quoted_printable(&encoded.replace('_', " "))?,
        other => {
            return Err(Error::InvalidEncoding(format!(
                "unknown RFC 2047 encoding: {other}"
            )));
        }
    };

    Ok(crate::charset::convert_charset(&raw, charset))
}
