//! Structured header parsing for fetched header sections.

use crate::encoding::decode_rfc2047;
use std::collections::HashMap;

/// Parsed message headers.
///
/// Field names are lowercased; each name maps to its values in the
/// order they appeared. Raw header text goes in, a structured map comes
/// out; callers never see the folded wire form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Headers {
    fields: HashMap<String, Vec<String>>,
}

impl Headers {
    /// Creates an empty header map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses raw header text.
    ///
    /// Continuation lines (leading space or tab) are unfolded into the
    /// preceding field; RFC 2047 encoded words in values are decoded.
    /// Lines without a colon outside a continuation are skipped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut headers = Self::new();
        let mut current: Option<(String, String)> = None;

        for line in text.lines() {
            if line.is_empty() {
                break;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                if let Some((_, value)) = current.as_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                }
                continue;
            }

            if let Some((name, value)) = current.take() {
                headers.add(name, decode_encoded_words(value.trim()));
            }
            if let Some((name, value)) = line.split_once(':') {
                current = Some((name.trim().to_string(), value.trim().to_string()));
            }
        }

        if let Some((name, value)) = current {
            headers.add(name, decode_encoded_words(value.trim()));
        }

        headers
    }

    /// Appends a value for a field.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields
            .entry(name.into().to_lowercase())
            .or_default()
            .push(value.into());
    }

    /// Returns the first value for a field, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&name.to_lowercase())
            .and_then(|values| values.first().map(String::as_str))
    }

    /// Returns every value for a field, in arrival order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.fields
            .get(&name.to_lowercase())
            .map_or(&[], Vec::as_slice)
    }

    /// Iterates over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().flat_map(|(name, values)| {
            values.iter().map(move |value| (name.as_str(), value.as_str()))
        })
    }

    /// Number of distinct field names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when no fields were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Decodes every RFC 2047 encoded word in a header value.
///
/// Malformed words are kept verbatim.
fn decode_encoded_words(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("=?") {
        let Some(end) = rest[start + 2..].find("?=").map(|i| start + 2 + i + 2) else {
            break;
        };
        out.push_str(&rest[..start]);
        let word = &rest[start..end];
        match decode_rfc2047(word) {
            Ok(decoded) => out.push_str(&decoded),
            Err(_) => out.push_str(word),
        }
        rest = &rest[end..];
    }

    out.push_str(rest);
    out
}
