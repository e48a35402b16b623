//! Error types for the convenience layer.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by fetch assembly, part decoding and wrapper
/// operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A single-part fetch produced a part count other than one.
    ///
    /// Signals a caller-side fetch misconfiguration; re-fetch with a
    /// corrected section list.
    #[error("Expected exactly one part, fetch produced {parts}")]
    Arity {
        /// Number of parts the assembly actually produced.
        parts: usize,
    },

    /// Transfer-encoding or charset decode failure.
    #[error("Decode error: {0}")]
    Decode(#[from] postbox_mime::Error),

    /// The event source closed before its terminal end event.
    #[error("Event source closed before the end event")]
    Disconnected,

    /// A fetch operation exceeded the configured deadline.
    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),

    /// Error reported by the underlying protocol backend.
    #[error("Backend error: {0}")]
    Backend(String),

    /// I/O error from the underlying transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested section holds parsed headers, not a raw body.
    #[error("Section {0} is not a body section")]
    NotABody(String),

    /// The part descriptor has no section path to fetch.
    #[error("Part descriptor has no section path")]
    MissingSection,

    /// A body drain task failed.
    #[error("Body drain task failed: {0}")]
    Drain(#[from] tokio::task::JoinError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
