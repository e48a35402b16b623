//! The protocol boundary.
//!
//! Everything below the convenience layer — command framing, response
//! parsing, TLS, authentication, literal handling — lives behind
//! [`MailBackend`]. Implementations adapt whatever protocol client the
//! application uses; this crate only consumes the typed surface.

use std::fmt;

use chrono::NaiveDate;

use crate::error::Result;
use crate::events::FetchStream;
use crate::types::{Flag, Flags, Uid, UidValidity};

/// Status of a mailbox returned by [`MailBackend::open_box`].
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxStatus {
    /// Mailbox name as opened.
    pub name: String,
    /// Flags defined for the mailbox.
    pub flags: Flags,
    /// Number of messages present.
    pub exists: u32,
    /// Number of recent messages.
    pub recent: u32,
    /// Next UID to be assigned.
    pub uid_next: Option<Uid>,
    /// UIDVALIDITY value.
    pub uid_validity: Option<UidValidity>,
    /// Whether the mailbox was opened read-only.
    pub read_only: bool,
}

impl BoxStatus {
    /// Creates an empty status for a mailbox name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// One mailbox in the hierarchy listing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MailboxInfo {
    /// Mailbox name (last hierarchy component).
    pub name: String,
    /// Hierarchy delimiter, when the server reports one.
    pub delimiter: Option<char>,
    /// LIST attributes.
    pub attributes: Vec<MailboxAttribute>,
    /// Child mailboxes.
    pub children: Vec<MailboxInfo>,
}

impl MailboxInfo {
    /// Creates a mailbox entry with no attributes or children.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            delimiter: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Returns `true` when the mailbox can be opened.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        !self.attributes.contains(&MailboxAttribute::NoSelect)
    }
}

/// Mailbox attribute from a LIST response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MailboxAttribute {
    /// Mailbox cannot be selected.
    NoSelect,
    /// Mailbox cannot have children.
    NoInferiors,
    /// Mailbox is marked for attention.
    Marked,
    /// Mailbox is not marked.
    Unmarked,
    /// Mailbox has children.
    HasChildren,
    /// Mailbox has no children.
    HasNoChildren,
    /// Drafts folder (RFC 6154).
    Drafts,
    /// Sent folder (RFC 6154).
    Sent,
    /// Trash folder (RFC 6154).
    Trash,
    /// Junk folder (RFC 6154).
    Junk,
    /// Archive folder (RFC 6154).
    Archive,
    /// Unrecognized attribute.
    Unknown(String),
}

impl MailboxAttribute {
    /// Parses a LIST attribute string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "\\NOSELECT" => Self::NoSelect,
            "\\NOINFERIORS" => Self::NoInferiors,
            "\\MARKED" => Self::Marked,
            "\\UNMARKED" => Self::Unmarked,
            "\\HASCHILDREN" => Self::HasChildren,
            "\\HASNOCHILDREN" => Self::HasNoChildren,
            "\\DRAFTS" => Self::Drafts,
            "\\SENT" => Self::Sent,
            "\\TRASH" => Self::Trash,
            "\\JUNK" | "\\SPAM" => Self::Junk,
            "\\ARCHIVE" => Self::Archive,
            _ => Self::Unknown(s.to_string()),
        }
    }
}

/// What a fetch should retrieve for each message.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Body sections to stream (`"TEXT"`, `"HEADER"`, `"1.2"`, ...).
    pub bodies: Vec<String>,
    /// Whether to request the BODYSTRUCTURE tree.
    pub fetch_struct: bool,
    /// Whether fetching marks the messages seen.
    pub mark_seen: bool,
}

impl FetchOptions {
    /// Creates options that fetch attributes only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one body section to stream.
    #[must_use]
    pub fn body(mut self, section: impl Into<String>) -> Self {
        self.bodies.push(section.into());
        self
    }

    /// Requests the BODYSTRUCTURE tree.
    #[must_use]
    pub const fn fetch_struct(mut self, fetch: bool) -> Self {
        self.fetch_struct = fetch;
        self
    }

    /// Sets whether the fetch marks messages seen.
    #[must_use]
    pub const fn mark_seen(mut self, mark: bool) -> Self {
        self.mark_seen = mark;
        self
    }
}

/// How a store operation combines with existing flags or labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagAction {
    /// Add to the existing set.
    Add,
    /// Remove from the existing set.
    Remove,
    /// Replace the existing set.
    Replace,
}

/// One search criterion, rendered to IMAP SEARCH syntax via `Display`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCriterion {
    /// Every message.
    All,
    /// Messages without the `\Seen` flag.
    Unseen,
    /// Messages with the `\Seen` flag.
    Seen,
    /// Messages with the `\Answered` flag.
    Answered,
    /// Messages with the `\Flagged` flag.
    Flagged,
    /// Messages with the `\Deleted` flag.
    Deleted,
    /// Sender contains the string.
    From(String),
    /// Recipient contains the string.
    To(String),
    /// Subject contains the string.
    Subject(String),
    /// Body or headers contain the string.
    Text(String),
    /// Named header contains the string.
    Header(String, String),
    /// Internal date on or after the day.
    Since(NaiveDate),
    /// Internal date before the day.
    Before(NaiveDate),
    /// Internal date within the day.
    On(NaiveDate),
    /// Size greater than the byte count.
    Larger(u32),
    /// Size smaller than the byte count.
    Smaller(u32),
    /// Explicit UID set, e.g. `"1:100"`.
    Uid(String),
}

impl fmt::Display for SearchCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "ALL"),
            Self::Unseen => write!(f, "UNSEEN"),
            Self::Seen => write!(f, "SEEN"),
            Self::Answered => write!(f, "ANSWERED"),
            Self::Flagged => write!(f, "FLAGGED"),
            Self::Deleted => write!(f, "DELETED"),
            Self::From(s) => write!(f, "FROM {}", quoted(s)),
            Self::To(s) => write!(f, "TO {}", quoted(s)),
            Self::Subject(s) => write!(f, "SUBJECT {}", quoted(s)),
            Self::Text(s) => write!(f, "TEXT {}", quoted(s)),
            Self::Header(name, value) => write!(f, "HEADER {name} {}", quoted(value)),
            Self::Since(date) => write!(f, "SINCE {}", date.format("%d-%b-%Y")),
            Self::Before(date) => write!(f, "BEFORE {}", date.format("%d-%b-%Y")),
            Self::On(date) => write!(f, "ON {}", date.format("%d-%b-%Y")),
            Self::Larger(n) => write!(f, "LARGER {n}"),
            Self::Smaller(n) => write!(f, "SMALLER {n}"),
            Self::Uid(set) => write!(f, "UID {set}"),
        }
    }
}

/// Quotes a search string, escaping backslash and double quote.
fn quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Protocol operations the convenience layer delegates to.
///
/// One implementation per wrapped protocol client. Methods mirror the
/// commands of an authenticated-and-selected session; the backend owns
/// connection state, pipelining and response parsing.
#[allow(async_fn_in_trait)]
pub trait MailBackend: Send {
    /// Opens a mailbox, read-write unless `read_only` is set.
    async fn open_box(&mut self, name: &str, read_only: bool) -> Result<BoxStatus>;

    /// Closes the open mailbox, expunging deleted messages when
    /// `auto_expunge` is set.
    async fn close_box(&mut self, auto_expunge: bool) -> Result<()>;

    /// Lists the mailbox hierarchy.
    async fn list_boxes(&mut self) -> Result<Vec<MailboxInfo>>;

    /// Creates a mailbox.
    async fn add_box(&mut self, name: &str) -> Result<()>;

    /// Deletes a mailbox.
    async fn del_box(&mut self, name: &str) -> Result<()>;

    /// Searches the open mailbox, returning matching UIDs.
    async fn search(&mut self, criteria: &[SearchCriterion]) -> Result<Vec<Uid>>;

    /// Starts a fetch for the given messages.
    ///
    /// Yields one event channel per message, in fetch order.
    async fn fetch(&mut self, uids: &[Uid], options: &FetchOptions) -> Result<FetchStream>;

    /// Stores flags on messages.
    async fn store_flags(&mut self, uids: &[Uid], action: FlagAction, flags: &[Flag])
    -> Result<()>;

    /// Stores Gmail labels on messages (`X-GM-LABELS` extension).
    async fn store_labels(
        &mut self,
        uids: &[Uid],
        action: FlagAction,
        labels: &[String],
    ) -> Result<()>;

    /// Moves messages to another mailbox.
    async fn move_messages(&mut self, uids: &[Uid], mailbox: &str) -> Result<()>;

    /// Appends a raw message to a mailbox.
    async fn append(&mut self, mailbox: &str, body: &[u8], flags: &[Flag]) -> Result<()>;

    /// Expunges messages marked deleted in the open mailbox.
    async fn expunge(&mut self) -> Result<()>;

    /// Ends the session.
    async fn end(&mut self) -> Result<()>;
}
