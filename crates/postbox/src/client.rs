//! The promise-style convenience surface.
//!
//! `Client` wraps a [`MailBackend`] and exposes the operations an
//! application actually wants: open a mailbox, search, fetch fully
//! assembled messages, decode a part, manipulate flags and labels,
//! manage mailboxes. Every method is a thin, typed delegation; the
//! protocol work stays in the backend.

use std::time::Duration;

use tokio::task::JoinSet;

use postbox_mime::DecodedBody;

use crate::assemble::{Message, assemble_message};
use crate::attributes::PartDescriptor;
use crate::error::{Error, Result};
use crate::events::FetchStream;
use crate::parts::decode_single;
use crate::session::{
    BoxStatus, FetchOptions, FlagAction, MailBackend, MailboxInfo, SearchCriterion,
};
use crate::types::{Flag, Uid};

/// Client behavior knobs.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Deadline for one whole fetch-and-assemble operation.
    ///
    /// The assembler itself never times out; without this, a fetch
    /// whose event source stops emitting stalls until the connection
    /// dies.
    pub fetch_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Creates the default configuration (no fetch deadline).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fetch deadline.
    #[must_use]
    pub const fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }
}

/// Convenience client over a protocol backend.
#[derive(Debug)]
pub struct Client<B> {
    backend: B,
    config: ClientConfig,
}

impl<B: MailBackend> Client<B> {
    /// Wraps a backend with default configuration.
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, ClientConfig::default())
    }

    /// Wraps a backend with the given configuration.
    pub fn with_config(backend: B, config: ClientConfig) -> Self {
        Self { backend, config }
    }

    /// Direct access to the wrapped backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Opens a mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot open the mailbox.
    pub async fn open_box(&mut self, name: &str, read_only: bool) -> Result<BoxStatus> {
        tracing::debug!(mailbox = name, read_only, "opening mailbox");
        self.backend.open_box(name, read_only).await
    }

    /// Closes the open mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if no mailbox is open or the close fails.
    pub async fn close_box(&mut self, auto_expunge: bool) -> Result<()> {
        tracing::debug!(auto_expunge, "closing mailbox");
        self.backend.close_box(auto_expunge).await
    }

    /// Lists the mailbox hierarchy.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    pub async fn get_boxes(&mut self) -> Result<Vec<MailboxInfo>> {
        self.backend.list_boxes().await
    }

    /// Creates a mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the mailbox cannot be created.
    pub async fn add_box(&mut self, name: &str) -> Result<()> {
        tracing::debug!(mailbox = name, "creating mailbox");
        self.backend.add_box(name).await
    }

    /// Deletes a mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the mailbox cannot be deleted.
    pub async fn del_box(&mut self, name: &str) -> Result<()> {
        tracing::debug!(mailbox = name, "deleting mailbox");
        self.backend.del_box(name).await
    }

    /// Searches the open mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails.
    pub async fn search(&mut self, criteria: &[SearchCriterion]) -> Result<Vec<Uid>> {
        self.backend.search(criteria).await
    }

    /// Searches, then fetches and assembles every match.
    ///
    /// # Errors
    ///
    /// Returns an error if the search or any assembly fails.
    pub async fn search_with_fetch(
        &mut self,
        criteria: &[SearchCriterion],
        options: &FetchOptions,
    ) -> Result<Vec<Message>> {
        let uids = self.backend.search(criteria).await?;
        tracing::debug!(matches = uids.len(), "search complete");
        if uids.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch(&uids, options).await
    }

    /// Fetches and assembles the given messages.
    ///
    /// Messages assemble concurrently; the returned order is the fetch
    /// order regardless of which assembly finishes first, and each
    /// message's `seq_no` records its fetch index.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails, an assembly fails, or the
    /// configured fetch deadline passes.
    pub async fn fetch(&mut self, uids: &[Uid], options: &FetchOptions) -> Result<Vec<Message>> {
        let limit = self.config.fetch_timeout;
        let run = async {
            let stream = self.backend.fetch(uids, options).await?;
            collect_messages(stream).await
        };
        match limit {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .map_err(|_| Error::Timeout(limit))?,
            None => run.await,
        }
    }

    /// Fetches one part and decodes it per its descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSection`] for a descriptor without a
    /// section path, [`Error::Arity`] when the fetch does not produce
    /// exactly one part, and decode errors per the declared encoding.
    pub async fn single_part_data(
        &mut self,
        uid: Uid,
        descriptor: &PartDescriptor,
    ) -> Result<DecodedBody> {
        let section = descriptor.part_id.as_deref().ok_or(Error::MissingSection)?;
        let options = FetchOptions::new().body(section);
        let mut messages = self.fetch(std::slice::from_ref(&uid), &options).await?;
        let Some(message) = messages.pop() else {
            return Err(Error::Backend(format!("fetch produced no message for uid {uid}")));
        };
        decode_single(&message, descriptor)
    }

    /// Adds flags to messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn add_flags(&mut self, uids: &[Uid], flags: &[Flag]) -> Result<()> {
        self.backend.store_flags(uids, FlagAction::Add, flags).await
    }

    /// Removes flags from messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn del_flags(&mut self, uids: &[Uid], flags: &[Flag]) -> Result<()> {
        self.backend
            .store_flags(uids, FlagAction::Remove, flags)
            .await
    }

    /// Replaces the flags on messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn set_flags(&mut self, uids: &[Uid], flags: &[Flag]) -> Result<()> {
        self.backend
            .store_flags(uids, FlagAction::Replace, flags)
            .await
    }

    /// Adds Gmail labels to messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn add_labels(&mut self, uids: &[Uid], labels: &[String]) -> Result<()> {
        self.backend
            .store_labels(uids, FlagAction::Add, labels)
            .await
    }

    /// Removes Gmail labels from messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn del_labels(&mut self, uids: &[Uid], labels: &[String]) -> Result<()> {
        self.backend
            .store_labels(uids, FlagAction::Remove, labels)
            .await
    }

    /// Replaces the Gmail labels on messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn set_labels(&mut self, uids: &[Uid], labels: &[String]) -> Result<()> {
        self.backend
            .store_labels(uids, FlagAction::Replace, labels)
            .await
    }

    /// Moves messages to another mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the move fails.
    pub async fn move_messages(&mut self, uids: &[Uid], mailbox: &str) -> Result<()> {
        tracing::debug!(count = uids.len(), mailbox, "moving messages");
        self.backend.move_messages(uids, mailbox).await
    }

    /// Appends a raw message to a mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the append fails.
    pub async fn append(&mut self, mailbox: &str, body: &[u8], flags: &[Flag]) -> Result<()> {
        tracing::debug!(mailbox, bytes = body.len(), "appending message");
        self.backend.append(mailbox, body, flags).await
    }

    /// Marks messages deleted and expunges them.
    ///
    /// # Errors
    ///
    /// Returns an error if the store or expunge fails.
    pub async fn delete_messages(&mut self, uids: &[Uid]) -> Result<()> {
        self.add_flags(uids, &[Flag::Deleted]).await?;
        self.backend.expunge().await
    }

    /// Expunges messages marked deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the expunge fails.
    pub async fn expunge(&mut self) -> Result<()> {
        self.backend.expunge().await
    }

    /// Ends the session, consuming the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the logout fails.
    pub async fn end(mut self) -> Result<()> {
        self.backend.end().await
    }
}

/// Assembles every message of a fetch, restoring fetch order.
///
/// Assemblies complete in arbitrary order; results are buffered as
/// `(index, message)` pairs and materialized into the final sequence
/// only once the cardinality is known.
async fn collect_messages(mut stream: FetchStream) -> Result<Vec<Message>> {
    let mut assemblies: JoinSet<(usize, Result<Message>)> = JoinSet::new();
    let mut expected = 0usize;

    while let Some(events) = stream.recv().await {
        let index = expected;
        expected += 1;
        assemblies.spawn(async move { (index, assemble_message(events).await) });
    }

    let mut slots: Vec<Option<Message>> = vec![None; expected];
    while let Some(joined) = assemblies.join_next().await {
        let (index, assembled) = joined?;
        let mut message = assembled?;
        message.seq_no = Some(index);
        slots[index] = Some(message);
    }

    Ok(slots.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_no_deadline() {
        assert!(ClientConfig::new().fetch_timeout.is_none());
    }

    #[test]
    fn config_builder_sets_deadline() {
        let config = ClientConfig::new().fetch_timeout(Duration::from_secs(30));
        assert_eq!(config.fetch_timeout, Some(Duration::from_secs(30)));
    }
}
