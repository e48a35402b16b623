//! Integration tests for the convenience client.
//!
//! These tests drive `Client` against a scripted backend that replays
//! fetch event streams, without requiring a real server connection.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;

use chrono::DateTime;

use postbox::{
    BoxStatus, Client, ClientConfig, DecodedBody, Error, FetchEvent, FetchOptions, FetchStream,
    Flag, FlagAction, MailBackend, MailboxInfo, MessageAttributes, PartDescriptor, PartInfo,
    Result, SearchCriterion, Uid, flatten_parts,
};

/// How a scripted message's event stream terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Finale {
    /// Normal terminal end event.
    End,
    /// Keep the stream open forever without an end event.
    Stall,
    /// Drop the stream without an end event.
    Drop,
}

/// One message the mock backend can replay.
#[derive(Debug, Clone)]
struct ScriptedMessage {
    uid: u32,
    /// `(section tag, raw content)` pairs, played for matching fetches.
    sections: Vec<(String, Vec<u8>)>,
    attributes_first: bool,
    finale: Finale,
}

impl ScriptedMessage {
    fn new(uid: u32) -> Self {
        Self {
            uid,
            sections: Vec::new(),
            attributes_first: true,
            finale: Finale::End,
        }
    }

    fn section(mut self, tag: &str, content: &[u8]) -> Self {
        self.sections.push((tag.to_string(), content.to_vec()));
        self
    }

    fn attributes_last(mut self) -> Self {
        self.attributes_first = false;
        self
    }

    fn finale(mut self, finale: Finale) -> Self {
        self.finale = finale;
        self
    }
}

/// Scripted backend recording every delegated operation.
#[derive(Debug, Default)]
struct MockBackend {
    messages: Vec<ScriptedMessage>,
    search_results: Vec<u32>,
    searches: Vec<String>,
    flag_stores: Vec<(FlagAction, Vec<Flag>)>,
    label_stores: Vec<(FlagAction, Vec<String>)>,
    expunges: usize,
}

impl MockBackend {
    fn with_messages(messages: Vec<ScriptedMessage>) -> Self {
        Self {
            search_results: messages.iter().map(|m| m.uid).collect(),
            messages,
            ..Self::default()
        }
    }
}

impl MailBackend for MockBackend {
    async fn open_box(&mut self, name: &str, read_only: bool) -> Result<BoxStatus> {
        let mut status = BoxStatus::new(name);
        status.read_only = read_only;
        status.exists = u32::try_from(self.messages.len()).unwrap();
        Ok(status)
    }

    async fn close_box(&mut self, _auto_expunge: bool) -> Result<()> {
        Ok(())
    }

    async fn list_boxes(&mut self) -> Result<Vec<MailboxInfo>> {
        Ok(vec![MailboxInfo::new("INBOX"), MailboxInfo::new("Archive")])
    }

    async fn add_box(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    async fn del_box(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    async fn search(&mut self, criteria: &[SearchCriterion]) -> Result<Vec<Uid>> {
        let rendered: Vec<String> = criteria.iter().map(ToString::to_string).collect();
        self.searches.push(rendered.join(" "));
        Ok(self
            .search_results
            .iter()
            .filter_map(|&uid| Uid::new(uid))
            .collect())
    }

    async fn fetch(&mut self, uids: &[Uid], options: &FetchOptions) -> Result<FetchStream> {
        let (stream_tx, stream_rx) = mpsc::channel(uids.len().max(1));
        for uid in uids {
            let Some(scripted) = self
                .messages
                .iter()
                .find(|m| m.uid == uid.get())
                .cloned()
            else {
                continue;
            };
            let (events_tx, events_rx) = mpsc::channel(16);
            let bodies = options.bodies.clone();
            tokio::spawn(play_message(
                events_tx,
                scripted,
                bodies,
                options.fetch_struct,
            ));
            stream_tx
                .send(events_rx)
                .await
                .map_err(|_| Error::Backend("fetch stream closed".to_string()))?;
        }
        Ok(stream_rx)
    }

    async fn store_flags(
        &mut self,
        _uids: &[Uid],
        action: FlagAction,
        flags: &[Flag],
    ) -> Result<()> {
        self.flag_stores.push((action, flags.to_vec()));
        Ok(())
    }

    async fn store_labels(
        &mut self,
        _uids: &[Uid],
        action: FlagAction,
        labels: &[String],
    ) -> Result<()> {
        self.label_stores.push((action, labels.to_vec()));
        Ok(())
    }

    async fn move_messages(&mut self, _uids: &[Uid], _mailbox: &str) -> Result<()> {
        Ok(())
    }

    async fn append(&mut self, _mailbox: &str, _body: &[u8], _flags: &[Flag]) -> Result<()> {
        Ok(())
    }

    async fn expunge(&mut self) -> Result<()> {
        self.expunges += 1;
        Ok(())
    }

    async fn end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Replays one scripted message into its event channel.
async fn play_message(
    events: mpsc::Sender<FetchEvent>,
    scripted: ScriptedMessage,
    bodies: Vec<String>,
    with_struct: bool,
) {
    let mut attrs = MessageAttributes::new(Uid::new(scripted.uid).unwrap());
    attrs.internal_date = DateTime::parse_from_rfc3339("2024-02-07T10:00:00+00:00").ok();
    if with_struct {
        attrs.structure = Some(
            PartDescriptor::new("multipart", "mixed")
                .child(
                    PartDescriptor::new("text", "plain")
                        .part_id("1")
                        .param("charset", "utf-8"),
                )
                .child(
                    PartDescriptor::new("application", "pdf")
                        .part_id("2")
                        .encoding("BASE64"),
                ),
        );
    }

    if scripted.attributes_first {
        let _ = events.send(FetchEvent::Attributes(attrs.clone())).await;
    }

    for (section, content) in &scripted.sections {
        if !bodies.contains(section) {
            continue;
        }
        let (chunk_tx, chunk_rx) = mpsc::channel(4);
        // Split into two chunks so accumulation is exercised.
        let mid = content.len() / 2;
        let _ = chunk_tx.send(Bytes::copy_from_slice(&content[..mid])).await;
        let _ = chunk_tx.send(Bytes::copy_from_slice(&content[mid..])).await;
        drop(chunk_tx);
        let _ = events
            .send(FetchEvent::Body {
                info: PartInfo::new(section.clone(), content.len() as u64),
                chunks: chunk_rx,
            })
            .await;
    }

    if !scripted.attributes_first {
        let _ = events.send(FetchEvent::Attributes(attrs)).await;
    }

    match scripted.finale {
        Finale::End => {
            let _ = events.send(FetchEvent::End).await;
        }
        Finale::Stall => {
            // Hold the sender open forever; the client's deadline fires.
            std::future::pending::<()>().await;
        }
        Finale::Drop => {}
    }
}

#[tokio::test]
async fn search_with_fetch_assembles_in_fetch_order() {
    let backend = MockBackend::with_messages(vec![
        ScriptedMessage::new(11).section("TEXT", b"first body"),
        ScriptedMessage::new(22)
            .section("TEXT", b"second body")
            .attributes_last(),
        ScriptedMessage::new(33).section("TEXT", b"third body"),
    ]);
    let mut client = Client::new(backend);

    let options = FetchOptions::new().body("TEXT");
    let messages = client
        .search_with_fetch(&[SearchCriterion::All], &options)
        .await
        .unwrap();

    let uids: Vec<u32> = messages.iter().map(|m| m.attributes.uid.get()).collect();
    assert_eq!(uids, [11, 22, 33]);
    let seq: Vec<Option<usize>> = messages.iter().map(|m| m.seq_no).collect();
    assert_eq!(seq, [Some(0), Some(1), Some(2)]);
    assert_eq!(messages[1].part("TEXT").unwrap().text(), Some("second body"));
}

#[tokio::test]
async fn search_renders_criteria_for_the_backend() {
    let backend = MockBackend::default();
    let mut client = Client::new(backend);

    client
        .search(&[
            SearchCriterion::Unseen,
            SearchCriterion::From("alice@example.com".to_string()),
        ])
        .await
        .unwrap();

    assert_eq!(
        client.backend_mut().searches,
        ["UNSEEN FROM \"alice@example.com\""]
    );
}

#[tokio::test]
async fn header_sections_come_back_structured() {
    let backend = MockBackend::with_messages(vec![ScriptedMessage::new(5)
        .section("HEADER", b"From: alice@example.com\r\nSubject: =?utf-8?B?SMOpbGxv?=\r\n")
        .section("TEXT", b"the body")]);
    let mut client = Client::new(backend);

    let options = FetchOptions::new().body("HEADER").body("TEXT");
    let messages = client.fetch(&[Uid::new(5).unwrap()], &options).await.unwrap();

    let message = &messages[0];
    let headers = message.part("HEADER").unwrap().headers().unwrap();
    assert_eq!(headers.get("from"), Some("alice@example.com"));
    assert_eq!(headers.get("subject"), Some("Héllo"));
    assert_eq!(message.part("TEXT").unwrap().text(), Some("the body"));
}

#[tokio::test]
async fn single_part_data_decodes_an_attachment() {
    let backend =
        MockBackend::with_messages(vec![ScriptedMessage::new(7).section("2", b"aGVsbG8=")]);
    let mut client = Client::new(backend);

    let descriptor = PartDescriptor::new("application", "octet-stream")
        .part_id("2")
        .encoding("BASE64");
    let data = client
        .single_part_data(Uid::new(7).unwrap(), &descriptor)
        .await
        .unwrap();

    assert_eq!(data, DecodedBody::Binary(b"hello".to_vec()));
}

#[tokio::test]
async fn fetch_struct_carries_the_structure_tree() {
    let backend =
        MockBackend::with_messages(vec![ScriptedMessage::new(7).section("2", b"aGVsbG8=")]);
    let mut client = Client::new(backend);

    let options = FetchOptions::new().fetch_struct(true);
    let messages = client.fetch(&[Uid::new(7).unwrap()], &options).await.unwrap();
    let message = &messages[0];
    assert!(message.attributes.internal_date.is_some());

    let structure = message.attributes.structure.as_ref().unwrap();
    let parts = flatten_parts(structure);
    assert_eq!(parts.len(), 2);

    // Walk the tree to the attachment, then fetch and decode it.
    let attachment = parts
        .iter()
        .find(|p| p.part_id.as_deref() == Some("2"))
        .unwrap();
    let data = client
        .single_part_data(Uid::new(7).unwrap(), attachment)
        .await
        .unwrap();
    assert_eq!(data, DecodedBody::Binary(b"hello".to_vec()));
}

#[tokio::test]
async fn single_part_data_rejects_multi_part_fetches() {
    // The backend misbehaves and streams the section twice.
    let backend = MockBackend::with_messages(vec![ScriptedMessage::new(7)
        .section("2", b"aGVsbG8=")
        .section("2", b"aGVsbG8=")]);
    let mut client = Client::new(backend);

    let descriptor = PartDescriptor::new("application", "octet-stream")
        .part_id("2")
        .encoding("BASE64");
    let result = client
        .single_part_data(Uid::new(7).unwrap(), &descriptor)
        .await;

    assert!(matches!(result, Err(Error::Arity { parts: 2 })));
}

#[tokio::test]
async fn single_part_data_requires_a_section_path() {
    let backend = MockBackend::default();
    let mut client = Client::new(backend);

    let descriptor = PartDescriptor::new("text", "plain");
    let result = client.single_part_data(Uid::new(1).unwrap(), &descriptor).await;

    assert!(matches!(result, Err(Error::MissingSection)));
}

#[tokio::test]
async fn mailbox_management_round_trip() {
    let backend = MockBackend::with_messages(vec![ScriptedMessage::new(1)]);
    let mut client = Client::new(backend);

    let status = client.open_box("INBOX", false).await.unwrap();
    assert_eq!(status.name, "INBOX");
    assert_eq!(status.exists, 1);
    assert!(!status.read_only);

    let boxes = client.get_boxes().await.unwrap();
    assert_eq!(boxes.len(), 2);
    assert!(boxes.iter().all(MailboxInfo::is_selectable));

    client.add_box("Archive/2024").await.unwrap();
    client.del_box("Archive/2024").await.unwrap();
    client
        .append("INBOX", b"From: a@b\r\n\r\nhi", &[Flag::Seen])
        .await
        .unwrap();
    client
        .move_messages(&[Uid::new(1).unwrap()], "Archive")
        .await
        .unwrap();
    client.close_box(true).await.unwrap();
}

#[tokio::test]
async fn flag_operations_delegate_with_the_right_action() {
    let backend = MockBackend::default();
    let mut client = Client::new(backend);
    let uids = [Uid::new(2).unwrap()];

    client.add_flags(&uids, &[Flag::Seen]).await.unwrap();
    client.del_flags(&uids, &[Flag::Seen]).await.unwrap();
    client.set_flags(&uids, &[Flag::Flagged]).await.unwrap();

    let actions: Vec<FlagAction> = client
        .backend_mut()
        .flag_stores
        .iter()
        .map(|(action, _)| *action)
        .collect();
    assert_eq!(
        actions,
        [FlagAction::Add, FlagAction::Remove, FlagAction::Replace]
    );
}

#[tokio::test]
async fn delete_messages_stores_deleted_then_expunges() {
    let backend = MockBackend::default();
    let mut client = Client::new(backend);

    client.delete_messages(&[Uid::new(4).unwrap()]).await.unwrap();

    let backend = client.backend_mut();
    assert_eq!(
        backend.flag_stores,
        [(FlagAction::Add, vec![Flag::Deleted])]
    );
    assert_eq!(backend.expunges, 1);
}

#[tokio::test]
async fn label_operations_delegate_with_the_right_action() {
    let backend = MockBackend::default();
    let mut client = Client::new(backend);
    let uids = [Uid::new(1).unwrap()];

    client.add_labels(&uids, &["work".to_string()]).await.unwrap();
    client.del_labels(&uids, &["work".to_string()]).await.unwrap();
    client.set_labels(&uids, &["done".to_string()]).await.unwrap();

    let actions: Vec<FlagAction> = client
        .backend_mut()
        .label_stores
        .iter()
        .map(|(action, _)| *action)
        .collect();
    assert_eq!(
        actions,
        [FlagAction::Add, FlagAction::Remove, FlagAction::Replace]
    );
}

#[tokio::test(start_paused = true)]
async fn stalled_fetch_hits_the_configured_deadline() {
    let backend = MockBackend::with_messages(vec![ScriptedMessage::new(9)
        .section("TEXT", b"never finishes")
        .finale(Finale::Stall)]);
    let config = ClientConfig::new().fetch_timeout(Duration::from_secs(5));
    let mut client = Client::with_config(backend, config);

    let options = FetchOptions::new().body("TEXT");
    let result = client.fetch(&[Uid::new(9).unwrap()], &options).await;

    assert!(matches!(result, Err(Error::Timeout(_))));
}

#[tokio::test]
async fn dropped_event_stream_surfaces_disconnected() {
    let backend =
        MockBackend::with_messages(vec![ScriptedMessage::new(3).finale(Finale::Drop)]);
    let mut client = Client::new(backend);

    let result = client.fetch(&[Uid::new(3).unwrap()], &FetchOptions::new()).await;

    assert!(matches!(result, Err(Error::Disconnected)));
}

#[tokio::test]
async fn end_consumes_the_client() {
    let backend = MockBackend::default();
    let client = Client::new(backend);
    client.end().await.unwrap();
}
