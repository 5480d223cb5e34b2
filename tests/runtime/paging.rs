//! Integration tests for sending documents as pages

use proptest::prelude::*;
use warden_document::{InnerNode, render_html, render_plain};
use warden_foundation::{EventId, RoomReference};
use warden_runtime::{Destination, MemoryTransport, Relation, render_and_send};

fn send(document: &InnerNode, limit: usize) -> (Vec<EventId>, MemoryTransport) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let transport = MemoryTransport::new();
    let room = RoomReference::parse("!control:example.org").unwrap();
    let reply_to = EventId::new("$command");
    let ids = runtime
        .block_on(render_and_send(
            document,
            Destination {
                room: &room,
                reply_to: Some(&reply_to),
            },
            &transport,
            limit,
        ))
        .unwrap();
    (ids, transport)
}

fn joined(transport: &MemoryTransport) -> (String, String) {
    let messages = transport.messages();
    (
        messages.iter().map(|(_, m)| m.body.as_str()).collect(),
        messages.iter().map(|(_, m)| m.formatted_body.as_str()).collect(),
    )
}

#[derive(Clone, Debug)]
enum Block {
    Paragraph(Vec<String>),
    List(Vec<Vec<String>>),
}

fn words() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}", 1..5)
}

fn blocks() -> impl Strategy<Value = Vec<Block>> {
    prop::collection::vec(
        prop_oneof![
            words().prop_map(Block::Paragraph),
            prop::collection::vec(words(), 1..4).prop_map(Block::List),
        ],
        0..8,
    )
}

fn build(blocks: &[Block]) -> InnerNode {
    let mut root = InnerNode::root();
    for block in blocks {
        match block {
            Block::Paragraph(words) => {
                root.paragraph().text(words.join(" "));
            }
            Block::List(items) => {
                let list = root.unordered_list();
                for words in items {
                    list.list_item().text(words.join(" "));
                }
            }
        }
    }
    root
}

proptest! {
    #[test]
    fn pages_respect_the_limit_and_concatenate(blocks in blocks(), limit in 100usize..400) {
        let document = build(&blocks);
        let (ids, transport) = send(&document, limit);
        let messages = transport.messages();
        prop_assert_eq!(ids.len(), messages.len());
        for (_, message) in &messages {
            prop_assert!(message.body.len() <= limit);
            prop_assert!(message.formatted_body.len() <= limit);
        }
        let (plain, html) = joined(&transport);
        prop_assert_eq!(plain, render_plain(&document).unwrap());
        prop_assert_eq!(html, render_html(&document).unwrap());
    }
}

#[test]
fn small_limits_split_a_greeting_and_a_list() {
    let mut document = InnerNode::root();
    document.paragraph().text("Hello");
    let list = document.unordered_list();
    list.list_item().text("a");
    list.list_item().text("b");

    let (ids, transport) = send(&document, 24);
    assert!(ids.len() >= 2);
    let (plain, html) = joined(&transport);
    assert_eq!(plain, render_plain(&document).unwrap());
    assert_eq!(html, render_html(&document).unwrap());

    let messages = transport.messages();
    assert_eq!(
        messages[0].1.relation,
        Some(Relation::Reply(EventId::new("$command")))
    );
    assert!(
        messages[1..]
            .iter()
            .all(|(_, m)| m.relation == Some(Relation::Thread(ids[0].clone())))
    );
}

#[test]
fn generous_limits_send_one_message() {
    let mut document = InnerNode::root();
    document.paragraph().text("Hello");
    let (ids, _) = send(&document, 20_000);
    assert_eq!(ids.len(), 1);
}
