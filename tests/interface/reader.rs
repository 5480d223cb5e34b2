//! Integration tests for the command reader

use proptest::prelude::*;
use warden_foundation::{RoomKind, RoomReference, UserId};
use warden_interface::{Keyword, ReadItem, print_readably, read_command};

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn plain_words_read_as_one_string_each(
        words in prop::collection::vec("[a-zA-Z0-9][a-zA-Z0-9._]{0,10}", 0..12),
        separator in "[ \t\n]{1,3}",
    ) {
        let text = words.join(&separator);
        let items = read_command(&text);
        prop_assert_eq!(items.len(), words.len());
        for (item, word) in items.iter().zip(&words) {
            prop_assert_eq!(item, &ReadItem::String(word.clone()));
        }
    }

    #[test]
    fn well_formed_rooms_round_trip(
        sigil in prop::sample::select(vec!['#', '!']),
        local in "[a-z0-9]{1,12}",
        server in "[a-z]{1,10}\\.(org|net|com)",
    ) {
        let text = format!("{sigil}{local}:{server}");
        let items = read_command(&text);
        prop_assert_eq!(items.len(), 1);
        let ReadItem::Room(room) = &items[0] else {
            return Err(TestCaseError::fail(format!("{text} did not read as a room")));
        };
        prop_assert_eq!(room.as_str(), text.as_str());
        let expected = if sigil == '#' { RoomKind::Alias } else { RoomKind::Id };
        prop_assert_eq!(room.kind(), expected);
        prop_assert_eq!(read_command(&print_readably(&items[0])), items);
    }

    #[test]
    fn malformed_rooms_stay_strings(
        sigil in prop::sample::select(vec!['#', '!']),
        local in "[a-z0-9]{1,12}",
    ) {
        let text = format!("{sigil}{local}");
        prop_assert_eq!(read_command(&text), vec![ReadItem::String(text.clone())]);
    }
}

// =============================================================================
// Examples
// =============================================================================

#[test]
fn moderation_command_reads_into_typed_items() {
    let items =
        read_command("!draupnir ban #room:example.org @spam:example.org spamming --no-confirm");
    assert_eq!(
        items,
        vec![
            ReadItem::String("!draupnir".to_string()),
            ReadItem::String("ban".to_string()),
            ReadItem::Room(RoomReference::parse("#room:example.org").unwrap()),
            ReadItem::User(UserId::parse("@spam:example.org").unwrap()),
            ReadItem::String("spamming".to_string()),
            ReadItem::Keyword(Keyword::new("no-confirm")),
        ]
    );
}

#[test]
fn permalinks_read_as_references() {
    let items = read_command(
        "https://matrix.to/#/%23room%3Aexample.org https://matrix.to/#/@spam:example.org",
    );
    assert_eq!(
        items[0],
        ReadItem::Room(RoomReference::parse("#room:example.org").unwrap())
    );
    assert_eq!(
        items[1],
        ReadItem::User(UserId::parse("@spam:example.org").unwrap())
    );
}

#[test]
fn keywords_accept_both_prefixes() {
    assert_eq!(
        read_command(":reason --reason"),
        vec![
            ReadItem::Keyword(Keyword::new("reason")),
            ReadItem::Keyword(Keyword::new("reason")),
        ]
    );
}
