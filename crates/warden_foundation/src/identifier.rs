//! Matrix identifiers that commands can refer to.
//!
//! Room ids (`!opaque:server`), room aliases (`#local:server`), user ids
//! (`@local:server`) and references to individual events. Parsing is
//! deliberately shallow: an identifier is "well shaped" when it has its
//! sigil, a non-empty local part, a `:` and a non-empty server part, and
//! contains no whitespace. Anything else is left to callers to treat as
//! plain text.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::permalink::Permalinks;

/// Splits `word` into `(localpart, server)` if it starts with `sigil` and is
/// well shaped.
fn split_identifier(sigil: char, word: &str) -> Option<(&str, &str)> {
    let body = word.strip_prefix(sigil)?;
    if body.chars().any(char::is_whitespace) {
        return None;
    }
    let (local, server) = body.split_once(':')?;
    if local.is_empty() || server.is_empty() {
        return None;
    }
    Some((local, server))
}

/// Whether a room reference is an opaque id or a human readable alias.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RoomKind {
    /// `!opaque:server`
    Id,
    /// `#local:server`
    Alias,
}

/// A universal reference to a Matrix room.
///
/// There are several ways of referring to a room (ids, aliases, permalinks)
/// and some of them need extra routing information (`via` servers) to be
/// useful before the homeserver has joined the room.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoomReference {
    kind: RoomKind,
    reference: String,
    via: Vec<String>,
}

impl RoomReference {
    /// Parses a room id or alias, returning `None` if it is not well shaped.
    #[must_use]
    pub fn parse(word: &str) -> Option<Self> {
        let kind = match word.chars().next()? {
            '!' => RoomKind::Id,
            '#' => RoomKind::Alias,
            _ => return None,
        };
        let sigil = if kind == RoomKind::Id { '!' } else { '#' };
        split_identifier(sigil, word)?;
        Some(Self {
            kind,
            reference: word.to_string(),
            via: Vec::new(),
        })
    }

    /// Parses a room reference and attaches `via` servers to it.
    #[must_use]
    pub fn parse_with_via(word: &str, via: Vec<String>) -> Option<Self> {
        Self::parse(word).map(|reference| reference.with_via(via))
    }

    /// Replaces the `via` servers of this reference.
    #[must_use]
    pub fn with_via(mut self, via: Vec<String>) -> Self {
        self.via = via;
        self
    }

    /// Returns whether this is a room id or an alias.
    #[must_use]
    pub const fn kind(&self) -> RoomKind {
        self.kind
    }

    /// Returns true if this is an opaque room id.
    #[must_use]
    pub fn is_room_id(&self) -> bool {
        self.kind == RoomKind::Id
    }

    /// Returns the raw id or alias.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.reference
    }

    /// Returns the servers that can be used to route to the room.
    #[must_use]
    pub fn via_servers(&self) -> &[String] {
        &self.via
    }

    /// Returns the server part of the id or alias.
    #[must_use]
    pub fn server_name(&self) -> &str {
        self.reference
            .split_once(':')
            .map_or("", |(_, server)| server)
    }

    /// Creates a `matrix.to` permalink for this room.
    #[must_use]
    pub fn to_permalink(&self) -> String {
        Permalinks::for_room(&self.reference, &self.via)
    }
}

impl fmt::Display for RoomReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference)
    }
}

/// A Matrix user id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UserId(String);

impl UserId {
    /// Parses a user id, returning `None` if it is not well shaped.
    #[must_use]
    pub fn parse(word: &str) -> Option<Self> {
        split_identifier('@', word).map(|_| Self(word.to_string()))
    }

    /// Returns the raw user id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the part between `@` and the first `:`.
    #[must_use]
    pub fn localpart(&self) -> &str {
        split_identifier('@', &self.0).map_or("", |(local, _)| local)
    }

    /// Returns the server part of the user id.
    #[must_use]
    pub fn server_name(&self) -> &str {
        split_identifier('@', &self.0).map_or("", |(_, server)| server)
    }

    /// Creates a `matrix.to` permalink for this user.
    #[must_use]
    pub fn to_permalink(&self) -> String {
        Permalinks::for_user(&self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A reference to a single event within a room.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventReference {
    room: RoomReference,
    event_id: EventId,
}

impl EventReference {
    /// Creates a reference to `event_id` in `room`.
    #[must_use]
    pub fn new(room: RoomReference, event_id: EventId) -> Self {
        Self { room, event_id }
    }

    /// Returns the room the event was sent in.
    #[must_use]
    pub const fn room(&self) -> &RoomReference {
        &self.room
    }

    /// Returns the id of the event.
    #[must_use]
    pub const fn event_id(&self) -> &EventId {
        &self.event_id
    }

    /// Creates a `matrix.to` permalink for this event.
    #[must_use]
    pub fn to_permalink(&self) -> String {
        Permalinks::for_event(
            self.room.as_str(),
            self.event_id.as_str(),
            self.room.via_servers(),
        )
    }
}

impl fmt::Display for EventReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_permalink())
    }
}

/// The id of an event, as returned by the homeserver when sending.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventId(String);

impl EventId {
    /// Wraps a raw event id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw event id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
