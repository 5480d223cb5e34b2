//! `matrix.to` permalinks.
//!
//! Creating permalinks for rooms, users and events, and parsing them back
//! into typed references.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use url::Url;

use crate::error::{Error, ErrorKind, Result};
use crate::identifier::{EventId, EventReference, RoomReference, UserId};

/// Characters escaped in a single path component of a permalink.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const BASE: &str = "https://matrix.to/#/";

/// What a permalink points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Permalink {
    /// A room, with any `via` servers.
    Room(RoomReference),
    /// A user.
    User(UserId),
    /// An event inside a room.
    Event(EventReference),
}

/// Functions for creating and parsing permalinks.
pub struct Permalinks;

impl Permalinks {
    fn encode(component: &str) -> String {
        utf8_percent_encode(component, COMPONENT).to_string()
    }

    fn encode_via(servers: &[String]) -> String {
        if servers.is_empty() {
            return String::new();
        }
        let mut query = url::form_urlencoded::Serializer::new(String::from("?"));
        for server in servers {
            query.append_pair("via", server);
        }
        query.finish()
    }

    /// Creates a room permalink.
    #[must_use]
    pub fn for_room(room_id_or_alias: &str, via: &[String]) -> String {
        format!(
            "{BASE}{}{}",
            Self::encode(room_id_or_alias),
            Self::encode_via(via)
        )
    }

    /// Creates a user permalink.
    #[must_use]
    pub fn for_user(user_id: &str) -> String {
        format!("{BASE}{}", Self::encode(user_id))
    }

    /// Creates an event permalink.
    #[must_use]
    pub fn for_event(room_id_or_alias: &str, event_id: &str, via: &[String]) -> String {
        format!(
            "{BASE}{}/{}{}",
            Self::encode(room_id_or_alias),
            Self::encode(event_id),
            Self::encode_via(via)
        )
    }

    /// Parses a `matrix.to` URL into what it refers to.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidPermalink`] if the URL is not a
    /// `matrix.to` link or the entity it names is not well shaped.
    pub fn parse(permalink: &str) -> Result<Permalink> {
        let invalid = |reason: &str| {
            Error::new(ErrorKind::InvalidPermalink {
                url: permalink.to_string(),
                reason: reason.to_string(),
            })
        };
        let url = Url::parse(permalink).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme() != "https" || url.host_str() != Some("matrix.to") {
            return Err(invalid("not a matrix.to link"));
        }
        let fragment = url
            .fragment()
            .and_then(|fragment| fragment.strip_prefix('/'))
            .ok_or_else(|| invalid("missing entity"))?;
        let (path, query) = fragment.split_once('?').unwrap_or((fragment, ""));
        let (entity, event) = match path.split_once('/') {
            Some((entity, event)) if !event.is_empty() => (entity, Some(event)),
            Some((entity, _)) => (entity, None),
            None => (path, None),
        };
        let decode = |component: &str| {
            percent_decode_str(component)
                .decode_utf8()
                .map(|decoded| decoded.into_owned())
                .map_err(|_| invalid("entity is not valid UTF-8"))
        };
        let entity = decode(entity)?;
        let via: Vec<String> = url::form_urlencoded::parse(query.as_bytes())
            .filter(|(key, _)| key == "via")
            .map(|(_, value)| value.into_owned())
            .collect();

        match entity.chars().next() {
            Some('@') => UserId::parse(&entity)
                .map(Permalink::User)
                .ok_or_else(|| invalid("malformed user id")),
            Some('#' | '!') => {
                let room = RoomReference::parse_with_via(&entity, via)
                    .ok_or_else(|| invalid("malformed room id or alias"))?;
                match event {
                    Some(event) => Ok(Permalink::Event(EventReference::new(
                        room,
                        EventId::new(decode(event)?),
                    ))),
                    None => Ok(Permalink::Room(room)),
                }
            }
            _ => Err(invalid("unexpected entity")),
        }
    }
}
