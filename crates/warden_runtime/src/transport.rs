//! The seam between Warden and whatever delivers Matrix events.
//!
//! Warden never talks to a homeserver itself. It sends through
//! [`MessageSender`] and [`ReactionSender`] and is fed [`RoomEvent`]s.
//! [`MemoryTransport`] keeps everything in memory, which is what the
//! console and the tests use.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use warden_foundation::{EventId, Result, RoomReference, UserId};

/// How a message relates to an earlier one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// A reply to an event.
    Reply(EventId),
    /// A continuation in the thread rooted at an event.
    Thread(EventId),
}

/// A message with both of its bodies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// The room to send to.
    pub room: RoomReference,
    /// Plain text body.
    pub body: String,
    /// HTML body.
    pub formatted_body: String,
    /// What the message relates to, if anything.
    pub relation: Option<Relation>,
}

/// Sends messages to rooms.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Sends a message and returns the id of the new event.
    ///
    /// # Errors
    ///
    /// Fails if the message could not be delivered.
    async fn send_message(&self, message: OutgoingMessage) -> Result<EventId>;
}

/// Annotates events with reactions.
#[async_trait]
pub trait ReactionSender: Send + Sync {
    /// Reacts to `event` in `room` with `key`.
    ///
    /// # Errors
    ///
    /// Fails if the reaction could not be delivered.
    async fn send_reaction(&self, room: &RoomReference, event: &EventId, key: &str) -> Result<()>;
}

/// A text message sent by someone in a room.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMessage {
    /// The room it was sent in.
    pub room: RoomReference,
    /// Its event id.
    pub event_id: EventId,
    /// Who sent it.
    pub sender: UserId,
    /// The plain text body.
    pub body: String,
}

/// A reaction to an earlier event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    /// The room it was sent in.
    pub room: RoomReference,
    /// Who reacted.
    pub sender: UserId,
    /// The event reacted to.
    pub relates_to: EventId,
    /// The reaction key, usually an emoji.
    pub key: String,
}

/// An event delivered to Warden.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    /// A text message.
    Message(RoomMessage),
    /// A reaction.
    Reaction(Reaction),
}

/// Something that was sent through a [`MemoryTransport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sent {
    /// A message and the id it was given.
    Message(EventId, OutgoingMessage),
    /// A reaction.
    Reaction {
        /// The room reacted in.
        room: RoomReference,
        /// The event reacted to.
        event: EventId,
        /// The reaction key.
        key: String,
    },
}

/// A transport that records everything sent and numbers events `$1`, `$2`
/// and so on.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    sent: Mutex<Vec<Sent>>,
}

impl MemoryTransport {
    /// Creates an empty transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, sent: Sent) -> usize {
        let mut log = self.sent.lock().unwrap_or_else(PoisonError::into_inner);
        log.push(sent);
        log.len()
    }

    /// Returns everything sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<Sent> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the messages sent so far, with their ids.
    #[must_use]
    pub fn messages(&self) -> Vec<(EventId, OutgoingMessage)> {
        self.sent()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Message(id, message) => Some((id, message)),
                Sent::Reaction { .. } => None,
            })
            .collect()
    }

    /// Returns the keys of the reactions sent to `event`, in order.
    #[must_use]
    pub fn reactions_to(&self, event: &EventId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Reaction { event: target, key, .. } if &target == event => Some(key),
                _ => None,
            })
            .collect()
    }

    /// Returns the id of the last message sent.
    #[must_use]
    pub fn last_message_id(&self) -> Option<EventId> {
        self.messages().pop().map(|(id, _)| id)
    }
}

#[async_trait]
impl MessageSender for MemoryTransport {
    async fn send_message(&self, message: OutgoingMessage) -> Result<EventId> {
        let mut log = self.sent.lock().unwrap_or_else(PoisonError::into_inner);
        let id = EventId::new(format!("${}", log.len() + 1));
        log.push(Sent::Message(id.clone(), message));
        Ok(id)
    }
}

#[async_trait]
impl ReactionSender for MemoryTransport {
    async fn send_reaction(&self, room: &RoomReference, event: &EventId, key: &str) -> Result<()> {
        self.record(Sent::Reaction {
            room: room.clone(),
            event: event.clone(),
            key: key.to_string(),
        });
        Ok(())
    }
}
