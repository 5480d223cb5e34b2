//! Answering prompts with reactions.
//!
//! [`ReactionPrompter`] sends the prompt and waits; [`ReactionHandler`]
//! holds the outstanding prompts, keyed by the id of the message that
//! offered them, and resolves them as reactions arrive.
//!
//! A prompt's message id is only known once it has been sent, so senders
//! [`reserve`](ReactionHandler::reserve) first. While any reservation is
//! held, reactions to unknown messages are kept and replayed against
//! prompts as they register.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::{debug, trace, warn};
use warden_document::InnerNode;
use warden_foundation::{Error, EventId, UserId};
use warden_interface::{
    CommandError, Keyword, ParameterDescription, PromptAcceptor, PromptRecord, PromptState,
    ReadItem, Resolution, render_confirmation_document, render_prompt_document,
};

use crate::dispatcher::Invocation;
use crate::render::{Destination, render_and_send};
use crate::transport::{MessageSender, Reaction, ReactionSender, RoomEvent};

/// The most reactions held while prompts are being sent.
const MAX_HELD_REACTIONS: usize = 64;

struct PendingPrompt {
    id: u64,
    record: PromptRecord<ReadItem>,
    answer: Option<oneshot::Sender<ReadItem>>,
}

#[derive(Default)]
struct Prompts {
    by_event: HashMap<EventId, Vec<PendingPrompt>>,
    reservations: usize,
    held: Vec<Reaction>,
}

impl Prompts {
    fn count(&self) -> usize {
        self.by_event.values().map(Vec::len).sum()
    }

    fn remove(&mut self, event: &EventId, id: u64) -> Option<PendingPrompt> {
        let prompts = self.by_event.get_mut(event)?;
        let index = prompts.iter().position(|prompt| prompt.id == id)?;
        let prompt = prompts.remove(index);
        if prompts.is_empty() {
            self.by_event.remove(event);
        }
        Some(prompt)
    }

    /// Applies a reaction. Returns true if it answered or withdrew a prompt.
    fn apply(&mut self, reaction: &Reaction) -> bool {
        let Some(prompts) = self.by_event.get_mut(&reaction.relates_to) else {
            if self.reservations > 0 {
                if self.held.len() == MAX_HELD_REACTIONS {
                    self.held.remove(0);
                }
                self.held.push(reaction.clone());
                trace!(event = %reaction.relates_to, "holding reaction while a prompt is sent");
            } else {
                trace!(event = %reaction.relates_to, "reaction to a message without prompts");
            }
            return false;
        };
        let mut unknown_key = false;
        let mut settled = None;
        for (index, prompt) in prompts.iter_mut().enumerate() {
            match prompt.record.resolve(&reaction.key) {
                Resolution::Accepted(value) => {
                    if let Some(answer) = prompt.answer.take() {
                        // The waiter may already have given up.
                        let _ = answer.send(value);
                    }
                    settled = Some(index);
                    break;
                }
                Resolution::Cancelled => {
                    settled = Some(index);
                    break;
                }
                Resolution::UnknownKey => unknown_key = true,
                Resolution::Ignored => {}
            }
        }
        let Some(index) = settled else {
            if unknown_key {
                warn!(
                    event = %reaction.relates_to,
                    sender = %reaction.sender,
                    key = %reaction.key,
                    "reaction key is not one of the prompt's options"
                );
            }
            return false;
        };
        let prompt = prompts.remove(index);
        if prompts.is_empty() {
            self.by_event.remove(&reaction.relates_to);
        }
        let outcome = if prompt.record.state() == PromptState::Cancelled {
            "prompt cancelled"
        } else {
            "prompt answered"
        };
        debug!(
            event = %reaction.relates_to,
            record = prompt.id,
            sender = %reaction.sender,
            key = %reaction.key,
            "{outcome}"
        );
        true
    }
}

/// Holds reactions to not-yet-registered prompts until dropped.
#[derive(Debug)]
pub struct PromptReservation<'h> {
    handler: &'h ReactionHandler,
}

impl Drop for PromptReservation<'_> {
    fn drop(&mut self) {
        let mut prompts = self.handler.lock();
        prompts.reservations = prompts.reservations.saturating_sub(1);
        if prompts.reservations == 0 {
            prompts.held.clear();
        }
    }
}

/// A registered prompt, redeemed with [`ReactionHandler::wait`].
///
/// Dropping the ticket withdraws the prompt.
#[derive(Debug)]
pub struct PromptTicket<'h> {
    handler: &'h ReactionHandler,
    event: EventId,
    id: u64,
    answer: oneshot::Receiver<ReadItem>,
}

impl PromptTicket<'_> {
    /// Returns the id of the message offering the prompt.
    #[must_use]
    pub const fn event(&self) -> &EventId {
        &self.event
    }
}

impl Drop for PromptTicket<'_> {
    fn drop(&mut self) {
        if self.handler.lock().remove(&self.event, self.id).is_some() {
            debug!(event = %self.event, record = self.id, "withdrew abandoned prompt");
        }
    }
}

/// Outstanding prompts, resolved by reactions.
pub struct ReactionHandler {
    bot_user: UserId,
    prompts: Mutex<Prompts>,
    next_id: AtomicU64,
}

impl ReactionHandler {
    /// Creates a handler that ignores reactions from `bot_user`.
    #[must_use]
    pub fn new(bot_user: UserId) -> Self {
        Self {
            bot_user,
            prompts: Mutex::new(Prompts::default()),
            next_id: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Prompts> {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts holding reactions to unknown messages until the reservation
    /// is dropped. Take one before sending a prompt.
    #[must_use]
    pub fn reserve(&self) -> PromptReservation<'_> {
        self.lock().reservations += 1;
        PromptReservation { handler: self }
    }

    /// Registers a prompt offered by the message `event`, applying any
    /// held reactions to it.
    pub fn register(&self, event: EventId, record: PromptRecord<ReadItem>) -> PromptTicket<'_> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();
        let mut prompts = self.lock();
        prompts
            .by_event
            .entry(event.clone())
            .or_default()
            .push(PendingPrompt {
                id,
                record,
                answer: Some(sender),
            });
        debug!(%event, record = id, "registered prompt");
        let (early, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut prompts.held)
            .into_iter()
            .partition(|reaction| reaction.relates_to == event);
        prompts.held = rest;
        for reaction in &early {
            prompts.apply(reaction);
        }
        drop(prompts);
        PromptTicket {
            handler: self,
            event,
            id,
            answer: receiver,
        }
    }

    /// Returns the number of prompts still waiting.
    #[must_use]
    pub fn pending_prompts(&self) -> usize {
        self.lock().count()
    }

    /// Feeds an event to the outstanding prompts. Returns true if it
    /// answered or cancelled one.
    pub fn handle_event(&self, event: &RoomEvent) -> bool {
        let RoomEvent::Reaction(reaction) = event else {
            return false;
        };
        if reaction.sender == self.bot_user {
            return false;
        }
        self.lock().apply(reaction)
    }

    /// Cancels every prompt offered by `event`. Returns how many were
    /// cancelled.
    pub fn cancel(&self, event: &EventId) -> usize {
        let removed = self.lock().by_event.remove(event).unwrap_or_default();
        let mut cancelled = 0;
        for mut prompt in removed {
            if prompt.record.cancel() {
                cancelled += 1;
            }
        }
        debug!(%event, cancelled, "cancelled prompts");
        cancelled
    }

    fn expire(&self, event: &EventId, id: u64) {
        if let Some(mut prompt) = self.lock().remove(event, id) {
            prompt.record.time_out();
        }
    }

    /// Waits up to `timeout` for the prompt behind `ticket` to be answered.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::PromptTimedOut`] if nobody answered in time,
    /// and [`CommandError::PromptCancelled`] if the prompt was cancelled.
    /// Either way the prompt is no longer registered.
    pub async fn wait(
        &self,
        mut ticket: PromptTicket<'_>,
        timeout: Duration,
    ) -> Result<ReadItem, CommandError> {
        match tokio::time::timeout(timeout, &mut ticket.answer).await {
            Ok(Ok(item)) => Ok(item),
            Ok(Err(_)) => Err(CommandError::PromptCancelled),
            Err(_) => {
                self.expire(&ticket.event, ticket.id);
                debug!(event = %ticket.event, record = ticket.id, "prompt timed out");
                Err(CommandError::PromptTimedOut)
            }
        }
    }
}

impl std::fmt::Debug for ReactionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactionHandler")
            .field("bot_user", &self.bot_user)
            .field("pending", &self.pending_prompts())
            .finish_non_exhaustive()
    }
}

/// Prompts for missing arguments and confirmations by sending a message
/// and waiting for a reaction to it.
pub struct ReactionPrompter<'a> {
    /// Sends the prompt.
    pub messages: &'a dyn MessageSender,
    /// Attaches the option reactions.
    pub reactions: &'a dyn ReactionSender,
    /// Where the answer arrives.
    pub handler: &'a ReactionHandler,
    /// Page size for the prompt message.
    pub page_size_limit: usize,
    /// The most options offered.
    pub max_reactions: usize,
    /// How long to wait for an answer.
    pub timeout: Duration,
}

impl ReactionPrompter<'_> {
    /// Asks the operator to confirm what `document` describes.
    ///
    /// Returns the `--no-confirm` keyword to rerun the command with.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::PromptCancelled`] if the operator reacted
    /// with Cancel and [`CommandError::PromptTimedOut`] if nobody answered.
    pub async fn confirm(
        &self,
        document: InnerNode,
        invocation: &Invocation,
    ) -> Result<ReadItem, CommandError> {
        let record = PromptRecord::confirmation(ReadItem::Keyword(Keyword::new("no-confirm")));
        self.offer(&render_confirmation_document(document), invocation, record)
            .await
    }

    /// Sends `document` in reply to the invocation, reacts with the
    /// record's keys and waits for an answer.
    async fn offer(
        &self,
        document: &InnerNode,
        invocation: &Invocation,
        record: PromptRecord<ReadItem>,
    ) -> Result<ReadItem, CommandError> {
        let reservation = self.handler.reserve();
        let sent = render_and_send(
            document,
            Destination {
                room: &invocation.room,
                reply_to: Some(&invocation.event_id),
            },
            self.messages,
            self.page_size_limit,
        )
        .await?;
        let prompt_event = sent
            .last()
            .cloned()
            .ok_or_else(|| Error::internal("prompt document rendered no pages"))?;

        let keys: Vec<&'static str> = record.reaction_keys().collect();
        let ticket = self.handler.register(prompt_event.clone(), record);
        drop(reservation);
        for key in keys {
            if let Err(error) = self
                .reactions
                .send_reaction(&invocation.room, &prompt_event, key)
                .await
            {
                warn!(event = %prompt_event, key, %error, "failed to add prompt option");
            }
        }
        self.handler.wait(ticket, self.timeout).await
    }
}

#[async_trait]
impl PromptAcceptor<Invocation> for ReactionPrompter<'_> {
    async fn prompt_for_accept(
        &self,
        parameter: &ParameterDescription<Invocation>,
        invocation: &Invocation,
    ) -> Result<ReadItem, CommandError> {
        let prompter = parameter.prompter().ok_or_else(|| {
            Error::internal(format!("parameter {} has no prompt", parameter.name()))
        })?;
        let options = prompter.prompt(parameter, invocation).await;
        let candidates: Vec<ReadItem> = options
            .candidates()
            .into_iter()
            .take(self.max_reactions)
            .collect();
        if candidates.is_empty() {
            return Err(CommandError::rejected(format!(
                "No argument was provided for the parameter {} and there are no options to choose from.",
                parameter.name()
            )));
        }

        let document =
            render_prompt_document(parameter.name(), &candidates, options.default.is_some());
        let record = PromptRecord::new(candidates, self.max_reactions);
        self.offer(&document, invocation, record).await
    }
}
