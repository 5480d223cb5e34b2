//! Reaction prompts.
//!
//! When a command is missing an argument, the interface sends a message
//! offering candidates as a numbered list and reacts to it with one keycap
//! per candidate. Whoever issued the command answers by reacting with the
//! same keycap, or withdraws the prompt by reacting with
//! [`CANCEL_REACTION`]. A [`PromptRecord`] tracks one such prompt.
//!
//! Confirmation prompts work the same way with a single
//! [`CONFIRM_REACTION`] option.

use std::time::Duration;

use warden_document::InnerNode;

use crate::presentation::append_presentation;
use crate::reader::ReadItem;

/// The most candidates a prompt offers.
pub const MAX_PROMPT_REACTIONS: usize = 5;

/// How long a prompt waits for an answer.
pub const DEFAULT_PROMPT_TIMEOUT: Duration = Duration::from_secs(600);

/// The reaction key that withdraws a prompt.
pub const CANCEL_REACTION: &str = "Cancel";

/// The reaction key that accepts a confirmation prompt.
pub const CONFIRM_REACTION: &str = "OK";

const KEYCAPS: [&str; 10] = [
    "1\u{fe0f}\u{20e3}",
    "2\u{fe0f}\u{20e3}",
    "3\u{fe0f}\u{20e3}",
    "4\u{fe0f}\u{20e3}",
    "5\u{fe0f}\u{20e3}",
    "6\u{fe0f}\u{20e3}",
    "7\u{fe0f}\u{20e3}",
    "8\u{fe0f}\u{20e3}",
    "9\u{fe0f}\u{20e3}",
    "\u{1f51f}",
];

/// Returns the keycap emoji for `number`, counting from one.
#[must_use]
pub fn number_to_emoji(number: usize) -> Option<&'static str> {
    number.checked_sub(1).and_then(|index| KEYCAPS.get(index)).copied()
}

/// Where a prompt is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    /// No answer yet.
    Waiting,
    /// A candidate was chosen.
    Resolved,
    /// Nobody answered in time.
    TimedOut,
    /// The prompt was withdrawn.
    Cancelled,
}

impl PromptState {
    /// Returns true once the prompt can no longer change.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Waiting)
    }
}

/// What a reaction did to a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// The reaction chose this candidate.
    Accepted(T),
    /// The reaction withdrew the prompt.
    Cancelled,
    /// The reaction key is not one of the candidates.
    UnknownKey,
    /// The prompt had already finished.
    Ignored,
}

/// One outstanding prompt.
#[derive(Debug, Clone)]
pub struct PromptRecord<T> {
    candidates: Vec<(&'static str, T)>,
    state: PromptState,
}

impl<T: Clone> PromptRecord<T> {
    /// Creates a waiting prompt, keying up to `max_reactions` candidates by
    /// keycap.
    #[must_use]
    pub fn new(candidates: impl IntoIterator<Item = T>, max_reactions: usize) -> Self {
        let candidates = candidates
            .into_iter()
            .take(max_reactions)
            .enumerate()
            .filter_map(|(index, value)| number_to_emoji(index + 1).map(|key| (key, value)))
            .collect();
        Self {
            candidates,
            state: PromptState::Waiting,
        }
    }

    /// Creates a waiting confirmation that yields `value` when accepted
    /// with [`CONFIRM_REACTION`].
    #[must_use]
    pub fn confirmation(value: T) -> Self {
        Self {
            candidates: vec![(CONFIRM_REACTION, value)],
            state: PromptState::Waiting,
        }
    }

    /// Returns the candidate keys, in candidate order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.candidates.iter().map(|(key, _)| *key)
    }

    /// Returns every key to react with: the candidate keys followed by
    /// [`CANCEL_REACTION`].
    pub fn reaction_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.keys().chain(std::iter::once(CANCEL_REACTION))
    }

    /// Returns the candidate values, in order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.candidates.iter().map(|(_, value)| value)
    }

    /// Returns the number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Returns true if there is nothing to choose from.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> PromptState {
        self.state
    }

    /// Applies a reaction.
    pub fn resolve(&mut self, key: &str) -> Resolution<T> {
        if self.state.is_terminal() {
            return Resolution::Ignored;
        }
        if key == CANCEL_REACTION {
            self.state = PromptState::Cancelled;
            return Resolution::Cancelled;
        }
        match self.candidates.iter().find(|(candidate, _)| *candidate == key) {
            Some((_, value)) => {
                self.state = PromptState::Resolved;
                Resolution::Accepted(value.clone())
            }
            None => Resolution::UnknownKey,
        }
    }

    /// Marks the prompt as timed out. Returns false if it had already
    /// finished.
    pub fn time_out(&mut self) -> bool {
        self.finish(PromptState::TimedOut)
    }

    /// Marks the prompt as cancelled. Returns false if it had already
    /// finished.
    pub fn cancel(&mut self) -> bool {
        self.finish(PromptState::Cancelled)
    }

    fn finish(&mut self, state: PromptState) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = state;
        true
    }
}

/// Builds the message that offers `candidates` for `parameter`.
///
/// When there is a default it is the first candidate, and the message says
/// so.
#[must_use]
pub fn render_prompt_document(
    parameter: &str,
    candidates: &[ReadItem],
    has_default: bool,
) -> InnerNode {
    let mut root = InnerNode::root();
    if has_default {
        let paragraph = root.paragraph();
        paragraph
            .text("No argument was provided for the parameter ")
            .inline_code(parameter)
            .text(", would you like to accept the default? It is option 1.");
    }
    root.paragraph()
        .text("Please select one of the following options to provide as an argument for the parameter ")
        .inline_code(parameter)
        .text(":");
    let list = root.ordered_list();
    for candidate in candidates {
        append_presentation(list.list_item(), candidate);
    }
    root
}

/// Appends the confirmation instructions to `document`.
#[must_use]
pub fn render_confirmation_document(mut document: InnerNode) -> InnerNode {
    document
        .paragraph()
        .text("React with ")
        .inline_code(CONFIRM_REACTION)
        .text(" to continue or ")
        .inline_code(CANCEL_REACTION)
        .text(" to stop.");
    document
}
