//! Errors produced while interpreting a command.
//!
//! Parse errors describe a mistake made by whoever typed the command and are
//! reported back to the room. Anything else that goes wrong is a
//! [`warden_foundation::Error`] wrapped in [`CommandError::Fault`].

use thiserror::Error;
use warden_foundation::Error;

use crate::reader::ReadItem;

/// An argument did not satisfy the parameter it was given for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ArgumentParseError {
    /// Name of the parameter being parsed.
    pub parameter: String,
    /// Name of the presentation type the parameter accepts.
    pub acceptor: String,
    /// Stream position of the offending item.
    pub position: usize,
    /// Every item of the argument stream.
    pub items: Vec<ReadItem>,
    /// What was wrong.
    pub message: String,
}

impl ArgumentParseError {
    /// Returns the item at the error position, if there is one.
    #[must_use]
    pub fn offending_item(&self) -> Option<&ReadItem> {
        self.items.get(self.position)
    }

    /// Returns the items that were accepted before the error.
    #[must_use]
    pub fn preceding_items(&self) -> &[ReadItem] {
        &self.items[..self.position.min(self.items.len())]
    }
}

/// Everything that can stop a command from completing.
#[derive(Debug, Error)]
pub enum CommandError {
    /// An argument was missing or invalid.
    #[error(transparent)]
    ArgumentParse(#[from] ArgumentParseError),

    /// Input was left over that no parameter could take.
    #[error("{message}")]
    UnexpectedArgument {
        /// What was unexpected.
        message: String,
        /// Stream position of the unexpected item.
        position: usize,
        /// Every item of the argument stream.
        items: Vec<ReadItem>,
    },

    /// Nobody answered a prompt in time.
    #[error("Timed out while waiting for a response to the prompt")]
    PromptTimedOut,

    /// A prompt was withdrawn before anyone answered.
    #[error("The prompt was cancelled")]
    PromptCancelled,

    /// The command ran but refused to do what was asked.
    #[error("{0}")]
    Rejected(String),

    /// Programmer or transport error.
    #[error(transparent)]
    Fault(#[from] Error),
}

impl CommandError {
    /// Creates a rejection with a message for the operator.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Returns true for faults, which are logged rather than blamed on the
    /// operator.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }
}
