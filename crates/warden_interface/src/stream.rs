//! Argument streams.

use async_trait::async_trait;
use warden_foundation::Error;

use crate::error::CommandError;
use crate::parameters::ParameterDescription;
use crate::reader::ReadItem;

/// Asks whoever issued a command for a missing argument.
///
/// Implemented by interface adaptors; the Matrix adaptor sends a message
/// listing suggestions and waits for a reaction.
#[async_trait]
pub trait PromptAcceptor<C>: Send + Sync {
    /// Obtains a value for `parameter`.
    ///
    /// # Errors
    ///
    /// Fails if nobody answers in time, if the prompt is cancelled, or if
    /// the prompt cannot be delivered.
    async fn prompt_for_accept(
        &self,
        parameter: &ParameterDescription<C>,
        context: &C,
    ) -> Result<ReadItem, CommandError>;
}

/// A cursor over the items of one invocation, after the designator.
///
/// A stream built with [`ArgumentStream::promptable`] can ask for values
/// that were not provided; the answer is inserted at the current position
/// and then parsed like any other item.
pub struct ArgumentStream<'a, C> {
    source: Vec<ReadItem>,
    position: usize,
    prompting: Option<(&'a dyn PromptAcceptor<C>, &'a C)>,
}

impl<'a, C> ArgumentStream<'a, C> {
    /// Creates a stream that cannot prompt.
    #[must_use]
    pub fn new(source: Vec<ReadItem>) -> Self {
        Self {
            source,
            position: 0,
            prompting: None,
        }
    }

    /// Creates a stream that prompts through `acceptor`.
    #[must_use]
    pub fn promptable(
        source: Vec<ReadItem>,
        acceptor: &'a dyn PromptAcceptor<C>,
        context: &'a C,
    ) -> Self {
        Self {
            source,
            position: 0,
            prompting: Some((acceptor, context)),
        }
    }

    /// Returns the next item without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<&ReadItem> {
        self.source.get(self.position)
    }

    /// Consumes the next item.
    pub fn read(&mut self) -> Option<ReadItem> {
        let item = self.source.get(self.position).cloned()?;
        self.position += 1;
        Some(item)
    }

    /// Returns the number of items consumed so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns every item, consumed or not.
    #[must_use]
    pub fn source(&self) -> &[ReadItem] {
        &self.source
    }

    /// Returns the items not yet consumed.
    #[must_use]
    pub fn rest(&self) -> &[ReadItem] {
        &self.source[self.position..]
    }

    /// Returns true if nothing is left to read.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.source.len()
    }

    /// Returns true if this stream can ask for missing values.
    #[must_use]
    pub const fn is_promptable(&self) -> bool {
        self.prompting.is_some()
    }

    /// Prompts for a value for `parameter` and inserts it at the current
    /// position.
    ///
    /// # Errors
    ///
    /// Fails if the stream is not promptable or if the prompt fails.
    pub async fn prompt(&mut self, parameter: &ParameterDescription<C>) -> Result<(), CommandError> {
        let (acceptor, context) = self.prompting.ok_or_else(|| {
            Error::internal(format!(
                "argument stream is not promptable, cannot prompt for {}",
                parameter.name()
            ))
        })?;
        let item = acceptor.prompt_for_accept(parameter, context).await?;
        self.source.insert(self.position, item);
        Ok(())
    }
}
