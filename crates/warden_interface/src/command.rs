//! Command definitions and executors.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use warden_document::InnerNode;

use crate::error::CommandError;
use crate::parameters::{ParameterList, ParsedArguments};
use crate::stream::ArgumentStream;

/// What a command produced.
#[derive(Debug, Clone)]
pub enum CommandOutcome {
    /// The command succeeded and has nothing to show.
    Acknowledged,
    /// The command succeeded and produced a document to send back.
    Reply(InnerNode),
    /// The command wants the operator to confirm before it acts. The
    /// document describes what would happen; once confirmed the command is
    /// run again with `--no-confirm`.
    ConfirmationRequired(InnerNode),
}

/// The body of a command, supplied by feature code.
#[async_trait]
pub trait CommandExecutor<C>: Send + Sync {
    /// Runs the command with parsed arguments.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Rejected`] for failures the operator should
    /// see, and [`CommandError::Fault`] for anything else.
    async fn execute(
        &self,
        context: &C,
        arguments: ParsedArguments,
    ) -> Result<CommandOutcome, CommandError>;
}

/// A command entry in a [`crate::CommandTable`].
pub struct CommandDefinition<C> {
    designator: Vec<String>,
    parameters: ParameterList<C>,
    executor: Arc<dyn CommandExecutor<C>>,
    summary: String,
    description: Option<String>,
}

impl<C> CommandDefinition<C> {
    /// Creates a command with no parameters.
    pub fn new<I, S>(designator: I, executor: Arc<dyn CommandExecutor<C>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            designator: designator.into_iter().map(Into::into).collect(),
            parameters: ParameterList::new(),
            executor,
            summary: String::new(),
            description: None,
        }
    }

    /// Sets the parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: ParameterList<C>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Sets the one-line summary shown in help.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Sets the longer description shown in help.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the designator words.
    #[must_use]
    pub fn designator(&self) -> &[String] {
        &self.designator
    }

    /// Returns the parameters.
    #[must_use]
    pub const fn parameters(&self) -> &ParameterList<C> {
        &self.parameters
    }

    /// Returns the summary.
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the executor.
    #[must_use]
    pub fn executor(&self) -> &dyn CommandExecutor<C> {
        self.executor.as_ref()
    }
}

impl<C: Sync> CommandDefinition<C> {
    /// Parses the arguments in `stream` and runs the executor.
    ///
    /// # Errors
    ///
    /// Returns the parse error, or whatever the executor returned.
    pub async fn parse_then_invoke(
        &self,
        context: &C,
        stream: &mut ArgumentStream<'_, C>,
    ) -> Result<CommandOutcome, CommandError> {
        let arguments = self.parameters.parse(stream).await?;
        self.executor.execute(context, arguments).await
    }
}

impl<C> fmt::Debug for CommandDefinition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("designator", &self.designator)
            .field("parameters", &self.parameters)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}
