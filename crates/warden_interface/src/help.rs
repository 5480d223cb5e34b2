//! Help and error documents.

use std::sync::{Arc, OnceLock, Weak};

use async_trait::async_trait;
use warden_document::InnerNode;
use warden_foundation::Error;

use crate::command::{CommandDefinition, CommandExecutor, CommandOutcome};
use crate::error::{ArgumentParseError, CommandError};
use crate::parameters::{ParameterDescription, ParsedArguments};
use crate::reader::print_readably;
use crate::table::CommandTable;

/// Returns the usage line of a command, such as
/// `ban <list> <user> [...reason] [--no-confirm]`.
#[must_use]
pub fn render_command_synopsis<C>(command: &CommandDefinition<C>) -> String {
    let parameters = command.parameters();
    command
        .designator()
        .iter()
        .cloned()
        .chain(
            parameters
                .descriptions()
                .iter()
                .map(|parameter| format!("<{}>", parameter.name())),
        )
        .chain(
            parameters
                .rest_description()
                .map(|rest| format!("[...{}]", rest.name())),
        )
        .chain(
            parameters
                .keyword_descriptions()
                .properties()
                .iter()
                .map(|keyword| format!("[--{}]", keyword.name)),
        )
        .collect::<Vec<_>>()
        .join(" ")
}

fn append_parameter<C>(list: &mut InnerNode, parameter: &ParameterDescription<C>) {
    list.list_item()
        .inline_code(parameter.name())
        .text(" - ")
        .text(parameter.description().unwrap_or("no description"));
}

fn append_command_summary<C>(list: &mut InnerNode, command: &CommandDefinition<C>) {
    let item = list.list_item();
    item.inline_code(render_command_synopsis(command));
    if !command.summary().is_empty() {
        item.text(" - ").text(command.summary());
    }
    if let Some(description) = command.description() {
        item.line_break().text(description);
    }
    let descriptions = command.parameters().descriptions();
    if !descriptions.is_empty() {
        let parameters = item.unordered_list();
        for parameter in descriptions {
            append_parameter(parameters, parameter);
        }
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn append_table_help<C>(node: &mut InnerNode, table: &CommandTable<C>) {
    let details = node.details();
    details
        .summary()
        .strong()
        .text(format!("{} commands:", capitalize(table.name())));
    if !table.exported_commands().is_empty() {
        let list = details.unordered_list();
        for command in table.exported_commands() {
            append_command_summary(list, command);
        }
    }
    for imported in table.imported_tables() {
        append_table_help(details, imported);
    }
}

/// Builds the help document for a table and everything it imports.
#[must_use]
pub fn render_table_help<C>(table: &CommandTable<C>) -> InnerNode {
    let mut root = InnerNode::root();
    append_table_help(&mut root, table);
    root
}

/// Draws a caret under the item that could not be parsed.
#[must_use]
pub fn formatted_argument_hint<C>(
    command: &CommandDefinition<C>,
    error: &ArgumentParseError,
) -> String {
    let context = std::iter::once("Command context:".to_string())
        .chain(command.designator().iter().cloned())
        .chain(error.preceding_items().iter().map(print_readably))
        .collect::<Vec<_>>()
        .join(" ");
    let offending = error
        .offending_item()
        .map(|item| format!(" {}", print_readably(item)))
        .unwrap_or_default();
    format!(
        "{context}{offending}\n{} ^ expected {} here",
        " ".repeat(context.chars().count()),
        error.acceptor
    )
}

/// Builds the reply for an argument that could not be parsed.
#[must_use]
pub fn render_argument_parse_error<C>(
    command: &CommandDefinition<C>,
    error: &ArgumentParseError,
) -> InnerNode {
    let mut root = InnerNode::root();
    root.paragraph()
        .text("There was a problem when parsing the ")
        .inline_code(&error.parameter)
        .text(" parameter for this command.");
    root.paragraph().inline_code(render_command_synopsis(command));
    root.paragraph().text(&error.message);
    root.block_code(formatted_argument_hint(command, error));
    root
}

/// Builds the reply for a fault, which only names the reference to look
/// up in the logs.
#[must_use]
pub fn render_fault(correlation_id: &str) -> InnerNode {
    let mut root = InnerNode::root();
    root.paragraph()
        .text("There was an unexpected error when processing this command. ")
        .text("Details can be found by providing the reference ")
        .inline_code(correlation_id)
        .text(" to an administrator.");
    root
}

/// Builds the reply for a command that matched nothing.
#[must_use]
pub fn render_unknown_command(command: &str) -> InnerNode {
    let mut root = InnerNode::root();
    root.paragraph()
        .text("There is no command matching ")
        .inline_code(command)
        .text(". Try ")
        .inline_code("help")
        .text(".");
    root
}

/// Renders the help of the table it is bound to.
///
/// The help command lives in the table it describes, so the executor is
/// created first and bound once the table is shared.
pub struct HelpExecutor<C> {
    table: OnceLock<Weak<CommandTable<C>>>,
}

impl<C> Default for HelpExecutor<C> {
    fn default() -> Self {
        Self {
            table: OnceLock::new(),
        }
    }
}

impl<C> HelpExecutor<C> {
    /// Creates an unbound executor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the executor to `table`. Returns false if it was already bound.
    pub fn bind(&self, table: &Arc<CommandTable<C>>) -> bool {
        self.table.set(Arc::downgrade(table)).is_ok()
    }
}

#[async_trait]
impl<C: Sync> CommandExecutor<C> for HelpExecutor<C> {
    async fn execute(
        &self,
        _context: &C,
        _arguments: ParsedArguments,
    ) -> Result<CommandOutcome, CommandError> {
        let table = self
            .table
            .get()
            .and_then(Weak::upgrade)
            .ok_or_else(|| Error::internal("help is not bound to a live command table"))?;
        Ok(CommandOutcome::Reply(render_table_help(&table)))
    }
}
