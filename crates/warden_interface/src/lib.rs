//! Command grammar for Warden.
//!
//! This crate provides:
//! - [`read_command`] / [`CommandReader`] - Reading command text into [`ReadItem`]s
//! - [`PresentationTypes`] - Named validators for read items
//! - [`ParameterList`] - Binding read items to parameters, prompting when allowed
//! - [`CommandTable`] - Finding commands by their designator words
//! - [`PromptRecord`] - The state of one reaction prompt
//! - [`help`] - Help, usage and error documents

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod command;
pub mod error;
pub mod help;
pub mod parameters;
pub mod presentation;
pub mod prompt;
pub mod reader;
pub mod stream;
pub mod table;

pub use command::{CommandDefinition, CommandExecutor, CommandOutcome};
pub use error::{ArgumentParseError, CommandError};
pub use help::{
    HelpExecutor, render_argument_parse_error, render_command_synopsis, render_fault,
    render_table_help, render_unknown_command,
};
pub use parameters::{
    KeywordPropertyDescription, KeywordValue, KeywordsDescription, ParameterDescription,
    ParameterList, ParsedArguments, ParsedKeywords, PromptOptions, Prompter, RestDescription,
};
pub use presentation::{PresentationType, PresentationTypes, append_presentation, union};
pub use prompt::{
    CANCEL_REACTION, CONFIRM_REACTION, DEFAULT_PROMPT_TIMEOUT, MAX_PROMPT_REACTIONS, PromptRecord,
    PromptState, Resolution, number_to_emoji, render_confirmation_document, render_prompt_document,
};
pub use reader::{CommandReader, Keyword, ReadItem, print_readably, read_command};
pub use stream::{ArgumentStream, PromptAcceptor};
pub use table::{CommandTable, CommandTables};
