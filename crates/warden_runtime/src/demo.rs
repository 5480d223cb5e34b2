//! A small command table for trying the interface out from the console.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use warden_document::InnerNode;
use warden_foundation::{Result, RoomReference};
use warden_interface::{
    CommandDefinition, CommandError, CommandExecutor, CommandOutcome, CommandTable,
    HelpExecutor, KeywordsDescription, ParameterDescription, ParameterList, ParsedArguments,
    PresentationTypes, PromptOptions, ReadItem, append_presentation,
};

use crate::dispatcher::Invocation;

struct Echo;

#[async_trait]
impl CommandExecutor<Invocation> for Echo {
    async fn execute(
        &self,
        _invocation: &Invocation,
        arguments: ParsedArguments,
    ) -> std::result::Result<CommandOutcome, CommandError> {
        let words = arguments.rest.unwrap_or_default();
        if words.is_empty() {
            return Err(CommandError::rejected("There is nothing to echo."));
        }
        let mut root = InnerNode::root();
        let paragraph = root.paragraph();
        for (index, word) in words.iter().enumerate() {
            if index > 0 {
                paragraph.text(" ");
            }
            append_presentation(paragraph, word);
        }
        Ok(CommandOutcome::Reply(root))
    }
}

/// The rooms added with `rooms add`.
#[derive(Debug, Default)]
struct ProtectedRooms {
    rooms: Mutex<Vec<RoomReference>>,
}

impl ProtectedRooms {
    fn document(&self) -> InnerNode {
        let rooms = self.rooms.lock().unwrap_or_else(PoisonError::into_inner);
        let mut root = InnerNode::root();
        root.paragraph()
            .strong()
            .text(format!("Protected rooms ({}):", rooms.len()));
        if !rooms.is_empty() {
            let list = root.unordered_list();
            for room in rooms.iter() {
                append_presentation(list.list_item(), &ReadItem::Room(room.clone()));
            }
        }
        root
    }
}

struct ListRooms(Arc<ProtectedRooms>);

#[async_trait]
impl CommandExecutor<Invocation> for ListRooms {
    async fn execute(
        &self,
        _invocation: &Invocation,
        _arguments: ParsedArguments,
    ) -> std::result::Result<CommandOutcome, CommandError> {
        Ok(CommandOutcome::Reply(self.0.document()))
    }
}

struct AddRoom(Arc<ProtectedRooms>);

#[async_trait]
impl CommandExecutor<Invocation> for AddRoom {
    async fn execute(
        &self,
        _invocation: &Invocation,
        arguments: ParsedArguments,
    ) -> std::result::Result<CommandOutcome, CommandError> {
        let Some(ReadItem::Room(room)) = arguments.immediate.first() else {
            return Err(CommandError::rejected("Expected a room to protect."));
        };
        {
            let mut rooms = self.0.rooms.lock().unwrap_or_else(PoisonError::into_inner);
            if rooms.iter().any(|existing| existing.as_str() == room.as_str()) {
                return Err(CommandError::rejected(format!(
                    "{room} is already protected."
                )));
            }
            rooms.push(room.clone());
        }
        Ok(CommandOutcome::Acknowledged)
    }
}

struct Ban;

#[async_trait]
impl CommandExecutor<Invocation> for Ban {
    async fn execute(
        &self,
        invocation: &Invocation,
        arguments: ParsedArguments,
    ) -> std::result::Result<CommandOutcome, CommandError> {
        let [list, user] = arguments.immediate.as_slice() else {
            return Err(CommandError::rejected("Expected a list and a user."));
        };
        let reason = arguments
            .rest
            .unwrap_or_default()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let confirmed = arguments.keywords.flag("no-confirm")?;

        let mut root = InnerNode::root();
        let paragraph = root.paragraph();
        paragraph.text(if confirmed { "Banned " } else { "Would ban " });
        append_presentation(paragraph, user);
        paragraph.text(" on ").inline_code(list.to_string());
        if !reason.is_empty() {
            paragraph.text(" for ").emphasis().text(reason);
        }
        paragraph.text(format!(", as requested by {}.", invocation.sender));
        if confirmed {
            Ok(CommandOutcome::Reply(root))
        } else {
            Ok(CommandOutcome::ConfirmationRequired(root))
        }
    }
}

/// Builds the demonstration table: `help`, `echo`, `ban`, `rooms` and
/// `rooms add`.
///
/// `rooms add` prompts for its room when none is given, suggesting the
/// rooms in `suggestions`.
///
/// # Errors
///
/// Fails if a designator is declared twice.
pub fn demo_table(suggestions: Vec<RoomReference>) -> Result<Arc<CommandTable<Invocation>>> {
    let types = PresentationTypes::standard();
    let rooms = Arc::new(ProtectedRooms::default());
    let help = Arc::new(HelpExecutor::<Invocation>::new());

    let mut moderation = CommandTable::new("moderation");
    moderation.intern_command(
        CommandDefinition::<Invocation>::new(["ban"], Arc::new(Ban))
            .with_parameters(
                ParameterList::new()
                    .parameter(
                        ParameterDescription::new("list", types.find("string")?.clone())
                            .with_description("The policy list to add the ban to"),
                    )
                    .parameter(
                        ParameterDescription::new("user", types.find("UserID")?.clone())
                            .with_description("The user to ban"),
                    )
                    .rest(ParameterDescription::new("reason", types.find("string")?.clone()))
                    .keywords(
                        KeywordsDescription::new()
                            .flag("no-confirm", "Do not ask for confirmation"),
                    ),
            )
            .with_summary("Ban a user"),
    )?;
    moderation.intern_command(
        CommandDefinition::<Invocation>::new(["rooms"], Arc::new(ListRooms(Arc::clone(&rooms))))
            .with_summary("List the protected rooms"),
    )?;
    let suggestions = suggestions.into_iter().map(ReadItem::Room).collect();
    moderation.intern_command(
        CommandDefinition::<Invocation>::new(["rooms", "add"], Arc::new(AddRoom(rooms)))
            .with_parameters(
                ParameterList::new().parameter(
                    ParameterDescription::new(
                        "room",
                        types.find("MatrixRoomReference")?.clone(),
                    )
                    .with_description("The room to protect")
                    .with_prompt(PromptOptions::new(suggestions)),
                ),
            )
            .with_summary("Protect a room"),
    )?;

    let mut table = CommandTable::new("warden");
    table.intern_command(
        CommandDefinition::<Invocation>::new(["help"], help.clone())
            .with_summary("Show this help"),
    )?;
    table.intern_command(
        CommandDefinition::<Invocation>::new(["echo"], Arc::new(Echo))
            .with_parameters(
                ParameterList::new()
                    .rest(ParameterDescription::new("words", types.find("any")?.clone())),
            )
            .with_summary("Repeat the words back"),
    )?;
    table.import_table(Arc::new(moderation))?;

    let table = Arc::new(table);
    help.bind(&table);
    Ok(table)
}
