//! Turning room messages into command invocations.
//!
//! The dispatcher reads a message from the control room, finds the command
//! it names, parses the arguments (prompting for missing ones), runs the
//! command and reports what happened back to the room: a reply document,
//! then a ✅ or ❌ reaction on the command message.
//!
//! A message is a command when it starts with a configured prefix or with
//! the bot's localpart, display name or user id, written as `!name`,
//! `name:` or plain `name`. Prefixes match without regard to case.

use std::sync::Arc;

use tracing::{debug, error, info};
use uuid::Uuid;
use warden_document::InnerNode;
use warden_foundation::{Error, EventId, Result, RoomReference, UserId};
use warden_interface::{
    ArgumentStream, CommandDefinition, CommandError, CommandOutcome, CommandTable, ReadItem,
    print_readably, read_command, render_argument_parse_error, render_fault,
    render_unknown_command,
};

use crate::config::InterfaceConfig;
use crate::reaction::{ReactionHandler, ReactionPrompter};
use crate::render::{Destination, render_and_send};
use crate::transport::{MessageSender, ReactionSender, RoomMessage};

/// Reaction for a command that completed.
pub const SUCCESS_REACTION: &str = "✅";

/// Reaction for a command that failed.
pub const FAILURE_REACTION: &str = "❌";

/// The message that invoked a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    /// The room the command was sent in.
    pub room: RoomReference,
    /// The command message.
    pub event_id: EventId,
    /// Who sent it.
    pub sender: UserId,
}

impl From<&RoomMessage> for Invocation {
    fn from(message: &RoomMessage) -> Self {
        Self {
            room: message.room.clone(),
            event_id: message.event_id.clone(),
            sender: message.sender.clone(),
        }
    }
}

/// What became of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Not a command for this bot.
    Ignored,
    /// A command prefix with no matching command.
    UnknownCommand,
    /// The command ran to completion.
    Completed,
    /// The command failed and the failure was reported.
    Failed,
}

/// Routes control room commands to a command table.
pub struct CommandDispatcher {
    table: Arc<CommandTable<Invocation>>,
    config: InterfaceConfig,
    control_room: RoomReference,
    bot_user: UserId,
    messages: Arc<dyn MessageSender>,
    reactions: Arc<dyn ReactionSender>,
    prompts: Arc<ReactionHandler>,
    prefixes: Vec<String>,
}

/// Every prefix that marks a message as a command, longest first.
fn command_prefixes(config: &InterfaceConfig, bot_user: &UserId) -> Vec<String> {
    let mut names = vec![bot_user.localpart().to_string()];
    names.extend(config.display_name.clone());
    names.push(bot_user.as_str().to_string());

    let mut prefixes = config.command_prefixes.clone();
    for name in names {
        prefixes.push(format!("!{name}"));
        prefixes.push(format!("{name}:"));
        prefixes.push(name);
    }
    if config.allow_no_prefix {
        prefixes.push("!".to_string());
    }
    prefixes.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    prefixes.dedup();
    prefixes
}

/// Returns what follows `prefix` at the start of `body`.
///
/// A prefix ending in a letter or digit must be followed by whitespace or
/// the end of the message, so `!warden` does not match `!wardens`.
fn strip_command_prefix<'b>(body: &'b str, prefix: &str) -> Option<&'b str> {
    let head = body.get(..prefix.len())?;
    if head.to_lowercase() != prefix.to_lowercase() {
        return None;
    }
    let rest = body.get(prefix.len()..)?;
    let needs_break = prefix.ends_with(char::is_alphanumeric);
    (!needs_break || rest.is_empty() || rest.starts_with(char::is_whitespace)).then_some(rest)
}

impl CommandDispatcher {
    /// Creates a dispatcher for `table`.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid.
    pub fn new(
        table: Arc<CommandTable<Invocation>>,
        config: InterfaceConfig,
        messages: Arc<dyn MessageSender>,
        reactions: Arc<dyn ReactionSender>,
    ) -> Result<Self> {
        config.validate()?;
        let control_room = config.control_room()?;
        let bot_user = config.bot_user()?;
        Ok(Self {
            table,
            prompts: Arc::new(ReactionHandler::new(bot_user.clone())),
            prefixes: command_prefixes(&config, &bot_user),
            config,
            control_room,
            bot_user,
            messages,
            reactions,
        })
    }

    /// Returns the handler that reactions must be fed to while commands
    /// are prompting.
    #[must_use]
    pub fn prompts(&self) -> &Arc<ReactionHandler> {
        &self.prompts
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &InterfaceConfig {
        &self.config
    }

    /// Returns the command table.
    #[must_use]
    pub fn table(&self) -> &Arc<CommandTable<Invocation>> {
        &self.table
    }

    /// Strips a command prefix, returning the rest of the command. A bare
    /// prefix asks for help.
    fn command_items(&self, message: &RoomMessage) -> Option<Vec<ReadItem>> {
        if message.room.as_str() != self.control_room.as_str() || message.sender == self.bot_user {
            return None;
        }
        let body = message.body.trim_start();
        let rest = self
            .prefixes
            .iter()
            .find_map(|prefix| strip_command_prefix(body, prefix))?;
        let items = read_command(rest);
        if items.is_empty() {
            return Some(vec![ReadItem::String("help".to_string())]);
        }
        Some(items)
    }

    /// Handles one room message.
    ///
    /// Waits while the command prompts, so reactions must be fed to
    /// [`Self::prompts`] from another task.
    ///
    /// # Errors
    ///
    /// Fails only if the outcome could not be reported to the room.
    pub async fn handle_message(&self, message: &RoomMessage) -> Result<Dispatch> {
        let Some(items) = self.command_items(message) else {
            return Ok(Dispatch::Ignored);
        };
        let invocation = Invocation::from(message);
        let Some((command, depth)) = self.table.find_matching_command(&items) else {
            let text = items.iter().map(print_readably).collect::<Vec<_>>().join(" ");
            info!(sender = %invocation.sender, command = %text, "unknown command");
            self.reply(&invocation, &render_unknown_command(&text)).await?;
            return Ok(Dispatch::UnknownCommand);
        };
        debug!(
            sender = %invocation.sender,
            designator = ?command.designator(),
            arguments = items.len() - depth,
            "dispatching command"
        );

        let prompter = ReactionPrompter {
            messages: self.messages.as_ref(),
            reactions: self.reactions.as_ref(),
            handler: &self.prompts,
            page_size_limit: self.config.page_size_limit,
            max_reactions: self.config.max_prompt_reactions,
            timeout: self.config.prompt_timeout(),
        };
        let mut arguments = items[depth..].to_vec();
        let mut outcome = invoke(&command, &invocation, &prompter, arguments.clone()).await;
        if let Ok(CommandOutcome::ConfirmationRequired(document)) = outcome {
            debug!(
                sender = %invocation.sender,
                designator = ?command.designator(),
                "asking for confirmation"
            );
            outcome = match prompter.confirm(document, &invocation).await {
                Ok(no_confirm) => {
                    arguments.push(no_confirm);
                    invoke(&command, &invocation, &prompter, arguments).await
                }
                Err(error) => Err(error),
            };
        }
        let result = match outcome {
            Ok(CommandOutcome::Reply(document)) => self
                .reply(&invocation, &document)
                .await
                .map_err(CommandError::from),
            Ok(CommandOutcome::Acknowledged) => Ok(()),
            Ok(CommandOutcome::ConfirmationRequired(_)) => Err(Error::internal(
                "command asked for confirmation again after --no-confirm",
            )
            .into()),
            Err(error) => Err(error),
        };

        match result {
            Ok(()) => {
                self.react(&invocation, SUCCESS_REACTION).await?;
                Ok(Dispatch::Completed)
            }
            Err(error) => {
                self.report_error(&invocation, &command, error).await?;
                self.react(&invocation, FAILURE_REACTION).await?;
                Ok(Dispatch::Failed)
            }
        }
    }

    async fn report_error(
        &self,
        invocation: &Invocation,
        command: &CommandDefinition<Invocation>,
        error: CommandError,
    ) -> Result<()> {
        let document = match &error {
            CommandError::ArgumentParse(parse_error) => {
                info!(
                    sender = %invocation.sender,
                    parameter = %parse_error.parameter,
                    "argument did not parse"
                );
                render_argument_parse_error(command, parse_error)
            }
            CommandError::Fault(fault) => {
                let correlation_id = Uuid::new_v4().to_string();
                error!(
                    correlation_id = %correlation_id,
                    designator = ?command.designator(),
                    error = %fault,
                    context = ?fault.context,
                    "command failed"
                );
                render_fault(&correlation_id)
            }
            other => {
                info!(sender = %invocation.sender, error = %other, "command was not completed");
                let mut root = InnerNode::root();
                root.paragraph().text(other.to_string());
                root
            }
        };
        self.reply(invocation, &document).await
    }

    async fn reply(&self, invocation: &Invocation, document: &InnerNode) -> Result<()> {
        render_and_send(
            document,
            Destination {
                room: &invocation.room,
                reply_to: Some(&invocation.event_id),
            },
            self.messages.as_ref(),
            self.config.page_size_limit,
        )
        .await
        .map(|_| ())
    }

    async fn react(&self, invocation: &Invocation, key: &str) -> Result<()> {
        self.reactions
            .send_reaction(&invocation.room, &invocation.event_id, key)
            .await
    }
}

async fn invoke(
    command: &CommandDefinition<Invocation>,
    invocation: &Invocation,
    prompter: &ReactionPrompter<'_>,
    arguments: Vec<ReadItem>,
) -> std::result::Result<CommandOutcome, CommandError> {
    let mut stream = ArgumentStream::promptable(arguments, prompter, invocation);
    command.parse_then_invoke(invocation, &mut stream).await
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("table", &self.table)
            .field("control_room", &self.control_room)
            .field("bot_user", &self.bot_user)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;
    use async_trait::async_trait;
    use warden_foundation::Error;
    use warden_interface::{
        CommandExecutor, HelpExecutor, ParameterDescription, ParameterList, ParsedArguments,
        PresentationTypes,
    };

    struct Ban;

    #[async_trait]
    impl CommandExecutor<Invocation> for Ban {
        async fn execute(
            &self,
            _invocation: &Invocation,
            arguments: ParsedArguments,
        ) -> std::result::Result<CommandOutcome, CommandError> {
            match arguments.immediate[0].as_str() {
                Some("locked") => Err(CommandError::rejected("The list is locked.")),
                Some("broken") => Err(Error::internal("policy room vanished").into()),
                _ => Ok(CommandOutcome::Acknowledged),
            }
        }
    }

    fn table() -> Arc<CommandTable<Invocation>> {
        let types = PresentationTypes::standard();
        let help = Arc::new(HelpExecutor::<Invocation>::new());
        let mut table = CommandTable::new("warden");
        table
            .intern_command(CommandDefinition::<Invocation>::new(["help"], help.clone()))
            .unwrap();
        table
            .intern_command(
                CommandDefinition::<Invocation>::new(["ban"], Arc::new(Ban)).with_parameters(
                    ParameterList::new()
                        .parameter(ParameterDescription::new(
                            "list",
                            types.find("string").unwrap().clone(),
                        ))
                        .parameter(ParameterDescription::new(
                            "user",
                            types.find("UserID").unwrap().clone(),
                        )),
                ),
            )
            .unwrap();
        let table = Arc::new(table);
        help.bind(&table);
        table
    }

    fn config() -> InterfaceConfig {
        InterfaceConfig {
            bot_user_id: "@warden:example.org".to_string(),
            control_room: "!control:example.org".to_string(),
            ..InterfaceConfig::default()
        }
    }

    fn dispatcher_with(transport: &Arc<MemoryTransport>, config: InterfaceConfig) -> CommandDispatcher {
        CommandDispatcher::new(table(), config, transport.clone(), transport.clone()).unwrap()
    }

    fn dispatcher(transport: &Arc<MemoryTransport>) -> CommandDispatcher {
        dispatcher_with(transport, config())
    }

    fn message(body: &str) -> RoomMessage {
        RoomMessage {
            room: RoomReference::parse("!control:example.org").unwrap(),
            event_id: EventId::new("$command"),
            sender: UserId::parse("@mod:example.org").unwrap(),
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn other_rooms_and_prefixes_are_ignored() {
        let transport = Arc::new(MemoryTransport::new());
        let dispatcher = dispatcher(&transport);
        let mut elsewhere = message("!warden help");
        elsewhere.room = RoomReference::parse("!lobby:example.org").unwrap();
        assert_eq!(dispatcher.handle_message(&elsewhere).await.unwrap(), Dispatch::Ignored);
        assert_eq!(
            dispatcher.handle_message(&message("hello there")).await.unwrap(),
            Dispatch::Ignored
        );
        let mut from_bot = message("!warden help");
        from_bot.sender = UserId::parse("@warden:example.org").unwrap();
        assert_eq!(dispatcher.handle_message(&from_bot).await.unwrap(), Dispatch::Ignored);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn replies_are_sent_before_the_reaction() {
        let transport = Arc::new(MemoryTransport::new());
        let dispatcher = dispatcher(&transport);
        let outcome = dispatcher.handle_message(&message("!WARDEN help")).await.unwrap();
        assert_eq!(outcome, Dispatch::Completed);
        let sent = transport.sent();
        assert!(matches!(&sent[0], crate::transport::Sent::Message(_, m)
            if m.body.starts_with("**Warden commands:**")));
        assert_eq!(
            transport.reactions_to(&EventId::new("$command")),
            vec![SUCCESS_REACTION.to_string()]
        );
    }

    #[tokio::test]
    async fn the_bot_answers_to_its_names() {
        let transport = Arc::new(MemoryTransport::new());
        let dispatcher = dispatcher_with(
            &transport,
            InterfaceConfig {
                display_name: Some("Warden Bot".to_string()),
                ..config()
            },
        );
        for body in [
            "!warden help",
            "warden help",
            "warden: help",
            "WARDEN: help",
            "@warden:example.org help",
            "@warden:example.org: help",
            "!@warden:example.org help",
            "Warden Bot: help",
            "warden bot help",
            "!Warden Bot help",
            "  !warden help",
        ] {
            assert_eq!(
                dispatcher.handle_message(&message(body)).await.unwrap(),
                Dispatch::Completed,
                "{body}"
            );
        }
        for body in ["wardens help", "!help", "@warden:example.orghelp", "help"] {
            assert_eq!(
                dispatcher.handle_message(&message(body)).await.unwrap(),
                Dispatch::Ignored,
                "{body}"
            );
        }
    }

    #[tokio::test]
    async fn a_lone_bang_is_a_prefix_only_when_allowed() {
        let transport = Arc::new(MemoryTransport::new());
        let dispatcher = dispatcher_with(
            &transport,
            InterfaceConfig {
                allow_no_prefix: true,
                ..config()
            },
        );
        assert_eq!(
            dispatcher.handle_message(&message("!help")).await.unwrap(),
            Dispatch::Completed
        );
        assert_eq!(
            dispatcher.handle_message(&message("!warden help")).await.unwrap(),
            Dispatch::Completed
        );
    }

    #[tokio::test]
    async fn a_bare_prefix_shows_help() {
        let transport = Arc::new(MemoryTransport::new());
        let dispatcher = dispatcher(&transport);
        for body in ["!warden", "warden:", "@warden:example.org  "] {
            let outcome = dispatcher.handle_message(&message(body)).await.unwrap();
            assert_eq!(outcome, Dispatch::Completed, "{body}");
            let (_, reply) = transport.messages().pop().unwrap();
            assert!(reply.body.starts_with("**Warden commands:**"), "{body}");
        }
    }

    #[test]
    fn longer_prefixes_are_tried_first() {
        let prefixes = command_prefixes(&config(), &UserId::parse("@warden:example.org").unwrap());
        assert_eq!(prefixes.first().map(String::as_str), Some("!@warden:example.org"));
        assert!(prefixes.windows(2).all(|pair| pair[0].len() >= pair[1].len()));
        assert_eq!(prefixes.iter().filter(|prefix| *prefix == "!warden").count(), 1);
    }

    #[tokio::test]
    async fn unknown_commands_get_a_notice() {
        let transport = Arc::new(MemoryTransport::new());
        let dispatcher = dispatcher(&transport);
        let outcome = dispatcher.handle_message(&message("!warden frobnicate")).await.unwrap();
        assert_eq!(outcome, Dispatch::UnknownCommand);
        let (_, reply) = transport.messages().pop().unwrap();
        assert_eq!(reply.body, "There is no command matching `frobnicate`. Try `help`.\n\n");
    }

    #[tokio::test]
    async fn parse_errors_point_at_the_argument() {
        let transport = Arc::new(MemoryTransport::new());
        let dispatcher = dispatcher(&transport);
        let outcome = dispatcher.handle_message(&message("!warden ban coc spam")).await.unwrap();
        assert_eq!(outcome, Dispatch::Failed);
        let (_, reply) = transport.messages().pop().unwrap();
        assert!(reply.body.contains("`user` parameter"));
        assert!(reply.formatted_body.contains("<pre><code>"));
        assert_eq!(
            transport.reactions_to(&EventId::new("$command")),
            vec![FAILURE_REACTION.to_string()]
        );
    }

    #[tokio::test]
    async fn rejections_and_faults_are_reported_differently() {
        let transport = Arc::new(MemoryTransport::new());
        let dispatcher = dispatcher(&transport);
        let outcome = dispatcher
            .handle_message(&message("!warden ban locked @spam:example.org"))
            .await
            .unwrap();
        assert_eq!(outcome, Dispatch::Failed);
        let (_, reply) = transport.messages().pop().unwrap();
        assert_eq!(reply.body, "The list is locked.\n\n");

        let outcome = dispatcher
            .handle_message(&message("!warden ban broken @spam:example.org"))
            .await
            .unwrap();
        assert_eq!(outcome, Dispatch::Failed);
        let (_, reply) = transport.messages().pop().unwrap();
        assert!(reply.body.starts_with("There was an unexpected error"));
        assert!(!reply.body.contains("policy room vanished"));
    }
}
