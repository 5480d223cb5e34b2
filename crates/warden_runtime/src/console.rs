//! An interactive console standing in for a Matrix room.
//!
//! Every line typed is a message from the operator in the control room.
//! A line of the form `+<key>` reacts to the bot's latest message instead,
//! so `+1` answers the first option of a prompt and `+ok` or `+cancel`
//! answers a confirmation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::runtime::Runtime;
use tokio::task::{JoinError, JoinHandle};
use tracing::error;
use warden_foundation::{Error, EventId, Result, RoomReference, UserId};
use warden_interface::{CANCEL_REACTION, CONFIRM_REACTION, number_to_emoji};

use crate::dispatcher::{CommandDispatcher, Dispatch};
use crate::editor::{LineEditor, ReadResult, RustylineEditor};
use crate::transport::{
    MemoryTransport, MessageSender, OutgoingMessage, Reaction, ReactionSender, Relation,
    RoomEvent, RoomMessage,
};

/// Records everything like [`MemoryTransport`] and prints it as it is sent.
#[derive(Debug, Default)]
pub struct ConsoleTransport {
    memory: MemoryTransport,
    quiet: bool,
}

impl ConsoleTransport {
    /// Creates a transport that prints to stdout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport that only records.
    #[must_use]
    pub fn quiet() -> Self {
        Self {
            memory: MemoryTransport::new(),
            quiet: true,
        }
    }

    /// Returns the record of everything sent.
    #[must_use]
    pub const fn memory(&self) -> &MemoryTransport {
        &self.memory
    }
}

#[async_trait]
impl MessageSender for ConsoleTransport {
    async fn send_message(&self, message: OutgoingMessage) -> Result<EventId> {
        let header = match &message.relation {
            Some(Relation::Reply(event)) => format!("in reply to {event}"),
            Some(Relation::Thread(event)) => format!("continuing {event}"),
            None => String::new(),
        };
        let body = message.body.clone();
        let id = self.memory.send_message(message).await?;
        if !self.quiet {
            println!("\x1b[1;36m[{id}]\x1b[0m \x1b[2m{header}\x1b[0m");
            println!("{}", body.trim_end());
        }
        Ok(id)
    }
}

#[async_trait]
impl ReactionSender for ConsoleTransport {
    async fn send_reaction(&self, room: &RoomReference, event: &EventId, key: &str) -> Result<()> {
        self.memory.send_reaction(room, event, key).await?;
        if !self.quiet {
            println!("\x1b[2m{key} on {event}\x1b[0m");
        }
        Ok(())
    }
}

/// Turns `+3` into the third keycap, `+ok` and `+cancel` into the
/// confirmation keys, and passes anything else through.
fn reaction_key(key: &str) -> &str {
    if key.eq_ignore_ascii_case(CONFIRM_REACTION) {
        return CONFIRM_REACTION;
    }
    if key.eq_ignore_ascii_case(CANCEL_REACTION) {
        return CANCEL_REACTION;
    }
    key.parse::<usize>()
        .ok()
        .and_then(number_to_emoji)
        .unwrap_or(key)
}

type CommandTask = JoinHandle<Result<Dispatch>>;

/// The interactive console.
pub struct Console<E: LineEditor = RustylineEditor> {
    editor: E,
    runtime: Runtime,
    dispatcher: Arc<CommandDispatcher>,
    transport: Arc<ConsoleTransport>,
    operator: UserId,
    prompt: String,
    next_event: u64,
    background: Vec<CommandTask>,
}

impl Console<RustylineEditor> {
    /// Creates a console with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor or the async runtime fails to start.
    pub fn new(dispatcher: CommandDispatcher, transport: Arc<ConsoleTransport>) -> Result<Self> {
        Self::with_editor(RustylineEditor::new()?, dispatcher, transport)
    }
}

impl<E: LineEditor> Console<E> {
    /// Creates a console reading from `editor`.
    ///
    /// `transport` must be the sender `dispatcher` was built with, so that
    /// `+<key>` reacts to the messages the dispatcher sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the async runtime fails to start.
    pub fn with_editor(
        mut editor: E,
        dispatcher: CommandDispatcher,
        transport: Arc<ConsoleTransport>,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|e| Error::internal(e.to_string()))?;
        let mut words = dispatcher.config().command_prefixes.clone();
        for command in dispatcher.table().all_commands() {
            for word in command.designator() {
                if !words.contains(word) {
                    words.push(word.clone());
                }
            }
        }
        editor.set_words(words);
        Ok(Self {
            editor,
            runtime,
            dispatcher: Arc::new(dispatcher),
            transport,
            operator: UserId::parse("@operator:localhost")
                .ok_or_else(|| Error::internal("operator user id is malformed"))?,
            prompt: "warden> ".to_string(),
            next_event: 0,
            background: Vec::new(),
        })
    }

    /// Sets who the typed messages come from.
    #[must_use]
    pub fn with_operator(mut self, operator: UserId) -> Self {
        self.operator = operator;
        self
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &Arc<ConsoleTransport> {
        &self.transport
    }

    /// Runs the console until end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails.
    pub fn run(&mut self) -> Result<()> {
        loop {
            match self.editor.read_line(&self.prompt)? {
                ReadResult::Line(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    self.editor.add_history(line);
                    self.submit(line);
                }
                ReadResult::Interrupted => {}
                ReadResult::Eof => break,
            }
        }
        Ok(())
    }

    fn next_event_id(&mut self) -> EventId {
        self.next_event += 1;
        EventId::new(format!("$console-{}", self.next_event))
    }

    /// Handles one line of input.
    pub fn submit(&mut self, line: &str) {
        let room = match self.dispatcher.config().control_room() {
            Ok(room) => room,
            Err(e) => {
                error!(error = %e, "no control room");
                return;
            }
        };
        if let Some(key) = line.strip_prefix('+') {
            self.react(room, reaction_key(key.trim()));
            return;
        }
        let message = RoomMessage {
            room,
            event_id: self.next_event_id(),
            sender: self.operator.clone(),
            body: line.to_string(),
        };
        self.dispatch(message);
    }

    fn react(&mut self, room: RoomReference, key: &str) {
        let Some(target) = self.transport.memory().last_message_id() else {
            println!("There is no message to react to.");
            return;
        };
        let event = RoomEvent::Reaction(Reaction {
            room,
            sender: self.operator.clone(),
            relates_to: target.clone(),
            key: key.to_string(),
        });
        if !self.dispatcher.prompts().handle_event(&event) {
            println!("{key} on {target} did not answer a prompt.");
            return;
        }
        let waiting = self.dispatcher.prompts().pending_prompts();
        let background = std::mem::take(&mut self.background);
        for mut task in background {
            if !self.settle(&mut task, waiting) {
                self.background.push(task);
            }
        }
    }

    fn dispatch(&mut self, message: RoomMessage) {
        let dispatcher = Arc::clone(&self.dispatcher);
        let waiting = self.dispatcher.prompts().pending_prompts();
        let mut task = self
            .runtime
            .spawn(async move { dispatcher.handle_message(&message).await });
        if !self.settle(&mut task, waiting) {
            self.background.push(task);
        }
    }

    /// Waits for `task` to finish or for a new prompt to appear, whichever
    /// is first. Returns true if the task finished.
    fn settle(&self, task: &mut CommandTask, waiting: usize) -> bool {
        let prompts = self.dispatcher.prompts();
        self.runtime.block_on(async {
            loop {
                tokio::select! {
                    joined = &mut *task => {
                        self.report(joined);
                        return true;
                    }
                    () = tokio::time::sleep(Duration::from_millis(20)) => {
                        if prompts.pending_prompts() > waiting {
                            return false;
                        }
                    }
                }
            }
        })
    }

    fn report(&self, joined: std::result::Result<Result<Dispatch>, JoinError>) {
        match joined {
            Ok(Ok(Dispatch::Ignored)) => println!(
                "Not a command. Commands start with one of: {}.",
                self.dispatcher.config().command_prefixes.join(", ")
            ),
            Ok(Ok(_)) => {}
            Ok(Err(e)) => error!(error = %e, "could not report command outcome"),
            Err(e) => error!(error = %e, "command task failed"),
        }
    }
}
