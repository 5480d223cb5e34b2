//! Matrix interface adaptor and console for Warden.
//!
//! This crate provides:
//! - [`render_and_send`] - Paged delivery of a document in both formats
//! - [`ReactionHandler`] / [`ReactionPrompter`] - Prompts answered by reactions
//! - [`CommandDispatcher`] - Running commands from control room messages
//! - [`InterfaceConfig`] - JSON configuration
//! - [`Console`] - An interactive stand-in for a Matrix room

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod console;
pub mod demo;
pub mod dispatcher;
pub mod editor;
pub mod reaction;
pub mod render;
pub mod transport;

pub use config::InterfaceConfig;
pub use console::{Console, ConsoleTransport};
pub use demo::demo_table;
pub use dispatcher::{
    CommandDispatcher, Dispatch, FAILURE_REACTION, Invocation, SUCCESS_REACTION,
};
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use reaction::{PromptReservation, PromptTicket, ReactionHandler, ReactionPrompter};
pub use render::{Destination, render_and_send};
pub use transport::{
    MemoryTransport, MessageSender, OutgoingMessage, Reaction, ReactionSender, Relation,
    RoomEvent, RoomMessage, Sent,
};
