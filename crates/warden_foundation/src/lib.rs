//! Core types for Warden.
//!
//! This crate provides:
//! - [`Error`] - The fault taxonomy shared by every layer
//! - [`RoomReference`], [`UserId`], [`EventReference`] - Matrix identifiers
//! - [`Permalinks`] - Creating and parsing `matrix.to` links

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod identifier;
pub mod permalink;

pub use error::{Error, ErrorContext, ErrorKind, Registry, Result};
pub use identifier::{EventId, EventReference, RoomKind, RoomReference, UserId};
pub use permalink::{Permalink, Permalinks};
