//! Error types for the Warden system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//!
//! Everything in this module is a *fault*: a programmer error or a failure
//! of an external collaborator. Mistakes made by the operator typing a
//! command are not represented here; they are reported back to the room by
//! the interface layer.

use std::fmt;

use thiserror::Error;

/// The main error type for Warden operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a missing renderer error.
    #[must_use]
    pub fn missing_renderer(format: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingRenderer {
            format: format.into(),
            key: key.into(),
        })
    }

    /// Creates an oversized commit error.
    #[must_use]
    pub fn oversized_commit(size: usize, limit: usize) -> Self {
        Self::new(ErrorKind::OversizedCommit { size, limit })
    }

    /// Creates a duplicate registration error.
    #[must_use]
    pub fn duplicate(registry: Registry, name: impl Into<String>) -> Self {
        Self::new(ErrorKind::Duplicate {
            registry,
            name: name.into(),
        })
    }

    /// Creates an unknown registry entry error.
    #[must_use]
    pub fn not_registered(registry: Registry, name: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotRegistered {
            registry,
            name: name.into(),
        })
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport(message.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns true if this error means a single unit of output could not
    /// fit in one message.
    #[must_use]
    pub fn is_oversized_commit(&self) -> bool {
        matches!(self.kind, ErrorKind::OversizedCommit { .. })
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// No render function is registered for a fringe position and tag.
    #[error("no {format} renderer registered for {key}")]
    MissingRenderer {
        /// The output format being rendered.
        format: String,
        /// The fringe position and tag that had no renderer.
        key: String,
    },

    /// Two walkers that must advance in lockstep returned different nodes.
    #[error("renderers diverged: {0}")]
    WalkerDivergence(String),

    /// A single committed block is larger than a whole page.
    #[error("commit of {size} bytes cannot fit in a page of {limit} bytes")]
    OversizedCommit {
        /// Size of the pending block.
        size: usize,
        /// Configured page size limit.
        limit: usize,
    },

    /// A name was registered twice in an append-only registry.
    #[error("{registry} already has an entry for {name}")]
    Duplicate {
        /// The registry that rejected the entry.
        registry: Registry,
        /// The duplicated name.
        name: String,
    },

    /// A name was looked up that was never registered.
    #[error("{registry} has no entry for {name}")]
    NotRegistered {
        /// The registry that was queried.
        registry: Registry,
        /// The name that was not found.
        name: String,
    },

    /// A value matched more than one presentation type.
    #[error("{value} matches several presentation types: {candidates:?}")]
    AmbiguousPresentation {
        /// Textual form of the value.
        value: String,
        /// Names of every type that accepted it.
        candidates: Vec<String>,
    },

    /// A permalink could not be parsed.
    #[error("invalid permalink {url}: {reason}")]
    InvalidPermalink {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The transport collaborator failed to deliver or annotate a message.
    #[error("transport error: {0}")]
    Transport(String),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// The append-only registries that can reject or miss an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registry {
    /// Named presentation types.
    PresentationType,
    /// Command designators within a table.
    CommandDesignator,
    /// Named command tables.
    CommandTable,
    /// Reader dispatch characters.
    ReadMacro,
    /// Per-format render functions.
    Renderer,
    /// Keyword arguments expected by a command.
    Keyword,
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PresentationType => "presentation type registry",
            Self::CommandDesignator => "command table",
            Self::CommandTable => "table registry",
            Self::ReadMacro => "reader",
            Self::Renderer => "renderer table",
            Self::Keyword => "keyword description",
        };
        f.write_str(name)
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The command designator being processed, if any.
    pub command: Option<String>,
    /// The room the failure relates to, if any.
    pub room: Option<String>,
    /// Stack of operations that led here.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the command designator.
    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Sets the room.
    #[must_use]
    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(command) = &self.command {
            write!(f, "in command {command}")?;
        }
        if let Some(room) = &self.room {
            write!(f, " (room {room})")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}

/// Result type alias for Warden operations.
pub type Result<T> = std::result::Result<T, Error>;
