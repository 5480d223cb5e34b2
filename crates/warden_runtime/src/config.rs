//! Runtime configuration.
//!
//! Read from JSON. Every field has a default, so `{}` is a valid
//! configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use warden_document::DEFAULT_PAGE_SIZE_LIMIT;
use warden_foundation::{Error, ErrorKind, Result, RoomReference, UserId};
use warden_interface::{DEFAULT_PROMPT_TIMEOUT, MAX_PROMPT_REACTIONS};

/// Settings for the command interface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterfaceConfig {
    /// Largest page, in bytes, of either body of a message.
    pub page_size_limit: usize,
    /// How long a prompt waits for a reaction, in milliseconds.
    pub prompt_timeout_ms: u64,
    /// How many candidates a prompt offers at most.
    pub max_prompt_reactions: usize,
    /// Words that mark a message as a command, besides the bot's own
    /// names.
    pub command_prefixes: Vec<String>,
    /// The bot's display name, also accepted as a prefix.
    pub display_name: Option<String>,
    /// Accept a lone `!` as a prefix.
    pub allow_no_prefix: bool,
    /// The bot's own user id. Its reactions never answer prompts.
    pub bot_user_id: String,
    /// The room commands are accepted in.
    pub control_room: String,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            page_size_limit: DEFAULT_PAGE_SIZE_LIMIT,
            prompt_timeout_ms: u64::try_from(DEFAULT_PROMPT_TIMEOUT.as_millis())
                .unwrap_or(u64::MAX),
            max_prompt_reactions: MAX_PROMPT_REACTIONS,
            command_prefixes: vec!["!warden".to_string()],
            display_name: None,
            allow_no_prefix: false,
            bot_user_id: "@warden:localhost".to_string(),
            control_room: "!control:localhost".to_string(),
        }
    }
}

fn config_error(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::Config(message.into()))
}

impl InterfaceConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Fails if the JSON is malformed or a value is out of range.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| config_error(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or its contents are invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| config_error(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Names the first field that is not.
    pub fn validate(&self) -> Result<()> {
        if self.page_size_limit == 0 {
            return Err(config_error("page_size_limit must be positive"));
        }
        if self.prompt_timeout_ms == 0 {
            return Err(config_error("prompt_timeout_ms must be positive"));
        }
        if !(1..=MAX_PROMPT_REACTIONS).contains(&self.max_prompt_reactions) {
            return Err(config_error(format!(
                "max_prompt_reactions must be between 1 and {MAX_PROMPT_REACTIONS}"
            )));
        }
        if self.command_prefixes.iter().any(|prefix| prefix.trim().is_empty()) {
            return Err(config_error("command_prefixes cannot contain a blank prefix"));
        }
        if self.display_name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(config_error("display_name cannot be blank"));
        }
        self.bot_user()?;
        self.control_room()?;
        Ok(())
    }

    /// Returns the prompt timeout.
    #[must_use]
    pub const fn prompt_timeout(&self) -> Duration {
        Duration::from_millis(self.prompt_timeout_ms)
    }

    /// Returns the bot's user id.
    ///
    /// # Errors
    ///
    /// Fails if `bot_user_id` is not a user id.
    pub fn bot_user(&self) -> Result<UserId> {
        UserId::parse(&self.bot_user_id)
            .ok_or_else(|| config_error(format!("bot_user_id {} is not a user id", self.bot_user_id)))
    }

    /// Returns the control room.
    ///
    /// # Errors
    ///
    /// Fails if `control_room` is not a room id or alias.
    pub fn control_room(&self) -> Result<RoomReference> {
        RoomReference::parse(&self.control_room).ok_or_else(|| {
            config_error(format!(
                "control_room {} is not a room id or alias",
                self.control_room
            ))
        })
    }
}
