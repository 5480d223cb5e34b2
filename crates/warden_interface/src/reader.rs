//! Command reading.
//!
//! Converts a raw command string into [`ReadItem`]s. Words are split on
//! whitespace; the first character of a word (its dispatch character) may
//! select a read macro that produces a typed item. After that, string items
//! are matched against rewrite patterns, which is how `matrix.to` permalinks
//! become references.
//!
//! Malformed references are never an error here. They are read as plain
//! strings and left for the parameter parser to reject.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use warden_foundation::{
    Error, EventReference, Permalink, Permalinks, Registry, Result, RoomReference, UserId,
};

/// A keyword argument such as `--no-confirm` or `:reason`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Keyword(String);

impl Keyword {
    /// Creates a keyword from its designator, without leading `-` or `:`.
    #[must_use]
    pub fn new(designator: impl Into<String>) -> Self {
        Self(designator.into())
    }

    /// Returns the designator.
    #[must_use]
    pub fn designator(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--{}", self.0)
    }
}

/// One item read from a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadItem {
    /// A plain word.
    String(String),
    /// A keyword argument.
    Keyword(Keyword),
    /// A room id or alias.
    Room(RoomReference),
    /// A user id.
    User(UserId),
    /// An event permalink.
    Event(EventReference),
}

impl ReadItem {
    /// Returns the word if this is a plain string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(word) => Some(word),
            _ => None,
        }
    }

    /// Returns true if this is a keyword.
    #[must_use]
    pub const fn is_keyword(&self) -> bool {
        matches!(self, Self::Keyword(_))
    }
}

impl fmt::Display for ReadItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(word) => f.write_str(word),
            Self::Keyword(keyword) => write!(f, "{keyword}"),
            Self::Room(room) => write!(f, "{room}"),
            Self::User(user) => write!(f, "{user}"),
            Self::Event(event) => write!(f, "{event}"),
        }
    }
}

impl From<&str> for ReadItem {
    fn from(word: &str) -> Self {
        Self::String(word.to_string())
    }
}

/// Prints an item so that reading the output gives back an equal item.
///
/// Rooms and events are printed as permalinks so that `via` servers survive.
#[must_use]
pub fn print_readably(item: &ReadItem) -> String {
    match item {
        ReadItem::Room(room) => room.to_permalink(),
        ReadItem::Event(event) => event.to_permalink(),
        ReadItem::User(user) => user.to_string(),
        ReadItem::Keyword(keyword) => keyword.to_string(),
        ReadItem::String(word) => word.clone(),
    }
}

/// Produces an item from a word that starts with a dispatch character.
pub type ReadMacro = fn(&str) -> ReadItem;

/// Produces an item from a string that matched a rewrite pattern, or `None`
/// to leave it as a string.
pub type Rewrite = fn(&str) -> Option<ReadItem>;

/// Reads commands using a set of read macros and rewrites.
pub struct CommandReader {
    macros: HashMap<char, ReadMacro>,
    rewrites: Vec<(Regex, Rewrite)>,
}

impl Default for CommandReader {
    fn default() -> Self {
        Self::standard()
    }
}

impl CommandReader {
    /// Creates a reader with no macros or rewrites, which reads every word
    /// as a string.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            macros: HashMap::new(),
            rewrites: Vec::new(),
        }
    }

    /// Creates a reader for rooms, users, keywords and permalinks.
    #[must_use]
    pub fn standard() -> Self {
        let macros = HashMap::from([
            ('#', read_room as ReadMacro),
            ('!', read_room as ReadMacro),
            ('@', read_user as ReadMacro),
            ('-', read_keyword as ReadMacro),
            (':', read_keyword as ReadMacro),
        ]);
        let mut rewrites = Vec::new();
        if let Ok(pattern) = Regex::new(r"^https://matrix\.to/#/\S+$") {
            rewrites.push((pattern, read_permalink as Rewrite));
        }
        Self { macros, rewrites }
    }

    /// Defines the macro for words starting with `dispatch`.
    ///
    /// # Errors
    ///
    /// Fails if a macro is already defined for `dispatch`.
    pub fn define_read_macro(&mut self, dispatch: char, read: ReadMacro) -> Result<&mut Self> {
        if self.macros.contains_key(&dispatch) {
            return Err(Error::duplicate(Registry::ReadMacro, dispatch.to_string()));
        }
        self.macros.insert(dispatch, read);
        Ok(self)
    }

    /// Adds a rewrite for strings matching `pattern`. Rewrites are tried in
    /// the order they were added.
    ///
    /// # Errors
    ///
    /// Fails if `pattern` is not a valid regular expression.
    pub fn define_rewrite(&mut self, pattern: &str, rewrite: Rewrite) -> Result<&mut Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| Error::internal(format!("invalid rewrite pattern {pattern}: {e}")))?;
        self.rewrites.push((pattern, rewrite));
        Ok(self)
    }

    /// Reads a command into items.
    #[must_use]
    pub fn read(&self, text: &str) -> Vec<ReadItem> {
        text.split_whitespace()
            .map(|word| self.read_word(word))
            .map(|item| self.rewrite(item))
            .collect()
    }

    fn read_word(&self, word: &str) -> ReadItem {
        word.chars()
            .next()
            .and_then(|dispatch| self.macros.get(&dispatch))
            .map_or_else(|| ReadItem::String(word.to_string()), |read| read(word))
    }

    fn rewrite(&self, item: ReadItem) -> ReadItem {
        let ReadItem::String(word) = &item else {
            return item;
        };
        self.rewrites
            .iter()
            .filter(|(pattern, _)| pattern.is_match(word))
            .find_map(|(_, rewrite)| rewrite(word))
            .unwrap_or(item)
    }
}

static STANDARD_READER: LazyLock<CommandReader> = LazyLock::new(CommandReader::standard);

/// Reads a command with the standard reader.
#[must_use]
pub fn read_command(text: &str) -> Vec<ReadItem> {
    STANDARD_READER.read(text)
}

fn read_room(word: &str) -> ReadItem {
    RoomReference::parse(word).map_or_else(|| ReadItem::String(word.to_string()), ReadItem::Room)
}

fn read_user(word: &str) -> ReadItem {
    UserId::parse(word).map_or_else(|| ReadItem::String(word.to_string()), ReadItem::User)
}

/// Reads `-x`, `--x` and `:x` as keywords. A negative number such as `-42`
/// or `-0.5` stays a string.
fn read_keyword(word: &str) -> ReadItem {
    let is_negative_number = word.strip_prefix('-').is_some_and(|number| {
        number.starts_with(|c: char| c.is_ascii_digit())
            && number.chars().all(|c| c.is_ascii_digit() || c == '.')
    });
    if is_negative_number {
        return ReadItem::String(word.to_string());
    }
    ReadItem::Keyword(Keyword::new(word.trim_start_matches(['-', ':'])))
}

fn read_permalink(word: &str) -> Option<ReadItem> {
    match Permalinks::parse(word).ok()? {
        Permalink::Room(room) => Some(ReadItem::Room(room)),
        Permalink::User(user) => Some(ReadItem::User(user)),
        Permalink::Event(event) => Some(ReadItem::Event(event)),
    }
}
