//! Command tables.
//!
//! A [`CommandTable`] is a trie keyed by designator words. Looking up a
//! command consumes plain words from the front of a read command for as
//! long as they lead somewhere in the trie, and answers with the deepest
//! command passed on the way. Tables can import other tables, which makes
//! every command of the imported table reachable from the importer.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;
use warden_foundation::{Error, Registry, Result};

use crate::command::CommandDefinition;
use crate::reader::ReadItem;

struct TrieNode<C> {
    command: Option<Arc<CommandDefinition<C>>>,
    next: HashMap<String, TrieNode<C>>,
}

impl<C> Default for TrieNode<C> {
    fn default() -> Self {
        Self {
            command: None,
            next: HashMap::new(),
        }
    }
}

/// A named trie of commands.
pub struct CommandTable<C> {
    name: String,
    root: TrieNode<C>,
    commands: Vec<Arc<CommandDefinition<C>>>,
    imports: Vec<Arc<CommandTable<C>>>,
}

impl<C> CommandTable<C> {
    /// Creates an empty table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: TrieNode::default(),
            commands: Vec::new(),
            imports: Vec::new(),
        }
    }

    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a command under its designator.
    ///
    /// # Errors
    ///
    /// Fails if this table, or a table it imports, already has a command
    /// with the same designator.
    pub fn intern_command(
        &mut self,
        command: CommandDefinition<C>,
    ) -> Result<Arc<CommandDefinition<C>>> {
        if self.contains(command.designator()) {
            return Err(Error::duplicate(
                Registry::CommandDesignator,
                command.designator().join(" "),
            ));
        }
        let command = Arc::new(command);
        let mut node = &mut self.root;
        for word in command.designator() {
            node = node.next.entry(word.clone()).or_default();
        }
        node.command = Some(Arc::clone(&command));
        self.commands.push(Arc::clone(&command));
        debug!(table = %self.name, designator = ?command.designator(), "interned command");
        Ok(command)
    }

    /// Makes every command of `table` reachable from this table.
    ///
    /// # Errors
    ///
    /// Fails if any of the imported designators is already reachable.
    pub fn import_table(&mut self, table: Arc<CommandTable<C>>) -> Result<()> {
        if let Some(clash) = table
            .all_commands()
            .into_iter()
            .find(|command| self.contains(command.designator()))
        {
            return Err(Error::duplicate(
                Registry::CommandDesignator,
                clash.designator().join(" "),
            ));
        }
        self.imports.push(table);
        Ok(())
    }

    /// Returns true if a command with exactly this designator is reachable.
    #[must_use]
    pub fn contains(&self, designator: &[String]) -> bool {
        self.find_exact(designator).is_some()
            || self.imports.iter().any(|table| table.contains(designator))
    }

    fn find_exact(&self, designator: &[String]) -> Option<&Arc<CommandDefinition<C>>> {
        designator
            .iter()
            .try_fold(&self.root, |node, word| node.next.get(word))
            .and_then(|node| node.command.as_ref())
    }

    /// Finds the command designated by the leading words of `items`.
    ///
    /// Returns the command and the number of items its designator used up;
    /// the items after that are the command's arguments. The deepest match
    /// wins, whether it comes from this table or an imported one.
    #[must_use]
    pub fn find_matching_command(
        &self,
        items: &[ReadItem],
    ) -> Option<(Arc<CommandDefinition<C>>, usize)> {
        let mut best = self.find_in_trie(items);
        for table in &self.imports {
            if let Some((command, depth)) = table.find_matching_command(items) {
                if best.as_ref().is_none_or(|(_, best_depth)| depth > *best_depth) {
                    best = Some((command, depth));
                }
            }
        }
        best
    }

    fn find_in_trie(&self, items: &[ReadItem]) -> Option<(Arc<CommandDefinition<C>>, usize)> {
        let mut node = &self.root;
        let mut best = node.command.as_ref().map(|command| (Arc::clone(command), 0));
        for (depth, item) in items.iter().enumerate() {
            let Some(next) = item.as_str().and_then(|word| node.next.get(word)) else {
                break;
            };
            node = next;
            if let Some(command) = &node.command {
                best = Some((Arc::clone(command), depth + 1));
            }
        }
        best
    }

    /// Returns the commands interned directly in this table, in the order
    /// they were added.
    #[must_use]
    pub fn exported_commands(&self) -> &[Arc<CommandDefinition<C>>] {
        &self.commands
    }

    /// Returns the imported tables.
    #[must_use]
    pub fn imported_tables(&self) -> &[Arc<CommandTable<C>>] {
        &self.imports
    }

    /// Returns every reachable command, own commands first.
    #[must_use]
    pub fn all_commands(&self) -> Vec<Arc<CommandDefinition<C>>> {
        let mut commands = self.commands.clone();
        for table in &self.imports {
            commands.extend(table.all_commands());
        }
        commands
    }
}

impl<C> fmt::Debug for CommandTable<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandTable")
            .field("name", &self.name)
            .field("commands", &self.commands.len())
            .field(
                "imports",
                &self.imports.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Finished command tables, keyed by name.
pub struct CommandTables<C> {
    tables: HashMap<String, Arc<CommandTable<C>>>,
}

impl<C> Default for CommandTables<C> {
    fn default() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }
}

impl<C> CommandTables<C> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table under its name.
    ///
    /// # Errors
    ///
    /// Fails if a table with that name is already registered.
    pub fn define_table(&mut self, table: CommandTable<C>) -> Result<Arc<CommandTable<C>>> {
        if self.tables.contains_key(table.name()) {
            return Err(Error::duplicate(Registry::CommandTable, table.name()));
        }
        let table = Arc::new(table);
        self.tables
            .insert(table.name().to_string(), Arc::clone(&table));
        Ok(table)
    }

    /// Looks up a table.
    ///
    /// # Errors
    ///
    /// Fails if no table has that name.
    pub fn find_table(&self, name: &str) -> Result<Arc<CommandTable<C>>> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_registered(Registry::CommandTable, name))
    }
}
