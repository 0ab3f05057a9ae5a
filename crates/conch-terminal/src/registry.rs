//! Name/alias lookup table.

use std::collections::HashMap;
use std::sync::Arc;

use conch_types::error::{ConchError, Result};

use crate::descriptor::{CommandDescriptor, name_key};
use crate::handler::Command;
use crate::help::HelpCommand;
use crate::terminal::Terminal;

/// Registry of available commands.
///
/// Built once at startup and read-only afterwards. Keys are lowercased
/// primary names and aliases. Primary names must be unique; aliases are
/// best effort and the first registration of a key wins.
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
    table: HashMap<String, usize>,
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.commands.iter().map(|c| c.name()).collect::<Vec<_>>())
            .field("keys", &self.table.len())
            .finish()
    }
}

impl CommandRegistry {
    /// Index `commands` in order.
    ///
    /// Fails if two commands share a primary name, or if a primary name
    /// matches an alias registered by an earlier command.
    pub fn new(commands: Vec<Box<dyn Command>>) -> Result<Self> {
        let mut table: HashMap<String, usize> = HashMap::new();

        for (index, cmd) in commands.iter().enumerate() {
            let key = name_key(cmd.name());
            if table.contains_key(&key) {
                return Err(ConchError::Collision {
                    name: cmd.name().to_string(),
                });
            }
            table.insert(key, index);

            for alias in cmd.aliases() {
                if alias.trim().is_empty() {
                    continue;
                }
                let key = name_key(alias);
                match table.get(&key) {
                    Some(&owner) if owner != index => log::debug!(
                        "alias {alias} of {} already taken by {}, skipped",
                        cmd.name(),
                        commands[owner].name()
                    ),
                    Some(_) => {},
                    None => {
                        table.insert(key, index);
                    },
                }
            }
        }

        Ok(Self { commands, table })
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Look up a command by name or alias, ignoring case.
    pub fn resolve(&self, name: &str) -> Option<&dyn Command> {
        let index = *self.table.get(&name_key(name))?;
        Some(self.commands[index].as_ref())
    }

    /// Descriptors of every command, in registration order.
    pub fn commands(&self) -> impl Iterator<Item = &CommandDescriptor> + '_ {
        self.commands.iter().map(|c| c.descriptor())
    }

    /// Number of registered commands (not keys).
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Collects commands before the registry is frozen.
#[derive(Default)]
pub struct RegistryBuilder {
    commands: Vec<Box<dyn Command>>,
    help: Option<Arc<dyn Terminal>>,
}

impl RegistryBuilder {
    /// Add a command. Order matters for alias collisions.
    pub fn register(&mut self, cmd: Box<dyn Command>) -> &mut Self {
        self.commands.push(cmd);
        self
    }

    /// Append the built-in `help` command, writing to `terminal`, when
    /// building.
    pub fn with_help(&mut self, terminal: Arc<dyn Terminal>) -> &mut Self {
        self.help = Some(terminal);
        self
    }

    pub fn build(self) -> Result<CommandRegistry> {
        let mut commands = self.commands;
        if let Some(terminal) = self.help {
            let descriptors = commands.iter().map(|c| c.descriptor().clone()).collect();
            commands.push(Box::new(HelpCommand::new(descriptors, terminal)));
        }
        CommandRegistry::new(commands)
    }
}
