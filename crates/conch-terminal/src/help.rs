//! Built-in `help` command.

use std::sync::Arc;

use async_trait::async_trait;

use crate::descriptor::{CommandDescriptor, name_key};
use crate::handler::Command;
use crate::terminal::Terminal;

/// Lists registered commands, or describes one.
///
/// Holds a snapshot of every descriptor taken when the registry is built,
/// including its own.
pub struct HelpCommand {
    descriptor: CommandDescriptor,
    commands: Vec<CommandDescriptor>,
    terminal: Arc<dyn Terminal>,
}

impl HelpCommand {
    pub fn new(mut commands: Vec<CommandDescriptor>, terminal: Arc<dyn Terminal>) -> Self {
        let descriptor = CommandDescriptor::new("help", "List commands or describe one")
            .with_aliases(["?"])
            .with_usage("[command]")
            .with_example("greet")
            .ignoring_extra_args();
        commands.push(descriptor.clone());
        Self {
            descriptor,
            commands,
            terminal,
        }
    }

    /// Find a command by name first, then by alias, in registration order.
    pub fn lookup(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands
            .iter()
            .find(|d| d.is_named(name))
            .or_else(|| self.commands.iter().find(|d| d.answers_to(name)))
    }

    /// One line per command, sorted by name.
    pub fn render_index(&self) -> String {
        let mut sorted: Vec<&CommandDescriptor> = self.commands.iter().collect();
        sorted.sort_by_key(|d| name_key(d.name()));

        let width = sorted.iter().map(|d| d.name().chars().count()).max().unwrap_or(0);
        let mut out = format!("Commands ({}):\n", sorted.len());
        for d in &sorted {
            out.push_str(&format!("  {:width$}  {}", d.name(), d.description()));
            let aliases = visible_aliases(d);
            if !aliases.is_empty() {
                out.push_str(&format!(" (aliases: {})", aliases.join(", ")));
            }
            out.push('\n');
        }
        out.push_str("\nType 'help <command>' for details.");
        out
    }

    /// Description, usage, aliases and example of one command.
    pub fn render_detail(d: &CommandDescriptor) -> String {
        let mut out = format!("{}\n  {}\n  Usage: {}", d.name(), d.description(), d.usage());
        let aliases = visible_aliases(d);
        if !aliases.is_empty() {
            out.push_str(&format!("\n  Aliases: {}", aliases.join(", ")));
        }
        if let Some(example) = d.example() {
            out.push_str(&format!("\n  Example: {example}"));
        }
        out
    }

    fn print(&self, text: &str) {
        if let Err(e) = self.terminal.write(&format!("{text}\n")) {
            log::warn!("help: failed to write output: {e}");
        }
    }
}

fn visible_aliases(d: &CommandDescriptor) -> Vec<&str> {
    d.aliases()
        .iter()
        .map(String::as_str)
        .filter(|a| !a.trim().is_empty())
        .collect()
}

#[async_trait]
impl Command for HelpCommand {
    fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    async fn execute(&self, args: &[String]) {
        match args.first() {
            None => self.print(&self.render_index()),
            Some(name) => match self.lookup(name) {
                Some(d) => self.print(&Self::render_detail(d)),
                None => log::warn!("{name} is not registered as a console command"),
            },
        }
    }
}
