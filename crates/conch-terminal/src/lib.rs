//! Typed console commands and the interactive read loop.
//!
//! Commands declare typed positional parameters and are registered by name
//! and alias. The console reads lines, splits them on spaces, resolves
//! the first token, converts the remaining tokens to the declared types and
//! runs the command.

pub mod coerce;
mod console;
mod descriptor;
mod handler;
mod help;
pub mod params;
mod registry;
pub mod terminal;

/// Why a token could not be converted.
pub use coerce::ConversionFailure;
/// Read loop driver.
pub use console::Console;
/// Outcome of dispatching one line.
pub use console::Dispatch;
/// Space tokenizer used by the read loop.
pub use console::tokenize;
/// Immutable command metadata.
pub use descriptor::CommandDescriptor;
/// Accepted argument count of a command.
pub use handler::Arity;
/// Typed values handed to a command body.
pub use handler::Arguments;
/// A single executable command trait.
pub use handler::Command;
/// Command with declared, typed parameters.
pub use handler::CommandHandler;
/// Builder for [`CommandHandler`].
pub use handler::HandlerBuilder;
/// Why an invocation was skipped.
pub use handler::InvocationError;
/// Built-in `help` command.
pub use help::HelpCommand;
/// Parameter declarations.
pub use params::{EnumSpec, ParameterSpec, TargetType, Value};
/// Name/alias lookup table.
pub use registry::CommandRegistry;
/// Collects commands before the registry is built.
pub use registry::RegistryBuilder;
/// Terminal capabilities.
pub use terminal::{StdTerminal, Terminal};
