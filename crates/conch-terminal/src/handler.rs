//! Command trait, typed handlers and argument binding.

use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use futures::future::{self, BoxFuture, FutureExt};

use conch_types::error::{ConchError, Result};

use crate::coerce::{self, ConversionFailure};
use crate::descriptor::CommandDescriptor;
use crate::params::{ParameterSpec, Value};

/// A single executable command.
#[async_trait]
pub trait Command: Send + Sync {
    /// Metadata shown in help and used to build the lookup table.
    fn descriptor(&self) -> &CommandDescriptor;

    /// The primary name (what the user types).
    fn name(&self) -> &str {
        self.descriptor().name()
    }

    /// One-line description for `help`.
    fn description(&self) -> &str {
        self.descriptor().description()
    }

    /// Alternate names resolving to this command.
    fn aliases(&self) -> &[String] {
        self.descriptor().aliases()
    }

    /// Run the command with the raw tokens that followed its name.
    ///
    /// Failures are reported through the log; nothing is returned to the
    /// dispatcher.
    async fn execute(&self, args: &[String]);
}

/// Boxed body of a typed command.
pub type CommandBody = Box<dyn Fn(Arguments) -> BoxFuture<'static, ()> + Send + Sync>;

/// Argument count accepted by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    /// Parameters without a default.
    pub required: usize,
    /// All parameters.
    pub total: usize,
    /// Extra arguments are dropped instead of rejected.
    pub ignore_extra: bool,
}

impl Arity {
    pub fn admits(&self, count: usize) -> bool {
        count >= self.required && (self.ignore_extra || count <= self.total)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ignore_extra {
            write!(f, "at least {}", self.required)
        } else if self.required == self.total {
            write!(f, "{}", self.total)
        } else {
            write!(f, "{} to {}", self.required, self.total)
        }
    }
}

/// Why an invocation was skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvocationError {
    #[error("expected {expected} argument(s), got {got}")]
    Arity { expected: Arity, got: usize },

    #[error("parameter `{parameter}`: {failure}")]
    Conversion {
        parameter: String,
        #[source]
        failure: ConversionFailure,
    },
}

/// Arguments bound to a command's parameters, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments {
    names: Vec<String>,
    values: Vec<Value>,
    tolerated: Vec<InvocationError>,
}

impl Arguments {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Look up a value by parameter name.
    pub fn named(&self, name: &str) -> Option<&Value> {
        let index = self.names.iter().position(|n| n == name)?;
        self.values.get(index)
    }

    pub fn integer(&self, index: usize) -> Option<i64> {
        self.get(index).and_then(Value::as_integer)
    }

    pub fn float(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(Value::as_float)
    }

    pub fn boolean(&self, index: usize) -> Option<bool> {
        self.get(index).and_then(Value::as_bool)
    }

    pub fn character(&self, index: usize) -> Option<char> {
        self.get(index).and_then(Value::as_char)
    }

    pub fn text(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(Value::as_text)
    }

    /// Member name of an enumeration argument.
    pub fn member(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(Value::as_member)
    }

    /// True for a null binding (and for an index past the end).
    pub fn is_null(&self, index: usize) -> bool {
        self.get(index).is_none_or(Value::is_null)
    }

    /// Conversion failures that were bound as null instead of aborting.
    pub fn tolerated(&self) -> &[InvocationError] {
        &self.tolerated
    }
}

/// A command with declared, typed parameters.
///
/// Raw tokens are checked against the parameter arity, converted one by
/// one, and handed to the body as [`Arguments`].
pub struct CommandHandler {
    descriptor: CommandDescriptor,
    parameters: Vec<ParameterSpec>,
    body: CommandBody,
}

impl fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHandler")
            .field("descriptor", &self.descriptor)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

impl CommandHandler {
    /// Start declaring a command.
    pub fn builder(name: impl Into<String>, description: impl Into<String>) -> HandlerBuilder {
        HandlerBuilder {
            name: name.into(),
            description: description.into(),
            aliases: Vec::new(),
            parameters: Vec::new(),
            example: None,
            ignore_extra_args: false,
        }
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn arity(&self) -> Arity {
        Arity {
            required: self.parameters.iter().filter(|p| !p.has_default()).count(),
            total: self.parameters.len(),
            ignore_extra: self.descriptor.ignore_extra_args(),
        }
    }

    /// Check arity and convert `args` without running the body.
    ///
    /// Has no side effects. A failed conversion for an object-like parameter
    /// binds null and is kept in [`Arguments::tolerated`]; any other failure
    /// is returned and nothing is bound.
    pub fn bind(&self, args: &[String]) -> std::result::Result<Arguments, InvocationError> {
        let arity = self.arity();
        if !arity.admits(args.len()) {
            return Err(InvocationError::Arity {
                expected: arity,
                got: args.len(),
            });
        }

        let mut values = Vec::with_capacity(self.parameters.len());
        let mut tolerated = Vec::new();
        for (i, param) in self.parameters.iter().enumerate() {
            let value = match args.get(i) {
                Some(raw) => match coerce::convert(raw, param) {
                    Ok(value) => value,
                    Err(failure) => {
                        let err = InvocationError::Conversion {
                            parameter: param.name().to_string(),
                            failure,
                        };
                        if !param.target().is_object_like() {
                            return Err(err);
                        }
                        tolerated.push(err);
                        Value::Null
                    },
                },
                // Arity guarantees every missing argument has a default.
                None => param.default_value().cloned().unwrap_or(Value::Null),
            };
            values.push(value);
        }

        Ok(Arguments {
            names: self.parameters.iter().map(|p| p.name().to_string()).collect(),
            values,
            tolerated,
        })
    }
}

#[async_trait]
impl Command for CommandHandler {
    fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    async fn execute(&self, args: &[String]) {
        match self.bind(args) {
            Ok(bound) => {
                for err in bound.tolerated() {
                    report(self.descriptor.name(), err);
                }
                (self.body)(bound).await
            },
            Err(err) => report(self.descriptor.name(), &err),
        }
    }
}

fn report(command: &str, err: &InvocationError) {
    match err {
        InvocationError::Arity { expected, got } => log::warn!(
            "Invalid number of arguments for command {command}: expected {expected}, got {got}"
        ),
        InvocationError::Conversion {
            parameter,
            failure: ConversionFailure::InvalidEnumValue { raw, members },
        } => log::warn!(
            "Invalid enum value {raw} for parameter {parameter} of {command}. \
             Valid values are: {}",
            members.join(", ")
        ),
        InvocationError::Conversion {
            parameter,
            failure: ConversionFailure::TypeMismatch { raw, type_name },
        } => log::warn!(
            "Cannot convert value {raw} to type {type_name} for parameter {parameter} of {command}"
        ),
    }
}

/// Declares a [`CommandHandler`].
#[derive(Debug)]
pub struct HandlerBuilder {
    name: String,
    description: String,
    aliases: Vec<String>,
    parameters: Vec<ParameterSpec>,
    example: Option<String>,
    ignore_extra_args: bool,
}

impl HandlerBuilder {
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Append a positional parameter.
    pub fn param(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    /// Example arguments, shown as `"<name> <example>"` in help.
    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Accept more arguments than parameters, dropping the rest.
    pub fn ignore_extra_args(mut self) -> Self {
        self.ignore_extra_args = true;
        self
    }

    /// Finish with an asynchronous body.
    pub fn body<F, Fut>(self, body: F) -> Result<CommandHandler>
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let boxed: CommandBody = Box::new(move |args| body(args).boxed());
        self.finish(boxed)
    }

    /// Finish with a synchronous body.
    pub fn sync_body<F>(self, body: F) -> Result<CommandHandler>
    where
        F: Fn(Arguments) + Send + Sync + 'static,
    {
        let boxed: CommandBody = Box::new(move |args| {
            body(args);
            future::ready(()).boxed()
        });
        self.finish(boxed)
    }

    fn finish(self, body: CommandBody) -> Result<CommandHandler> {
        self.validate()?;

        let mut descriptor = CommandDescriptor::new(self.name, self.description)
            .with_aliases(self.aliases)
            .with_parameters(&self.parameters);
        if let Some(example) = &self.example {
            descriptor = descriptor.with_example(example);
        }
        if self.ignore_extra_args {
            descriptor = descriptor.ignoring_extra_args();
        }

        Ok(CommandHandler {
            descriptor,
            parameters: self.parameters,
            body,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ConchError::Registration("command name is empty".into()));
        }
        if self.name.contains(char::is_whitespace) {
            return Err(ConchError::Registration(format!(
                "command name `{}` contains whitespace",
                self.name
            )));
        }

        let mut seen_default = false;
        for (i, param) in self.parameters.iter().enumerate() {
            if self.parameters[..i].iter().any(|p| p.name() == param.name()) {
                return Err(ConchError::Registration(format!(
                    "{}: duplicate parameter `{}`",
                    self.name,
                    param.name()
                )));
            }
            match param.default_value() {
                Some(default) => {
                    if !param.target().accepts(default) {
                        return Err(ConchError::Registration(format!(
                            "{}: default `{default}` does not fit parameter `{}` of type {}",
                            self.name,
                            param.name(),
                            param.target().type_name()
                        )));
                    }
                    seen_default = true;
                },
                None if seen_default => {
                    return Err(ConchError::Registration(format!(
                        "{}: required parameter `{}` follows an optional one",
                        self.name,
                        param.name()
                    )));
                },
                None => {},
            }
        }
        Ok(())
    }
}
