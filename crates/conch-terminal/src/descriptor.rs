//! Command metadata.

use crate::params::ParameterSpec;

/// Immutable metadata describing one command.
///
/// The usage line is derived from the parameter list when the command is
/// built (`"greet <name:string> <times:integer>"`). The example, when set,
/// is stored with the command name prepended so it can be shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    name: String,
    description: String,
    aliases: Vec<String>,
    usage: String,
    example: Option<String>,
    ignore_extra_args: bool,
}

impl CommandDescriptor {
    /// A descriptor with no aliases, no parameters and no example.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            usage: name.clone(),
            name,
            description: description.into(),
            aliases: Vec::new(),
            example: None,
            ignore_extra_args: false,
        }
    }

    /// Replace the alias list.
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Derive the usage line from a parameter list.
    pub fn with_parameters(mut self, parameters: &[ParameterSpec]) -> Self {
        self.usage = render_usage(&self.name, parameters);
        self
    }

    /// Use a hand-written argument synopsis (e.g. `"[command]"`).
    pub fn with_usage(mut self, synopsis: &str) -> Self {
        self.usage = join_with_name(&self.name, synopsis);
        self
    }

    /// Set the example arguments. Blank examples are ignored.
    pub fn with_example(mut self, example: &str) -> Self {
        self.example = if example.trim().is_empty() {
            None
        } else {
            Some(join_with_name(&self.name, example.trim()))
        };
        self
    }

    /// Accept and drop arguments beyond the declared parameters.
    pub fn ignoring_extra_args(mut self) -> Self {
        self.ignore_extra_args = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn example(&self) -> Option<&str> {
        self.example.as_deref()
    }

    pub fn ignore_extra_args(&self) -> bool {
        self.ignore_extra_args
    }

    /// Whether `input` is this command's primary name, ignoring case.
    pub fn is_named(&self, input: &str) -> bool {
        name_key(&self.name) == name_key(input)
    }

    /// Whether `input` names this command, by primary name or alias.
    pub fn answers_to(&self, input: &str) -> bool {
        let key = name_key(input);
        name_key(&self.name) == key || self.aliases.iter().any(|a| name_key(a) == key)
    }
}

/// Case-folded lookup key for a command name or alias.
pub(crate) fn name_key(name: &str) -> String {
    name.to_lowercase()
}

fn render_usage(name: &str, parameters: &[ParameterSpec]) -> String {
    let synopsis: Vec<String> = parameters.iter().map(ParameterSpec::usage_fragment).collect();
    join_with_name(name, &synopsis.join(" "))
}

fn join_with_name(name: &str, rest: &str) -> String {
    if rest.is_empty() {
        name.to_string()
    } else {
        format!("{name} {rest}")
    }
}
