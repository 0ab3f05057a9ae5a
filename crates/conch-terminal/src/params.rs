//! Parameter declarations and bound values.
//!
//! A command declares its positional parameters as a list of
//! [`ParameterSpec`]s. Each spec carries a closed [`TargetType`] tag that
//! selects the conversion rule applied to the raw token, so no type
//! inspection happens at dispatch time.

use std::fmt;

/// The semantic type a raw token is converted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetType {
    /// Signed 64-bit integer.
    Integer,
    /// 64-bit float.
    Float,
    /// `true` / `false`, case-insensitive.
    Bool,
    /// Exactly one character.
    Char,
    /// The token verbatim.
    String,
    /// The inner type, or null when the token does not convert.
    Nullable(Box<TargetType>),
    /// One member of a closed set of names.
    Enum(EnumSpec),
    /// A type with no text conversion. Always binds null.
    Other(String),
}

impl TargetType {
    /// Wrap `inner` as nullable. Wrapping twice is a no-op.
    pub fn nullable(inner: TargetType) -> Self {
        match inner {
            Self::Nullable(_) => inner,
            other => Self::Nullable(Box::new(other)),
        }
    }

    /// Shorthand for an enumeration target.
    pub fn enumeration<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(EnumSpec::new(name, members))
    }

    /// Types whose failed conversion binds null instead of aborting the call.
    pub fn is_object_like(&self) -> bool {
        matches!(self, Self::Nullable(_) | Self::String | Self::Other(_))
    }

    /// The nullable wrapper removed, if any.
    pub fn underlying(&self) -> &TargetType {
        match self {
            Self::Nullable(inner) => inner,
            other => other,
        }
    }

    /// Human-readable type name, used in usage lines and diagnostics.
    pub fn type_name(&self) -> String {
        match self {
            Self::Integer => "integer".to_string(),
            Self::Float => "float".to_string(),
            Self::Bool => "bool".to_string(),
            Self::Char => "char".to_string(),
            Self::String => "string".to_string(),
            Self::Nullable(inner) => format!("{}?", inner.type_name()),
            Self::Enum(spec) => spec.name().to_string(),
            Self::Other(name) => name.clone(),
        }
    }

    /// Whether `value` can be bound to a parameter of this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => self.is_object_like(),
            (Self::Nullable(inner), v) => inner.accepts(v),
            (Self::Integer, Value::Integer(_))
            | (Self::Float, Value::Float(_))
            | (Self::Bool, Value::Bool(_))
            | (Self::Char, Value::Char(_))
            | (Self::String, Value::Text(_)) => true,
            (Self::Enum(spec), Value::Member { index, name }) => {
                spec.members().get(*index).is_some_and(|m| m == name)
            },
            _ => false,
        }
    }
}

/// A named, ordered set of enumeration members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSpec {
    name: String,
    members: Vec<String>,
}

impl EnumSpec {
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Look up a member by name, ignoring ASCII case.
    pub fn parse(&self, raw: &str) -> Option<Value> {
        self.members
            .iter()
            .position(|m| m.eq_ignore_ascii_case(raw))
            .map(|index| self.member(index))
    }

    /// The value for the member at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn member(&self, index: usize) -> Value {
        Value::Member {
            index,
            name: self.members[index].clone(),
        }
    }
}

/// A converted argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    Text(String),
    /// An enumeration member: its position in the declaration and its
    /// declared spelling.
    Member { index: usize, name: String },
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// The member name of an enumeration value.
    pub fn as_member(&self) -> Option<&str> {
        match self {
            Self::Member { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The declaration index of an enumeration value.
    pub fn member_index(&self) -> Option<usize> {
        match self {
            Self::Member { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Char(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
            Self::Member { name, .. } => write!(f, "{name}"),
        }
    }
}

/// One positional parameter of a command.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    name: String,
    target: TargetType,
    default: Option<Value>,
}

impl ParameterSpec {
    /// A parameter the caller must supply.
    pub fn required(name: impl Into<String>, target: TargetType) -> Self {
        Self {
            name: name.into(),
            target,
            default: None,
        }
    }

    /// A parameter that falls back to `default` when the argument is absent.
    pub fn optional(name: impl Into<String>, target: TargetType, default: Value) -> Self {
        Self {
            name: name.into(),
            target,
            default: Some(default),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &TargetType {
        &self.target
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// `<name:type>` as shown in usage lines.
    pub fn usage_fragment(&self) -> String {
        format!("<{}:{}>", self.name, self.target.type_name())
    }
}
