//! Conversion of raw tokens into typed argument values.
//!
//! Conversion never logs and never panics: failures come back as
//! [`ConversionFailure`] values and the caller decides whether the
//! invocation can go on.

use crate::params::{ParameterSpec, TargetType, Value};

/// Why a token could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionFailure {
    #[error("invalid enum value `{raw}`, valid values are: {}", .members.join(", "))]
    InvalidEnumValue { raw: String, members: Vec<String> },

    #[error("cannot convert `{raw}` to {type_name}")]
    TypeMismatch { raw: String, type_name: String },
}

/// Convert `raw` for the given parameter.
pub fn convert(raw: &str, spec: &ParameterSpec) -> Result<Value, ConversionFailure> {
    convert_to(raw, spec.target())
}

/// Convert `raw` to `target`.
///
/// A nullable target converts as its underlying type; turning a failure
/// into null is left to the binder.
pub fn convert_to(raw: &str, target: &TargetType) -> Result<Value, ConversionFailure> {
    let mismatch = || ConversionFailure::TypeMismatch {
        raw: raw.to_string(),
        type_name: target.type_name(),
    };

    match target.underlying() {
        TargetType::Enum(spec) => spec
            .parse(raw)
            .ok_or_else(|| ConversionFailure::InvalidEnumValue {
                raw: raw.to_string(),
                members: spec.members().to_vec(),
            }),
        TargetType::Integer => raw.parse().map(Value::Integer).map_err(|_| mismatch()),
        TargetType::Float => raw.parse().map(Value::Float).map_err(|_| mismatch()),
        TargetType::Bool => parse_bool(raw).map(Value::Bool).ok_or_else(mismatch),
        TargetType::Char => single_char(raw).map(Value::Char).ok_or_else(mismatch),
        TargetType::String => Ok(Value::Text(raw.to_string())),
        TargetType::Other(_) => Err(mismatch()),
        // `underlying` never returns a nullable.
        TargetType::Nullable(_) => Err(mismatch()),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn single_char(raw: &str) -> Option<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
