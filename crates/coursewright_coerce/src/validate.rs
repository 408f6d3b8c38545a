//! Shape validation of parsed backend output.
//!
//! Failures here are recoverable: their message is fed back to the backend
//! on the next attempt.

use crate::{FieldSpec, OutputSpec, SpecKey};
use serde_json::Value;

/// Why one attempt's output was rejected.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum FormatError {
    /// The backend returned no text
    #[display("empty completion")]
    Empty,
    /// The repaired text is not valid JSON
    #[display("{}", _0)]
    Parse(String),
    /// List input produced something other than an array
    #[display("Output format not in an array of json")]
    NotAnArray,
    /// List input produced the wrong number of records
    #[display("expected {} json objects, one for each input element, got {}", expected, actual)]
    CountMismatch {
        /// Number of prompts
        expected: usize,
        /// Number of records returned
        actual: usize,
    },
    /// A record is not a JSON object
    #[display("{} is not a json object", _0)]
    NotAnObject(String),
    /// A declared key is absent
    #[display("{} not in json output", _0)]
    MissingField(String),
    /// An enumerated field holds a non-string value
    #[display("{} must be one of {:?}, got {}", key, choices, value)]
    InvalidChoice {
        /// Field path
        key: String,
        /// Allowed values
        choices: Vec<String>,
        /// Offending value
        value: String,
    },
    /// Validated output does not deserialize into the caller's type
    #[display("output does not have the expected structure: {}", _0)]
    Mismatch(String),
}

/// Turns parsed output into one record per expected input.
pub(crate) fn normalize(
    value: Value,
    list_input: bool,
    expected: usize,
) -> Result<Vec<Value>, FormatError> {
    if list_input {
        return match value {
            Value::Array(items) if items.len() == expected => Ok(items),
            Value::Array(items) => Err(FormatError::CountMismatch {
                expected,
                actual: items.len(),
            }),
            _ => Err(FormatError::NotAnArray),
        };
    }

    match value {
        Value::Array(mut items) if items.len() == 1 && items[0].is_object() => {
            Ok(vec![items.swap_remove(0)])
        }
        other => Ok(vec![other]),
    }
}

/// Checks a record against `spec`, coercing enumerated fields in place.
pub(crate) fn validate_record(
    record: &mut Value,
    spec: &OutputSpec,
    default_category: Option<&str>,
    path: &str,
) -> Result<(), FormatError> {
    let object = record.as_object_mut().ok_or_else(|| {
        FormatError::NotAnObject(if path.is_empty() {
            "output".to_string()
        } else {
            path.to_string()
        })
    })?;

    for (key, field) in spec.fields() {
        // generated keys cannot be looked up
        let SpecKey::Literal(name) = key else {
            continue;
        };
        let qualified = qualify(path, name);
        let slot = object
            .get_mut(name)
            .ok_or_else(|| FormatError::MissingField(qualified.clone()))?;

        match field {
            FieldSpec::Description(_) => {}
            FieldSpec::Choices(choices) => {
                coerce_choice(slot, choices, default_category, &qualified)?
            }
            FieldSpec::Nested(inner) => {
                validate_record(slot, inner, default_category, &qualified)?
            }
        }
    }
    Ok(())
}

fn qualify(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

fn coerce_choice(
    slot: &mut Value,
    choices: &[String],
    default_category: Option<&str>,
    key: &str,
) -> Result<(), FormatError> {
    if slot.is_array() {
        *slot = match slot.take() {
            Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
            other => other,
        };
    }

    let allowed = slot
        .as_str()
        .is_some_and(|value| choices.iter().any(|choice| choice == value));
    if !allowed && let Some(default) = default_category {
        *slot = Value::String(default.to_string());
    }

    let Value::String(text) = slot else {
        return Err(FormatError::InvalidChoice {
            key: key.to_string(),
            choices: choices.to_vec(),
            value: slot.to_string(),
        });
    };
    if let Some(colon) = text.find(':') {
        text.truncate(colon);
    }
    Ok(())
}

/// Replaces a keyed record with its values, unwrapping a single value.
pub(crate) fn values_only(record: Value) -> Value {
    match record {
        Value::Object(map) => {
            let mut values: Vec<Value> = map.into_iter().map(|(_, value)| value).collect();
            if values.len() == 1 {
                values.swap_remove(0)
            } else {
                Value::Array(values)
            }
        }
        other => other,
    }
}
