//! The validated output of a generation.

use coursewright_error::{CoerceError, CoerceErrorKind};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Validated output.
///
/// A single prompt yields a [`Record`](Generated::Record); a list of prompts
/// yields [`Records`](Generated::Records) aligned with the prompts. An empty
/// `Records` means every attempt failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Generated {
    /// One record for a single prompt.
    Record(Value),
    /// One record per prompt, in prompt order.
    Records(Vec<Value>),
}

impl Generated {
    /// The result of an exhausted attempt budget.
    pub fn empty() -> Self {
        Generated::Records(Vec::new())
    }

    /// Whether no records were produced.
    pub fn is_empty(&self) -> bool {
        match self {
            Generated::Record(_) => false,
            Generated::Records(records) => records.is_empty(),
        }
    }

    /// The records as a sequence; a single record becomes a one-element vector.
    pub fn into_records(self) -> Vec<Value> {
        match self {
            Generated::Record(record) => vec![record],
            Generated::Records(records) => records,
        }
    }

    /// The output as one JSON value.
    pub fn into_value(self) -> Value {
        match self {
            Generated::Record(record) => record,
            Generated::Records(records) => Value::Array(records),
        }
    }

    /// Deserializes the output into a caller type.
    ///
    /// `Record` maps onto `T` directly, `Records` onto a sequence type.
    ///
    /// # Examples
    ///
    /// ```
    /// use coursewright_coerce::Generated;
    /// use serde_json::json;
    ///
    /// #[derive(serde::Deserialize)]
    /// struct Term {
    ///     image_search_term: String,
    /// }
    ///
    /// let term: Term = Generated::Record(json!({"image_search_term": "rust crab"}))
    ///     .deserialize()
    ///     .unwrap();
    /// assert_eq!(term.image_search_term, "rust crab");
    ///
    /// assert!(Generated::empty().deserialize::<Vec<Term>>().is_err());
    /// ```
    #[track_caller]
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T, CoerceError> {
        if self.is_empty() {
            return Err(CoerceError::new(CoerceErrorKind::Deserialize(
                "no records were generated".to_string(),
            )));
        }
        serde_json::from_value(self.into_value())
            .map_err(|e| CoerceError::new(CoerceErrorKind::Deserialize(e.to_string())))
    }
}
