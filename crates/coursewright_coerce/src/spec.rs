//! Declarative description of the JSON shape a generation must produce.

use coursewright_error::{CoerceError, CoerceErrorKind};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::str::FromStr;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<.*?>").expect("placeholder pattern is valid"));

/// Returns true if `text` contains an angle-bracket placeholder such as `<location>`.
pub fn contains_placeholder(text: &str) -> bool {
    PLACEHOLDER.is_match(text)
}

/// The key of an output field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SpecKey {
    /// The field must appear under exactly this name.
    Literal(String),
    /// The backend invents the key; the template (e.g. `<location>`) describes it.
    Generated(String),
}

impl SpecKey {
    /// Classifies a raw key: anything containing a placeholder is generated.
    ///
    /// # Examples
    ///
    /// ```
    /// use coursewright_coerce::SpecKey;
    ///
    /// assert_eq!(SpecKey::parse("title"), SpecKey::Literal("title".to_string()));
    /// assert!(SpecKey::parse("<location>").is_generated());
    /// ```
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if contains_placeholder(&raw) {
            SpecKey::Generated(raw)
        } else {
            SpecKey::Literal(raw)
        }
    }

    /// The key text as shown to the backend.
    pub fn as_str(&self) -> &str {
        match self {
            SpecKey::Literal(name) | SpecKey::Generated(name) => name,
        }
    }

    /// Whether the backend generates this key.
    pub fn is_generated(&self) -> bool {
        matches!(self, SpecKey::Generated(_))
    }
}

/// What a single output field must contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpec {
    /// Free text, described for the backend.
    Description(String),
    /// A closed set of allowed values.
    Choices(Vec<String>),
    /// A nested object with its own fields.
    Nested(OutputSpec),
}

impl FieldSpec {
    fn has_placeholders(&self) -> bool {
        match self {
            FieldSpec::Description(text) => contains_placeholder(text),
            FieldSpec::Choices(choices) => choices.iter().any(|c| contains_placeholder(c)),
            FieldSpec::Nested(spec) => spec.has_placeholders(),
        }
    }

    fn has_choices(&self) -> bool {
        match self {
            FieldSpec::Description(_) => false,
            FieldSpec::Choices(_) => true,
            FieldSpec::Nested(spec) => spec.has_choices(),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            FieldSpec::Description(text) => Value::String(text.clone()),
            FieldSpec::Choices(choices) => {
                Value::Array(choices.iter().cloned().map(Value::String).collect())
            }
            FieldSpec::Nested(spec) => spec.to_value(),
        }
    }

    fn from_value(key: &str, value: &Value) -> Result<Self, CoerceError> {
        match value {
            Value::String(text) => Ok(FieldSpec::Description(text.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(choice) => Ok(choice.clone()),
                    other => Err(CoerceError::new(CoerceErrorKind::InvalidSpec(format!(
                        "choice for '{}' must be a string, got {}",
                        key, other
                    )))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(FieldSpec::Choices),
            Value::Object(_) => OutputSpec::try_from(value).map(FieldSpec::Nested),
            other => Err(CoerceError::new(CoerceErrorKind::InvalidSpec(format!(
                "field '{}' must be a description, a list of choices or an object, got {}",
                key, other
            )))),
        }
    }
}

/// An ordered set of output fields.
///
/// Field order is preserved in the prompt and in validation.
///
/// # Examples
///
/// ```
/// use coursewright_coerce::OutputSpec;
///
/// let spec = OutputSpec::new()
///     .describe("question", "question")
///     .choices("difficulty", ["easy", "hard"]);
///
/// assert_eq!(
///     spec.to_string(),
///     r#"{"question":"question","difficulty":["easy","hard"]}"#
/// );
/// assert!(spec.has_choices());
/// assert!(!spec.has_placeholders());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSpec {
    fields: Vec<(SpecKey, FieldSpec)>,
}

impl OutputSpec {
    /// Creates an empty spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, classifying the key with [`SpecKey::parse`].
    ///
    /// A later field with the same key replaces the earlier one in place.
    pub fn field(self, key: impl Into<String>, spec: FieldSpec) -> Self {
        self.with_key(SpecKey::parse(key), spec)
    }

    /// Adds a field with an explicit key kind.
    pub fn with_key(mut self, key: SpecKey, spec: FieldSpec) -> Self {
        match self.fields.iter_mut().find(|(k, _)| k.as_str() == key.as_str()) {
            Some(slot) => *slot = (key, spec),
            None => self.fields.push((key, spec)),
        }
        self
    }

    /// Adds a free-text field.
    pub fn describe(self, key: impl Into<String>, description: impl Into<String>) -> Self {
        self.field(key, FieldSpec::Description(description.into()))
    }

    /// Adds an enumerated field.
    pub fn choices<I, S>(self, key: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field(
            key,
            FieldSpec::Choices(choices.into_iter().map(Into::into).collect()),
        )
    }

    /// Adds a nested object field.
    pub fn nested(self, key: impl Into<String>, spec: OutputSpec) -> Self {
        self.field(key, FieldSpec::Nested(spec))
    }

    /// Adds a field whose key the backend generates from `template`.
    pub fn generated(self, template: impl Into<String>, spec: FieldSpec) -> Self {
        self.with_key(SpecKey::Generated(template.into()), spec)
    }

    /// Iterates fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&SpecKey, &FieldSpec)> {
        self.fields.iter().map(|(k, v)| (k, v))
    }

    /// Looks up a field by key text.
    pub fn get(&self, key: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v)
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the spec declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether any key or value, at any depth, asks the backend to generate content.
    pub fn has_placeholders(&self) -> bool {
        self.fields
            .iter()
            .any(|(key, spec)| key.is_generated() || spec.has_placeholders())
    }

    /// Whether any field, at any depth, is enumerated.
    pub fn has_choices(&self) -> bool {
        self.fields.iter().any(|(_, spec)| spec.has_choices())
    }

    /// Renders the spec as the JSON object the backend is shown.
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(key, spec)| (key.as_str().to_string(), spec.to_value()))
            .collect();
        Value::Object(map)
    }
}

impl std::fmt::Display for OutputSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

impl TryFrom<&Value> for OutputSpec {
    type Error = CoerceError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let object = value.as_object().ok_or_else(|| {
            CoerceError::new(CoerceErrorKind::InvalidSpec(format!(
                "output spec must be a JSON object, got {}",
                value
            )))
        })?;

        object
            .iter()
            .try_fold(
                OutputSpec::new(),
                |spec, (key, field)| -> Result<OutputSpec, CoerceError> {
                    Ok(spec.field(key.clone(), FieldSpec::from_value(key, field)?))
                },
            )
    }
}

impl FromStr for OutputSpec {
    type Err = CoerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(s).map_err(|e| {
            CoerceError::new(CoerceErrorKind::InvalidSpec(format!(
                "output spec is not valid JSON: {}",
                e
            )))
        })?;
        OutputSpec::try_from(&value)
    }
}

impl Serialize for OutputSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OutputSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        OutputSpec::try_from(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_detection_matches_any_bracketed_token() {
        assert!(contains_placeholder("Go to <location>"));
        assert!(contains_placeholder("<>"));
        assert!(!contains_placeholder("a < b\nand c > d"));
        assert!(!contains_placeholder("plain"));
    }

    #[test]
    fn keys_with_placeholders_are_generated() {
        let spec = OutputSpec::new()
            .describe("<location>", "description of location")
            .describe("name", "name");
        let keys: Vec<_> = spec.fields().map(|(k, _)| k.clone()).collect();
        assert_eq!(
            keys,
            vec![
                SpecKey::Generated("<location>".to_string()),
                SpecKey::Literal("name".to_string())
            ]
        );
        assert!(spec.has_placeholders());
    }

    #[test]
    fn placeholder_inside_description_counts() {
        let spec = OutputSpec::new().describe("directions", "Go to <location>");
        assert!(spec.has_placeholders());
    }

    #[test]
    fn nested_choices_are_detected() {
        let inner = OutputSpec::new().choices("level", ["beginner", "expert"]);
        let spec = OutputSpec::new().nested("meta", inner);
        assert!(spec.has_choices());
    }

    #[test]
    fn duplicate_key_replaces_in_place() {
        let spec = OutputSpec::new()
            .describe("a", "first")
            .describe("b", "second")
            .describe("a", "third");
        assert_eq!(spec.len(), 2);
        assert_eq!(spec.to_string(), r#"{"a":"third","b":"second"}"#);
    }

    #[test]
    fn parses_json_preserving_order() {
        let text = r#"{"zeta": "last letter", "alpha": ["x", "y"], "<key>": {"inner": "text"}}"#;
        let spec: OutputSpec = text.parse().unwrap();

        let keys: Vec<&str> = spec.fields().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "<key>"]);
        assert_eq!(
            spec.get("alpha"),
            Some(&FieldSpec::Choices(vec!["x".to_string(), "y".to_string()]))
        );
        assert!(matches!(spec.get("<key>"), Some(FieldSpec::Nested(_))));
        assert_eq!(
            spec.to_string(),
            r#"{"zeta":"last letter","alpha":["x","y"],"<key>":{"inner":"text"}}"#
        );
    }

    #[test]
    fn rejects_non_string_fields() {
        let err = "{\"count\": 3}".parse::<OutputSpec>().unwrap_err();
        assert!(matches!(err.kind, CoerceErrorKind::InvalidSpec(_)));

        let err = "{\"pick\": [1, 2]}".parse::<OutputSpec>().unwrap_err();
        assert!(matches!(err.kind, CoerceErrorKind::InvalidSpec(_)));

        let err = "[\"not\", \"an\", \"object\"]".parse::<OutputSpec>().unwrap_err();
        assert!(matches!(err.kind, CoerceErrorKind::InvalidSpec(_)));
    }

    #[test]
    fn serde_round_trip_through_value() {
        let spec = OutputSpec::new()
            .describe("title", "title of the unit")
            .choices("kind", ["lecture", "lab"]);
        let json = serde_json::to_string(&spec).unwrap();
        let back: OutputSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }
}
