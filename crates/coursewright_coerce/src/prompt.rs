//! Prompt assembly for structured output.

use crate::{GenerationRequest, OutputSpec, UserPrompt};

/// Shape properties of a request that change the instructions sent to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShapeFlags {
    /// The user prompt holds several inputs answered positionally.
    pub list_input: bool,
    /// The spec asks the backend to generate keys or fill placeholders.
    pub dynamic_elements: bool,
    /// The spec contains an enumerated field.
    pub list_output: bool,
}

impl ShapeFlags {
    /// Derives the flags for a prompt and spec.
    pub fn detect(prompt: &UserPrompt, spec: &OutputSpec) -> Self {
        Self {
            list_input: prompt.is_list(),
            dynamic_elements: spec.has_placeholders(),
            list_output: spec.has_choices(),
        }
    }
}

const NO_QUOTES: &str =
    "\nDo not put quotation marks or escape character \\ in the output fields.";

const CLASSIFY: &str =
    "\nIf output field is a list, classify output into the best element of the list.";

const PLACEHOLDERS: &str = "\nAny text enclosed by < and > indicates you must generate content to replace it. \
Example input: Go to <location>, Example output: Go to the garden\n\
Any output key containing < and > indicates you must generate the key name to replace it. \
Example input: {'<location>': 'description of location'}, \
Example output: {school: a place for education}";

const ONE_PER_INPUT: &str = "\nGenerate an array of json, one json for each input element.";

/// Builds the format instructions appended to the caller's system prompt.
///
/// # Examples
///
/// ```
/// use coursewright_coerce::{format_instructions, OutputSpec, ShapeFlags};
///
/// let spec = OutputSpec::new().describe("summary", "summary of the text");
/// let text = format_instructions(&spec, ShapeFlags::default());
///
/// assert!(text.starts_with("\nYou are to output the following in json format: "));
/// assert!(text.contains(r#"{"summary":"summary of the text"}"#));
/// ```
pub fn format_instructions(spec: &OutputSpec, flags: ShapeFlags) -> String {
    let shape = if flags.list_output {
        "an array of objects in"
    } else {
        "the following in"
    };

    let mut text = format!("\nYou are to output {} json format: {}.", shape, spec);
    text.push_str(NO_QUOTES);
    if flags.list_output {
        text.push_str(CLASSIFY);
    }
    if flags.dynamic_elements {
        text.push_str(PLACEHOLDERS);
    }
    if flags.list_input {
        text.push_str(ONE_PER_INPUT);
    }
    text
}

/// The full system message for one attempt.
pub fn system_message(request: &GenerationRequest, flags: ShapeFlags, feedback: &str) -> String {
    format!(
        "{}{}{}",
        request.system_prompt(),
        format_instructions(request.output_spec(), flags),
        feedback
    )
}

/// Feedback appended to the next attempt's system message after a failure.
pub fn feedback(response: &str, error: &str) -> String {
    format!("\n\nResult: {}\n\nError message: {}", response, error)
}
