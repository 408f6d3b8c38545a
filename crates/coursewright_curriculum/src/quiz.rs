//! Multiple-choice quizzes.

use coursewright_coerce::{GenerationRequest, OutputSpec, StrictOutput};
use coursewright_error::{CoerceError, CoerceErrorKind, CoursewrightResult};
use coursewright_interface::CoursewrightDriver;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Number of questions generated when the caller does not choose.
pub const DEFAULT_QUIZ_QUESTIONS: usize = 5;

const SYSTEM_PROMPT: &str = "You are a helpful AI that is able to generate mcq questions and answers, \
the length of each answer should not be more than 15 words";

/// A multiple-choice question with one correct answer and three distractors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct QuizQuestion {
    question: String,
    answer: String,
    option1: String,
    option2: String,
    option3: String,
}

impl QuizQuestion {
    /// All choices, correct answer first.
    pub fn options(&self) -> [&str; 4] {
        [
            self.answer.as_str(),
            self.option1.as_str(),
            self.option2.as_str(),
            self.option3.as_str(),
        ]
    }
}

fn quiz_spec() -> OutputSpec {
    OutputSpec::new()
        .describe("question", "question")
        .describe("answer", "answer with max length of 15 words")
        .describe("option1", "option1 with max length of 15 words")
        .describe("option2", "option2 with max length of 15 words")
        .describe("option3", "option3 with max length of 15 words")
}

/// Generates `count` hard questions about `course_title` grounded in `transcript`.
#[instrument(skip(coercer, transcript), fields(transcript_len = transcript.len()))]
pub async fn generate_quiz<D: CoursewrightDriver>(
    coercer: &StrictOutput<D>,
    course_title: &str,
    transcript: &str,
    count: usize,
) -> CoursewrightResult<Vec<QuizQuestion>> {
    let prompt = format!(
        "You are to generate a random hard mcq question about {} with context of the following transcript: {}",
        course_title, transcript
    );

    let request = GenerationRequest::builder()
        .system_prompt(SYSTEM_PROMPT)
        .user_prompt(vec![prompt; count])
        .output_spec(quiz_spec())
        .build()
        .map_err(|e| CoerceError::new(CoerceErrorKind::InvalidRequest(e.to_string())))?;

    coercer.generate_as(&request).await
}
