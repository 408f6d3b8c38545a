//! Course-curation generators built on the structured output coercer.
//!
//! Each generator shapes one [`GenerationRequest`](coursewright_coerce::GenerationRequest)
//! and runs it through [`StrictOutput::generate_as`](coursewright_coerce::StrictOutput::generate_as),
//! so output that does not fit the typed result is retried like any other
//! malformed reply.

mod image;
mod outline;
mod quiz;
mod summary;

pub use image::generate_image_search_term;
pub use outline::{ChapterOutline, UnitOutline, generate_course_outline};
pub use quiz::{DEFAULT_QUIZ_QUESTIONS, QuizQuestion, generate_quiz};
pub use summary::{SUMMARY_WORD_LIMIT, summarize_transcript, truncate_words};
