//! Course outlines: one unit of chapters per requested unit.

use coursewright_coerce::{GenerationRequest, OutputSpec, StrictOutput};
use coursewright_error::{CoerceError, CoerceErrorKind, CoursewrightResult};
use coursewright_interface::CoursewrightDriver;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const SYSTEM_PROMPT: &str = "You are an AI capable of curating course content. \
Your task is to create a separate chapter for each unit provided. For each chapter, \
generate a relevant title and a detailed YouTube search query to find an educational video. \
Ensure that each chapter is distinct and directly related to its corresponding unit and the overall course title.";

/// A chapter within a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ChapterOutline {
    /// Chapter heading
    chapter_title: String,
    /// Query used to find an educational video for the chapter
    youtube_search_query: String,
}

/// A generated unit and its chapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct UnitOutline {
    /// Unit heading
    title: String,
    /// Chapters in teaching order
    chapters: Vec<ChapterOutline>,
}

fn outline_spec() -> OutputSpec {
    OutputSpec::new()
        .describe("title", "title of the unit")
        .describe(
            "chapters",
            "an array of chapters, each chapter should have a youtube_search_query and a chapter_title key in the JSON object",
        )
}

fn unit_prompt(title: &str, unit: &str) -> String {
    format!(
        "Create a chapter for the unit: {} in the context of the course titled \"{}\". \
The chapter title should be the unit name itself. Provide a chapter title and a YouTube \
search query for an educational video related to this chapter. Add 3 chapters each",
        unit, title
    )
}

/// Generates an outline with one [`UnitOutline`] per entry of `units`, in order.
///
/// # Errors
///
/// Fails with `InvalidRequest` when `units` is empty and `Exhausted` when no
/// attempt produced an outline with well-formed chapters.
#[instrument(skip(coercer, units), fields(units = units.len()))]
pub async fn generate_course_outline<D: CoursewrightDriver>(
    coercer: &StrictOutput<D>,
    title: &str,
    units: &[String],
) -> CoursewrightResult<Vec<UnitOutline>> {
    if units.is_empty() {
        return Err(CoerceError::new(CoerceErrorKind::InvalidRequest(
            "a course outline needs at least one unit".to_string(),
        ))
        .into());
    }

    let request = GenerationRequest::builder()
        .system_prompt(SYSTEM_PROMPT)
        .user_prompt(
            units
                .iter()
                .map(|unit| unit_prompt(title, unit))
                .collect::<Vec<_>>(),
        )
        .output_spec(outline_spec())
        .build()
        .map_err(|e| CoerceError::new(CoerceErrorKind::InvalidRequest(e.to_string())))?;

    let outline: Vec<UnitOutline> = coercer.generate_as(&request).await?;
    debug!(
        chapters = outline.iter().map(|u| u.chapters.len()).sum::<usize>(),
        "Generated course outline"
    );
    Ok(outline)
}
