//! Transcript summaries.

use coursewright_coerce::{GenerationRequest, OutputSpec, StrictOutput};
use coursewright_error::{CoerceError, CoerceErrorKind, CoursewrightResult};
use coursewright_interface::CoursewrightDriver;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Transcripts are cut to this many words before summarizing.
pub const SUMMARY_WORD_LIMIT: usize = 250;

#[derive(Deserialize)]
struct Summary {
    summary: String,
}

/// Keeps the first `limit` whitespace-separated words of `text`, joined by single spaces.
///
/// # Examples
///
/// ```
/// use coursewright_curriculum::truncate_words;
///
/// assert_eq!(truncate_words("one  two\nthree four", 3), "one two three");
/// assert_eq!(truncate_words("short", 10), "short");
/// ```
pub fn truncate_words(text: &str, limit: usize) -> String {
    text.split_whitespace()
        .take(limit)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Summarizes the first [`SUMMARY_WORD_LIMIT`] words of a video transcript.
#[instrument(skip(coercer, transcript), fields(transcript_len = transcript.len()))]
pub async fn summarize_transcript<D: CoursewrightDriver>(
    coercer: &StrictOutput<D>,
    transcript: &str,
) -> CoursewrightResult<String> {
    let excerpt = truncate_words(transcript, SUMMARY_WORD_LIMIT);
    if excerpt.is_empty() {
        return Err(CoerceError::new(CoerceErrorKind::InvalidRequest(
            "transcript is empty".to_string(),
        ))
        .into());
    }
    debug!(words = excerpt.split(' ').count(), "Summarizing transcript excerpt");

    let request = GenerationRequest::builder()
        .system_prompt("You are an AI capable of summarising a youtube transcript")
        .user_prompt(format!(
            "summarise in {} words or less and do not talk of the sponsors or anything \
unrelated to the main topic, also do not introduce what the summary is about.\n{}",
            SUMMARY_WORD_LIMIT, excerpt
        ))
        .output_spec(OutputSpec::new().describe("summary", "summary of the transcript"))
        .build()
        .map_err(|e| CoerceError::new(CoerceErrorKind::InvalidRequest(e.to_string())))?;

    let summary: Summary = coercer.generate_as(&request).await?;
    Ok(summary.summary)
}
