//! Image search terms for course cover art.

use coursewright_coerce::{GenerationRequest, OutputSpec, StrictOutput};
use coursewright_error::{CoerceError, CoerceErrorKind, CoursewrightResult};
use coursewright_interface::CoursewrightDriver;
use serde::Deserialize;
use tracing::instrument;

#[derive(Deserialize)]
struct ImageSearchTerm {
    image_search_term: String,
}

/// Generates a search term for finding a cover image for a course titled `title`.
#[instrument(skip(coercer))]
pub async fn generate_image_search_term<D: CoursewrightDriver>(
    coercer: &StrictOutput<D>,
    title: &str,
) -> CoursewrightResult<String> {
    let request = GenerationRequest::builder()
        .system_prompt("You are an AI capable of finding the most relevant image for a course")
        .user_prompt(format!(
            "Provide a good image search term for a course titled \"{}\". \
This search term will be used in the Unsplash API to find relevant images.",
            title
        ))
        .output_spec(OutputSpec::new().describe(
            "image_search_term",
            "a good search term for the title of the course",
        ))
        .build()
        .map_err(|e| CoerceError::new(CoerceErrorKind::InvalidRequest(e.to_string())))?;

    let term: ImageSearchTerm = coercer.generate_as(&request).await?;
    Ok(term.image_search_term)
}
