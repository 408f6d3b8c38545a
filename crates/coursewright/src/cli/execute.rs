//! Command execution against a coercer.

use crate::cli::Commands;
use anyhow::{Context, bail};
use coursewright_coerce::{GenerationRequest, OutputSpec, StrictOutput, UserPrompt};
use coursewright_curriculum::{
    generate_course_outline, generate_image_search_term, generate_quiz, summarize_transcript,
};
use coursewright_interface::CoursewrightDriver;
use serde_json::{Value, json};
use std::path::Path;
use tracing::{info, instrument};

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Runs `command` and returns its JSON result.
#[instrument(skip_all, fields(provider = coercer.driver().provider_name()))]
pub async fn execute<D: CoursewrightDriver>(
    command: &Commands,
    coercer: &StrictOutput<D>,
) -> anyhow::Result<Value> {
    match command {
        Commands::Outline { title, units } => {
            info!(title = %title, units = units.len(), "Generating course outline");
            let outline = generate_course_outline(coercer, title, units).await?;
            Ok(serde_json::to_value(outline)?)
        }
        Commands::ImageTerm { title } => {
            let term = generate_image_search_term(coercer, title).await?;
            Ok(json!({ "image_search_term": term }))
        }
        Commands::Summarize { transcript } => {
            let text = read_file(transcript)?;
            let summary = summarize_transcript(coercer, &text).await?;
            Ok(json!({ "summary": summary }))
        }
        Commands::Quiz {
            title,
            transcript,
            count,
        } => {
            let text = read_file(transcript)?;
            let quiz = generate_quiz(coercer, title, &text, *count).await?;
            Ok(serde_json::to_value(quiz)?)
        }
        Commands::Coerce {
            system,
            prompts,
            spec,
            default_category,
            values_only,
            strict,
            verbose,
        } => {
            let output_spec: OutputSpec = read_file(spec)?
                .parse()
                .with_context(|| format!("Invalid output spec in {}", spec.display()))?;

            let user_prompt = match prompts.as_slice() {
                [] => bail!("at least one --prompt is required"),
                [single] => UserPrompt::Single(single.clone()),
                many => UserPrompt::Many(many.to_vec()),
            };

            let request = GenerationRequest::builder()
                .system_prompt(system.as_str())
                .user_prompt(user_prompt)
                .output_spec(output_spec)
                .default_category(default_category.clone())
                .values_only(*values_only)
                .verbose(*verbose)
                .build()?;

            let generated = if *strict {
                coercer.generate_strict(&request).await?
            } else {
                coercer.generate(&request).await?
            };
            Ok(serde_json::to_value(generated)?)
        }
    }
}
