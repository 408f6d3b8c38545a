//! CLI command definitions.

use clap::{Parser, Subcommand};
use coursewright_curriculum::DEFAULT_QUIZ_QUESTIONS;
use std::path::PathBuf;

/// Generate course material and structured JSON with a language model.
#[derive(Parser, Debug)]
#[command(name = "coursewright", version, about)]
pub struct Cli {
    /// Configuration file layered over the user configuration
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Model to use, overriding configuration
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Attempts per structured generation, overriding configuration
    #[arg(long, global = true)]
    pub max_tries: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Generate units of chapters with video search queries
    Outline {
        /// Course title
        #[arg(long)]
        title: String,

        /// Unit name; repeat for each unit
        #[arg(long = "unit", required = true)]
        units: Vec<String>,
    },

    /// Suggest an image search term for a course
    ImageTerm {
        /// Course title
        #[arg(long)]
        title: String,
    },

    /// Summarize a video transcript
    Summarize {
        /// File holding the transcript text
        #[arg(long)]
        transcript: PathBuf,
    },

    /// Write multiple-choice questions from a transcript
    Quiz {
        /// Course title
        #[arg(long)]
        title: String,

        /// File holding the transcript text
        #[arg(long)]
        transcript: PathBuf,

        /// Number of questions
        #[arg(long, default_value_t = DEFAULT_QUIZ_QUESTIONS)]
        count: usize,
    },

    /// Run an arbitrary structured generation
    Coerce {
        /// System prompt
        #[arg(long)]
        system: String,

        /// User prompt; repeat to generate one record per prompt
        #[arg(long = "prompt", required = true)]
        prompts: Vec<String>,

        /// JSON file describing the output shape
        #[arg(long)]
        spec: PathBuf,

        /// Replacement for values outside an enumerated field's choices
        #[arg(long)]
        default_category: Option<String>,

        /// Print bare values instead of keyed objects
        #[arg(long)]
        values_only: bool,

        /// Fail instead of printing an empty result when no attempt validates
        #[arg(long)]
        strict: bool,

        /// Log prompts and responses at info level
        #[arg(long)]
        verbose: bool,
    },
}
