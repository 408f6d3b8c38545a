//! Command-line interface for the coursewright binary.

mod commands;
mod execute;

pub use commands::{Cli, Commands};
pub use execute::execute;
