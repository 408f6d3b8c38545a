//! Core data types for the Coursewright library.
//!
//! This crate provides the backend-neutral request and response types that
//! flow between the structured output coercer and generation drivers.

mod message;
mod output;
mod request;
mod role;
mod token_usage;

pub use message::{Message, MessageBuilder};
pub use output::Output;
pub use request::{
    GenerateRequest, GenerateRequestBuilder, GenerateResponse, GenerateResponseBuilder,
};
pub use role::Role;
pub use token_usage::{TokenUsage, TokenUsageBuilder};
