//! Generic OpenAI-compatible API client.
//!
//! This module provides a reusable client for any API that follows the OpenAI
//! chat completions format.

mod client;
mod config;
mod conversions;
mod dto;

pub use client::OpenAICompatibleClient;
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use conversions::{from_chat_response, to_chat_request};
pub use dto::{ChatChoice, ChatMessage, ChatRequest, ChatResponse, ChatUsage};
