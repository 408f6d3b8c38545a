//! Generation backend integrations for Coursewright.
//!
//! Currently one backend family is provided: any API speaking the OpenAI
//! chat completions format (OpenAI itself, Groq, local llama.cpp or vLLM
//! servers).

pub mod openai_compat;

pub use openai_compat::{ClientConfig, ClientConfigBuilder, OpenAICompatibleClient};
