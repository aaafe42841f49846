//! OpenAI Chat Completions client.

mod api;
mod client;

pub use client::OpenAiClient;
