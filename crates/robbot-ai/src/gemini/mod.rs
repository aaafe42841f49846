//! Google Gemini API client.
//!
//! Implements [`ModelBackend`](crate::ModelBackend) for Gemini models via
//! the Generative Language REST API.

mod api;
mod client;

pub use client::GeminiClient;
