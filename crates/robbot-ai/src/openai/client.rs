//! OpenAI API client struct, request building, and response parsing.

use std::fmt;

use robbot_common::Role;

use crate::http::build_client;
use crate::{BackendError, GenerationRequest};

pub(crate) const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI API client.
pub struct OpenAiClient {
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) http: reqwest::Client,
}

impl fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, BackendError> {
        Ok(Self {
            api_key: api_key.into(),
            base_url: OPENAI_API_BASE.to_string(),
            http: build_client()?,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub(crate) fn models_url(&self) -> String {
        format!("{}/models", self.base_url)
    }

    pub(crate) fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Build the JSON request body for the Chat Completions API.
    pub(crate) fn build_request_body(
        &self,
        model: &str,
        request: &GenerationRequest,
        stream: bool,
    ) -> serde_json::Value {
        let messages: Vec<_> = request
            .contents
            .iter()
            .map(|msg| {
                let role = match msg.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                    Role::System => "system",
                };
                serde_json::json!({ "role": role, "content": msg.content })
            })
            .collect();

        let sampling = &request.sampling;
        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
            "temperature": sampling.temperature,
            "top_p": sampling.top_p,
        });
        if let Some(p) = sampling.presence_penalty {
            body["presence_penalty"] = serde_json::json!(p);
        }
        if let Some(p) = sampling.frequency_penalty {
            body["frequency_penalty"] = serde_json::json!(p);
        }
        if let Some(max) = sampling.max_output_tokens {
            body["max_tokens"] = serde_json::json!(max);
        }
        if stream {
            body["stream"] = serde_json::json!(true);
        }

        body
    }

    /// Parse a non-streaming completion into its reply text.
    pub(crate) fn parse_response(json: &serde_json::Value) -> Result<String, BackendError> {
        let choice = json["choices"]
            .as_array()
            .and_then(|choices| choices.first())
            .ok_or_else(|| BackendError::ParseError("no choices in response".into()))?;
        Ok(choice["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    /// Text carried by one streamed `chat.completion.chunk`.
    pub(crate) fn parse_chunk(json: &serde_json::Value) -> Option<&str> {
        json["choices"][0]["delta"]["content"]
            .as_str()
            .filter(|s| !s.is_empty())
    }

    pub(crate) fn parse_model_list(json: &serde_json::Value) -> Vec<String> {
        json["data"]
            .as_array()
            .map(|models| {
                models
                    .iter()
                    .filter_map(|m| m["id"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robbot_common::Message;
    use robbot_config::SamplingParams;

    fn sampling() -> SamplingParams {
        SamplingParams {
            temperature: 1.2,
            top_p: 1.0,
            top_k: None,
            max_output_tokens: None,
            presence_penalty: Some(0.5),
            frequency_penalty: Some(0.0),
        }
    }

    #[test]
    fn request_body_keeps_system_role_inline() {
        let client = OpenAiClient::new("k").unwrap();
        let request = GenerationRequest {
            contents: vec![Message::system("persona"), Message::user("hi")],
            sampling: sampling(),
        };
        let body = client.build_request_body("gpt-4", &request, true);
        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["temperature"], 1.2);
        assert_eq!(body["presence_penalty"], 0.5);
        assert_eq!(body["stream"], true);
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn parse_response_reads_first_choice() {
        let json = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "Hi there" } }]
        });
        assert_eq!(OpenAiClient::parse_response(&json).unwrap(), "Hi there");
        assert!(OpenAiClient::parse_response(&serde_json::json!({ "choices": [] })).is_err());
    }

    #[test]
    fn parse_chunk_skips_role_only_deltas() {
        let role_only = serde_json::json!({ "choices": [{ "delta": { "role": "assistant" } }] });
        assert_eq!(OpenAiClient::parse_chunk(&role_only), None);
        let text = serde_json::json!({ "choices": [{ "delta": { "content": "Hel" } }] });
        assert_eq!(OpenAiClient::parse_chunk(&text), Some("Hel"));
    }

    #[test]
    fn parse_model_list_reads_ids() {
        let json = serde_json::json!({ "data": [{ "id": "gpt-4" }, { "id": "gpt-3.5-turbo" }] });
        assert_eq!(OpenAiClient::parse_model_list(&json), vec!["gpt-4", "gpt-3.5-turbo"]);
    }
}
