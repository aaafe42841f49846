//! Gemini API client struct, request building, and response parsing.

use std::fmt;

use robbot_common::Role;

use crate::http::build_client;
use crate::{BackendError, GenerationRequest};

pub(crate) const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API client. Owns its credential; nothing is configured globally.
pub struct GeminiClient {
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) http: reqwest::Client,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, BackendError> {
        Ok(Self {
            api_key: api_key.into(),
            base_url: GEMINI_API_BASE.to_string(),
            http: build_client()?,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub(crate) fn models_url(&self) -> String {
        format!("{}/models?pageSize=1000", self.base_url)
    }

    /// Accepts both `gemini-pro` and the resource form `models/gemini-pro`.
    pub(crate) fn api_url(&self, model: &str, stream: bool) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        if stream {
            format!(
                "{}/models/{}:streamGenerateContent?alt=sse",
                self.base_url, model
            )
        } else {
            format!("{}/models/{}:generateContent", self.base_url, model)
        }
    }

    /// Build the JSON request body for `generateContent`.
    pub(crate) fn build_request_body(&self, request: &GenerationRequest) -> serde_json::Value {
        let mut contents = Vec::new();

        for msg in &request.contents {
            let role = match msg.role {
                Role::User => "user",
                Role::Assistant => "model",
                Role::System => continue, // handled via systemInstruction
            };
            contents.push(serde_json::json!({
                "role": role,
                "parts": [{ "text": msg.content }]
            }));
        }

        let sampling = &request.sampling;
        let mut generation_config = serde_json::json!({
            "temperature": sampling.temperature,
            "topP": sampling.top_p,
        });
        if let Some(top_k) = sampling.top_k {
            generation_config["topK"] = serde_json::json!(top_k);
        }
        if let Some(max) = sampling.max_output_tokens {
            generation_config["maxOutputTokens"] = serde_json::json!(max);
        }

        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": generation_config,
        });

        if let Some(system) = request.contents.iter().find(|m| m.role == Role::System) {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": system.content }]
            });
        }

        body
    }

    /// Parse a `generateContent` response into its reply text.
    pub(crate) fn parse_response(json: &serde_json::Value) -> Result<String, BackendError> {
        let has_candidates = json["candidates"]
            .as_array()
            .is_some_and(|c| !c.is_empty());
        if !has_candidates {
            if let Some(reason) = json["promptFeedback"]["blockReason"].as_str() {
                return Err(BackendError::ParseError(format!("prompt blocked: {reason}")));
            }
            return Err(BackendError::ParseError("no candidates in response".into()));
        }
        Ok(extract_text(json))
    }

    /// Parse a `models.list` response into model resource names.
    pub(crate) fn parse_model_list(json: &serde_json::Value) -> Vec<String> {
        json["models"]
            .as_array()
            .map(|models| {
                models
                    .iter()
                    .filter_map(|m| m["name"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Concatenate the text parts of the first candidate.
pub(crate) fn extract_text(json: &serde_json::Value) -> String {
    json["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
        .unwrap_or_default()
}

/// Why the first candidate stopped, present on the last streamed event.
pub(crate) fn finish_reason(json: &serde_json::Value) -> Option<&str> {
    json["candidates"][0]["finishReason"].as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use robbot_common::Message;
    use robbot_config::SamplingParams;

    fn client() -> GeminiClient {
        GeminiClient::new("test-key").unwrap()
    }

    fn sampling() -> SamplingParams {
        SamplingParams {
            temperature: 0.7,
            top_p: 0.8,
            top_k: Some(40),
            max_output_tokens: Some(2048),
            presence_penalty: None,
            frequency_penalty: None,
        }
    }

    #[test]
    fn api_url_strips_models_prefix() {
        let c = client();
        assert_eq!(
            c.api_url("models/gemini-pro", false),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
        );
        assert!(c
            .api_url("gemini-2.0-flash", true)
            .ends_with("/models/gemini-2.0-flash:streamGenerateContent?alt=sse"));
    }

    #[test]
    fn base_url_override_drops_trailing_slash() {
        let c = client().with_base_url("http://localhost:9000/v1beta/");
        assert_eq!(c.models_url(), "http://localhost:9000/v1beta/models?pageSize=1000");
    }

    #[test]
    fn request_body_maps_roles_and_sampling() {
        let request = GenerationRequest {
            contents: vec![
                Message::system("be brief"),
                Message::user("hi"),
                Message::assistant("hello"),
                Message::user("how are you?"),
            ],
            sampling: sampling(),
        };
        let body = client().build_request_body(&request);

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["parts"][0]["text"], "how are you?");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(body["generationConfig"]["topK"], 40);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
        assert_eq!(body["generationConfig"]["topP"], 0.8);
    }

    #[test]
    fn request_body_omits_unset_sampling_fields() {
        let mut s = sampling();
        s.top_k = None;
        s.max_output_tokens = None;
        let body = client().build_request_body(&GenerationRequest::single_turn("x", s));
        assert!(body["generationConfig"].get("topK").is_none());
        assert!(body["generationConfig"].get("maxOutputTokens").is_none());
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn parse_response_joins_parts() {
        let json = serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Hello, " }, { "text": "world" }] }
            }]
        });
        assert_eq!(GeminiClient::parse_response(&json).unwrap(), "Hello, world");
    }

    #[test]
    fn parse_response_reports_block_reason() {
        let json = serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let err = GeminiClient::parse_response(&json).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn finish_reason_only_on_final_event() {
        let partial = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "Hel" }] } }]
        });
        assert_eq!(finish_reason(&partial), None);
        let last = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "lo" }] }, "finishReason": "STOP" }]
        });
        assert_eq!(finish_reason(&last), Some("STOP"));
    }

    #[test]
    fn parse_model_list_reads_names() {
        let json = serde_json::json!({
            "models": [{ "name": "models/gemini-pro" }, { "name": "models/gemini-2.0-flash" }]
        });
        assert_eq!(
            GeminiClient::parse_model_list(&json),
            vec!["models/gemini-pro", "models/gemini-2.0-flash"]
        );
        assert!(GeminiClient::parse_model_list(&serde_json::json!({})).is_empty());
    }
}
