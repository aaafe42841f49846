//! ModelBackend implementation for GeminiClient.

use async_trait::async_trait;
use tracing::debug;

use crate::http::{check_status, network_error};
use crate::streaming::{parse_json_event, parse_sse_stream, SseEvent};
use crate::{BackendError, ChunkFn, GenerationRequest, ModelBackend};

use super::client::{extract_text, finish_reason, GeminiClient};

#[async_trait]
impl ModelBackend for GeminiClient {
    async fn list_models(&self) -> Result<Vec<String>, BackendError> {
        debug!("Gemini models.list request");

        let response = self
            .http
            .get(self.models_url())
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(network_error)?;
        let response = check_status(response).await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BackendError::ParseError(e.to_string()))?;

        Ok(Self::parse_model_list(&json))
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<String, BackendError> {
        let body = self.build_request_body(request);

        debug!(%model, turns = request.contents.len(), "Gemini API request");

        let response = self
            .http
            .post(self.api_url(model, false))
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;
        let response = check_status(response).await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BackendError::ParseError(e.to_string()))?;

        Self::parse_response(&json)
    }

    async fn generate_streaming(
        &self,
        model: &str,
        request: &GenerationRequest,
        on_chunk: &ChunkFn<'_>,
    ) -> Result<String, BackendError> {
        let body = self.build_request_body(request);

        debug!(%model, turns = request.contents.len(), "Gemini API streaming request");

        let response = self
            .http
            .post(self.api_url(model, true))
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;
        let response = check_status(response).await?;

        let mut full_content = String::new();
        let mut finished = false;

        parse_sse_stream(response, |event: SseEvent| {
            let data = parse_json_event(&event.data)?;
            let chunk = extract_text(&data);
            if !chunk.is_empty() {
                full_content.push_str(&chunk);
                on_chunk(&chunk);
            }
            if let Some(reason) = finish_reason(&data) {
                debug!(%reason, "Gemini stream finished");
                finished = true;
            }
            Ok(())
        })
        .await?;

        if !finished {
            return Err(BackendError::ApiError(
                "stream ended without a finish reason".into(),
            ));
        }
        Ok(full_content)
    }
}
