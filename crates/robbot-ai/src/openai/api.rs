//! ModelBackend implementation for OpenAiClient.

use async_trait::async_trait;
use tracing::debug;

use crate::http::{check_status, network_error};
use crate::streaming::{parse_json_event, parse_sse_stream, SseEvent};
use crate::{BackendError, ChunkFn, GenerationRequest, ModelBackend};

use super::client::OpenAiClient;

#[async_trait]
impl ModelBackend for OpenAiClient {
    async fn list_models(&self) -> Result<Vec<String>, BackendError> {
        debug!("OpenAI models request");

        let response = self
            .http
            .get(self.models_url())
            .bearer_auth(&self.api_key)
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
        let body = self.build_request_body(model, request, false);

        debug!(%model, turns = request.contents.len(), "OpenAI API request");

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
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
        let body = self.build_request_body(model, request, true);

        debug!(%model, turns = request.contents.len(), "OpenAI API streaming request");

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;
        let response = check_status(response).await?;

        let mut full_content = String::new();
        let mut done = false;

        parse_sse_stream(response, |event: SseEvent| {
            if event.data == "[DONE]" {
                done = true;
                return Ok(());
            }
            let data = parse_json_event(&event.data)?;
            if let Some(chunk) = Self::parse_chunk(&data) {
                full_content.push_str(chunk);
                on_chunk(chunk);
            }
            Ok(())
        })
        .await?;

        if !done {
            return Err(BackendError::ApiError("stream ended before [DONE]".into()));
        }
        Ok(full_content)
    }
}
