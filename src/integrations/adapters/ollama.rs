use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::Instrument;

use crate::{
    config::{OllamaConfig, TimeoutConfig},
    integrations::{
        InferenceService,
        error::{IntegrationResult, ServiceId},
        http_common,
        types::SummaryRequest,
    },
};

const SERVICE: ServiceId = ServiceId::Ollama;

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig, timeouts: &TimeoutConfig) -> Self {
        Self {
            client: http_common::build_client(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            timeout: timeouts.inference_timeout(),
        }
    }
}

#[async_trait]
impl InferenceService for OllamaClient {
    async fn summarize(&self, request: &SummaryRequest) -> IntegrationResult<String> {
        let dispatch_span = tracing::debug_span!(
            target: "integrations.ollama",
            "ollama_generate",
            model = %self.model,
            prompt_chars = request.prompt.chars().count(),
            timeout_ms = self.timeout.as_millis() as u64
        );

        let body = json!({
            "model": self.model,
            "prompt": request.prompt,
            "stream": false,
        });
        let builder = self
            .client
            .post(http_common::join_url(&self.base_url, "/api/generate"))
            .json(&body);

        let generated: GenerateResponse = http_common::call_json(SERVICE, builder, self.timeout)
            .instrument(dispatch_span)
            .await?;
        Ok(generated.response.unwrap_or_default())
    }
}
