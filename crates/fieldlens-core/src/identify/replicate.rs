//! Replicate vision provider using the synchronous predictions API.
//!
//! Uses `Prefer: wait` so the call blocks until the prediction resolves,
//! keeping the one-call-per-identification contract. Output arrives as a
//! string or a chunked string array depending on the model.

use super::classify;
use super::provider::{VisionProvider, VisionRequest, VisionResponse};
use crate::error::IdentifyError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Replicate provider using the predictions API.
pub struct ReplicateProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl ReplicateProvider {
    pub fn new(api_key: &str, model: &str, timeout: Duration) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
            endpoint: format!("https://api.replicate.com/v1/models/{model}/predictions"),
            timeout,
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct PredictionRequest {
    input: PredictionInput,
}

#[derive(Serialize)]
struct PredictionInput {
    image: String,
    prompt: String,
    max_tokens: u32,
    temperature: f32,
}

// --- Response types ---

#[derive(Deserialize)]
struct PredictionResponse {
    status: String,
    output: Option<PredictionOutput>,
    error: Option<String>,
}

/// Model output: either one string or a list of text chunks to concatenate.
#[derive(Deserialize)]
#[serde(untagged)]
enum PredictionOutput {
    Text(String),
    Chunks(Vec<String>),
}

impl PredictionOutput {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Chunks(chunks) => chunks.join(""),
        }
    }
}

#[async_trait]
impl VisionProvider for ReplicateProvider {
    fn name(&self) -> &str {
        "replicate"
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn generate(&self, request: &VisionRequest) -> Result<VisionResponse, IdentifyError> {
        let start = Instant::now();
        let timeout_ms = self.timeout.as_millis() as u64;

        let body = PredictionRequest {
            input: PredictionInput {
                image: request.image.data_url(),
                prompt: request.prompt.clone(),
                max_tokens: request.max_tokens,
                temperature: request.temperature,
            },
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Prefer", "wait")
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| classify::classify_transport(&e, timeout_ms))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(classify::classify_http(status.as_u16(), &text, timeout_ms));
        }

        let prediction: PredictionResponse =
            resp.json().await.map_err(|e| IdentifyError::ParseFailure {
                message: format!("Failed to decode Replicate response envelope: {e}"),
            })?;

        if prediction.status != "succeeded" {
            let detail = prediction
                .error
                .unwrap_or_else(|| format!("prediction status '{}'", prediction.status));
            return Err(classify::classify_provider_message(&detail));
        }

        let text = prediction
            .output
            .map(PredictionOutput::into_text)
            .unwrap_or_default()
            .trim()
            .to_string();
        if text.is_empty() {
            return Err(IdentifyError::ParseFailure {
                message: "Replicate prediction succeeded with empty output".to_string(),
            });
        }

        Ok(VisionResponse {
            text,
            model: self.model.clone(),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}
