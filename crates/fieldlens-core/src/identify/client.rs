//! The identification client: one call in, one classified result out.
//!
//! Ties the pipeline together: validates the request, builds the prompt,
//! issues exactly one provider call under a wall-clock deadline, and hands
//! the raw output to the normalizer. No retries and no caching — a failed
//! call surfaces as a classified error and the caller decides what to do.

use super::normalize;
use super::provider::{
    IdentificationRequest, ProviderFactory, VisionProvider, VisionRequest,
};
use crate::config::Config;
use crate::error::IdentifyError;
use crate::types::IdentificationResult;
use std::time::Duration;

/// Generation knobs for the identification call.
#[derive(Debug, Clone)]
pub struct IdentifyOptions {
    /// Wall-clock deadline for the provider call in milliseconds
    pub timeout_ms: u64,
    /// Maximum alternative matches to keep (capped at 3)
    pub max_alternatives: usize,
    /// Maximum tokens the model may generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for IdentifyOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_alternatives: 3,
            max_tokens: 1024,
            temperature: 0.2,
        }
    }
}

impl From<&crate::config::IdentifyConfig> for IdentifyOptions {
    fn from(config: &crate::config::IdentifyConfig) -> Self {
        Self {
            timeout_ms: config.timeout_ms,
            max_alternatives: config.max_alternatives,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Species identification client over one configured vision provider.
///
/// Safe to share across tasks; each `identify` call is an independent
/// request/response cycle with no shared mutable state. Dropping the
/// returned future cancels the in-flight HTTP request — no partial result
/// is ever produced.
pub struct IdentificationClient {
    provider: Box<dyn VisionProvider>,
    options: IdentifyOptions,
}

impl IdentificationClient {
    pub fn new(provider: Box<dyn VisionProvider>, options: IdentifyOptions) -> Self {
        Self { provider, options }
    }

    /// Build a client from config: resolves the configured provider and its
    /// credentials.
    pub fn from_config(config: &Config) -> Result<Self, IdentifyError> {
        let provider = ProviderFactory::create(&config.identify.provider, config, None)?;
        Ok(Self::new(provider, IdentifyOptions::from(&config.identify)))
    }

    /// Name of the underlying provider ("gemini", "openai", "replicate").
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Identify the species in a photo.
    ///
    /// Exactly one network call per invocation. Every failure mode comes
    /// back as a classified `IdentifyError`.
    pub async fn identify(
        &self,
        request: &IdentificationRequest,
    ) -> Result<IdentificationResult, IdentifyError> {
        if request.image.is_empty() {
            return Err(IdentifyError::InvalidArgument {
                message: "Image payload is empty".to_string(),
            });
        }

        if !self.provider.is_available().await {
            return Err(IdentifyError::Unauthenticated {
                message: format!(
                    "Provider '{}' is not configured with credentials",
                    self.provider.name()
                ),
            });
        }

        let vision_request = VisionRequest::from_identification(
            request,
            self.options.max_tokens,
            self.options.temperature,
        );

        tracing::debug!(
            provider = self.provider.name(),
            hint = ?request.category_hint,
            trial_bypassed = request.trial_bypassed,
            "Dispatching identification request"
        );

        let timeout = Duration::from_millis(self.options.timeout_ms);
        let response = match tokio::time::timeout(timeout, self.provider.generate(&vision_request))
            .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!(provider = self.provider.name(), error = %e, "Identification failed");
                return Err(e);
            }
            Err(_) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    timeout_ms = self.options.timeout_ms,
                    "Identification timed out"
                );
                return Err(IdentifyError::Timeout {
                    timeout_ms: self.options.timeout_ms,
                });
            }
        };

        let result = normalize::normalize(
            &response,
            self.provider.name(),
            self.options.max_alternatives,
        )?;

        tracing::info!(
            provider = self.provider.name(),
            species = %result.primary.common_name,
            confidence = result.primary.confidence,
            alternatives = result.alternatives.len(),
            latency_ms = result.latency_ms,
            "Identification complete"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identify::provider::{ImageInput, VisionResponse};
    use crate::types::{Category, Edibility};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// A configurable mock vision provider for testing client behavior.
    struct MockProvider {
        /// Result factory invoked once per `generate` call.
        response_fn: Box<dyn Fn() -> Result<VisionResponse, IdentifyError> + Send + Sync>,
        /// Tracks how many times `generate` was called.
        call_count: Arc<AtomicU32>,
        /// Optional delay before returning.
        delay: Option<Duration>,
        /// Reported by `is_available`.
        available: bool,
    }

    impl MockProvider {
        fn with_text(text: &str) -> Self {
            let text = text.to_string();
            Self {
                response_fn: Box::new(move || {
                    Ok(VisionResponse {
                        text: text.clone(),
                        model: "mock-v1".to_string(),
                        latency_ms: 10,
                    })
                }),
                call_count: Arc::new(AtomicU32::new(0)),
                delay: None,
                available: true,
            }
        }

        fn failing(error_fn: impl Fn() -> IdentifyError + Send + Sync + 'static) -> Self {
            Self {
                response_fn: Box::new(move || Err(error_fn())),
                call_count: Arc::new(AtomicU32::new(0)),
                delay: None,
                available: true,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        fn unavailable(mut self) -> Self {
            self.available = false;
            self
        }

        fn call_count_handle(&self) -> Arc<AtomicU32> {
            self.call_count.clone()
        }
    }

    #[async_trait]
    impl VisionProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn is_available(&self) -> bool {
            self.available
        }

        async fn generate(
            &self,
            _request: &VisionRequest,
        ) -> Result<VisionResponse, IdentifyError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            (self.response_fn)()
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(30)
        }
    }

    fn robin_payload() -> &'static str {
        r#"{
            "primaryMatch": {
                "commonName": "American Robin",
                "scientificName": "Turdus migratorius",
                "family": "Turdidae",
                "category": "bird",
                "confidence": 0.92,
                "description": "A widespread North American songbird.",
                "habitat": "Woodlands, gardens, and lawns",
                "edibility": "NOT_APPLICABLE"
            },
            "alternativeMatches": [
                {
                    "commonName": "Eastern Towhee",
                    "scientificName": "Pipilo erythrophthalmus",
                    "category": "bird",
                    "confidence": 0.40,
                    "description": "A large New World sparrow.",
                    "habitat": "Brushy edges",
                    "edibility": "NOT_APPLICABLE",
                    "rationale": "Similar rufous flanks in low light."
                }
            ]
        }"#
    }

    fn bird_request() -> IdentificationRequest {
        IdentificationRequest::new(ImageInput::from_bytes(b"X", "jpeg")).with_hint(Category::Bird)
    }

    fn fast_options() -> IdentifyOptions {
        IdentifyOptions {
            timeout_ms: 5_000,
            ..IdentifyOptions::default()
        }
    }

    #[tokio::test]
    async fn test_identify_end_to_end() {
        let client = IdentificationClient::new(
            Box::new(MockProvider::with_text(robin_payload())),
            fast_options(),
        );
        let result = client.identify(&bird_request()).await.unwrap();

        assert_eq!(result.primary.common_name, "American Robin");
        assert_eq!(result.primary.confidence, 0.92);
        assert_eq!(result.primary.edibility, Edibility::NotApplicable);
        assert!(result.primary.safety_warning.is_none());
        assert_eq!(result.alternatives.len(), 1);
        assert_eq!(result.alternatives[0].species.confidence, 0.40);
        assert!(result.confidences_non_increasing());
        assert_eq!(result.provider, "mock");
        assert_eq!(result.model, "mock-v1");
    }

    #[tokio::test]
    async fn test_identify_rejects_empty_image() {
        let provider = MockProvider::with_text(robin_payload());
        let call_count = provider.call_count_handle();
        let client = IdentificationClient::new(Box::new(provider), fast_options());

        let request = IdentificationRequest::new(ImageInput::from_bytes(&[], "jpeg"));
        let err = client.identify(&request).await.unwrap_err();

        assert!(matches!(err, IdentifyError::InvalidArgument { .. }));
        // Provider never called for an invalid request
        assert_eq!(call_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_identify_rejects_unavailable_provider() {
        let provider = MockProvider::with_text(robin_payload()).unavailable();
        let call_count = provider.call_count_handle();
        let client = IdentificationClient::new(Box::new(provider), fast_options());

        let err = client.identify(&bird_request()).await.unwrap_err();
        assert!(matches!(err, IdentifyError::Unauthenticated { .. }));
        // No network call is attempted without credentials
        assert_eq!(call_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_identify_times_out() {
        let provider =
            MockProvider::with_text(robin_payload()).with_delay(Duration::from_secs(5));
        let options = IdentifyOptions {
            timeout_ms: 50,
            ..IdentifyOptions::default()
        };
        let client = IdentificationClient::new(Box::new(provider), options);

        let err = client.identify(&bird_request()).await.unwrap_err();
        assert!(matches!(err, IdentifyError::Timeout { timeout_ms: 50 }));
    }

    #[tokio::test]
    async fn test_identify_passes_classified_errors_through() {
        let provider = MockProvider::failing(|| IdentifyError::QuotaExceeded {
            message: "free tier exhausted".to_string(),
        });
        let call_count = provider.call_count_handle();
        let client = IdentificationClient::new(Box::new(provider), fast_options());

        let err = client.identify(&bird_request()).await.unwrap_err();
        match err {
            IdentifyError::QuotaExceeded { message } => {
                assert!(message.contains("free tier"));
            }
            other => panic!("expected QuotaExceeded, got {other:?}"),
        }
        // Exactly one call — the client never retries
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_identify_malformed_output_is_parse_failure() {
        let client = IdentificationClient::new(
            Box::new(MockProvider::with_text("Sorry, I can't tell.")),
            fast_options(),
        );
        let err = client.identify(&bird_request()).await.unwrap_err();
        assert!(matches!(err, IdentifyError::ParseFailure { .. }));
    }

    #[tokio::test]
    async fn test_identify_substitutes_poison_warning() {
        let payload = r#"{"primaryMatch":{"commonName":"Destroying Angel","scientificName":"Amanita bisporigera","category":"fungi","confidence":0.81,"description":"d","habitat":"h","edibility":"poisonous"}}"#;
        let client = IdentificationClient::new(
            Box::new(MockProvider::with_text(payload)),
            fast_options(),
        );
        let result = client.identify(&bird_request()).await.unwrap();
        assert_eq!(result.primary.edibility, Edibility::Poisonous);
        assert!(result.primary.safety_warning.is_some());
    }
}
