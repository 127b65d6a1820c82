//! Vision provider trait and request/response types.
//!
//! Defines the interface that all vision providers implement, plus the
//! factory that creates the configured provider. Providers return raw model
//! text; decoding into the domain model is the normalizer's job.

use crate::config::Config;
use crate::error::IdentifyError;
use crate::identify::prompt;
use crate::types::Category;
use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;

/// Base64-encoded image ready to send to a vision API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and format string.
    ///
    /// The format is the image format identifier (e.g., "jpeg", "png", "webp").
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        let media_type = match format {
            "jpeg" | "jpg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "heic" => "image/heic",
            other => {
                tracing::warn!("Unknown image format '{other}', defaulting to image/jpeg");
                "image/jpeg"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }

    /// Create an `ImageInput` from an already base64-encoded payload.
    pub fn from_base64(data: &str, media_type: &str) -> Self {
        Self {
            data: data.to_string(),
            media_type: media_type.to_string(),
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }

    /// Whether the payload carries any image data at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One identification request as issued by a caller.
#[derive(Debug, Clone)]
pub struct IdentificationRequest {
    /// The photo to identify
    pub image: ImageInput,
    /// Optional category the user believes the subject belongs to
    pub category_hint: Option<Category>,
    /// Caller has premium/unlimited access. Passed through for server-side
    /// auditing only — never enforced here.
    pub trial_bypassed: bool,
}

impl IdentificationRequest {
    pub fn new(image: ImageInput) -> Self {
        Self {
            image,
            category_hint: None,
            trial_bypassed: false,
        }
    }

    pub fn with_hint(mut self, hint: Category) -> Self {
        self.category_hint = Some(hint);
        self
    }

    pub fn with_trial_bypassed(mut self, bypassed: bool) -> Self {
        self.trial_bypassed = bypassed;
        self
    }
}

/// The provider-facing request: prompt already built, knobs resolved.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    /// The image to identify
    pub image: ImageInput,
    /// Instruction prompt with the embedded response schema
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Audit flag forwarded in request metadata where the provider supports it
    pub trial_bypassed: bool,
}

impl VisionRequest {
    /// Build a provider request from a caller request and generation knobs.
    pub fn from_identification(
        request: &IdentificationRequest,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            image: request.image.clone(),
            prompt: prompt::build_prompt(request.category_hint),
            max_tokens,
            temperature,
            trial_bypassed: request.trial_bypassed,
        }
    }
}

/// Raw output of one vision call, before normalization.
#[derive(Debug, Clone)]
pub struct VisionResponse {
    /// Raw model text (expected to be the schema JSON, possibly fenced)
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all vision providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn VisionProvider>` for dynamic dispatch).
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider name for logging (e.g., "gemini", "openai").
    fn name(&self) -> &str;

    /// Check whether the provider is configured with credentials.
    /// The client calls this before dispatching a request.
    async fn is_available(&self) -> bool;

    /// Issue exactly one identification call. No retries, no caching.
    ///
    /// All failures come back classified — never a raw transport error.
    async fn generate(&self, request: &VisionRequest) -> Result<VisionResponse, IdentifyError>;

    /// Per-request timeout for this provider.
    fn timeout(&self) -> Duration;
}

impl std::fmt::Debug for dyn VisionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionProvider")
            .field("name", &self.name())
            .finish()
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Factory that creates the configured provider.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a vision provider based on provider name and config.
    ///
    /// Provider choice is a configuration-time decision — there is no
    /// runtime fallback chain between providers.
    pub fn create(
        provider: &str,
        config: &Config,
        model_override: Option<&str>,
    ) -> Result<Box<dyn VisionProvider>, IdentifyError> {
        let timeout = Duration::from_millis(config.identify.timeout_ms);
        match provider {
            "gemini" => {
                let cfg = config.providers.gemini.clone().unwrap_or_default();
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| {
                    IdentifyError::Unauthenticated {
                        message: "Gemini API key not set. Set GEMINI_API_KEY env var.".to_string(),
                    }
                })?;
                let model = model_override.map(String::from).unwrap_or(cfg.model);
                Ok(Box::new(super::gemini::GeminiProvider::new(
                    &api_key, &model, timeout,
                )))
            }
            "openai" => {
                let cfg = config.providers.openai.clone().unwrap_or_default();
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| {
                    IdentifyError::Unauthenticated {
                        message: "OpenAI API key not set. Set OPENAI_API_KEY env var.".to_string(),
                    }
                })?;
                let model = model_override.map(String::from).unwrap_or(cfg.model);
                Ok(Box::new(super::openai::OpenAiProvider::new(
                    &api_key, &model, timeout,
                )))
            }
            "replicate" => {
                let cfg = config.providers.replicate.clone().unwrap_or_default();
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| {
                    IdentifyError::Unauthenticated {
                        message: "Replicate API token not set. Set REPLICATE_API_TOKEN env var."
                            .to_string(),
                    }
                })?;
                let model = model_override.map(String::from).unwrap_or(cfg.model);
                Ok(Box::new(super::replicate::ReplicateProvider::new(
                    &api_key, &model, timeout,
                )))
            }
            other => Err(IdentifyError::InvalidArgument {
                message: format!("Unknown vision provider: {other}"),
            }),
        }
    }
}
