//! Sub-configuration structs with defaults.

use serde::{Deserialize, Serialize};

/// Identification pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifyConfig {
    /// Active provider ("gemini", "openai", "replicate")
    pub provider: String,

    /// Provider call timeout in milliseconds.
    /// Vision generation latency is substantial; 30s is the floor that
    /// avoids spurious timeouts on large images.
    pub timeout_ms: u64,

    /// Maximum alternative matches to keep (hard cap 3)
    pub max_alternatives: usize,

    /// Maximum tokens the model may generate
    pub max_tokens: u32,

    /// Sampling temperature. Low — identification wants determinism,
    /// not creativity.
    pub temperature: f32,
}

impl Default for IdentifyConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            timeout_ms: 30_000,
            max_alternatives: 3,
            max_tokens: 1024,
            temperature: 0.2,
        }
    }
}

/// Vision provider configurations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Google Gemini configuration
    pub gemini: Option<GeminiConfig>,

    /// OpenAI configuration
    pub openai: Option<OpenAiConfig>,

    /// Replicate configuration
    pub replicate: Option<ReplicateConfig>,
}

/// Gemini configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: "${GEMINI_API_KEY}".to_string(),
            model: "gemini-2.0-flash".to_string(),
        }
    }
}

/// OpenAI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Replicate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicateConfig {
    /// API token (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model version identifier
    pub model: String,
}

impl Default for ReplicateConfig {
    fn default() -> Self {
        Self {
            api_key: "${REPLICATE_API_TOKEN}".to_string(),
            model: "yorickvp/llava-13b".to_string(),
        }
    }
}

/// Logging settings, consumed by the CLI crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level ("trace", "debug", "info", "warn", "error")
    pub level: String,

    /// Output format ("pretty" or "json")
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
