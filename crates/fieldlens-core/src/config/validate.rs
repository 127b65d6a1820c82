//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

const KNOWN_PROVIDERS: &[&str] = &["gemini", "openai", "replicate"];

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !KNOWN_PROVIDERS.contains(&self.identify.provider.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "identify.provider must be one of {KNOWN_PROVIDERS:?}, got '{}'",
                self.identify.provider
            )));
        }
        if self.identify.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "identify.timeout_ms must be > 0".into(),
            ));
        }
        if self.identify.max_alternatives == 0 || self.identify.max_alternatives > 3 {
            return Err(ConfigError::ValidationError(
                "identify.max_alternatives must be between 1 and 3".into(),
            ));
        }
        if self.identify.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "identify.max_tokens must be > 0".into(),
            ));
        }
        if self.identify.temperature < 0.0 || self.identify.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "identify.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        Ok(())
    }
}
