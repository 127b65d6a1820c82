//! Fieldlens Core - species identification from wildlife photos.
//!
//! Fieldlens sends a photo plus a structured prompt to a configured AI
//! vision provider and normalizes the response into a canonical
//! identification: one primary match, up to three alternatives, confidence
//! scores, and an edibility/safety classification.
//!
//! # Architecture
//!
//! ```text
//! Image bytes → Prompt Builder → Vision Provider (Gemini/OpenAI/Replicate)
//!             → Response Normalizer → IdentificationResult
//! ```
//!
//! Failures at any stage are classified into `IdentifyError` — callers never
//! see raw transport or provider errors.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fieldlens_core::{Config, IdentificationClient, IdentificationRequest, ImageInput};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let client = IdentificationClient::from_config(&config)?;
//!
//!     let image = ImageInput::from_bytes(&std::fs::read("robin.jpg")?, "jpeg");
//!     let result = client.identify(&IdentificationRequest::new(image)).await?;
//!     println!("{} ({:.0}%)", result.primary.common_name, result.primary.confidence * 100.0);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod capabilities;
pub mod config;
pub mod error;
pub mod identify;
pub mod types;

// Re-exports for convenient access
pub use capabilities::{AllowAll, DiscardResults, EntitlementGate, ResultSink};
pub use config::Config;
pub use error::{ConfigError, FieldlensError, IdentifyError, IdentifyResult, Result};
pub use identify::{
    IdentificationClient, IdentificationRequest, IdentifyOptions, ImageInput, ProviderFactory,
    VisionProvider,
};
pub use types::{
    AlternativeMatch, Category, Edibility, IdentificationResult, SpeciesMatch,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
