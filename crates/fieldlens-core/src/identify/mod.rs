//! The species identification pipeline.
//!
//! Provides a provider abstraction over the supported vision backends
//! (Gemini, OpenAI, Replicate), a deterministic prompt builder, an error
//! classifier, and the normalizer that converts raw model output into the
//! canonical `IdentificationResult`.

pub(crate) mod classify;
pub(crate) mod client;
pub(crate) mod gemini;
pub(crate) mod normalize;
pub(crate) mod openai;
pub(crate) mod prompt;
pub(crate) mod provider;
pub(crate) mod replicate;

pub use client::{IdentificationClient, IdentifyOptions};
pub use prompt::build_prompt;
pub use provider::{
    IdentificationRequest, ImageInput, ProviderFactory, VisionProvider, VisionRequest,
    VisionResponse,
};
