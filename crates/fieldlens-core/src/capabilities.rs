//! Collaborator seams owned by the surrounding application.
//!
//! The trial/quota store and the history store are vendor/app concerns; the
//! pipeline only needs these narrow interfaces. Defaults are provided for
//! the CLI and for tests.

use crate::error::IdentifyError;
use crate::types::IdentificationResult;
use async_trait::async_trait;

/// Supplies and records the caller's remaining free identification uses.
///
/// Checked before a call is issued; never enforced inside the client itself
/// (the `trial_bypassed` flag is audit-only once the call is in flight).
#[async_trait]
pub trait EntitlementGate: Send + Sync {
    /// Remaining free uses, or `None` for unlimited access.
    async fn remaining_uses(&self) -> Option<u32>;

    /// Record one consumed identification.
    async fn record_use(&self) -> Result<(), IdentifyError>;
}

/// Receives successful identifications for history/favorites storage.
///
/// The sink owns its copy; results are otherwise ephemeral.
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn store(&self, result: &IdentificationResult) -> Result<(), IdentifyError>;
}

/// Gate granting unlimited access. Used by the CLI, where quota is not a
/// concept, and by tests.
pub struct AllowAll;

#[async_trait]
impl EntitlementGate for AllowAll {
    async fn remaining_uses(&self) -> Option<u32> {
        None
    }

    async fn record_use(&self) -> Result<(), IdentifyError> {
        Ok(())
    }
}

/// Sink that drops results.
pub struct DiscardResults;

#[async_trait]
impl ResultSink for DiscardResults {
    async fn store(&self, _result: &IdentificationResult) -> Result<(), IdentifyError> {
        Ok(())
    }
}
