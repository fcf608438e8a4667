//! Certificate strategies.
//!
//! Each strategy turns one participant of one event into a
//! [`CertificateRecord`], or explains why it cannot. Processing is simulated
//! with a fixed delay that stops early when the caller's
//! [`CancellationToken`] fires.

mod completion;
mod premium;
mod standard;

use std::time::Duration;

use async_trait::async_trait;
use eventpro_core::{CertificateKind, CertificateRecord, EventContext, ParticipantRecord};
use tokio_util::sync::CancellationToken;

pub use completion::CompletionCertificateStrategy;
pub use premium::PremiumCertificateStrategy;
pub use standard::StandardCertificateStrategy;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("insufficient attendance: {actual} hours attended, {required} required")]
    InsufficientAttendance { required: u32, actual: u32 },

    #[error("malformed participant: {0}")]
    MalformedParticipant(String),

    #[error("certificate generation cancelled")]
    Cancelled,
}

#[async_trait]
pub trait CertificateStrategy: Send + Sync {
    /// Human-readable strategy name, used in logs.
    fn name(&self) -> &'static str;

    fn kind(&self) -> CertificateKind;

    /// Generate a certificate, stopping with [`GenerationError::Cancelled`]
    /// if `cancel` fires first.
    async fn generate_cancellable(
        &self,
        participant: &ParticipantRecord,
        event: &EventContext,
        cancel: &CancellationToken,
    ) -> Result<CertificateRecord, GenerationError>;

    async fn generate(
        &self,
        participant: &ParticipantRecord,
        event: &EventContext,
    ) -> Result<CertificateRecord, GenerationError> {
        self.generate_cancellable(participant, event, &CancellationToken::new())
            .await
    }
}

/// Reject participants that cannot be printed on a certificate.
fn ensure_well_formed(participant: &ParticipantRecord) -> Result<(), GenerationError> {
    participant
        .ensure_well_formed()
        .map_err(|e| GenerationError::MalformedParticipant(e.to_string()))
}

/// Simulated rendering time.
async fn processing_delay(delay: Duration, cancel: &CancellationToken) -> Result<(), GenerationError> {
    if cancel.is_cancelled() {
        return Err(GenerationError::Cancelled);
    }
    if delay.is_zero() {
        return Ok(());
    }
    tokio::select! {
        _ = cancel.cancelled() => Err(GenerationError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
