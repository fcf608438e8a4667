use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use eventpro_core::{CertificateKind, CertificateRecord, EventContext, ParticipantRecord};
use tokio_util::sync::CancellationToken;

use super::{ensure_well_formed, processing_delay, CertificateStrategy, GenerationError};
use crate::codes;
use crate::config::CertificateConfig;

/// Completion certificate, issued only to participants who attended at
/// least 80% of the event's whole hours.
pub struct CompletionCertificateStrategy {
    output_root: String,
    delay: Duration,
}

impl CompletionCertificateStrategy {
    pub fn new(output_root: impl Into<String>, delay: Duration) -> Self {
        Self {
            output_root: output_root.into(),
            delay,
        }
    }

    pub fn from_config(config: &CertificateConfig) -> Self {
        Self::new(config.output_root.clone(), config.completion_delay)
    }
}

/// `floor(0.8 * duration_hours)`, in integer arithmetic.
pub fn required_hours(event: &EventContext) -> u32 {
    let hours = u64::from(event.duration_hours());
    u32::try_from(hours * 4 / 5).unwrap_or(u32::MAX)
}

#[async_trait]
impl CertificateStrategy for CompletionCertificateStrategy {
    fn name(&self) -> &'static str {
        "Completion Certificate Strategy"
    }

    fn kind(&self) -> CertificateKind {
        CertificateKind::Completion
    }

    async fn generate_cancellable(
        &self,
        participant: &ParticipantRecord,
        event: &EventContext,
        cancel: &CancellationToken,
    ) -> Result<CertificateRecord, GenerationError> {
        ensure_well_formed(participant)?;

        let required = required_hours(event);
        if participant.attendance_hours < required {
            return Err(GenerationError::InsufficientAttendance {
                required,
                actual: participant.attendance_hours,
            });
        }

        processing_delay(self.delay, cancel).await?;

        let id = codes::certificate_id(self.kind());
        let path = codes::file_path(&self.output_root, self.kind(), &id);
        let code = codes::completion_code(participant.id, event.id, Utc::now().year());
        let record = CertificateRecord::issue(self.kind(), id, code, path);

        tracing::debug!(
            participant_id = participant.id,
            event_id = event.id,
            attendance_hours = participant.attendance_hours,
            required_hours = required,
            certificate_id = %record.certificate_id(),
            "Completion certificate issued"
        );
        Ok(record)
    }
}
