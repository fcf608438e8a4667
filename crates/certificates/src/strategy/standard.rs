use std::time::Duration;

use async_trait::async_trait;
use eventpro_core::{CertificateKind, CertificateRecord, EventContext, ParticipantRecord};
use tokio_util::sync::CancellationToken;

use super::{ensure_well_formed, processing_delay, CertificateStrategy, GenerationError};
use crate::codes;
use crate::config::CertificateConfig;

/// Participation certificate for any well-formed participant.
pub struct StandardCertificateStrategy {
    output_root: String,
    delay: Duration,
}

impl StandardCertificateStrategy {
    pub fn new(output_root: impl Into<String>, delay: Duration) -> Self {
        Self {
            output_root: output_root.into(),
            delay,
        }
    }

    pub fn from_config(config: &CertificateConfig) -> Self {
        Self::new(config.output_root.clone(), config.standard_delay)
    }
}

#[async_trait]
impl CertificateStrategy for StandardCertificateStrategy {
    fn name(&self) -> &'static str {
        "Standard Certificate Strategy"
    }

    fn kind(&self) -> CertificateKind {
        CertificateKind::Standard
    }

    async fn generate_cancellable(
        &self,
        participant: &ParticipantRecord,
        event: &EventContext,
        cancel: &CancellationToken,
    ) -> Result<CertificateRecord, GenerationError> {
        ensure_well_formed(participant)?;
        processing_delay(self.delay, cancel).await?;

        let id = codes::certificate_id(self.kind());
        let path = codes::file_path(&self.output_root, self.kind(), &id);
        let record = CertificateRecord::issue(self.kind(), id, codes::standard_code(), path);

        tracing::debug!(
            participant_id = participant.id,
            event_id = event.id,
            certificate_id = %record.certificate_id(),
            "Standard certificate issued"
        );
        Ok(record)
    }
}
