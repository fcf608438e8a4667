use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use eventpro_core::{CertificateKind, CertificateRecord, EventContext, ParticipantRecord};
use tokio_util::sync::CancellationToken;

use super::{ensure_well_formed, processing_delay, CertificateStrategy, GenerationError};
use crate::codes;
use crate::config::CertificateConfig;

/// Premium participation certificate. Never checks attendance.
pub struct PremiumCertificateStrategy {
    output_root: String,
    delay: Duration,
}

impl PremiumCertificateStrategy {
    pub fn new(output_root: impl Into<String>, delay: Duration) -> Self {
        Self {
            output_root: output_root.into(),
            delay,
        }
    }

    pub fn from_config(config: &CertificateConfig) -> Self {
        Self::new(config.output_root.clone(), config.premium_delay)
    }
}

#[async_trait]
impl CertificateStrategy for PremiumCertificateStrategy {
    fn name(&self) -> &'static str {
        "Premium Certificate Strategy"
    }

    fn kind(&self) -> CertificateKind {
        CertificateKind::Premium
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
        let code = codes::premium_code(Utc::now());
        let record = CertificateRecord::issue(self.kind(), id, code, path);

        tracing::debug!(
            participant_id = participant.id,
            event_id = event.id,
            certificate_id = %record.certificate_id(),
            "Premium certificate issued"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use eventpro_core::EventType;

    #[tokio::test]
    async fn issues_premium_certificate_regardless_of_attendance() {
        let start = Utc::now();
        let event = EventContext {
            id: 9,
            title: "Advanced Rust".into(),
            event_type: EventType::Course,
            start_time: start,
            end_time: start + ChronoDuration::hours(40),
        };
        let strategy = PremiumCertificateStrategy::new("/out", Duration::ZERO);
        let participant = ParticipantRecord::new(2, "Grace", "grace@example.com", 1);

        let record = strategy.generate(&participant, &event).await.unwrap();

        assert_eq!(record.certificate_kind(), CertificateKind::Premium);
        assert!(record.certificate_id().starts_with("CERT-PREM-"));
        let (millis, random) = record.verification_code().split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(random.len(), 8);
    }
}
