//! Concurrent certificate generation across a roster.
//!
//! One strategy is selected for the whole batch, then one task per
//! participant is spawned on a [`JoinSet`]. Every task is awaited. A failing
//! or panicking participant is recorded and the batch carries on; a fired
//! [`CancellationToken`] (or the configured roster timeout) stops whatever is
//! still running while keeping certificates already issued.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use eventpro_core::{CertificateRecord, EntityId, EventContext, ParticipantRecord};
use futures::FutureExt;
use serde::Serialize;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::CertificateConfig;
use crate::selector::StrategySelector;
use crate::strategy::GenerationError;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantFailure {
    pub participant_id: EntityId,
    pub reason: String,
}

/// Aggregate outcome of one roster.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// Issued certificates, in roster order.
    pub succeeded: Vec<CertificateRecord>,
    /// One entry per failed participant, in roster order.
    pub failures: Vec<ParticipantFailure>,
    pub failed_count: usize,
    /// Failures caused by cancellation. Included in `failed_count`.
    pub cancelled_count: usize,
    pub total_requested: usize,
}

impl BatchResult {
    /// Fraction of the roster that received a certificate. `0.0` for an
    /// empty roster.
    pub fn success_rate(&self) -> f64 {
        if self.total_requested == 0 {
            return 0.0;
        }
        self.succeeded.len() as f64 / self.total_requested as f64
    }
}

/// Final state of one participant's task.
enum Slot {
    Pending,
    Issued(CertificateRecord),
    Failed { reason: String, cancelled: bool },
}

// ---------------------------------------------------------------------------
// CertificationOrchestrator
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct CertificationOrchestrator {
    selector: StrategySelector,
    roster_timeout: Option<Duration>,
}

impl CertificationOrchestrator {
    pub fn new(selector: StrategySelector) -> Self {
        Self {
            selector,
            roster_timeout: None,
        }
    }

    pub fn from_config(config: &CertificateConfig) -> Self {
        Self {
            selector: StrategySelector::new(config),
            roster_timeout: config.roster_timeout,
        }
    }

    pub fn with_roster_timeout(mut self, timeout: Duration) -> Self {
        self.roster_timeout = Some(timeout);
        self
    }

    /// Generate certificates for every participant and wait for all of them.
    pub async fn generate_for_roster(
        &self,
        participants: &[ParticipantRecord],
        event: &EventContext,
        is_premium: bool,
    ) -> BatchResult {
        self.generate_for_roster_with_cancel(participants, event, is_premium, &CancellationToken::new())
            .await
    }

    /// Like [`generate_for_roster`](Self::generate_for_roster), but stops
    /// unfinished work when `cancel` fires. Stopped participants are counted
    /// as cancelled failures.
    pub async fn generate_for_roster_with_cancel(
        &self,
        participants: &[ParticipantRecord],
        event: &EventContext,
        is_premium: bool,
        cancel: &CancellationToken,
    ) -> BatchResult {
        let strategy = self.selector.select_for(&event.event_type, is_premium);
        let total = participants.len();

        tracing::info!(
            event_id = event.id,
            event_type = event.event_type.display_name(),
            strategy = strategy.name(),
            certificate = strategy.kind().display_name(),
            participants = total,
            "Starting certificate batch"
        );

        let batch_cancel = cancel.child_token();
        let event = Arc::new(event.clone());
        let mut tasks = JoinSet::new();

        for (index, participant) in participants.iter().cloned().enumerate() {
            let strategy = Arc::clone(&strategy);
            let event = Arc::clone(&event);
            let cancel = batch_cancel.clone();
            tasks.spawn(async move {
                let generate = async {
                    tokio::select! {
                        biased;
                        result = strategy.generate_cancellable(&participant, &event, &cancel) => result,
                        _ = cancel.cancelled() => Err(GenerationError::Cancelled),
                    }
                };
                let slot = match AssertUnwindSafe(generate).catch_unwind().await {
                    Ok(Ok(record)) => Slot::Issued(record),
                    Ok(Err(e)) => Slot::Failed {
                        cancelled: e == GenerationError::Cancelled,
                        reason: e.to_string(),
                    },
                    Err(panic) => Slot::Failed {
                        reason: format!("generation panicked: {}", panic_message(panic.as_ref())),
                        cancelled: false,
                    },
                };
                (index, slot)
            });
        }

        let mut slots: Vec<Slot> = (0..total).map(|_| Slot::Pending).collect();
        let deadline = self
            .roster_timeout
            .map(|timeout| tokio::time::Instant::now() + timeout);

        loop {
            let joined = match deadline {
                Some(deadline) if !batch_cancel.is_cancelled() => {
                    tokio::select! {
                        joined = tasks.join_next() => joined,
                        _ = tokio::time::sleep_until(deadline) => {
                            tracing::warn!(
                                event_id = event.id,
                                remaining = tasks.len(),
                                "Certificate batch timed out, cancelling remaining participants"
                            );
                            batch_cancel.cancel();
                            continue;
                        }
                    }
                }
                _ => tasks.join_next().await,
            };

            let Some(joined) = joined else { break };
            match joined {
                Ok((index, slot)) => slots[index] = slot,
                Err(e) => tracing::error!(error = %e, "Certificate task did not complete"),
            }
        }

        let result = collect(participants, slots);

        tracing::info!(
            event_id = event.id,
            strategy = strategy.name(),
            succeeded = result.succeeded.len(),
            failed = result.failed_count,
            cancelled = result.cancelled_count,
            total = result.total_requested,
            "Certificate batch finished: {}/{} issued",
            result.succeeded.len(),
            result.total_requested
        );
        result
    }
}

/// Fold per-participant slots into a [`BatchResult`], keeping roster order.
fn collect(participants: &[ParticipantRecord], slots: Vec<Slot>) -> BatchResult {
    let mut result = BatchResult {
        succeeded: Vec::new(),
        failures: Vec::new(),
        failed_count: 0,
        cancelled_count: 0,
        total_requested: participants.len(),
    };

    for (participant, slot) in participants.iter().zip(slots) {
        let (reason, cancelled) = match slot {
            Slot::Issued(record) => {
                result.succeeded.push(record);
                continue;
            }
            Slot::Failed { reason, cancelled } => (reason, cancelled),
            Slot::Pending => ("generation task aborted".to_string(), false),
        };

        tracing::warn!(
            participant_id = participant.id,
            reason = %reason,
            "Certificate generation failed"
        );
        result.failed_count += 1;
        if cancelled {
            result.cancelled_count += 1;
        }
        result.failures.push(ParticipantFailure {
            participant_id: participant.id,
            reason,
        });
    }

    result
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use eventpro_core::{CertificateKind, EventType};

    fn event(event_type: EventType, hours: i64) -> EventContext {
        let start = Utc::now();
        EventContext {
            id: 5,
            title: "Batch".into(),
            event_type,
            start_time: start,
            end_time: start + ChronoDuration::hours(hours),
        }
    }

    fn orchestrator() -> CertificationOrchestrator {
        CertificationOrchestrator::from_config(&CertificateConfig::immediate())
    }

    #[tokio::test]
    async fn empty_roster_yields_empty_result() {
        let result = orchestrator()
            .generate_for_roster(&[], &event(EventType::Conference, 2), false)
            .await;
        assert_eq!(result.total_requested, 0);
        assert_eq!(result.failed_count, 0);
        assert_eq!(result.success_rate(), 0.0);
    }

    #[tokio::test]
    async fn success_preserves_roster_order() {
        let roster: Vec<_> = (1..=5)
            .map(|id| ParticipantRecord::new(id, format!("P{id}"), "p@example.com", 10))
            .collect();
        let result = orchestrator()
            .generate_for_roster(&roster, &event(EventType::Workshop, 10), false)
            .await;

        assert_eq!(result.succeeded.len(), 5);
        let expected: Vec<String> = (1..=5).map(|id| format!("-{id:04}-")).collect();
        for (record, fragment) in result.succeeded.iter().zip(&expected) {
            assert_eq!(record.certificate_kind(), CertificateKind::Completion);
            assert!(record.verification_code().contains(fragment.as_str()));
        }
        assert_eq!(result.success_rate(), 1.0);
    }

    #[tokio::test]
    async fn already_cancelled_token_fails_everyone() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let roster = vec![ParticipantRecord::new(1, "A", "a@example.com", 0)];

        let result = orchestrator()
            .generate_for_roster_with_cancel(&roster, &event(EventType::Seminar, 1), false, &cancel)
            .await;

        assert!(result.succeeded.is_empty());
        assert_eq!(result.failed_count, 1);
        assert_eq!(result.cancelled_count, 1);
    }

    #[test]
    fn pending_slot_counts_as_failure() {
        let roster = vec![ParticipantRecord::new(9, "A", "a@example.com", 0)];
        let result = collect(&roster, vec![Slot::Pending]);
        assert_eq!(result.failed_count, 1);
        assert_eq!(result.failures[0].participant_id, 9);
        assert_eq!(result.cancelled_count, 0);
    }
}
