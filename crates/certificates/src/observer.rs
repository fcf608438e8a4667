//! Bus observer that issues certificates when an event completes.

use std::time::Duration;

use async_trait::async_trait;
use eventpro_core::{EntityId, EventContext, LifecycleKind, LifecycleNotification, ParticipantRecord};
use eventpro_events::{Observer, ObserverError};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::orchestrator::{BatchResult, CertificationOrchestrator};

/// Payload carried by a `Completed` notification that should produce
/// certificates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificationRequest {
    pub event: EventContext,
    pub participants: Vec<ParticipantRecord>,
    #[serde(default)]
    pub is_premium: bool,
}

/// Runs the orchestrator for every completed event and forwards
/// `(subject_id, BatchResult)` to `results`.
///
/// The bus drops a handler that outlives its timeout, which would lose the
/// batch. Set a [`batch_deadline`](Self::with_batch_deadline) shorter than
/// that timeout so unfinished participants are cancelled and the partial
/// result still gets forwarded.
pub struct CertificateObserver {
    orchestrator: CertificationOrchestrator,
    results: mpsc::Sender<(EntityId, BatchResult)>,
    cancel: CancellationToken,
    batch_deadline: Option<Duration>,
}

impl CertificateObserver {
    pub fn new(
        orchestrator: CertificationOrchestrator,
        results: mpsc::Sender<(EntityId, BatchResult)>,
    ) -> Self {
        Self {
            orchestrator,
            results,
            cancel: CancellationToken::new(),
            batch_deadline: None,
        }
    }

    /// Stop in-flight batches when `cancel` fires, e.g. on shutdown.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Cancel whatever is still running `deadline` after a batch starts.
    pub fn with_batch_deadline(mut self, deadline: Duration) -> Self {
        self.batch_deadline = Some(deadline);
        self
    }
}

#[async_trait]
impl Observer for CertificateObserver {
    fn name(&self) -> &str {
        "CertificateObserver"
    }

    fn is_interested(&self, kind: LifecycleKind) -> bool {
        kind == LifecycleKind::Completed
    }

    async fn handle(&self, notification: &LifecycleNotification) -> Result<(), ObserverError> {
        let request: CertificationRequest = serde_json::from_value(notification.payload.clone())?;

        tracing::info!(
            subject_id = notification.subject_id,
            participants = request.participants.len(),
            is_premium = request.is_premium,
            "Generating certificates for completed event"
        );

        let batch_cancel = self.cancel.child_token();
        let run = self.orchestrator.generate_for_roster_with_cancel(
            &request.participants,
            &request.event,
            request.is_premium,
            &batch_cancel,
        );

        let result = match self.batch_deadline {
            None => run.await,
            Some(deadline) => {
                tokio::pin!(run);
                tokio::select! {
                    biased;
                    result = &mut run => result,
                    () = tokio::time::sleep(deadline) => {
                        tracing::warn!(
                            subject_id = notification.subject_id,
                            deadline_ms = deadline.as_millis() as u64,
                            "Certificate batch deadline reached, cancelling remaining participants"
                        );
                        batch_cancel.cancel();
                        run.await
                    }
                }
            }
        };

        self.results
            .send((notification.subject_id, result))
            .await
            .map_err(|_| ObserverError::Failed("certificate result receiver dropped".into()))
    }
}
