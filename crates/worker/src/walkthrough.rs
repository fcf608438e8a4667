//! Sample event lifecycle driven through the bus.
//!
//! Takes one workshop from creation to completion, sends a reminder to the
//! first attendee on every enabled channel, and attaches a certification
//! request to the completion notice.

use chrono::{Duration, Utc};

use eventpro_certificates::CertificationRequest;
use eventpro_core::{EventContext, EventType, ParticipantRecord};
use eventpro_events::{LifecyclePublisher, NotificationService, OutboundMessage};

fn sample_event() -> EventContext {
    let start = Utc::now() - Duration::hours(10);
    EventContext {
        id: 1,
        title: "Async Rust Workshop".into(),
        event_type: EventType::Workshop,
        start_time: start,
        end_time: start + Duration::hours(10),
    }
}

fn sample_roster() -> Vec<ParticipantRecord> {
    vec![
        ParticipantRecord::new(1, "Ada Lovelace", "ada@example.com", 10),
        ParticipantRecord::new(2, "Alan Turing", "+14155550100", 8),
        ParticipantRecord::new(3, "Grace Hopper", "grace@example.com", 6),
        ParticipantRecord::new(4, "Edsger Dijkstra", "edsger_device_token_01", 9),
    ]
}

pub async fn run(publisher: &LifecyclePublisher, service: &NotificationService) -> anyhow::Result<()> {
    let event = sample_event();
    let roster = sample_roster();
    let (id, title) = (event.id, event.title.as_str());

    publisher.created(id, title, None).await;
    publisher.registration_opened(id, title, None).await;
    publisher
        .updated(id, title, Some(serde_json::json!({ "room": "Hall B" })))
        .await;
    publisher.registration_closed(id, title, None).await;

    if let Some(first) = roster.first() {
        let reminder = OutboundMessage::new(
            first.contact_address.clone(),
            format!("Reminder: {title}"),
            format!("{title} starts soon."),
        )
        .with_metadata(serde_json::json!({ "subject_id": id, "reminder": true }));
        let outcomes = service
            .send_multiple(&service.supported_kinds(), &reminder)
            .await;
        for (kind, outcome) in outcomes {
            tracing::info!(
                channel = kind.display_name(),
                success = outcome.is_success(),
                "Reminder outcome"
            );
        }
    }

    let request = CertificationRequest {
        event: event.clone(),
        participants: roster,
        is_premium: false,
    };
    publisher
        .completed(id, title, Some(serde_json::to_value(&request)?))
        .await;

    Ok(())
}
