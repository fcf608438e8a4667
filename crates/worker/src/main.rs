use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eventpro_certificates::{CertificateConfig, CertificateObserver, CertificationOrchestrator};
use eventpro_core::config::env_opt;
use eventpro_core::{ChannelKind, LifecycleKind};
use eventpro_events::{
    AnalyticsObserver, ChannelFactory, DeliveryConfig, EmailNotificationObserver, EventBus,
    LifecyclePublisher, NotificationService,
};

mod walkthrough;

const DEFAULT_LOG_FILTER: &str =
    "eventpro_worker=info,eventpro_events=info,eventpro_certificates=info";

/// How long cleanup waits for outstanding certificate results.
const RESULTS_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    // --- Configuration ---
    let delivery_config = DeliveryConfig::from_env().context("Invalid delivery configuration")?;
    let certificate_config =
        CertificateConfig::from_env().context("Invalid certificate configuration")?;
    let recipients = recipients_from_env().context("Invalid NOTIFY_RECIPIENTS")?;
    tracing::info!(
        channels = ?delivery_config.enabled,
        observer_timeout_secs = delivery_config.observer_timeout.as_secs(),
        output_root = %certificate_config.output_root,
        recipients = recipients.len(),
        "Loaded worker configuration"
    );

    // --- Delivery ---
    let factory = Arc::new(ChannelFactory::new(&delivery_config));
    let service = NotificationService::new(Arc::clone(&factory));

    // --- Event bus ---
    let bus = Arc::new(EventBus::new(delivery_config.observer_timeout));
    let shutdown = CancellationToken::new();

    let analytics = Arc::new(AnalyticsObserver::new());
    bus.register(analytics.clone());

    if factory.is_supported(ChannelKind::Email) {
        let email = factory.create(ChannelKind::Email)?;
        bus.register(Arc::new(EmailNotificationObserver::new(email, recipients)));
    } else {
        tracing::warn!("Email channel disabled, lifecycle emails will not be sent");
    }

    let (results_tx, mut results_rx) = mpsc::channel(16);
    let orchestrator = CertificationOrchestrator::from_config(&certificate_config);
    // Finish batches before the bus gives up on the handler, so partial
    // results are still reported.
    let batch_deadline = delivery_config.observer_timeout * 4 / 5;
    bus.register(Arc::new(
        CertificateObserver::new(orchestrator, results_tx)
            .with_cancellation(shutdown.clone())
            .with_batch_deadline(batch_deadline),
    ));
    tracing::info!(observers = ?bus.observer_names(), "Event bus ready");
    let publisher = LifecyclePublisher::new(Arc::clone(&bus));

    // Log certificate batches as they come back.
    let results_handle = tokio::spawn(async move {
        while let Some((subject_id, result)) = results_rx.recv().await {
            tracing::info!(
                subject_id,
                succeeded = result.succeeded.len(),
                failed = result.failed_count,
                cancelled = result.cancelled_count,
                success_rate = result.success_rate(),
                "Certificate batch received"
            );
            for failure in &result.failures {
                tracing::info!(
                    subject_id,
                    participant_id = failure.participant_id,
                    reason = %failure.reason,
                    "Participant without certificate"
                );
            }
        }
    });

    // Cancel in-flight work on SIGINT/SIGTERM.
    let signal_handle = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown.cancel();
        })
    };

    // --- Run ---
    tokio::select! {
        outcome = walkthrough::run(&publisher, &service) => outcome?,
        () = shutdown.cancelled() => {
            tracing::info!("Shutdown requested, stopping lifecycle walkthrough");
        }
    }

    // --- Cleanup ---
    // Dropping the bus drops the certificate observer and closes the results channel.
    drop(publisher);
    drop(bus);
    drain_results(results_handle, RESULTS_DRAIN_TIMEOUT).await;
    signal_handle.abort();

    tracing::info!(
        created = analytics.count(LifecycleKind::Created),
        completed = analytics.count(LifecycleKind::Completed),
        total = analytics.total(),
        "Worker finished"
    );
    Ok(())
}

/// Wait up to `timeout` for the results logger to finish. Returns `false`
/// (after logging) when it fails or is still running.
async fn drain_results(handle: JoinHandle<()>, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Certificate results logger failed");
            false
        }
        Err(_) => {
            tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                "Certificate results did not drain in time, exiting anyway"
            );
            false
        }
    }
}

/// Structured logging to stdout. `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Comma-separated email addresses from `NOTIFY_RECIPIENTS`.
fn recipients_from_env() -> Result<Vec<String>, eventpro_core::config::ConfigError> {
    Ok(env_opt::<String>("NOTIFY_RECIPIENTS")?
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default())
}

/// Wait for SIGINT or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT (Ctrl-C)"),
        () = terminate => tracing::info!("Received SIGTERM"),
    }
}
