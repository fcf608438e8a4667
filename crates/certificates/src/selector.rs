//! Strategy selection by event type and premium flag.

use std::sync::Arc;

use eventpro_core::EventType;

use crate::config::CertificateConfig;
use crate::strategy::{
    CertificateStrategy, CompletionCertificateStrategy, PremiumCertificateStrategy,
    StandardCertificateStrategy,
};

/// Event types with an explicit strategy mapping.
const MAPPED_EVENT_TYPES: [&str; 5] = ["conference", "seminar", "workshop", "webinar", "course"];

/// Hands out shared strategy instances. Selection never fails: unknown
/// event types fall back to the standard strategy.
#[derive(Clone)]
pub struct StrategySelector {
    standard: Arc<dyn CertificateStrategy>,
    premium: Arc<dyn CertificateStrategy>,
    completion: Arc<dyn CertificateStrategy>,
}

impl StrategySelector {
    pub fn new(config: &CertificateConfig) -> Self {
        Self {
            standard: Arc::new(StandardCertificateStrategy::from_config(config)),
            premium: Arc::new(PremiumCertificateStrategy::from_config(config)),
            completion: Arc::new(CompletionCertificateStrategy::from_config(config)),
        }
    }

    /// Build from caller-supplied strategies, e.g. ones that render real
    /// documents.
    pub fn from_strategies(
        standard: Arc<dyn CertificateStrategy>,
        premium: Arc<dyn CertificateStrategy>,
        completion: Arc<dyn CertificateStrategy>,
    ) -> Self {
        Self {
            standard,
            premium,
            completion,
        }
    }

    /// Select by event type name (case-insensitive).
    pub fn select(&self, event_type: &str, is_premium: bool) -> Arc<dyn CertificateStrategy> {
        self.select_for(&EventType::parse(event_type), is_premium)
    }

    pub fn select_for(&self, event_type: &EventType, is_premium: bool) -> Arc<dyn CertificateStrategy> {
        if is_premium {
            return Arc::clone(&self.premium);
        }
        match event_type {
            EventType::Course | EventType::Workshop => Arc::clone(&self.completion),
            EventType::Conference | EventType::Seminar | EventType::Webinar => {
                Arc::clone(&self.standard)
            }
            EventType::Meetup | EventType::Other(_) => {
                tracing::debug!(event_type = %event_type, "No explicit strategy, using standard");
                Arc::clone(&self.standard)
            }
        }
    }

    /// Names of the event types with an explicit mapping.
    pub fn supported_event_types(&self) -> Vec<&'static str> {
        MAPPED_EVENT_TYPES.to_vec()
    }
}

impl Default for StrategySelector {
    fn default() -> Self {
        Self::new(&CertificateConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventpro_core::CertificateKind;

    fn selector() -> StrategySelector {
        StrategySelector::new(&CertificateConfig::immediate())
    }

    #[test]
    fn premium_flag_always_wins() {
        let s = selector();
        for name in ["conference", "workshop", "course", "meetup", "unknown-type"] {
            assert_eq!(s.select(name, true).kind(), CertificateKind::Premium);
        }
    }

    #[test]
    fn hands_on_types_get_completion() {
        let s = selector();
        assert_eq!(s.select("workshop", false).kind(), CertificateKind::Completion);
        assert_eq!(s.select("COURSE", false).kind(), CertificateKind::Completion);
    }

    #[test]
    fn talk_types_get_standard() {
        let s = selector();
        for name in ["conference", "seminar", "webinar"] {
            assert_eq!(s.select(name, false).kind(), CertificateKind::Standard);
        }
    }

    #[test]
    fn unknown_types_fall_back_to_standard() {
        let s = selector();
        assert_eq!(s.select("unknown-type", false).kind(), CertificateKind::Standard);
        assert_eq!(s.select_for(&EventType::Meetup, false).kind(), CertificateKind::Standard);
    }

    #[test]
    fn strategies_are_shared() {
        let s = selector();
        assert!(Arc::ptr_eq(&s.select("seminar", false), &s.select("webinar", false)));
    }

    #[test]
    fn lists_mapped_types() {
        assert_eq!(
            selector().supported_event_types(),
            vec!["conference", "seminar", "workshop", "webinar", "course"]
        );
    }
}
