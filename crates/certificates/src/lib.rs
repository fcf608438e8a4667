//! Certificate generation for completed events.
//!
//! A [`StrategySelector`] picks one [`CertificateStrategy`] per event from
//! its type and premium flag. The [`CertificationOrchestrator`] runs that
//! strategy for every participant of a roster concurrently and collects a
//! [`BatchResult`]; one participant failing never affects the others.
//! [`CertificateObserver`] plugs the orchestrator into the event bus.

pub mod codes;
pub mod config;
pub mod observer;
pub mod orchestrator;
pub mod selector;
pub mod strategy;

pub use config::CertificateConfig;
pub use observer::{CertificateObserver, CertificationRequest};
pub use orchestrator::{BatchResult, CertificationOrchestrator, ParticipantFailure};
pub use selector::StrategySelector;
pub use strategy::{
    CertificateStrategy, CompletionCertificateStrategy, GenerationError,
    PremiumCertificateStrategy, StandardCertificateStrategy,
};
