//! Certificate ids, verification codes and file paths.

use eventpro_core::{CertificateKind, EntityId, Timestamp};
use rand::Rng;
use uuid::Uuid;

/// Length of the random part of standard and premium verification codes.
pub const RANDOM_CODE_LENGTH: usize = 8;

fn id_prefix(kind: CertificateKind) -> &'static str {
    match kind {
        CertificateKind::Standard => "CERT-STD",
        CertificateKind::Premium => "CERT-PREM",
        CertificateKind::Completion => "CERT-COMP",
    }
}

/// New certificate id, e.g. `CERT-STD-0192F1A3...`.
///
/// The suffix is a UUIDv7 so ids stay unique under concurrent generation
/// and sort by issue time.
pub fn certificate_id(kind: CertificateKind) -> String {
    let suffix = Uuid::now_v7().simple().to_string().to_ascii_uppercase();
    format!("{}-{suffix}", id_prefix(kind))
}

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Eight random uppercase alphanumerics.
pub fn standard_code() -> String {
    random_alphanumeric(RANDOM_CODE_LENGTH).to_ascii_uppercase()
}

/// `<unix-millis>-<8 random alphanumerics>`, uppercased.
pub fn premium_code(now: Timestamp) -> String {
    format!(
        "{}-{}",
        now.timestamp_millis(),
        random_alphanumeric(RANDOM_CODE_LENGTH)
    )
    .to_ascii_uppercase()
}

/// `COMP-<participant:04>-<event:04>-<year>`.
pub fn completion_code(participant_id: EntityId, event_id: EntityId, year: i32) -> String {
    format!("COMP-{participant_id:04}-{event_id:04}-{year}")
}

/// `<root>/<kind>/<certificate_id>.pdf`
pub fn file_path(output_root: &str, kind: CertificateKind, certificate_id: &str) -> String {
    format!(
        "{}/{}/{certificate_id}.pdf",
        output_root.trim_end_matches('/'),
        kind.as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn certificate_id_has_kind_prefix() {
        let id = certificate_id(CertificateKind::Premium);
        assert!(id.starts_with("CERT-PREM-"));
        let suffix = &id["CERT-PREM-".len()..];
        assert_eq!(suffix.len(), 32);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn standard_code_is_eight_uppercase_alphanumerics() {
        let code = standard_code();
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn premium_code_starts_with_millis() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let code = premium_code(now);
        let (millis, random) = code.split_once('-').unwrap();
        assert_eq!(millis, "1700000000123");
        assert_eq!(random.len(), 8);
        assert_eq!(code, code.to_ascii_uppercase());
    }

    #[test]
    fn completion_code_pads_ids() {
        assert_eq!(completion_code(7, 42, 2024), "COMP-0007-0042-2024");
        assert_eq!(completion_code(12345, 1, 2025), "COMP-12345-0001-2025");
    }

    #[test]
    fn file_path_joins_root_kind_and_id() {
        assert_eq!(
            file_path("/certificates/", CertificateKind::Completion, "CERT-COMP-1"),
            "/certificates/completion/CERT-COMP-1.pdf"
        );
    }
}
