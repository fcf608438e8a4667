//! Certificate records produced by the certificate strategies.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// CertificateKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateKind {
    Standard,
    Premium,
    Completion,
}

impl CertificateKind {
    /// Lowercase name, also the directory segment in certificate file paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateKind::Standard => "standard",
            CertificateKind::Premium => "premium",
            CertificateKind::Completion => "completion",
        }
    }

    /// Title printed on the certificate.
    pub fn display_name(&self) -> &'static str {
        match self {
            CertificateKind::Standard => "Participation",
            CertificateKind::Premium => "Premium Participation",
            CertificateKind::Completion => "Completion",
        }
    }
}

impl fmt::Display for CertificateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CertificateRecord
// ---------------------------------------------------------------------------

/// An issued certificate.
///
/// Fields are only readable: a record is built once by a strategy and never
/// changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    certificate_id: String,
    verification_code: String,
    file_path: String,
    issued_at: Timestamp,
    certificate_kind: CertificateKind,
}

impl CertificateRecord {
    /// Issue a record stamped with the current time.
    pub fn issue(
        certificate_kind: CertificateKind,
        certificate_id: String,
        verification_code: String,
        file_path: String,
    ) -> Self {
        Self {
            certificate_id,
            verification_code,
            file_path,
            issued_at: Utc::now(),
            certificate_kind,
        }
    }

    pub fn certificate_id(&self) -> &str {
        &self.certificate_id
    }

    pub fn verification_code(&self) -> &str {
        &self.verification_code
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn issued_at(&self) -> Timestamp {
        self.issued_at
    }

    pub fn certificate_kind(&self) -> CertificateKind {
        self.certificate_kind
    }
}
