//! Public verification of certificate ids.
//!
//! Answers the question a scanned QR code asks: does this id belong to a
//! real issued certificate? Lookups never error out; a registry failure is
//! reported as an invalid outcome so the public page can always answer.

use cert_layout::{RenderOptions, RenderedDocument, render_certificate};
use chrono::{DateTime, Utc};
use registry_db::{CertificateRecord, CertificateStore};
use serde::Serialize;

use crate::services::projection;

/// Why an id failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    /// No certificate with this id exists.
    NotFound,
    /// The registry could not be consulted.
    LookupFailed,
}

/// A verified certificate with its presentation fields.
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedCertificate {
    #[serde(flatten)]
    pub record: CertificateRecord,
    pub issue_date: String,
    pub verified_at: DateTime<Utc>,
}

/// Outcome of one verification lookup.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationResult {
    Valid(VerifiedCertificate),
    Invalid { reason: InvalidReason },
}

impl VerificationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationResult::Valid(_))
    }
}

/// Resolves scanned or typed certificate ids against the registry.
pub struct VerificationService<S> {
    store: S,
    options: RenderOptions,
}

impl<S: CertificateStore> VerificationService<S> {
    pub fn new(store: S, options: RenderOptions) -> Self {
        Self { store, options }
    }

    /// Look up a certificate id. Surrounding whitespace is ignored.
    pub fn verify(&self, raw_id: &str) -> VerificationResult {
        let id = raw_id.trim();
        if id.is_empty() {
            return VerificationResult::Invalid {
                reason: InvalidReason::NotFound,
            };
        }
        match self.store.get_by_certificate_id(id) {
            Ok(Some(record)) => {
                tracing::info!(certificate_id = %record.certificate_id, "certificate verified");
                VerificationResult::Valid(VerifiedCertificate {
                    issue_date: projection::format_issue_date(record.created_at),
                    verified_at: Utc::now(),
                    record,
                })
            }
            Ok(None) => {
                tracing::info!(certificate_id = %id, "verification miss");
                VerificationResult::Invalid {
                    reason: InvalidReason::NotFound,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "verification lookup failed");
                VerificationResult::Invalid {
                    reason: InvalidReason::LookupFailed,
                }
            }
        }
    }

    /// Compose the confirmation view for a verified record.
    ///
    /// Runs the same pipeline as issuance, so the confirmation page shows
    /// exactly the page that was printed.
    pub fn confirmation_document(&self, record: &CertificateRecord) -> RenderedDocument {
        render_certificate(&projection::certificate_data(record), &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cert_layout::certificate_layout;
    use registry_db::{CertificatePatch, Database, DbError, NewCertificate, SortField, SortOrder};

    struct FailingStore;

    impl CertificateStore for FailingStore {
        fn create(&self, _new: &NewCertificate) -> Result<CertificateRecord, DbError> {
            Err(DbError::InvalidData("simulated transport fault".into()))
        }

        fn list_sorted(
            &self,
            _filter: Option<&str>,
            _sort: SortField,
            _order: SortOrder,
        ) -> Result<Vec<CertificateRecord>, DbError> {
            Err(DbError::InvalidData("simulated transport fault".into()))
        }

        fn get_by_storage_key(&self, _id: i64) -> Result<Option<CertificateRecord>, DbError> {
            Err(DbError::InvalidData("simulated transport fault".into()))
        }

        fn get_by_certificate_id(
            &self,
            _certificate_id: &str,
        ) -> Result<Option<CertificateRecord>, DbError> {
            Err(DbError::InvalidData("simulated transport fault".into()))
        }

        fn update(&self, _id: i64, _patch: &CertificatePatch) -> Result<CertificateRecord, DbError> {
            Err(DbError::InvalidData("simulated transport fault".into()))
        }

        fn delete(&self, _id: i64) -> Result<(), DbError> {
            Err(DbError::InvalidData("simulated transport fault".into()))
        }
    }

    fn seeded_db() -> (Database, CertificateRecord) {
        let db = Database::open_in_memory().unwrap();
        let record = db
            .create(&NewCertificate {
                certificate_id: "MIE-1700000000-ABC123XYZ".into(),
                student_name: "Priya Sharma".into(),
                course_name: "Data Structures".into(),
                grade: Some("A+".into()),
                created_at: 1_700_000_000,
                ..NewCertificate::default()
            })
            .unwrap();
        (db, record)
    }

    #[test]
    fn test_known_id_is_valid() {
        let (db, record) = seeded_db();
        let service = VerificationService::new(db, RenderOptions::default());

        let result = service.verify("MIE-1700000000-ABC123XYZ");
        assert!(result.is_valid());
        let VerificationResult::Valid(verified) = result else {
            unreachable!()
        };
        assert_eq!(verified.record.id, record.id);
        assert_eq!(verified.issue_date, "14/11/2023");
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let (db, _) = seeded_db();
        let service = VerificationService::new(db, RenderOptions::default());
        assert!(service.verify("  MIE-1700000000-ABC123XYZ\n").is_valid());
    }

    #[test]
    fn test_unknown_id_is_invalid() {
        let (db, _) = seeded_db();
        let service = VerificationService::new(db, RenderOptions::default());
        assert!(matches!(
            service.verify("DOES-NOT-EXIST"),
            VerificationResult::Invalid {
                reason: InvalidReason::NotFound
            }
        ));
    }

    #[test]
    fn test_blank_id_is_invalid_without_a_lookup() {
        let service = VerificationService::new(FailingStore, RenderOptions::default());
        assert!(matches!(
            service.verify("   "),
            VerificationResult::Invalid {
                reason: InvalidReason::NotFound
            }
        ));
    }

    #[test]
    fn test_registry_failure_reports_lookup_failed() {
        let service = VerificationService::new(FailingStore, RenderOptions::default());
        assert!(matches!(
            service.verify("MIE-1700000000-ABC123XYZ"),
            VerificationResult::Invalid {
                reason: InvalidReason::LookupFailed
            }
        ));
    }

    #[tokio::test]
    async fn test_confirmation_matches_the_issued_page() {
        let (db, record) = seeded_db();
        let options = RenderOptions {
            origin: "https://certs.example.org".into(),
            issuer: "Modern Institute of Engineering".into(),
        };
        let service = VerificationService::new(db, options.clone());

        let confirmation = service.confirmation_document(&record);
        let expected = certificate_layout(
            &projection::certificate_data(&record),
            &options.origin,
            &options.issuer,
        );
        assert_eq!(*confirmation.layout(), expected);
    }
}
