//! OTP-guarded certificate deletion.
//!
//! Deleting an issued certificate is irreversible, so the registry row is
//! only removed after a one-time code round trip. The gate holds at most
//! one pending deletion; starting another replaces it and drops the old
//! engine, which cancels its countdown.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use otp_engine::{CodeDelivery, DeliveryError, OtpEngine, OtpError, OtpPhase, OtpPurpose};
use registry_db::{CertificateStore, DbError};

/// Development transport: the code goes to the operator's own log.
pub struct ConsoleDelivery;

impl CodeDelivery for ConsoleDelivery {
    fn deliver(
        &self,
        destination: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<(), DeliveryError> {
        tracing::info!(%destination, %code, ?purpose, "one-time code (console delivery)");
        Ok(())
    }
}

struct PendingDelete {
    storage_key: i64,
    engine: OtpEngine,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error("no deletion is pending")]
    NothingPending,
    #[error(transparent)]
    Otp(#[from] OtpError),
    #[error(transparent)]
    Store(#[from] DbError),
}

/// Serializes deletions behind a code check.
pub struct DeleteGate<S> {
    store: S,
    delivery: Arc<dyn CodeDelivery>,
    pending: Mutex<Option<PendingDelete>>,
}

impl<S: CertificateStore> DeleteGate<S> {
    pub fn new(store: S, delivery: Arc<dyn CodeDelivery>) -> Self {
        Self {
            store,
            delivery,
            pending: Mutex::new(None),
        }
    }

    /// Start a deletion: check the record exists, then issue a code to
    /// `destination`. Replaces any previous pending deletion.
    ///
    /// Must be called inside a tokio runtime.
    pub fn request(&self, storage_key: i64, destination: &str) -> Result<(), DeleteError> {
        let record = self
            .store
            .get_by_storage_key(storage_key)?
            .ok_or_else(|| DbError::NotFound(format!("certificate {storage_key}")))?;
        tracing::info!(certificate_id = %record.certificate_id, "deletion requested");

        let engine = OtpEngine::new(Arc::clone(&self.delivery));
        let outcome = engine.request(destination, OtpPurpose::Delete);
        // Install the engine even when delivery failed: the code is live
        // and the operator can resend.
        *self.lock() = Some(PendingDelete {
            storage_key,
            engine,
        });
        Ok(outcome?)
    }

    /// Resend a fresh code for the pending deletion.
    pub fn resend(&self, destination: &str) -> Result<(), DeleteError> {
        let guard = self.lock();
        let pending = guard.as_ref().ok_or(DeleteError::NothingPending)?;
        pending.engine.request(destination, OtpPurpose::Delete)?;
        Ok(())
    }

    /// Verify the code and, on a match, delete the record.
    ///
    /// A mismatch or an expired code keeps the deletion pending so the
    /// operator can retry or resend.
    pub fn confirm(&self, candidate: &str) -> Result<(), DeleteError> {
        let storage_key = {
            let mut guard = self.lock();
            let pending = guard.as_ref().ok_or(DeleteError::NothingPending)?;
            pending.engine.verify(candidate)?;
            let key = pending.storage_key;
            *guard = None;
            key
        };
        self.store.delete(storage_key)?;
        tracing::info!(storage_key, "certificate deleted");
        Ok(())
    }

    /// Abandon the pending deletion, if any.
    pub fn cancel(&self) {
        if self.lock().take().is_some() {
            tracing::info!("pending deletion abandoned");
        }
    }

    /// Code phase of the pending deletion, if one exists.
    pub fn pending_phase(&self) -> Option<OtpPhase> {
        self.lock().as_ref().map(|p| p.engine.phase())
    }

    /// Countdown seconds left on the pending deletion's code.
    pub fn remaining_secs(&self) -> Option<u64> {
        self.lock().as_ref().map(|p| p.engine.remaining_secs())
    }

    fn lock(&self) -> MutexGuard<'_, Option<PendingDelete>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::issuance::{CertificateForm, IssuanceService};
    use registry_db::{CertificateRecord, Database};

    struct RecordingDelivery {
        sent: Mutex<Vec<String>>,
    }

    impl RecordingDelivery {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
            })
        }

        fn last_code(&self) -> String {
            self.sent.lock().unwrap().last().cloned().unwrap()
        }

        fn count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    impl CodeDelivery for RecordingDelivery {
        fn deliver(
            &self,
            _destination: &str,
            code: &str,
            _purpose: OtpPurpose,
        ) -> Result<(), DeliveryError> {
            self.sent.lock().unwrap().push(code.to_string());
            Ok(())
        }
    }

    struct FailingDelivery;

    impl CodeDelivery for FailingDelivery {
        fn deliver(
            &self,
            _destination: &str,
            _code: &str,
            _purpose: OtpPurpose,
        ) -> Result<(), DeliveryError> {
            Err(DeliveryError("smtp unreachable".into()))
        }
    }

    fn issued(db: &Database, student: &str) -> CertificateRecord {
        IssuanceService::new(db.clone(), "MIE")
            .issue(&CertificateForm {
                student_name: student.into(),
                course_name: "Data Structures".into(),
                ..CertificateForm::default()
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_wrong_code_keeps_the_record() {
        let db = Database::open_in_memory().unwrap();
        let record = issued(&db, "Priya Sharma");
        let delivery = RecordingDelivery::new();
        let gate = DeleteGate::new(db.clone(), delivery.clone());

        gate.request(record.id, "admin@example.org").unwrap();
        assert_eq!(gate.pending_phase(), Some(OtpPhase::Sent));

        let wrong = if delivery.last_code() == "000000" {
            "000001"
        } else {
            "000000"
        };
        assert!(matches!(
            gate.confirm(wrong),
            Err(DeleteError::Otp(OtpError::CodeMismatch))
        ));
        assert!(db.get_by_storage_key(record.id).unwrap().is_some());
        assert_eq!(gate.pending_phase(), Some(OtpPhase::Sent));

        gate.confirm(&delivery.last_code()).unwrap();
        assert!(db.get_by_storage_key(record.id).unwrap().is_none());
        assert_eq!(gate.pending_phase(), None);
    }

    #[tokio::test]
    async fn test_confirm_deletes_only_after_the_code_matches() {
        let db = Database::open_in_memory().unwrap();
        let record = issued(&db, "Priya Sharma");
        let delivery = RecordingDelivery::new();
        let gate = DeleteGate::new(db.clone(), delivery.clone());

        gate.request(record.id, "admin@example.org").unwrap();
        gate.confirm(&delivery.last_code()).unwrap();

        assert!(db.get_by_storage_key(record.id).unwrap().is_none());
        assert!(matches!(
            gate.confirm("123456"),
            Err(DeleteError::NothingPending)
        ));
    }

    #[tokio::test]
    async fn test_request_for_a_missing_record_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let gate = DeleteGate::new(db, RecordingDelivery::new());
        assert!(matches!(
            gate.request(999, "admin@example.org"),
            Err(DeleteError::Store(DbError::NotFound(_)))
        ));
        assert_eq!(gate.pending_phase(), None);
    }

    #[tokio::test]
    async fn test_cancel_abandons_the_pending_deletion() {
        let db = Database::open_in_memory().unwrap();
        let record = issued(&db, "Priya Sharma");
        let gate = DeleteGate::new(db.clone(), RecordingDelivery::new());

        gate.request(record.id, "admin@example.org").unwrap();
        gate.cancel();

        assert!(matches!(
            gate.confirm("123456"),
            Err(DeleteError::NothingPending)
        ));
        assert!(db.get_by_storage_key(record.id).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_resend_issues_a_fresh_code() {
        let db = Database::open_in_memory().unwrap();
        let record = issued(&db, "Priya Sharma");
        let delivery = RecordingDelivery::new();
        let gate = DeleteGate::new(db.clone(), delivery.clone());

        gate.request(record.id, "admin@example.org").unwrap();
        gate.resend("admin@example.org").unwrap();
        assert_eq!(delivery.count(), 2);

        gate.confirm(&delivery.last_code()).unwrap();
        assert!(db.get_by_storage_key(record.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_new_request_replaces_the_pending_deletion() {
        let db = Database::open_in_memory().unwrap();
        let first = issued(&db, "Priya Sharma");
        let second = issued(&db, "Arun Patel");
        let delivery = RecordingDelivery::new();
        let gate = DeleteGate::new(db.clone(), delivery.clone());

        gate.request(first.id, "admin@example.org").unwrap();
        gate.request(second.id, "admin@example.org").unwrap();
        gate.confirm(&delivery.last_code()).unwrap();

        assert!(db.get_by_storage_key(first.id).unwrap().is_some());
        assert!(db.get_by_storage_key(second.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_delivery_leaves_the_code_live() {
        let db = Database::open_in_memory().unwrap();
        let record = issued(&db, "Priya Sharma");
        let gate = DeleteGate::new(db.clone(), Arc::new(FailingDelivery));

        assert!(matches!(
            gate.request(record.id, "admin@example.org"),
            Err(DeleteError::Otp(OtpError::Delivery(_)))
        ));
        assert_eq!(gate.pending_phase(), Some(OtpPhase::Sent));
        assert!(gate.remaining_secs().is_some());
    }
}
