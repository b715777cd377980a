//! Certificate issuance.
//!
//! Mints public certificate ids and writes new rows through the store. The
//! id carries the issue second plus a nine-character random suffix, so a
//! collision is only possible within one second and is retried.

use chrono::Utc;
use registry_db::{CertificatePatch, CertificateRecord, CertificateStore, DbError, NewCertificate};
use serde::{Deserialize, Serialize};

/// Alphabet for the random id suffix. Uppercase only so ids survive
/// case-insensitive channels (spoken, handwritten, OCR'd from print).
const ID_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I',
    'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];
const ID_SUFFIX_LEN: usize = 9;
const MAX_MINT_ATTEMPTS: u32 = 4;

/// Mint a fresh public certificate id: `{prefix}-{unix seconds}-{suffix}`.
pub fn new_certificate_id(prefix: &str) -> String {
    format!(
        "{}-{}-{}",
        prefix,
        Utc::now().timestamp(),
        nanoid::nanoid!(ID_SUFFIX_LEN, &ID_ALPHABET)
    )
}

/// Operator-entered fields for a new certificate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CertificateForm {
    pub student_name: String,
    pub course_name: String,
    pub father_name: Option<String>,
    pub duration: Option<String>,
    pub completion_date: Option<String>,
    pub grade: Option<String>,
    pub coordinator_name: Option<String>,
    pub roll_no: Option<String>,
    pub batch_number: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("could not mint a unique certificate id")]
    IdExhausted,
    #[error(transparent)]
    Store(#[from] DbError),
}

/// Issues new certificates and amends existing ones.
pub struct IssuanceService<S> {
    store: S,
    id_prefix: String,
}

impl<S: CertificateStore> IssuanceService<S> {
    pub fn new(store: S, id_prefix: impl Into<String>) -> Self {
        Self {
            store,
            id_prefix: id_prefix.into(),
        }
    }

    /// Issue a new certificate from form data.
    pub fn issue(&self, form: &CertificateForm) -> Result<CertificateRecord, IssueError> {
        if form.student_name.trim().is_empty() {
            return Err(IssueError::MissingField("student_name"));
        }
        if form.course_name.trim().is_empty() {
            return Err(IssueError::MissingField("course_name"));
        }

        for _ in 0..MAX_MINT_ATTEMPTS {
            let new = NewCertificate {
                certificate_id: new_certificate_id(&self.id_prefix),
                student_name: form.student_name.trim().to_string(),
                course_name: form.course_name.trim().to_string(),
                father_name: form.father_name.clone(),
                duration: form.duration.clone(),
                completion_date: form.completion_date.clone(),
                grade: form.grade.clone(),
                coordinator_name: form.coordinator_name.clone(),
                roll_no: form.roll_no.clone(),
                batch_number: form.batch_number.clone(),
                created_at: Utc::now().timestamp(),
            };
            match self.store.create(&new) {
                Ok(record) => {
                    tracing::info!(certificate_id = %record.certificate_id, "certificate issued");
                    return Ok(record);
                }
                Err(DbError::Duplicate(id)) => {
                    tracing::warn!(certificate_id = %id, "minted id already taken, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(IssueError::IdExhausted)
    }

    /// Amend an issued certificate. The public id and issue time stay fixed.
    pub fn amend(
        &self,
        id: i64,
        patch: &CertificatePatch,
    ) -> Result<CertificateRecord, IssueError> {
        if matches!(&patch.student_name, Some(v) if v.trim().is_empty()) {
            return Err(IssueError::MissingField("student_name"));
        }
        if matches!(&patch.course_name, Some(v) if v.trim().is_empty()) {
            return Err(IssueError::MissingField("course_name"));
        }
        Ok(self.store.update(id, patch)?)
    }
}
