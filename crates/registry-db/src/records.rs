//! Certificate record types.

use serde::{Deserialize, Serialize};

/// A stored certificate.
///
/// `id` is the internal storage key used for edits and deletion.
/// `certificate_id` is the public verification identifier printed on the
/// page; it is unique and never changes after issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub id: i64,
    pub certificate_id: String,
    pub student_name: String,
    pub course_name: String,
    pub father_name: Option<String>,
    pub duration: Option<String>,
    pub completion_date: Option<String>,
    pub grade: Option<String>,
    pub coordinator_name: Option<String>,
    pub roll_no: Option<String>,
    pub batch_number: Option<String>,
    pub created_at: i64,
}

/// Fields for a new certificate row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCertificate {
    pub certificate_id: String,
    pub student_name: String,
    pub course_name: String,
    pub father_name: Option<String>,
    pub duration: Option<String>,
    pub completion_date: Option<String>,
    pub grade: Option<String>,
    pub coordinator_name: Option<String>,
    pub roll_no: Option<String>,
    pub batch_number: Option<String>,
    pub created_at: i64,
}

/// Partial update for an existing certificate.
///
/// `None` leaves a column untouched. For the optional columns, a provided
/// blank value clears the column. The public identifier and creation time
/// are deliberately absent: they are immutable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CertificatePatch {
    pub student_name: Option<String>,
    pub course_name: Option<String>,
    pub father_name: Option<String>,
    pub duration: Option<String>,
    pub completion_date: Option<String>,
    pub grade: Option<String>,
    pub coordinator_name: Option<String>,
    pub roll_no: Option<String>,
    pub batch_number: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    CreatedAt,
    StudentName,
    CourseName,
    CompletionDate,
}

impl SortField {
    pub(crate) fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::StudentName => "student_name",
            SortField::CourseName => "course_name",
            SortField::CompletionDate => "completion_date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}
