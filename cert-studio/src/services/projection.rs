//! Registry rows projected into printable certificate data.

use cert_layout::CertificateData;
use chrono::DateTime;
use registry_db::CertificateRecord;

/// Format a unix timestamp as the printed issue date (DD/MM/YYYY).
pub fn format_issue_date(created_at: i64) -> String {
    DateTime::from_timestamp(created_at, 0)
        .map(|dt| dt.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

/// Project a stored record into the fields the page prints.
pub fn certificate_data(record: &CertificateRecord) -> CertificateData {
    CertificateData {
        certificate_id: record.certificate_id.clone(),
        student_name: record.student_name.clone(),
        course_name: record.course_name.clone(),
        father_name: record.father_name.clone(),
        duration: record.duration.clone(),
        completion_date: record.completion_date.clone(),
        grade: record.grade.clone(),
        coordinator_name: record.coordinator_name.clone(),
        roll_no: record.roll_no.clone(),
        batch_number: record.batch_number.clone(),
        issue_date: format_issue_date(record.created_at),
    }
}
