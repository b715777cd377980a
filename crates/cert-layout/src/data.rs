//! Render-time view of a certificate.
//!
//! `CertificateData` carries exactly the fields the page prints. Blank or
//! missing fields fall back to fixed placeholder labels so an empty form
//! still composes a complete, printable page.

use serde::{Deserialize, Serialize};

pub const STUDENT_NAME_PLACEHOLDER: &str = "Student Name";
pub const FATHER_NAME_PLACEHOLDER: &str = "Father Name";
pub const COURSE_NAME_PLACEHOLDER: &str = "Course Name";
pub const DURATION_PLACEHOLDER: &str = "Duration";
pub const COMPLETION_DATE_PLACEHOLDER: &str = "Completion Date";
pub const GRADE_PLACEHOLDER: &str = "Grade";
pub const COORDINATOR_PLACEHOLDER: &str = "Coordinator Name";
pub const ROLL_NO_PLACEHOLDER: &str = "Roll No";
pub const BATCH_PLACEHOLDER: &str = "Batch No";
pub const ISSUE_DATE_PLACEHOLDER: &str = "Issue Date";

/// The printable fields of one certificate.
///
/// `certificate_id` is the public verification identifier. When it is blank
/// the composed page omits the QR region entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateData {
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
    pub issue_date: String,
}

impl CertificateData {
    pub fn display_student_name(&self) -> &str {
        text_or(&self.student_name, STUDENT_NAME_PLACEHOLDER)
    }

    pub fn display_father_name(&self) -> &str {
        opt_or(&self.father_name, FATHER_NAME_PLACEHOLDER)
    }

    pub fn display_course_name(&self) -> &str {
        text_or(&self.course_name, COURSE_NAME_PLACEHOLDER)
    }

    pub fn display_duration(&self) -> &str {
        opt_or(&self.duration, DURATION_PLACEHOLDER)
    }

    pub fn display_completion_date(&self) -> &str {
        opt_or(&self.completion_date, COMPLETION_DATE_PLACEHOLDER)
    }

    pub fn display_grade(&self) -> &str {
        opt_or(&self.grade, GRADE_PLACEHOLDER)
    }

    pub fn display_coordinator_name(&self) -> &str {
        opt_or(&self.coordinator_name, COORDINATOR_PLACEHOLDER)
    }

    pub fn display_roll_no(&self) -> &str {
        opt_or(&self.roll_no, ROLL_NO_PLACEHOLDER)
    }

    pub fn display_batch_number(&self) -> &str {
        opt_or(&self.batch_number, BATCH_PLACEHOLDER)
    }

    pub fn display_issue_date(&self) -> &str {
        text_or(&self.issue_date, ISSUE_DATE_PLACEHOLDER)
    }

    /// Whether the page carries a verification QR region.
    pub fn has_verification_id(&self) -> bool {
        !self.certificate_id.trim().is_empty()
    }
}

/// Trimmed value, or the placeholder when the value is blank.
pub fn text_or<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() { placeholder } else { trimmed }
}

fn opt_or<'a>(value: &'a Option<String>, placeholder: &'a str) -> &'a str {
    match value {
        Some(v) => text_or(v, placeholder),
        None => placeholder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_fall_back_to_placeholders() {
        let data = CertificateData::default();
        assert_eq!(data.display_student_name(), "Student Name");
        assert_eq!(data.display_father_name(), "Father Name");
        assert_eq!(data.display_course_name(), "Course Name");
        assert_eq!(data.display_issue_date(), "Issue Date");
    }

    #[test]
    fn whitespace_only_counts_as_blank() {
        let data = CertificateData {
            student_name: "   ".to_string(),
            duration: Some("\t".to_string()),
            ..Default::default()
        };
        assert_eq!(data.display_student_name(), "Student Name");
        assert_eq!(data.display_duration(), "Duration");
    }

    #[test]
    fn filled_fields_are_trimmed_not_replaced() {
        let data = CertificateData {
            student_name: "  Priya Sharma ".to_string(),
            grade: Some("A+".to_string()),
            ..Default::default()
        };
        assert_eq!(data.display_student_name(), "Priya Sharma");
        assert_eq!(data.display_grade(), "A+");
    }

    #[test]
    fn verification_id_requires_non_blank_certificate_id() {
        let mut data = CertificateData::default();
        assert!(!data.has_verification_id());
        data.certificate_id = "  ".to_string();
        assert!(!data.has_verification_id());
        data.certificate_id = "MIE-1700000000-ABC123XYZ".to_string();
        assert!(data.has_verification_id());
    }
}
