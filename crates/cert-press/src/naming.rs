//! Output file naming.

use chrono::{DateTime, Utc};

/// File name for a single exported certificate.
///
/// Spaces in the student name become underscores; the rest of the name is
/// kept as entered.
pub fn certificate_file_name(student_name: &str, certificate_id: &str) -> String {
    let student = student_name.trim().replace(' ', "_");
    format!("{student}_{certificate_id}_Certificate_v1.0.pdf")
}

/// File name for a batch export, stamped with the export time.
pub fn batch_file_name(at: &DateTime<Utc>) -> String {
    format!("Certificates_{}_v1.0.pdf", at.format("%Y%m%d_%H%M%S"))
}
