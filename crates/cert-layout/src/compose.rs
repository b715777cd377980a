//! Canonical certificate composition.
//!
//! One fixed A4 arrangement, filled from [`CertificateData`]. Composition is
//! deterministic: identical data always yields an identical document, and no
//! element position depends on the display scale.

use crate::data::CertificateData;
use crate::document::{Align, LayoutDocument};
use crate::qr::{self, verification_url};
use crate::{PAGE_HEIGHT_MM, PAGE_WIDTH_MM};

const CENTER_X: f32 = PAGE_WIDTH_MM / 2.0;

const UNDERLINE_MIN_MM: f32 = 40.0;
const UNDERLINE_MAX_MM: f32 = 150.0;

const QR_X_MM: f32 = 172.0;
const QR_Y_MM: f32 = 258.0;

/// Underline width grows with the text it sits beneath and never collapses
/// below a fixed floor, so short names still read as filled-in lines.
fn underline_width_mm(text: &str, per_char_mm: f32) -> f32 {
    (text.chars().count() as f32 * per_char_mm).clamp(UNDERLINE_MIN_MM, UNDERLINE_MAX_MM)
}

/// Compose the certificate page for `data`.
///
/// The QR region is present only when the data carries a certificate id;
/// its payload is the public verification URL under `origin`.
pub fn certificate_layout(data: &CertificateData, origin: &str, issuer: &str) -> LayoutDocument {
    let mut doc = LayoutDocument::a4();

    doc.frame(6.0, 6.0, PAGE_WIDTH_MM - 12.0, PAGE_HEIGHT_MM - 12.0, 0.8);
    doc.frame(9.0, 9.0, PAGE_WIDTH_MM - 18.0, PAGE_HEIGHT_MM - 18.0, 0.3);

    doc.text(CENTER_X, 24.0, 8.0, Align::Center, issuer);
    doc.text(CENTER_X, 44.0, 11.0, Align::Center, "Certificate of Completion");
    doc.rule(CENTER_X - 50.0, 58.0, 100.0, 0.5);

    doc.text(CENTER_X, 74.0, 4.5, Align::Center, "This is to certify that");
    let student = data.display_student_name().to_string();
    let student_line = underline_width_mm(&student, 4.2);
    doc.text(CENTER_X, 86.0, 8.0, Align::Center, student);
    doc.rule(CENTER_X - student_line / 2.0, 98.0, student_line, 0.5);

    doc.text(CENTER_X, 108.0, 4.5, Align::Center, "son / daughter of");
    let father = data.display_father_name().to_string();
    let father_line = underline_width_mm(&father, 3.4);
    doc.text(CENTER_X, 118.0, 6.5, Align::Center, father);
    doc.rule(CENTER_X - father_line / 2.0, 128.0, father_line, 0.4);

    doc.text(
        CENTER_X,
        142.0,
        4.5,
        Align::Center,
        "has successfully completed the course",
    );
    doc.text(CENTER_X, 152.0, 7.5, Align::Center, data.display_course_name());

    doc.text(40.0, 172.0, 4.2, Align::Left, format!("Duration: {}", data.display_duration()));
    doc.text(120.0, 172.0, 4.2, Align::Left, format!("Grade: {}", data.display_grade()));
    doc.text(40.0, 182.0, 4.2, Align::Left, format!("Roll No: {}", data.display_roll_no()));
    doc.text(120.0, 182.0, 4.2, Align::Left, format!("Batch: {}", data.display_batch_number()));
    doc.text(
        40.0,
        192.0,
        4.2,
        Align::Left,
        format!("Completed on: {}", data.display_completion_date()),
    );

    doc.text(165.0, 242.0, 4.2, Align::Center, data.display_coordinator_name());
    doc.rule(140.0, 249.0, 50.0, 0.4);
    doc.text(165.0, 252.0, 3.5, Align::Center, "Course Coordinator");

    doc.text(22.0, 250.0, 4.0, Align::Left, format!("Issue Date: {}", data.display_issue_date()));
    let printed_id = if data.has_verification_id() {
        data.certificate_id.trim().to_string()
    } else {
        "Pending".to_string()
    };
    doc.text(22.0, 266.0, 3.8, Align::Left, format!("Certificate No: {printed_id}"));

    if data.has_verification_id() {
        let payload = verification_url(origin, data.certificate_id.trim());
        doc.qr_region(
            QR_X_MM,
            QR_Y_MM,
            payload,
            qr::DEFAULT_QR_WIDTH_PX,
            qr::DEFAULT_QR_MARGIN_MODULES,
        );
    }

    doc
}
