//! PDF export of issued certificates.
//!
//! Single exports are named after the student and the public id; batch
//! exports collect one page per record into a timestamped file. All file
//! writes go through the staged pipeline, so a crash never leaves a
//! partial PDF at the destination.

use std::path::PathBuf;

use cert_layout::{RenderOptions, RenderedDocument, render_certificate};
use cert_press::{PageFont, PressError, naming, pipeline};
use chrono::Utc;
use registry_db::{CertificateRecord, CertificateStore, DbError};

use crate::services::projection;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no certificate with id {0}")]
    NotFound(String),
    #[error(transparent)]
    Press(#[from] PressError),
    #[error(transparent)]
    Store(#[from] DbError),
}

/// Renders stored certificates into finished PDF files.
pub struct ExportService<S> {
    store: S,
    options: RenderOptions,
    output_dir: PathBuf,
    font: PageFont,
}

impl<S: CertificateStore> ExportService<S> {
    pub fn new(store: S, options: RenderOptions, output_dir: PathBuf, font: PageFont) -> Self {
        Self {
            store,
            options,
            output_dir,
            font,
        }
    }

    /// Export one certificate by its public id.
    pub async fn export_by_certificate_id(
        &self,
        certificate_id: &str,
    ) -> Result<PathBuf, ExportError> {
        let id = certificate_id.trim();
        let record = self
            .store
            .get_by_certificate_id(id)?
            .ok_or_else(|| ExportError::NotFound(id.to_string()))?;
        self.export_record(&record).await
    }

    /// Export one stored certificate as a single-page PDF.
    pub async fn export_record(&self, record: &CertificateRecord) -> Result<PathBuf, ExportError> {
        let data = projection::certificate_data(record);
        let file_name =
            naming::certificate_file_name(data.display_student_name(), &record.certificate_id);
        let document = render_certificate(&data, &self.options);
        let destination = self.output_dir.join(file_name);
        let path = pipeline::export_to_file(vec![document], &self.font, &destination).await?;
        tracing::info!(certificate_id = %record.certificate_id, "certificate exported");
        Ok(path)
    }

    /// Export several certificates into one PDF, one page per record, in
    /// the order given.
    pub async fn export_batch(
        &self,
        records: &[CertificateRecord],
    ) -> Result<PathBuf, ExportError> {
        let documents: Vec<RenderedDocument> = records
            .iter()
            .map(|record| render_certificate(&projection::certificate_data(record), &self.options))
            .collect();
        let destination = self.output_dir.join(naming::batch_file_name(&Utc::now()));
        let path = pipeline::export_to_file(documents, &self.font, &destination).await?;
        tracing::info!(pages = records.len(), "batch exported");
        Ok(path)
    }
}
