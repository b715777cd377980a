//! Certificate CRUD.

use rusqlite::{OptionalExtension, Row, params};

use crate::records::{CertificatePatch, CertificateRecord, NewCertificate, SortField, SortOrder};
use crate::{Database, DbError};

const COLUMNS: &str = "id, certificate_id, student_name, course_name, father_name, duration, \
                       completion_date, grade, coordinator_name, roll_no, batch_number, created_at";

fn row_to_record(row: &Row) -> rusqlite::Result<CertificateRecord> {
    Ok(CertificateRecord {
        id: row.get(0)?,
        certificate_id: row.get(1)?,
        student_name: row.get(2)?,
        course_name: row.get(3)?,
        father_name: row.get(4)?,
        duration: row.get(5)?,
        completion_date: row.get(6)?,
        grade: row.get(7)?,
        coordinator_name: row.get(8)?,
        roll_no: row.get(9)?,
        batch_number: row.get(10)?,
        created_at: row.get(11)?,
    })
}

/// Blank optional values are stored as NULL.
fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn map_unique_violation(e: rusqlite::Error, certificate_id: &str) -> DbError {
    if let rusqlite::Error::SqliteFailure(err, _) = &e {
        if err.code == rusqlite::ErrorCode::ConstraintViolation {
            return DbError::Duplicate(certificate_id.to_string());
        }
    }
    DbError::Sqlite(e)
}

impl Database {
    /// Insert a new certificate and return the stored row.
    ///
    /// A second row with the same public identifier is rejected with
    /// [`DbError::Duplicate`].
    pub fn insert_certificate(&self, new: &NewCertificate) -> Result<CertificateRecord, DbError> {
        let certificate_id = new.certificate_id.trim().to_string();
        if certificate_id.is_empty() {
            return Err(DbError::InvalidData(
                "certificate_id must not be empty".to_string(),
            ));
        }
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO certificates (certificate_id, student_name, course_name, father_name, \
                 duration, completion_date, grade, coordinator_name, roll_no, batch_number, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    certificate_id,
                    new.student_name.trim(),
                    new.course_name.trim(),
                    clean(&new.father_name),
                    clean(&new.duration),
                    clean(&new.completion_date),
                    clean(&new.grade),
                    clean(&new.coordinator_name),
                    clean(&new.roll_no),
                    clean(&new.batch_number),
                    new.created_at,
                ],
            )
            .map_err(|e| map_unique_violation(e, &certificate_id))?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM certificates WHERE id = ?1"),
                params![id],
                row_to_record,
            )
            .map_err(DbError::Sqlite)
        })
    }

    /// All certificates, optionally filtered, in the requested order.
    ///
    /// The filter matches case-insensitively against student name, course
    /// name and public identifier.
    pub fn list_certificates(
        &self,
        filter: Option<&str>,
        sort: SortField,
        order: SortOrder,
    ) -> Result<Vec<CertificateRecord>, DbError> {
        let filter = filter.map(str::trim).filter(|f| !f.is_empty());
        self.with_conn(|conn| {
            let rows = match filter {
                Some(f) => {
                    let pattern = format!("%{f}%");
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {COLUMNS} FROM certificates
                         WHERE student_name LIKE ?1 OR course_name LIKE ?1 OR certificate_id LIKE ?1
                         ORDER BY {} {}",
                        sort.column(),
                        order.keyword()
                    ))?;
                    let mapped = stmt.query_map(params![pattern], row_to_record)?;
                    mapped.collect::<rusqlite::Result<Vec<_>>>()?
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {COLUMNS} FROM certificates ORDER BY {} {}",
                        sort.column(),
                        order.keyword()
                    ))?;
                    let mapped = stmt.query_map([], row_to_record)?;
                    mapped.collect::<rusqlite::Result<Vec<_>>>()?
                }
            };
            Ok(rows)
        })
    }

    pub fn get_certificate(&self, id: i64) -> Result<Option<CertificateRecord>, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM certificates WHERE id = ?1"),
                params![id],
                row_to_record,
            )
            .optional()
            .map_err(DbError::Sqlite)
        })
    }

    pub fn get_certificate_by_certificate_id(
        &self,
        certificate_id: &str,
    ) -> Result<Option<CertificateRecord>, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM certificates WHERE certificate_id = ?1"),
                params![certificate_id.trim()],
                row_to_record,
            )
            .optional()
            .map_err(DbError::Sqlite)
        })
    }

    /// Apply a partial update and return the stored row.
    ///
    /// The public identifier and creation time cannot be patched.
    pub fn update_certificate(
        &self,
        id: i64,
        patch: &CertificatePatch,
    ) -> Result<CertificateRecord, DbError> {
        fn push_optional(
            sets: &mut Vec<String>,
            values: &mut Vec<Box<dyn rusqlite::ToSql>>,
            column: &str,
            value: &Option<String>,
        ) {
            if value.is_some() {
                sets.push(format!("{column} = ?{}", values.len() + 1));
                values.push(Box::new(clean(value)));
            }
        }

        let mut sets: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(v) = &patch.student_name {
            let v = v.trim().to_string();
            if v.is_empty() {
                return Err(DbError::InvalidData(
                    "student_name must not be empty".to_string(),
                ));
            }
            sets.push(format!("student_name = ?{}", values.len() + 1));
            values.push(Box::new(v));
        }
        if let Some(v) = &patch.course_name {
            let v = v.trim().to_string();
            if v.is_empty() {
                return Err(DbError::InvalidData(
                    "course_name must not be empty".to_string(),
                ));
            }
            sets.push(format!("course_name = ?{}", values.len() + 1));
            values.push(Box::new(v));
        }
        push_optional(&mut sets, &mut values, "father_name", &patch.father_name);
        push_optional(&mut sets, &mut values, "duration", &patch.duration);
        push_optional(&mut sets, &mut values, "completion_date", &patch.completion_date);
        push_optional(&mut sets, &mut values, "grade", &patch.grade);
        push_optional(&mut sets, &mut values, "coordinator_name", &patch.coordinator_name);
        push_optional(&mut sets, &mut values, "roll_no", &patch.roll_no);
        push_optional(&mut sets, &mut values, "batch_number", &patch.batch_number);

        if sets.is_empty() {
            return self
                .get_certificate(id)?
                .ok_or_else(|| DbError::NotFound(format!("certificate {id}")));
        }

        self.with_conn(|conn| {
            values.push(Box::new(id));
            let sql = format!(
                "UPDATE certificates SET {} WHERE id = ?{}",
                sets.join(", "),
                values.len()
            );
            let refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
            let changed = conn.execute(&sql, &refs[..])?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("certificate {id}")));
            }
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM certificates WHERE id = ?1"),
                params![id],
                row_to_record,
            )
            .map_err(DbError::Sqlite)
        })
    }

    pub fn delete_certificate(&self, id: i64) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM certificates WHERE id = ?1", params![id])?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("certificate {id}")));
            }
            Ok(())
        })
    }

    pub fn count_certificates(&self) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM certificates", [], |row| row.get(0))
                .map_err(DbError::Sqlite)
        })
    }
}
