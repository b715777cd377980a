//! SQLite registry for issued certificates.

pub mod certificates;
pub mod records;
pub mod schema;

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

pub use records::{CertificatePatch, CertificateRecord, NewCertificate, SortField, SortOrder};

/// Thread-safe database handle wrapping a single SQLite connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.configure()?;
        db.migrate()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.configure()?;
        db.migrate()?;
        Ok(db)
    }

    /// Access the underlying connection with a closure.
    pub fn with_conn<F, R>(&self, f: F) -> Result<R, DbError>
    where
        F: FnOnce(&Connection) -> Result<R, DbError>,
    {
        let conn = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        f(&conn)
    }

    /// Access the underlying connection mutably (for transactions).
    pub fn with_conn_mut<F, R>(&self, f: F) -> Result<R, DbError>
    where
        F: FnOnce(&mut Connection) -> Result<R, DbError>,
    {
        let mut conn = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        f(&mut conn)
    }

    fn configure(&self) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA busy_timeout=5000;
                 PRAGMA foreign_keys=ON;",
            )?;
            Ok(())
        })
    }

    fn migrate(&self) -> Result<(), DbError> {
        self.with_conn(|conn| {
            schema::run_migrations(conn)?;
            Ok(())
        })
    }
}

/// Database error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate certificate id: {0}")]
    Duplicate(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage operations the certificate services depend on.
///
/// `Database` is the production implementation; tests substitute mocks to
/// exercise failure paths.
pub trait CertificateStore: Send + Sync {
    fn create(&self, new: &NewCertificate) -> Result<CertificateRecord, DbError>;
    fn list_sorted(
        &self,
        filter: Option<&str>,
        sort: SortField,
        order: SortOrder,
    ) -> Result<Vec<CertificateRecord>, DbError>;
    fn get_by_storage_key(&self, id: i64) -> Result<Option<CertificateRecord>, DbError>;
    fn get_by_certificate_id(
        &self,
        certificate_id: &str,
    ) -> Result<Option<CertificateRecord>, DbError>;
    fn update(&self, id: i64, patch: &CertificatePatch) -> Result<CertificateRecord, DbError>;
    fn delete(&self, id: i64) -> Result<(), DbError>;
}

impl CertificateStore for Database {
    fn create(&self, new: &NewCertificate) -> Result<CertificateRecord, DbError> {
        self.insert_certificate(new)
    }

    fn list_sorted(
        &self,
        filter: Option<&str>,
        sort: SortField,
        order: SortOrder,
    ) -> Result<Vec<CertificateRecord>, DbError> {
        self.list_certificates(filter, sort, order)
    }

    fn get_by_storage_key(&self, id: i64) -> Result<Option<CertificateRecord>, DbError> {
        self.get_certificate(id)
    }

    fn get_by_certificate_id(
        &self,
        certificate_id: &str,
    ) -> Result<Option<CertificateRecord>, DbError> {
        self.get_certificate_by_certificate_id(certificate_id)
    }

    fn update(&self, id: i64, patch: &CertificatePatch) -> Result<CertificateRecord, DbError> {
        self.update_certificate(id, patch)
    }

    fn delete(&self, id: i64) -> Result<(), DbError> {
        self.delete_certificate(id)
    }
}
