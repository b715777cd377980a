//! Database schema and migrations.

use rusqlite::Connection;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS certificates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    certificate_id TEXT NOT NULL UNIQUE,
    student_name TEXT NOT NULL,
    course_name TEXT NOT NULL,
    father_name TEXT,
    duration TEXT,
    completion_date TEXT,
    grade TEXT,
    coordinator_name TEXT,
    roll_no TEXT,
    batch_number TEXT,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_certificates_created_at
    ON certificates(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_certificates_student_name
    ON certificates(student_name);
";

/// Apply the schema. Statements are idempotent, so this runs on every open.
pub fn run_migrations(conn: &Connection) -> Result<(), rusqlite::Error> {
    if !table_exists(conn, "certificates")? {
        tracing::info!("Creating certificates table");
    }
    conn.execute_batch(SCHEMA)
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool, rusqlite::Error> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
