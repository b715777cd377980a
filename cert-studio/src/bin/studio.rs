//! Headless studio binary.
//!
//! Issues, lists, verifies, exports and deletes certificates from the
//! command line. Deletion reads the one-time code from stdin.

use std::io::Write as _;

use tracing_subscriber::EnvFilter;

use cert_studio::app::SharedState;
use cert_studio::services::issuance::CertificateForm;
use registry_db::{CertificatePatch, CertificateStore, SortField, SortOrder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let (db, config, dir) = cert_studio::init_foundation()?;
    let state = SharedState::new(db, config, dir);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        ["issue", student, course] => issue(&state, student, course, None).await?,
        ["issue", student, course, father] => {
            issue(&state, student, course, Some(*father)).await?;
        }
        ["amend", key, field, value] => {
            let storage_key: i64 = key.parse()?;
            let patch = field_patch(field, value)?;
            let record = state.issuance().await.amend(storage_key, &patch)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        ["list"] => {
            let records = state
                .db()
                .list_sorted(None, SortField::CreatedAt, SortOrder::Desc)?;
            for r in &records {
                println!(
                    "{:>4}  {}  {}  {}",
                    r.id, r.certificate_id, r.student_name, r.course_name
                );
            }
            println!("{} certificate(s)", records.len());
        }
        ["verify", id] => {
            let result = state.verification().await.verify(id);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        ["export", id] => {
            let path = state.export().await?.export_by_certificate_id(id).await?;
            println!("{}", path.display());
        }
        ["export-all"] => {
            let records = state
                .db()
                .list_sorted(None, SortField::CreatedAt, SortOrder::Asc)?;
            let path = state.export().await?.export_batch(&records).await?;
            println!("{}", path.display());
        }
        ["delete", key] => {
            let storage_key: i64 = key.parse()?;
            let gate = state.delete_gate();
            gate.request(storage_key, "operator-console")?;

            print!("Enter the one-time code: ");
            std::io::stdout().flush()?;
            let mut code = String::new();
            std::io::stdin().read_line(&mut code)?;

            gate.confirm(&code)?;
            println!("Deleted certificate {storage_key}");
        }
        _ => {
            eprintln!("Usage: studio <command>");
            eprintln!("  issue <student> <course> [father]  issue a new certificate");
            eprintln!("  amend <storage-key> <field> <val>  change one field of a certificate");
            eprintln!("  list                               list issued certificates");
            eprintln!("  verify <certificate-id>            check a public id");
            eprintln!("  export <certificate-id>            export one certificate as PDF");
            eprintln!("  export-all                         export everything into one PDF");
            eprintln!("  delete <storage-key>               delete after a one-time code check");
            std::process::exit(2);
        }
    }
    Ok(())
}

async fn issue(
    state: &SharedState,
    student: &str,
    course: &str,
    father: Option<&str>,
) -> anyhow::Result<()> {
    let form = CertificateForm {
        student_name: student.to_string(),
        course_name: course.to_string(),
        father_name: father.map(str::to_string),
        ..CertificateForm::default()
    };
    let record = state.issuance().await.issue(&form)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn field_patch(field: &str, value: &str) -> anyhow::Result<CertificatePatch> {
    let mut patch = CertificatePatch::default();
    let slot = match field {
        "student-name" => &mut patch.student_name,
        "course-name" => &mut patch.course_name,
        "father-name" => &mut patch.father_name,
        "duration" => &mut patch.duration,
        "completion-date" => &mut patch.completion_date,
        "grade" => &mut patch.grade,
        "coordinator-name" => &mut patch.coordinator_name,
        "roll-no" => &mut patch.roll_no,
        "batch-number" => &mut patch.batch_number,
        other => anyhow::bail!("unknown field: {other}"),
    };
    *slot = Some(value.to_string());
    Ok(patch)
}
