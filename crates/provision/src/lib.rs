//! `edi-provision` library crate.
//!
//! Composes the `edi-db` steps into one provisioning run and renders its
//! console output. The binary entrypoint lives in `main.rs`.

use std::io::Write;

use edi_core::event_log::EventLog;
use edi_core::settings::Settings;
use edi_core::types::LogContext;
use edi_db::{
    apply_statements, create_database, load_schema, split_statements, verify, ProvisionError,
    ProvisionTarget, VerificationReport,
};
use serde_json::json;

/// Exit status when any step through schema execution fails.
pub const EXIT_FAILURE: u8 = 1;

/// Exit status when verification fails and strict mode is on.
pub const EXIT_VERIFY_FAILED: u8 = 2;

/// Result of a run that got through schema execution.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub applied: usize,
    pub report: VerificationReport,
}

impl Outcome {
    /// `0`, or [`EXIT_VERIFY_FAILED`] when `strict` and verification failed.
    pub fn exit_status(&self, strict: bool) -> u8 {
        if strict && !self.report.all_passed() {
            EXIT_VERIFY_FAILED
        } else {
            0
        }
    }
}

/// Process exit status for a finished run.
///
/// Errors map to [`EXIT_FAILURE`]; a completed run defers to
/// [`Outcome::exit_status`].
pub fn exit_status(result: &Result<Outcome, ProvisionError>, strict: bool) -> u8 {
    match result {
        Ok(outcome) => outcome.exit_status(strict),
        Err(_) => EXIT_FAILURE,
    }
}

/// Create the database, apply the schema and verify the result.
///
/// Progress markers and the verification checklist are written to `out`.
/// The first failing step aborts the run; nothing is rolled back.
pub async fn run<T, W>(
    target: &mut T,
    settings: &Settings,
    out: &mut W,
) -> Result<Outcome, ProvisionError>
where
    T: ProvisionTarget,
    W: Write,
{
    let db = &settings.database;
    let prov = &settings.provisioning;

    create_database(target, db).await?;
    let _ = writeln!(out, "Database `{}` ready", db.name);

    let schema = load_schema(&prov.schema_path)?;
    let statements = split_statements(&schema);
    tracing::info!(
        path = %prov.schema_path.display(),
        count = statements.len(),
        "Loaded schema",
    );
    let _ = writeln!(out, "Applying {} statements", statements.len());

    let applied = apply_statements(target, &statements, |_, _| {
        let _ = write!(out, ".");
        let _ = out.flush();
    })
    .await;
    let _ = writeln!(out);
    let applied = applied?;

    let report = verify(target, &prov.expected_tables, &prov.seed_partner_code).await?;
    let _ = write!(out, "{}", report.render());

    Ok(Outcome { applied, report })
}

/// Human-readable failure text, including the statement preview when a
/// schema statement failed.
pub fn describe_failure(err: &ProvisionError) -> String {
    match err {
        ProvisionError::Statement {
            index,
            preview,
            truncated,
            source,
        } => {
            let ellipsis = if *truncated { "..." } else { "" };
            format!("Error in statement {index}: {source}\nStatement: {preview}{ellipsis}")
        }
        other => other.to_string(),
    }
}

/// Structured context recorded in `error.log` for a failed run.
pub fn failure_context(err: &ProvisionError) -> LogContext {
    let mut ctx = LogContext::new();
    match err {
        ProvisionError::Statement { index, preview, .. } => {
            ctx.insert("statement_index".into(), json!(index));
            ctx.insert("statement_preview".into(), json!(preview));
        }
        ProvisionError::SchemaNotFound { path } | ProvisionError::SchemaRead { path, .. } => {
            ctx.insert("schema_path".into(), json!(path.display().to_string()));
        }
        _ => {}
    }
    ctx
}

/// Record the outcome of a run in the severity logs.
pub fn journal(log: &EventLog, settings: &Settings, result: &Result<Outcome, ProvisionError>) {
    match result {
        Ok(outcome) => {
            let mut ctx = LogContext::new();
            ctx.insert("database".into(), json!(settings.database.name));
            ctx.insert("statements".into(), json!(outcome.applied));
            ctx.insert("verified".into(), json!(outcome.report.all_passed()));
            ctx.insert(
                "missing_tables".into(),
                json!(outcome.report.missing_tables()),
            );
            log.log_info("Provisioning complete", &ctx);
        }
        Err(err) => {
            let mut ctx = failure_context(err);
            ctx.insert("database".into(), json!(settings.database.name));
            log.log_error(&format!("Provisioning failed: {err}"), &ctx);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::Path;

    use assert_matches::assert_matches;
    use edi_core::event_log::Severity;

    use super::*;

    /// In-memory server: `CREATE TABLE <name>` registers a table,
    /// `INSERT INTO trading_partners` adds a partner row, anything
    /// containing `BROKEN` fails.
    #[derive(Default)]
    struct MemoryTarget {
        database: Option<String>,
        tables: Vec<String>,
        partners: i64,
        executed: usize,
    }

    impl ProvisionTarget for MemoryTarget {
        async fn create_database(
            &mut self,
            name: &str,
            _charset: &str,
            _collation: &str,
        ) -> Result<(), sqlx::Error> {
            self.database = Some(name.to_string());
            Ok(())
        }

        async fn execute(&mut self, statement: &str) -> Result<(), sqlx::Error> {
            if statement.contains("BROKEN") {
                return Err(sqlx::Error::Protocol("You have an error in your SQL syntax".into()));
            }
            self.executed += 1;
            if let Some(rest) = statement.strip_prefix("CREATE TABLE ") {
                let name = rest.split_whitespace().next().unwrap_or_default();
                self.tables.push(name.to_string());
            } else if statement.starts_with("INSERT INTO trading_partners") {
                self.partners += 1;
            }
            Ok(())
        }

        async fn list_tables(&mut self) -> Result<Vec<String>, sqlx::Error> {
            Ok(self.tables.clone())
        }

        async fn count_partners(&mut self, _partner_code: &str) -> Result<i64, sqlx::Error> {
            Ok(self.partners)
        }

        async fn count_ship_to_locations(&mut self) -> Result<i64, sqlx::Error> {
            Ok(0)
        }
    }

    const FULL_SCHEMA: &str = "\
-- reference schema
CREATE TABLE trading_partners (id INT);
CREATE TABLE ship_to_locations (id INT);
CREATE TABLE edi_transactions (id INT);
CREATE TABLE delivery_schedules (id INT);
CREATE TABLE shipments (id INT);
CREATE TABLE shipment_items (id INT);
CREATE TABLE customer_edi_configs (id INT);
CREATE TABLE customer_connections (id INT);
INSERT INTO trading_partners VALUES (1);
";

    fn settings_for(dir: &Path, schema: Option<&str>) -> Settings {
        let schema_path = dir.join("database_schema.sql");
        if let Some(sql) = schema {
            std::fs::write(&schema_path, sql).expect("write schema");
        }
        let vars: HashMap<&str, String> = HashMap::from([
            ("EDI_INSTALL_ROOT", dir.display().to_string()),
            ("EDI_SCHEMA_PATH", schema_path.display().to_string()),
            ("EDI_TIMEZONE", "UTC".to_string()),
        ]);
        Settings::from_lookup(|key| vars.get(key).cloned()).expect("settings")
    }

    #[tokio::test]
    async fn full_run_reports_every_check() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let settings = settings_for(dir.path(), Some(FULL_SCHEMA));
        let mut target = MemoryTarget::default();
        let mut out = Vec::new();

        let outcome = run(&mut target, &settings, &mut out).await.expect("run");

        assert_eq!(target.database.as_deref(), Some("edi_processing"));
        assert_eq!(outcome.applied, 9);
        assert!(outcome.report.all_passed());
        assert_eq!(outcome.exit_status(true), 0);

        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("........."));
        assert_eq!(text.matches('✓').count(), 9);
        assert!(text.contains("Trading partner NIFCO present (1)"));
    }

    #[tokio::test]
    async fn verification_failure_only_fails_in_strict_mode() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let settings = settings_for(dir.path(), Some("CREATE TABLE trading_partners (id INT);"));
        let mut target = MemoryTarget::default();
        let mut out = Vec::new();

        let outcome = run(&mut target, &settings, &mut out).await.expect("run");

        assert!(!outcome.report.all_passed());
        assert_eq!(outcome.exit_status(false), 0);
        assert_eq!(outcome.exit_status(true), EXIT_VERIFY_FAILED);
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text.matches('✗').count(), 8);
    }

    #[tokio::test]
    async fn missing_schema_aborts_after_database_creation() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let settings = settings_for(dir.path(), None);
        let mut target = MemoryTarget::default();
        let mut out = Vec::new();

        let err = run(&mut target, &settings, &mut out).await.unwrap_err();

        assert_matches!(err, ProvisionError::SchemaNotFound { .. });
        assert!(target.database.is_some());
        assert_eq!(target.executed, 0);
        assert!(describe_failure(&err).contains("database_schema.sql"));
    }

    #[tokio::test]
    async fn failing_statement_stops_the_run() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let schema = "CREATE TABLE a (id INT);\nCREATE TABLE b (id INT);\nBROKEN STATEMENT;\nCREATE TABLE c (id INT);";
        let settings = settings_for(dir.path(), Some(schema));
        let mut target = MemoryTarget::default();
        let mut out = Vec::new();

        let err = run(&mut target, &settings, &mut out).await.unwrap_err();

        assert_matches!(err, ProvisionError::Statement { index: 3, .. });
        assert_eq!(target.tables, vec!["a", "b"]);
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("..\n"));
        assert!(!text.contains("Verifying"));

        let described = describe_failure(&err);
        assert!(described.contains("Error in statement 3"));
        assert!(described.ends_with("Statement: BROKEN STATEMENT"));

        let ctx = failure_context(&err);
        assert_eq!(ctx["statement_index"], json!(3));
        assert_eq!(ctx["statement_preview"], json!("BROKEN STATEMENT"));
    }

    #[tokio::test]
    async fn long_failing_statement_is_described_with_ellipsis() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let schema = format!("BROKEN {};", "x".repeat(200));
        let settings = settings_for(dir.path(), Some(schema.as_str()));
        let mut target = MemoryTarget::default();

        let err = run(&mut target, &settings, &mut std::io::sink())
            .await
            .unwrap_err();

        let described = describe_failure(&err);
        let expected = format!("Statement: BROKEN {}...", "x".repeat(93));
        assert!(described.ends_with(&expected), "unexpected: {described}");
    }

    #[tokio::test]
    async fn exit_status_covers_every_outcome() {
        let dir = tempfile::tempdir().expect("create temp dir");

        let settings = settings_for(dir.path(), Some(FULL_SCHEMA));
        let result = run(&mut MemoryTarget::default(), &settings, &mut std::io::sink()).await;
        assert_eq!(exit_status(&result, true), 0);

        let settings = settings_for(dir.path(), Some("CREATE TABLE shipments (id INT);"));
        let result = run(&mut MemoryTarget::default(), &settings, &mut std::io::sink()).await;
        assert_eq!(exit_status(&result, false), 0);
        assert_eq!(exit_status(&result, true), EXIT_VERIFY_FAILED);

        let settings = settings_for(dir.path(), Some("BROKEN;"));
        let result = run(&mut MemoryTarget::default(), &settings, &mut std::io::sink()).await;
        assert_eq!(exit_status(&result, false), EXIT_FAILURE);
        assert_eq!(exit_status(&result, true), EXIT_FAILURE);
    }

    #[tokio::test]
    async fn journal_writes_to_severity_logs() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let settings = settings_for(dir.path(), Some("BROKEN;"));
        let log = EventLog::new(dir.path().join("logs"), settings.timezone);
        let mut target = MemoryTarget::default();

        let result = run(&mut target, &settings, &mut std::io::sink()).await;
        journal(&log, &settings, &result);

        let errors =
            std::fs::read_to_string(log.file_path(Severity::Error)).expect("error.log");
        assert!(errors.contains("ERROR: Provisioning failed: Statement 1 failed"));
        assert!(errors.contains("\"statement_index\":1"));
        assert!(!log.file_path(Severity::Info).exists());
    }
}
