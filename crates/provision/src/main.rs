//! `edi-provision` -- one-shot database setup for the EDI processing hub.
//!
//! Connects to the MySQL server, creates the target database if absent,
//! applies the schema file statement by statement, and prints a checklist
//! of the expected tables and seed rows. Takes no arguments; everything is
//! configured through environment variables (see `Settings::from_env`).
//!
//! Exit status: `0` on success (including verification failures unless
//! `EDI_STRICT_VERIFY` is set), `1` if any step through schema execution
//! fails, `2` on verification failure in strict mode.

use std::process::ExitCode;

use edi_core::constants::{APP_NAME, APP_VERSION, LOG_DIR_NAME};
use edi_core::event_log::EventLog;
use edi_core::paths::Paths;
use edi_core::settings::Settings;
use edi_core::types::LogContext;
use edi_db::MySqlTarget;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "edi_provision=info,edi_db=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // --- Configuration ---
    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::from(edi_provision::EXIT_FAILURE);
        }
    };
    tracing::info!(
        app = APP_NAME,
        version = APP_VERSION,
        database = ?settings.database,
        schema = %settings.provisioning.schema_path.display(),
        "Loaded provisioning settings",
    );

    // --- Severity logs ---
    let paths = Paths::from_settings(&settings);
    let log_dir = paths.log_path().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Could not create log directory");
        paths.install_root().join(LOG_DIR_NAME)
    });
    let log = EventLog::new(log_dir, settings.timezone);

    let mut ctx = LogContext::new();
    ctx.insert("database".into(), json!(settings.database.name));
    ctx.insert("host".into(), json!(settings.database.host));
    log.log_info("Provisioning started", &ctx);

    // --- Connection ---
    println!("{APP_NAME} database setup");
    let mut target = match MySqlTarget::connect(&settings.database).await {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Connection failed: {e}");
            log.log_error(&format!("Connection failed: {e}"), &ctx);
            return ExitCode::from(edi_provision::EXIT_FAILURE);
        }
    };
    println!("Connected to {}:{}", settings.database.host, settings.database.port);

    // --- Provisioning ---
    let mut stdout = std::io::stdout();
    let result = edi_provision::run(&mut target, &settings, &mut stdout).await;
    edi_provision::journal(&log, &settings, &result);

    if let Err(e) = target.close().await {
        tracing::debug!(error = %e, "Error closing database connection");
    }

    let status = edi_provision::exit_status(&result, settings.provisioning.strict_verify);
    match &result {
        Ok(outcome) if outcome.report.all_passed() => println!("Database setup complete"),
        Ok(_) => println!("Database setup finished with verification failures"),
        Err(e) => {
            eprintln!("{}", edi_provision::describe_failure(e));
            eprintln!("Database setup failed: {e}");
        }
    }
    ExitCode::from(status)
}
