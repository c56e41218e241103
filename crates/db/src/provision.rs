//! Provisioning procedure: create database, apply statements, verify.
//!
//! Each step is a free function over a [`ProvisionTarget`] so the binary
//! composes them and tests can drive them without a server.

use std::collections::HashSet;
use std::fmt::Write as _;

use edi_core::settings::{validate_identifier, DatabaseSettings};

use crate::error::ProvisionError;
use crate::target::{ProvisionTarget, PARTNER_TABLE, SHIP_TO_TABLE};

/// Characters of a failing statement kept in error reports.
pub const STATEMENT_PREVIEW_CHARS: usize = 100;

/// Validate identifiers, then create and select the configured database.
pub async fn create_database<T: ProvisionTarget>(
    target: &mut T,
    db: &DatabaseSettings,
) -> Result<(), ProvisionError> {
    validate_identifier(&db.name)?;
    validate_identifier(&db.charset)?;
    validate_identifier(&db.collation)?;
    target
        .create_database(&db.name, &db.charset, &db.collation)
        .await?;
    Ok(())
}

/// First [`STATEMENT_PREVIEW_CHARS`] characters of `statement`.
pub fn statement_preview(statement: &str) -> String {
    statement.chars().take(STATEMENT_PREVIEW_CHARS).collect()
}

/// Execute `statements` in order, stopping at the first failure.
///
/// `on_applied` is called with the 1-based index of every statement that
/// succeeds. There is no transaction: statements applied before a failure
/// stay applied. Returns the number of statements executed.
pub async fn apply_statements<T, F>(
    target: &mut T,
    statements: &[String],
    mut on_applied: F,
) -> Result<usize, ProvisionError>
where
    T: ProvisionTarget,
    F: FnMut(usize, &str),
{
    for (i, statement) in statements.iter().enumerate() {
        let index = i + 1;
        if let Err(source) = target.execute(statement).await {
            let preview = statement_preview(statement);
            tracing::error!(index, error = %source, preview = %preview, "Schema statement failed");
            return Err(ProvisionError::Statement {
                index,
                preview,
                truncated: statement.chars().count() > STATEMENT_PREVIEW_CHARS,
                source,
            });
        }
        tracing::debug!(index, "Applied schema statement");
        on_applied(index, statement);
    }

    tracing::info!(count = statements.len(), "Schema statements applied");
    Ok(statements.len())
}

/// Presence of one expected table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCheck {
    pub name: String,
    pub present: bool,
}

/// Outcome of the post-provisioning checklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub tables: Vec<TableCheck>,
    pub seed_partner_code: String,
    /// `None` when the partner table itself is missing.
    pub partner_count: Option<i64>,
    /// `None` when the ship-to table itself is missing.
    pub ship_to_count: Option<i64>,
}

impl VerificationReport {
    pub fn missing_tables(&self) -> Vec<&str> {
        self.tables
            .iter()
            .filter(|t| !t.present)
            .map(|t| t.name.as_str())
            .collect()
    }

    pub fn seed_partner_present(&self) -> bool {
        self.partner_count.is_some_and(|n| n > 0)
    }

    /// Every expected table exists and the seed partner row is present.
    ///
    /// The ship-to count is informational only.
    pub fn all_passed(&self) -> bool {
        self.tables.iter().all(|t| t.present) && self.seed_partner_present()
    }

    /// Console checklist, one line per check.
    pub fn render(&self) -> String {
        let mut out = String::from("Verifying tables:\n");
        for table in &self.tables {
            let mark = if table.present { '✓' } else { '✗' };
            let _ = writeln!(out, "  {mark} {}", table.name);
        }

        out.push_str("Verifying seed data:\n");
        match self.partner_count {
            Some(n) if n > 0 => {
                let _ = writeln!(out, "  ✓ Trading partner {} present ({n})", self.seed_partner_code);
            }
            Some(_) => {
                let _ = writeln!(out, "  ✗ Trading partner {} missing", self.seed_partner_code);
            }
            None => {
                let _ = writeln!(
                    out,
                    "  ✗ Trading partner {} not checked ({PARTNER_TABLE} missing)",
                    self.seed_partner_code
                );
            }
        }
        match self.ship_to_count {
            Some(n) => {
                let _ = writeln!(out, "  Ship-to locations: {n}");
            }
            None => {
                let _ = writeln!(out, "  Ship-to locations: not checked ({SHIP_TO_TABLE} missing)");
            }
        }
        out
    }
}

/// Check `expected_tables` against the active database and count seed rows.
///
/// Seed counts are skipped for tables that do not exist.
pub async fn verify<T: ProvisionTarget>(
    target: &mut T,
    expected_tables: &[String],
    seed_partner_code: &str,
) -> Result<VerificationReport, ProvisionError> {
    let existing: HashSet<String> = target.list_tables().await?.into_iter().collect();

    let tables: Vec<TableCheck> = expected_tables
        .iter()
        .map(|name| TableCheck {
            name: name.clone(),
            present: existing.contains(name),
        })
        .collect();

    let partner_count = if existing.contains(PARTNER_TABLE) {
        Some(target.count_partners(seed_partner_code).await?)
    } else {
        None
    };

    let ship_to_count = if existing.contains(SHIP_TO_TABLE) {
        Some(target.count_ship_to_locations().await?)
    } else {
        None
    };

    let report = VerificationReport {
        tables,
        seed_partner_code: seed_partner_code.to_string(),
        partner_count,
        ship_to_count,
    };

    if report.all_passed() {
        tracing::info!("Verification passed");
    } else {
        tracing::warn!(
            missing_tables = ?report.missing_tables(),
            partner_count = ?report.partner_count,
            "Verification failed",
        );
    }
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
