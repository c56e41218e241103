//! Single-connection access to the MySQL server.
//!
//! Provisioning runs strictly one statement at a time, so it holds one
//! [`MySqlConnection`] instead of a pool.

use edi_core::settings::DatabaseSettings;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::Connection;

use crate::error::ProvisionError;

/// Build connect options for the configured server.
///
/// No database is selected; the provisioner creates and selects it.
pub fn connect_options(db: &DatabaseSettings) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&db.host)
        .port(db.port)
        .username(&db.user)
        .password(&db.password)
        .charset(&db.charset)
}

/// Open a connection to the server. Failure maps to [`ProvisionError::Connect`].
pub async fn connect_server(db: &DatabaseSettings) -> Result<MySqlConnection, ProvisionError> {
    let conn = MySqlConnection::connect_with(&connect_options(db))
        .await
        .map_err(ProvisionError::Connect)?;
    tracing::info!(host = %db.host, port = db.port, user = %db.user, "Connected to database server");
    Ok(conn)
}

/// Verify the connection answers a trivial query.
pub async fn health_check(conn: &mut MySqlConnection) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(conn).await?;
    Ok(())
}
