//! The database operations a provisioning run needs.
//!
//! [`ProvisionTarget`] is the seam between the provisioning procedure and
//! the server. [`MySqlTarget`] is the production implementation; tests
//! drive the procedure through an in-memory target.

use edi_core::settings::DatabaseSettings;
use sqlx::mysql::MySqlConnection;
use sqlx::Connection;

use crate::connection::{connect_server, health_check};
use crate::error::ProvisionError;

/// Table holding trading partners and their codes.
pub const PARTNER_TABLE: &str = "trading_partners";

/// Table holding partner ship-to locations.
pub const SHIP_TO_TABLE: &str = "ship_to_locations";

/// Operations executed against the server during provisioning.
pub trait ProvisionTarget {
    /// Create the database if absent and make it the active database.
    ///
    /// Identifiers are interpolated as-is; callers validate them first.
    fn create_database(
        &mut self,
        name: &str,
        charset: &str,
        collation: &str,
    ) -> impl std::future::Future<Output = Result<(), sqlx::Error>> + Send;

    /// Execute one schema statement. Each statement commits on its own.
    fn execute(
        &mut self,
        statement: &str,
    ) -> impl std::future::Future<Output = Result<(), sqlx::Error>> + Send;

    /// Names of the tables in the active database.
    fn list_tables(
        &mut self,
    ) -> impl std::future::Future<Output = Result<Vec<String>, sqlx::Error>> + Send;

    /// Number of trading partners with the given code.
    fn count_partners(
        &mut self,
        partner_code: &str,
    ) -> impl std::future::Future<Output = Result<i64, sqlx::Error>> + Send;

    /// Number of ship-to locations.
    fn count_ship_to_locations(
        &mut self,
    ) -> impl std::future::Future<Output = Result<i64, sqlx::Error>> + Send;
}

/// DDL creating the database with a fixed charset and collation.
pub fn create_database_sql(name: &str, charset: &str, collation: &str) -> String {
    format!("CREATE DATABASE IF NOT EXISTS `{name}` CHARACTER SET {charset} COLLATE {collation}")
}

/// [`ProvisionTarget`] backed by a live MySQL connection.
pub struct MySqlTarget {
    conn: MySqlConnection,
}

impl MySqlTarget {
    pub fn new(conn: MySqlConnection) -> Self {
        Self { conn }
    }

    /// Connect to the configured server and run a health check.
    pub async fn connect(db: &DatabaseSettings) -> Result<Self, ProvisionError> {
        let mut conn = connect_server(db).await?;
        health_check(&mut conn)
            .await
            .map_err(ProvisionError::Connect)?;
        tracing::debug!("Database health check passed");
        Ok(Self::new(conn))
    }

    pub async fn close(self) -> Result<(), sqlx::Error> {
        self.conn.close().await
    }
}

impl ProvisionTarget for MySqlTarget {
    async fn create_database(
        &mut self,
        name: &str,
        charset: &str,
        collation: &str,
    ) -> Result<(), sqlx::Error> {
        // DDL and USE go over the text protocol; USE cannot be prepared.
        let create = create_database_sql(name, charset, collation);
        sqlx::Executor::execute(&mut self.conn, sqlx::raw_sql(&create)).await?;
        tracing::info!(database = %name, "Database created (or already present)");

        let select = format!("USE `{name}`");
        sqlx::Executor::execute(&mut self.conn, sqlx::raw_sql(&select)).await?;
        tracing::info!(database = %name, "Database selected");
        Ok(())
    }

    async fn execute(&mut self, statement: &str) -> Result<(), sqlx::Error> {
        sqlx::Executor::execute(&mut self.conn, sqlx::raw_sql(statement)).await?;
        Ok(())
    }

    async fn list_tables(&mut self) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT CAST(table_name AS CHAR(64))
             FROM information_schema.tables
             WHERE table_schema = DATABASE()
             ORDER BY table_name",
        )
        .fetch_all(&mut self.conn)
        .await
    }

    async fn count_partners(&mut self, partner_code: &str) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM {PARTNER_TABLE} WHERE partner_code = ?");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(partner_code)
            .fetch_one(&mut self.conn)
            .await
    }

    async fn count_ship_to_locations(&mut self) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM {SHIP_TO_TABLE}");
        sqlx::query_scalar::<_, i64>(&query)
            .fetch_one(&mut self.conn)
            .await
    }
}
