//! `edi-db` -- MySQL provisioning for the EDI processing hub.
//!
//! Creates the target database, applies a schema file statement by
//! statement, and verifies the resulting tables and seed rows.

pub mod connection;
pub mod error;
pub mod provision;
pub mod schema;
pub mod target;

pub use connection::{connect_server, health_check};
pub use error::ProvisionError;
pub use provision::{apply_statements, create_database, verify, TableCheck, VerificationReport};
pub use schema::{load_schema, split_statements};
pub use target::{MySqlTarget, ProvisionTarget};
