//! Runtime settings resolved once at process startup.
//!
//! Everything deployment-specific (directories, timezone, database
//! credentials, provisioning checklist) is read here and then passed by
//! reference into the services that need it. Nothing downstream reads
//! environment variables on its own.

use std::fmt;
use std::path::PathBuf;

use chrono_tz::Tz;

use crate::constants::DEFAULT_TIMEZONE;
pub use crate::error::ConfigError;

/// Tables the provisioner expects after applying the reference schema.
pub const DEFAULT_EXPECTED_TABLES: &[&str] = &[
    "trading_partners",
    "ship_to_locations",
    "edi_transactions",
    "delivery_schedules",
    "shipments",
    "shipment_items",
    "customer_edi_configs",
    "customer_connections",
];

/// Trading partner code seeded by the reference schema.
pub const DEFAULT_SEED_PARTNER_CODE: &str = "NIFCO";

/// Immutable application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root of the installation; `data/` and `logs/` live under it.
    pub install_root: PathBuf,
    /// Root for scratch directories (default: the OS temp dir).
    pub temp_root: PathBuf,
    /// Zone applied to every timestamp the application formats.
    pub timezone: Tz,
    pub database: DatabaseSettings,
    pub provisioning: ProvisioningSettings,
}

/// MySQL server connection parameters and target database.
#[derive(Clone)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Database created (if absent) and selected by the provisioner.
    pub name: String,
    pub charset: String,
    pub collation: String,
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("charset", &self.charset)
            .field("collation", &self.collation)
            .finish()
    }
}

/// What the provisioner applies and what it checks afterwards.
#[derive(Debug, Clone)]
pub struct ProvisioningSettings {
    /// Always absolute or rooted at `install_root`.
    pub schema_path: PathBuf,
    /// Kept in sync with the schema by hand; not derived from it.
    pub expected_tables: Vec<String>,
    pub seed_partner_code: String,
    /// When set, a failed verification makes the run exit non-zero.
    pub strict_verify: bool,
}

impl Settings {
    /// Load settings from process environment variables with defaults.
    ///
    /// | Env Var                 | Default                   |
    /// |-------------------------|---------------------------|
    /// | `EDI_INSTALL_ROOT`      | `.`                       |
    /// | `EDI_TEMP_ROOT`         | OS temp dir               |
    /// | `EDI_TIMEZONE`          | `America/New_York`        |
    /// | `DB_HOST`               | `localhost`               |
    /// | `DB_PORT`               | `3306`                    |
    /// | `DB_USER`               | `root`                    |
    /// | `DB_PASSWORD`           | (empty)                   |
    /// | `DB_NAME`               | `edi_processing`          |
    /// | `DB_CHARSET`            | `utf8mb4`                 |
    /// | `DB_COLLATION`          | `utf8mb4_unicode_ci`      |
    /// | `EDI_SCHEMA_PATH`       | `database_schema.sql`     |
    /// | `EDI_EXPECTED_TABLES`   | eight core EDI tables     |
    /// | `EDI_SEED_PARTNER_CODE` | `NIFCO`                   |
    /// | `EDI_STRICT_VERIFY`     | `false`                   |
    ///
    /// A relative `EDI_SCHEMA_PATH` is resolved against `EDI_INSTALL_ROOT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup.
    ///
    /// `from_env` delegates here; tests pass a map instead of mutating the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let install_root = PathBuf::from(var("EDI_INSTALL_ROOT", "."));
        let temp_root = lookup("EDI_TEMP_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);

        let tz_name = var("EDI_TIMEZONE", DEFAULT_TIMEZONE);
        let timezone: Tz = tz_name
            .parse()
            .map_err(|_| ConfigError::UnknownTimezone(tz_name.clone()))?;

        let port_raw = var("DB_PORT", "3306");
        let port: u16 = port_raw.parse().map_err(|_| ConfigError::InvalidValue {
            var: "DB_PORT",
            expected: "a valid u16",
            value: port_raw.clone(),
        })?;

        let database = DatabaseSettings {
            host: var("DB_HOST", "localhost"),
            port,
            user: var("DB_USER", "root"),
            password: var("DB_PASSWORD", ""),
            name: var("DB_NAME", "edi_processing"),
            charset: var("DB_CHARSET", "utf8mb4"),
            collation: var("DB_COLLATION", "utf8mb4_unicode_ci"),
        };
        validate_identifier(&database.name)?;
        validate_identifier(&database.charset)?;
        validate_identifier(&database.collation)?;

        let expected_tables: Vec<String> = match lookup("EDI_EXPECTED_TABLES") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => DEFAULT_EXPECTED_TABLES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };
        if expected_tables.is_empty() {
            return Err(ConfigError::EmptyTableList("EDI_EXPECTED_TABLES"));
        }

        let strict_raw = var("EDI_STRICT_VERIFY", "false");
        let strict_verify = parse_bool(&strict_raw).ok_or(ConfigError::InvalidValue {
            var: "EDI_STRICT_VERIFY",
            expected: "a boolean (true/false/1/0)",
            value: strict_raw.clone(),
        })?;

        let schema_path = PathBuf::from(var("EDI_SCHEMA_PATH", "database_schema.sql"));
        let schema_path = if schema_path.is_absolute() {
            schema_path
        } else {
            install_root.join(schema_path)
        };

        let provisioning = ProvisioningSettings {
            schema_path,
            expected_tables,
            seed_partner_code: var("EDI_SEED_PARTNER_CODE", DEFAULT_SEED_PARTNER_CODE),
            strict_verify,
        };

        Ok(Self {
            install_root,
            temp_root,
            timezone,
            database,
            provisioning,
        })
    }
}

/// Reject identifiers that are unsafe to interpolate into DDL.
///
/// Database names, charsets and collations cannot be bound as parameters,
/// so they are restricted to `[A-Za-z0-9_-]+`.
pub fn validate_identifier(name: &str) -> Result<(), ConfigError> {
    if !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier(name.to_string()))
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
