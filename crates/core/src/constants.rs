//! Fixed application constants.
//!
//! Values here never change at runtime. Anything that differs between
//! deployments belongs in [`crate::settings::Settings`] instead.

// ---------------------------------------------------------------------------
// Application identity
// ---------------------------------------------------------------------------

/// Application name used in banners and log context.
pub const APP_NAME: &str = "EDI Processing Hub";

/// Application version, taken from the crate manifest.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Operating company name.
pub const COMPANY_NAME: &str = "Greenfield Automotive Components";

/// Timezone used when `EDI_TIMEZONE` is not set.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

// ---------------------------------------------------------------------------
// Timestamp formats (chrono `strftime` syntax)
// ---------------------------------------------------------------------------

/// Calendar date, e.g. `2024-03-01`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date and time as written into the severity logs, e.g. `2024-03-01 14:05:09`.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// EDI delimiters (X12)
// ---------------------------------------------------------------------------

/// Separates data elements within a segment.
pub const ELEMENT_SEPARATOR: char = '*';

/// Terminates a segment.
pub const SEGMENT_TERMINATOR: char = '~';

/// Separates components of a composite element.
pub const SUB_ELEMENT_SEPARATOR: char = '>';

// ---------------------------------------------------------------------------
// Organizational defaults
// ---------------------------------------------------------------------------

/// Unit of measure applied when a document omits one ("each").
pub const DEFAULT_UOM: &str = "EA";

/// Ship-from organization used when none is configured per partner.
pub const DEFAULT_ORGANIZATION: &str = "Greenfield Automotive - Plant 1";

/// Supplier name reported to trading partners.
pub const DEFAULT_SUPPLIER_NAME: &str = "Greenfield Automotive Components";

// ---------------------------------------------------------------------------
// Filesystem layout
// ---------------------------------------------------------------------------

/// Data directory under the install root.
pub const DATA_DIR_NAME: &str = "data";

/// Incoming documents, under the data directory.
pub const INBOX_DIR_NAME: &str = "inbox";

/// Outgoing documents, under the data directory.
pub const OUTBOX_DIR_NAME: &str = "outbox";

/// Processed documents, under the data directory.
pub const ARCHIVE_DIR_NAME: &str = "archive";

/// Log directory under the install root.
pub const LOG_DIR_NAME: &str = "logs";

/// Scratch directory under the temp root.
pub const TEMP_DIR_NAME: &str = "edi_processing";

/// Permission bits for lazily created directories (Unix only).
pub const DIR_MODE: u32 = 0o755;

/// Receives `ERROR` entries.
pub const ERROR_LOG_FILE: &str = "error.log";

/// Receives `INFO` entries.
pub const INFO_LOG_FILE: &str = "info.log";
