/// Timestamps written to the severity logs carry the configured zone.
pub type LocalTimestamp = chrono::DateTime<chrono_tz::Tz>;

/// Structured context attached to a log entry.
pub type LogContext = serde_json::Map<String, serde_json::Value>;
