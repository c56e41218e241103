/// Errors raised while resolving [`crate::settings::Settings`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    InvalidValue {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("Unknown timezone '{0}'")]
    UnknownTimezone(String),

    #[error("{0} must list at least one table")]
    EmptyTableList(&'static str),

    #[error("Invalid database identifier '{0}': only alphanumeric, '_' and '-' allowed")]
    InvalidIdentifier(String),
}
