//! `edi-core` -- configuration provider for the EDI processing hub.
//!
//! Holds the fixed application constants, the immutable [`settings::Settings`]
//! resolved at startup, the filesystem layout derived from them, and the
//! append-only severity logs.

pub mod constants;
pub mod error;
pub mod event_log;
pub mod paths;
pub mod settings;
pub mod types;
