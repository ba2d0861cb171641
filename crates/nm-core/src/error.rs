//! Error types for nm-core

use thiserror::Error;

/// Core error type for neomigrate
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Settings file not found
    #[error("[E001] Settings file not found: {path}")]
    SettingsNotFound { path: String },

    /// E002: Failed to parse settings file
    #[error("[E002] Failed to parse settings in {path}: {message}")]
    SettingsParseError { path: String, message: String },

    /// E003: Invalid settings value
    #[error("[E003] Invalid settings: {message}")]
    SettingsInvalid { message: String },

    /// E004: Unknown migration type read back from storage
    #[error("[E004] Unknown migration type '{found}' (expected CYPHER or ACTION)")]
    UnknownMigrationKind { found: String },

    /// E005: IO error with file path context
    #[error("[E005] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
