use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings document failed validation.
    ///
    /// The message names every offending field.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A field outside the recognized set was read or written.
    #[error("Unknown config setting '{0}'.")]
    AttributeUnknown(String),

    /// Settings can be added and updated but never removed.
    #[error("Config setting '{0}' cannot be deleted.")]
    DeletionUnsupported(String),

    /// The backing file could not be read or written.
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a JSON document.
    #[error("Failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),
}
