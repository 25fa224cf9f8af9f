use thiserror::Error;

/// Reasons a command prefix is rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixError {
    #[error("Prefix should consist of a minimum of 1 character.")]
    Empty,

    #[error("Prefix should consist of a maximum of 3 characters.")]
    TooLong,

    #[error("Prefix should consist of ascii characters, for example: `$`.")]
    NonAscii,
}
