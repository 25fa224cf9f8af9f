use crate::error::prefix::PrefixError;

/// Longest prefix a guild may configure.
pub const MAX_PREFIX_LEN: usize = 3;

/// Validates a command prefix after trimming surrounding whitespace.
///
/// # Arguments
/// - `prefix` - Prefix as typed by the user or read from the config file
///
/// # Returns
/// - `Ok(String)` - The trimmed prefix, 1 to 3 ASCII characters
/// - `Err(PrefixError)` - Empty, too long, or containing non-ASCII characters
pub fn validate_prefix(prefix: &str) -> Result<String, PrefixError> {
    let prefix = prefix.trim();

    if prefix.is_empty() {
        return Err(PrefixError::Empty);
    }
    if prefix.chars().count() > MAX_PREFIX_LEN {
        return Err(PrefixError::TooLong);
    }
    if !prefix.is_ascii() {
        return Err(PrefixError::NonAscii);
    }

    Ok(prefix.to_string())
}
