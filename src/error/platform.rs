use thiserror::Error;

/// Failure of an outbound platform action.
///
/// Forbidden and not-found responses are classified so callers can degrade gracefully
/// instead of failing the whole command.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("missing access for this action")]
    Forbidden,

    #[error("the requested resource does not exist")]
    NotFound,

    /// The gateway connection is closed or was never attached.
    #[error("connection closed")]
    ConnectionClosed,

    #[error("{0}")]
    Other(String),
}

impl From<serenity::Error> for PlatformError {
    fn from(err: serenity::Error) -> Self {
        if let serenity::Error::Http(ref http) = err {
            match http.status_code().map(|status| status.as_u16()) {
                Some(403) => return PlatformError::Forbidden,
                Some(404) => return PlatformError::NotFound,
                _ => {}
            }
        }

        PlatformError::Other(err.to_string())
    }
}
