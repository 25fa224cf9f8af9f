use std::time::Duration;

use thiserror::Error;

use crate::error::{platform::PlatformError, prefix::PrefixError, AppError};

/// Failure of a single chat command.
///
/// Classified variants carry the text shown to the invoker. Everything else is logged by the
/// dispatcher and answered with a generic line, leaving the connection untouched.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Missing required subcommand. Correct syntax: `{usage}`.")]
    MissingSubcommand { usage: String },

    #[error("Missing required argument: `{name}`. Correct syntax: `{usage}`.")]
    MissingArgument { name: String, usage: String },

    #[error("{0}")]
    BadArgument(String),

    #[error("A role **{0}** was not found.")]
    RoleNotFound(String),

    #[error("The role **{0}** cannot be used in this command.")]
    BadRole(String),

    #[error("A member **{0}** was not found.")]
    MemberNotFound(String),

    #[error("A user **{0}** was not found.")]
    UserNotFound(String),

    #[error("A member or user **{0}** was not found.")]
    MemberOrUserNotFound(String),

    #[error("An emote **{0}** was not found.")]
    EmojiNotFound(String),

    #[error("Forbidden. I may need more permissions for this action.")]
    Forbidden,

    #[error("I am missing permission(s) for this command: {}.", .0.join(", "))]
    BotMissingPermissions(Vec<String>),

    #[error("I cannot use this command on members with the same or a higher top role than I have.")]
    BotTooLowInHierarchy,

    #[error("Command `{0}` cannot be used in private messages.")]
    NoPrivateMessage(String),

    #[error("You don't have permissions for this command.")]
    MissingPermissions,

    #[error("You don't have permissions for this command.")]
    NotOwner,

    #[error("You cannot use this commands on members with the same or a higher top role than you have.")]
    TooLowInHierarchy,

    /// Self-service assignment of a role ranked at or above the invoker's top role, or one
    /// granting permissions the invoker lacks.
    #[error("You cannot give yourself the role **{0}**.")]
    CannotSelfAssign(String),

    #[error("You don't have permissions to use this command on other people.")]
    MissingPermissionsAndNotOnSelf,

    #[error("This command is on cooldown. Try again in **{:.2}** second(s).", .0.as_secs_f64())]
    OnCooldown(Duration),

    #[error("{0}")]
    InvalidPrefix(#[from] PrefixError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),

    #[error(transparent)]
    App(Box<AppError>),
}

impl From<AppError> for CommandError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::PlatformErr(err) => CommandError::from(err),
            AppError::DbErr(err) => CommandError::Database(err),
            err => CommandError::App(Box::new(err)),
        }
    }
}

impl CommandError {
    /// Chat response for classified failures, `None` for unexpected ones.
    pub fn user_message(&self) -> Option<String> {
        match self {
            CommandError::Platform(PlatformError::Forbidden) => {
                Some(CommandError::Forbidden.to_string())
            }
            CommandError::Platform(_) | CommandError::Database(_) | CommandError::App(_) => None,
            other => Some(other.to_string()),
        }
    }
}
