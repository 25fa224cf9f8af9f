//! Error types for the moderation bot.
//!
//! Each concern owns its own error enum. `AppError` is the top-level type returned from
//! startup, lifecycle and persistence paths and wraps the domain-specific errors with
//! `#[from]` so `?` converts them automatically. Errors raised while running a single chat
//! command use `CommandError`, which the dispatcher turns into a chat response.

pub mod command;
pub mod config;
pub mod module;
pub mod platform;
pub mod prefix;

use thiserror::Error;

use crate::{
    bot::lifecycle::LifecycleState,
    error::{config::ConfigError, module::ModuleError, platform::PlatformError},
};

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid or unreadable runtime configuration. Fatal at startup.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Database operation error from SeaORM.
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),

    /// Discord client error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// An outbound platform action failed.
    #[error(transparent)]
    PlatformErr(#[from] PlatformError),

    /// Installing or removing a command module failed.
    #[error(transparent)]
    ModuleErr(#[from] ModuleError),

    /// A second lifecycle manager was constructed while the first one is alive.
    #[error("A bot instance has already been initialised.")]
    InstanceAlreadyExists,

    /// The connection state machine refused a transition.
    #[error("Invalid connection state transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
    },
}

/// Manual conversion from serenity::Error to AppError.
///
/// Boxes the error to reduce the size of the AppError enum, as serenity::Error
/// is very large and would make all AppError variants larger if not boxed.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}
