//! SeaORM entities for the moderation bot's persistence layer.

pub mod prelude;

pub mod custom_command;
pub mod guild_config;
pub mod user_data;
