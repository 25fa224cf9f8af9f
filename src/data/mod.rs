//! Repositories mapping domain models onto the `entity` tables.

pub mod custom_command;
pub mod guild_config;
pub mod user_data;

#[cfg(test)]
mod test;

pub use custom_command::CustomCommandRepository;
pub use guild_config::GuildConfigRepository;
pub use user_data::UserDataRepository;
