pub use super::custom_command::Entity as CustomCommand;
pub use super::guild_config::Entity as GuildConfig;
pub use super::user_data::Entity as UserData;
