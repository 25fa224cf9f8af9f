mod custom_command;
mod guild_config;
mod user_data;
