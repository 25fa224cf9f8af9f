use crate::data::guild_config::GuildConfigRepository;
use sea_orm::{DbErr, EntityTrait, PaginatorTrait};
use test_utils::{builder::TestBuilder, factory};

mod create_default;
mod find;
mod missing_guild_ids;
mod set_log_channel;
mod set_prefix;
