use crate::data::custom_command::CustomCommandRepository;
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod delete;
mod get_many;
mod upsert;
