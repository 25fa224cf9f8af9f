use crate::{data::user_data::UserDataRepository, model::moderation::CounterChange};
use sea_orm::{DbErr, EntityTrait, PaginatorTrait};
use test_utils::{builder::TestBuilder, factory};

mod apply;
mod find;
