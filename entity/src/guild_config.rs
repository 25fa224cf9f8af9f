use sea_orm::entity::prelude::*;

/// Per-guild settings, one row for every guild the bot has joined.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "guild_config")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub guild_id: i64,
    pub prefix: String,
    #[sea_orm(default_value = false)]
    pub enable_cc: bool,
    pub log_channel: Option<i64>,
    pub welcome_channel: Option<i64>,
    pub system_channel: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_data::Entity")]
    UserData,
    #[sea_orm(has_many = "super::custom_command::Entity")]
    CustomCommand,
}

impl Related<super::user_data::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserData.def()
    }
}

impl Related<super::custom_command::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomCommand.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
