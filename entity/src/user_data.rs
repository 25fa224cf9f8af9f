use sea_orm::entity::prelude::*;

/// Moderation counters of a single user within a single guild.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_data")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub guild_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    #[sea_orm(default_value = 0)]
    pub current_warns: i32,
    #[sea_orm(default_value = 0)]
    pub total_warns: i32,
    #[sea_orm(default_value = 0)]
    pub total_kicks: i32,
    #[sea_orm(default_value = 0)]
    pub total_bans: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::guild_config::Entity",
        from = "Column::GuildId",
        to = "super::guild_config::Column::GuildId",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    GuildConfig,
}

impl Related<super::guild_config::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GuildConfig.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
