use sea_orm::entity::prelude::*;

/// A guild-defined text trigger and the response it produces.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "custom_command")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub guild_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub command: String,
    pub response: String,
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
