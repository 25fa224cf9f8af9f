/// A guild-defined trigger and the text sent when it is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomCommand {
    pub guild_id: u64,
    pub command: String,
    pub response: String,
}

impl CustomCommand {
    pub fn from_entity(entity: entity::custom_command::Model) -> Self {
        Self {
            guild_id: entity.guild_id as u64,
            command: entity.command,
            response: entity.response,
        }
    }
}
