use serenity::all::{Context, GuildId, Member, User};

use crate::bot::{convert, Bot};

/// Handle a member joining a guild
pub async fn handle_guild_member_addition(bot: &Bot, _ctx: Context, new_member: Member) {
    bot.on_member_join(new_member.guild_id.get(), convert::user_info(&new_member.user))
        .await;
}

/// Handle a member leaving a guild, classified as kick or leave by the bot
pub async fn handle_guild_member_removal(
    bot: &Bot,
    _ctx: Context,
    guild_id: GuildId,
    user: User,
    _member_data_if_available: Option<Member>,
) {
    let dispatched = bot
        .on_member_remove(guild_id.get(), convert::user_info(&user))
        .await;

    if dispatched.is_some() {
        tracing::debug!("Member {} removed from guild {}", user.id, guild_id);
    }
}

/// Handle a user being banned from a guild
pub async fn handle_guild_ban_addition(bot: &Bot, _ctx: Context, guild_id: GuildId, banned_user: User) {
    bot.on_ban(guild_id.get(), convert::user_info(&banned_user))
        .await;
}

/// Handle a user being unbanned from a guild
pub async fn handle_guild_ban_removal(
    bot: &Bot,
    _ctx: Context,
    guild_id: GuildId,
    unbanned_user: User,
) {
    bot.on_unban(guild_id.get(), convert::user_info(&unbanned_user))
        .await;
}
