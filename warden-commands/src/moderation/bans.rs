use twilight_model::{gateway::payload::incoming::MessageCreate, guild::Permissions};

use crate::moderation::embeds::{
    fetch_target_profile, guild_only_message, permission_denied_message,
    restrictions_overview_embed, usage_message,
};
use crate::CommandMeta;
use warden_core::Context;
use warden_utils::parse::parse_target_user_id;
use warden_utils::permissions::has_message_permission;

pub const META: CommandMeta = CommandMeta {
    name: "bans",
    desc: "List a user's ban history.",
    category: "moderation",
    usage: "!bans <user>",
};

/// Show the flat chronological ban/removal history for a user.
pub async fn run(ctx: Context, msg: Box<MessageCreate>, arg1: Option<&str>) -> anyhow::Result<()> {
    let http = &ctx.http;
    let Some(guild_id) = msg.guild_id else {
        http.create_message(msg.channel_id)
            .content(guild_only_message())
            .await?;
        return Ok(());
    };

    if !has_message_permission(http, &msg, Permissions::BAN_MEMBERS).await? {
        http.create_message(msg.channel_id)
            .content(permission_denied_message())
            .await?;
        return Ok(());
    }

    let Some(target_user_id) = arg1.and_then(parse_target_user_id) else {
        let usage = usage_message(META.usage);
        http.create_message(msg.channel_id).content(&usage).await?;
        return Ok(());
    };

    let restrictions = ctx
        .store
        .restrictions(guild_id.get(), target_user_id.get())
        .await;
    let level = ctx
        .store
        .escalation_level(guild_id.get(), target_user_id.get())
        .await;

    let target_profile = fetch_target_profile(http, target_user_id).await;
    let embed = restrictions_overview_embed(&target_profile, level, &restrictions)?;
    http.create_message(msg.channel_id).embeds(&[embed]).await?;

    Ok(())
}
