use twilight_model::{gateway::payload::incoming::MessageCreate, guild::Permissions};

use crate::moderation::embeds::{guild_only_message, permission_denied_message, usage_message};
use crate::CommandMeta;
use warden_core::Context;
use warden_utils::parse::parse_target_user_id;
use warden_utils::permissions::has_message_permission;

pub const META: CommandMeta = CommandMeta {
    name: "clearwarns",
    desc: "Remove all of a user's warnings.",
    category: "moderation",
    usage: "!clearwarns <user>",
};

/// Empty a user's warning list.
pub async fn run(ctx: Context, msg: Box<MessageCreate>, arg1: Option<&str>) -> anyhow::Result<()> {
    let http = &ctx.http;
    let Some(guild_id) = msg.guild_id else {
        http.create_message(msg.channel_id)
            .content(guild_only_message())
            .await?;
        return Ok(());
    };

    if !has_message_permission(http, &msg, Permissions::MANAGE_MESSAGES).await? {
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

    let removed = ctx
        .store
        .clear_warnings(guild_id.get(), target_user_id.get())
        .await;

    let reply = format!(
        "Cleared {removed} warning(s) for <@{}>.",
        target_user_id.get()
    );
    http.create_message(msg.channel_id).content(&reply).await?;

    Ok(())
}
