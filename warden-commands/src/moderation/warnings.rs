use twilight_model::{gateway::payload::incoming::MessageCreate, guild::Permissions};

use crate::moderation::embeds::{
    fetch_target_profile, guild_only_message, permission_denied_message, usage_message,
    warnings_overview_embed,
};
use crate::CommandMeta;
use warden_core::Context;
use warden_utils::parse::parse_target_user_id;
use warden_utils::permissions::has_message_permission;
use warden_utils::time::now_unix_ms;

pub const META: CommandMeta = CommandMeta {
    name: "warns",
    desc: "List a user's active warnings.",
    category: "moderation",
    usage: "!warns <user>",
};

/// Show the flat chronological listing of a user's active warnings.
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

    let warnings = ctx
        .store
        .active_warnings(guild_id.get(), target_user_id.get(), now_unix_ms())
        .await;

    let target_profile = fetch_target_profile(http, target_user_id).await;
    let embed = warnings_overview_embed(&target_profile, &warnings)?;
    http.create_message(msg.channel_id).embeds(&[embed]).await?;

    Ok(())
}
