use twilight_model::{gateway::payload::incoming::MessageCreate, guild::Permissions};

use crate::moderation::embeds::{guild_only_message, permission_denied_message, usage_message};
use crate::CommandMeta;
use warden_core::Context;
use warden_utils::parse::parse_target_user_id;
use warden_utils::permissions::has_message_permission;

pub const META: CommandMeta = CommandMeta {
    name: "clearbans",
    desc: "Erase a user's ban history and reset their escalation level.",
    category: "moderation",
    usage: "!clearbans <user>",
};

/// Empty a user's removal history. This is the explicit reset that winds the
/// escalation ladder back to its first rung.
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

    let removed = ctx
        .store
        .clear_restrictions(guild_id.get(), target_user_id.get())
        .await;

    let reply = format!(
        "Cleared {removed} ban record(s) for <@{}> and reset their escalation level.",
        target_user_id.get()
    );
    http.create_message(msg.channel_id).content(&reply).await?;

    Ok(())
}
