use tracing::error;
use twilight_http::request::AuditLogReason as _;
use twilight_model::{gateway::payload::incoming::MessageCreate, guild::Permissions};

use crate::moderation::embeds::{
    fetch_target_profile, gateway_failure_message, guild_only_message, moderation_action_embed,
    moderation_self_action_message, permission_denied_message, usage_message,
};
use crate::CommandMeta;
use warden_core::Context;
use warden_utils::parse::parse_target_user_id;
use warden_utils::permissions::has_message_permission;

pub const META: CommandMeta = CommandMeta {
    name: "kick",
    desc: "Kick a user from the server (leaves no record).",
    category: "moderation",
    usage: "!kick <user> [reason]",
};

/// One-shot removal without a history entry.
pub async fn run(
    ctx: Context,
    msg: Box<MessageCreate>,
    arg1: Option<&str>,
    arg_tail: Option<&str>,
) -> anyhow::Result<()> {
    let http = &ctx.http;
    let Some(guild_id) = msg.guild_id else {
        http.create_message(msg.channel_id)
            .content(guild_only_message())
            .await?;
        return Ok(());
    };

    if !has_message_permission(http, &msg, Permissions::KICK_MEMBERS).await? {
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

    if target_user_id == msg.author.id {
        http.create_message(msg.channel_id)
            .content(&moderation_self_action_message("kick"))
            .await?;
        return Ok(());
    }

    let mut request = http.remove_guild_member(guild_id, target_user_id);
    if let Some(reason) = arg_tail {
        request = request.reason(reason);
    }

    if let Err(source) = request.await {
        error!(?source, "kick request failed");
        http.create_message(msg.channel_id)
            .content(&gateway_failure_message("kick"))
            .await?;
        return Ok(());
    }

    let target_profile = fetch_target_profile(http, target_user_id).await;
    let embed = moderation_action_embed(&target_profile, target_user_id, "kicked", arg_tail, None)?;
    http.create_message(msg.channel_id).embeds(&[embed]).await?;

    Ok(())
}
