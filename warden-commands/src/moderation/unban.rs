use tracing::error;
use twilight_http::request::AuditLogReason as _;
use twilight_model::{gateway::payload::incoming::MessageCreate, guild::Permissions};

use crate::moderation::embeds::{
    fetch_target_profile, guild_only_message, moderation_action_embed, permission_denied_message,
    usage_message,
};
use crate::CommandMeta;
use warden_core::Context;
use warden_utils::parse::parse_target_user_id;
use warden_utils::permissions::has_message_permission;

pub const META: CommandMeta = CommandMeta {
    name: "unban",
    desc: "Lift a user's ban early.",
    category: "moderation",
    usage: "!unban <user> [reason]",
};

/// Reverse a removal. A target that is not banned counts as success, since
/// a scheduled reversal may have fired already.
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

    let mut request = http.delete_ban(guild_id, target_user_id);
    if let Some(reason) = arg_tail {
        request = request.reason(reason);
    }

    match request.await {
        Ok(_) => {}
        Err(source)
            if matches!(
                source.kind(),
                twilight_http::error::ErrorType::Response { status, .. } if status.get() == 404
            ) => {}
        Err(source) => {
            error!(?source, "unban request failed");
            http.create_message(msg.channel_id)
                .content("I couldn't unban that user. Check bot permissions.")
                .await?;
            return Ok(());
        }
    }

    let target_profile = fetch_target_profile(http, target_user_id).await;
    let embed =
        moderation_action_embed(&target_profile, target_user_id, "unbanned", arg_tail, None)?;
    http.create_message(msg.channel_id).embeds(&[embed]).await?;

    Ok(())
}
