use tracing::error;
use twilight_model::{gateway::payload::incoming::MessageCreate, guild::Permissions};

use crate::moderation::actions::remove_restriction;
use crate::moderation::embeds::{
    fetch_target_profile, gateway_failure_message, guild_only_message, moderation_action_embed,
    permission_denied_message, usage_message,
};
use crate::CommandMeta;
use warden_core::Context;
use warden_utils::parse::parse_target_user_id;
use warden_utils::permissions::has_message_permission;

pub const META: CommandMeta = CommandMeta {
    name: "unmute",
    desc: "Lift a user's restriction early.",
    category: "moderation",
    usage: "!unmute <user>",
};

/// Remove the restriction role. Succeeds even if the user was never muted
/// or the scheduled reversal already fired.
pub async fn run(ctx: Context, msg: Box<MessageCreate>, arg1: Option<&str>) -> anyhow::Result<()> {
    let http = &ctx.http;
    let Some(guild_id) = msg.guild_id else {
        http.create_message(msg.channel_id)
            .content(guild_only_message())
            .await?;
        return Ok(());
    };

    if !has_message_permission(http, &msg, Permissions::MODERATE_MEMBERS).await? {
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

    if let Err(source) = remove_restriction(&ctx, guild_id, target_user_id, "Manual unmute").await {
        error!(?source, "unmute request failed");
        http.create_message(msg.channel_id)
            .content(&gateway_failure_message("unmute"))
            .await?;
        return Ok(());
    }

    let target_profile = fetch_target_profile(http, target_user_id).await;
    let embed = moderation_action_embed(&target_profile, target_user_id, "unmuted", None, None)?;
    http.create_message(msg.channel_id).embeds(&[embed]).await?;

    Ok(())
}
