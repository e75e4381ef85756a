use twilight_model::{gateway::payload::incoming::MessageCreate, guild::Permissions};

use crate::moderation::embeds::{
    fetch_target_profile, guild_only_message, moderation_action_embed, permission_denied_message,
    usage_message,
};
use crate::CommandMeta;
use warden_core::Context;
use warden_store::StoreError;
use warden_utils::parse::parse_target_user_id;
use warden_utils::permissions::has_message_permission;
use warden_utils::time::now_unix_ms;

pub const META: CommandMeta = CommandMeta {
    name: "unwarn",
    desc: "Remove one of a user's active warnings by its listed number.",
    category: "moderation",
    usage: "!unwarn <user> <index>",
};

/// Delete the 1-based indexed active warning from a user's record.
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

    let Some(index) = arg_tail.and_then(|raw| raw.trim().parse::<usize>().ok()) else {
        let usage = usage_message(META.usage);
        http.create_message(msg.channel_id).content(&usage).await?;
        return Ok(());
    };

    let removed = ctx
        .store
        .remove_warning(guild_id.get(), target_user_id.get(), index, now_unix_ms())
        .await;

    let removed = match removed {
        Ok(entry) => entry,
        Err(StoreError::OutOfRange { index, active }) => {
            let reply =
                format!("Warning #{index} doesn't exist; this user has {active} active warning(s).");
            http.create_message(msg.channel_id).content(&reply).await?;
            return Ok(());
        }
    };

    let action = format!("cleared of warning #{index}");
    let target_profile = fetch_target_profile(http, target_user_id).await;
    let embed = moderation_action_embed(
        &target_profile,
        target_user_id,
        &action,
        Some(&removed.reason),
        None,
    )?;
    http.create_message(msg.channel_id).embeds(&[embed]).await?;

    Ok(())
}
