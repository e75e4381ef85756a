use tracing::error;
use twilight_model::{gateway::payload::incoming::MessageCreate, guild::Permissions};

use crate::moderation::actions::{notify_member, restrict_member};
use crate::moderation::embeds::{
    fetch_target_profile, gateway_failure_message, guild_only_message, moderation_action_embed,
    moderation_self_action_message, permission_denied_message, usage_message,
};
use crate::CommandMeta;
use warden_core::Context;
use warden_utils::parse::{format_duration_ms, parse_duration_ms, parse_target_user_id};
use warden_utils::permissions::has_message_permission;

pub const META: CommandMeta = CommandMeta {
    name: "mute",
    desc: "Restrict a user for a duration (e.g. 10m, 2h, 1d).",
    category: "moderation",
    usage: "!mute <user> <duration> [reason]",
};

/// Apply the timed restriction role to a target user.
///
/// Manual restrictions are not written to the punishment history; only
/// removals are recorded there.
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

    if target_user_id == msg.author.id {
        http.create_message(msg.channel_id)
            .content(&moderation_self_action_message("mute"))
            .await?;
        return Ok(());
    }

    let (raw_duration, reason) = match arg_tail {
        Some(tail) => {
            let mut parts = tail.splitn(2, char::is_whitespace);
            let first = parts.next().unwrap_or("");
            let rest = parts
                .next()
                .map(str::trim)
                .filter(|value| !value.is_empty());
            (first, rest)
        }
        None => ("", None),
    };

    let Some(duration_ms) = parse_duration_ms(raw_duration) else {
        http.create_message(msg.channel_id)
            .content("That duration doesn't parse. Use forms like `30s`, `10m`, `2h`, or `1d`.")
            .await?;
        return Ok(());
    };

    let reason = reason.unwrap_or("No reason provided");
    if let Err(source) = restrict_member(&ctx, guild_id, target_user_id, duration_ms, reason).await
    {
        error!(?source, "mute request failed");
        http.create_message(msg.channel_id)
            .content(&gateway_failure_message("mute"))
            .await?;
        return Ok(());
    }

    let duration_label = format_duration_ms(duration_ms);
    notify_member(
        http,
        target_user_id,
        &format!("You have been muted for {duration_label}. Reason: {reason}"),
    )
    .await;

    let target_profile = fetch_target_profile(http, target_user_id).await;
    let embed = moderation_action_embed(
        &target_profile,
        target_user_id,
        "muted",
        Some(reason),
        Some(&duration_label),
    )?;
    http.create_message(msg.channel_id).embeds(&[embed]).await?;

    Ok(())
}
