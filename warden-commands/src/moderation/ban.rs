use tracing::error;
use twilight_http::request::AuditLogReason as _;
use twilight_model::{gateway::payload::incoming::MessageCreate, guild::Permissions};

use crate::moderation::actions::{notify_member, schedule_removal_lift};
use crate::moderation::embeds::{
    fetch_target_profile, guild_only_message, moderation_action_embed,
    moderation_self_action_message, permission_denied_message, usage_message,
};
use crate::CommandMeta;
use warden_core::Context;
use warden_store::RestrictionRecord;
use warden_utils::parse::{format_duration_ms, parse_duration_ms, parse_target_user_id};
use warden_utils::permissions::has_message_permission;
use warden_utils::time::now_unix_ms;

pub const META: CommandMeta = CommandMeta {
    name: "ban",
    desc: "Ban a user, permanently or for a duration.",
    category: "moderation",
    usage: "!ban <user> [duration] [reason]",
};

/// Ban a target user, record the removal, and schedule the unban when a
/// duration was given.
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

    if target_user_id == msg.author.id {
        http.create_message(msg.channel_id)
            .content(&moderation_self_action_message("ban"))
            .await?;
        return Ok(());
    }

    // First tail token is an optional duration; anything that doesn't parse
    // as one belongs to the reason, and the ban is permanent.
    let (duration_ms, reason) = match arg_tail {
        Some(tail) => {
            let mut parts = tail.splitn(2, char::is_whitespace);
            let first = parts.next().unwrap_or("");
            match parse_duration_ms(first) {
                Some(duration) => (
                    Some(duration),
                    parts
                        .next()
                        .map(str::trim)
                        .filter(|value| !value.is_empty()),
                ),
                None => (None, Some(tail)),
            }
        }
        None => (None, None),
    };

    let reason = reason.unwrap_or("No reason provided");
    let entry = RestrictionRecord {
        created_at: now_unix_ms(),
        duration_ms,
        reason: reason.to_owned(),
        issuer_id: msg.author.id.get(),
        issuer_label: msg.author.name.clone(),
    };
    let level = ctx
        .store
        .record_removal(guild_id.get(), target_user_id.get(), entry)
        .await;

    let duration_label = duration_ms.map(format_duration_ms);
    let notice = match duration_label.as_deref() {
        Some(duration) => {
            format!("You have been banned for {duration}. Reason: {reason}")
        }
        None => format!("You have been banned permanently. Reason: {reason}"),
    };
    notify_member(http, target_user_id, &notice).await;

    // The history entry above is the decision of record; a failed gateway
    // call is reported but not rolled back.
    if let Err(source) = http
        .create_ban(guild_id, target_user_id)
        .reason(reason)
        .await
    {
        error!(?source, "ban request failed");
        http.create_message(msg.channel_id)
            .content(
                "The ban was recorded, but the server refused it. \
                 Check role hierarchy and bot permissions.",
            )
            .await?;
        return Ok(());
    }

    if let Some(duration) = duration_ms {
        schedule_removal_lift(&ctx, guild_id, target_user_id, duration);
    }

    let action = format!("banned (escalation level {level})");
    let target_profile = fetch_target_profile(http, target_user_id).await;
    let embed = moderation_action_embed(
        &target_profile,
        target_user_id,
        &action,
        Some(reason),
        duration_label.as_deref(),
    )?;
    http.create_message(msg.channel_id).embeds(&[embed]).await?;

    Ok(())
}
