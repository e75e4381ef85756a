use tracing::error;
use twilight_model::{gateway::payload::incoming::MessageCreate, guild::Permissions};

use crate::moderation::actions::apply_escalation;
use crate::moderation::embeds::{
    fetch_target_profile, guild_only_message, moderation_action_embed,
    moderation_self_action_message, permission_denied_message, usage_message,
};
use crate::CommandMeta;
use warden_core::Context;
use warden_store::WarningRecord;
use warden_utils::parse::parse_target_user_id;
use warden_utils::permissions::has_message_permission;
use warden_utils::time::now_unix_ms;

pub const META: CommandMeta = CommandMeta {
    name: "warn",
    desc: "Issue a warning to a user; repeated warnings escalate.",
    category: "moderation",
    usage: "!warn <user> [reason]",
};

/// Record a warning, then evaluate and enact the escalation policy.
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

    let Some(raw_target) = arg1 else {
        let usage = usage_message(META.usage);
        http.create_message(msg.channel_id).content(&usage).await?;
        return Ok(());
    };

    let Some(target_user_id) = parse_target_user_id(raw_target) else {
        let usage = usage_message(META.usage);
        http.create_message(msg.channel_id).content(&usage).await?;
        return Ok(());
    };

    if target_user_id == msg.author.id {
        http.create_message(msg.channel_id)
            .content(&moderation_self_action_message("warn"))
            .await?;
        return Ok(());
    }

    let reason = arg_tail.unwrap_or("No reason provided");
    let now_ms = now_unix_ms();
    let entry = WarningRecord {
        created_at: now_ms,
        reason: reason.to_owned(),
        issuer_id: msg.author.id.get(),
        issuer_label: msg.author.name.clone(),
    };

    let outcome = ctx
        .store
        .add_warning(guild_id.get(), target_user_id.get(), entry)
        .await;

    // The warning is committed; escalation is a separate step whose gateway
    // failures never roll it back.
    let escalation_note =
        match apply_escalation(&ctx, guild_id, target_user_id, outcome, now_ms).await {
            Ok(note) => note,
            Err(source) => {
                error!(?source, "escalation action failed");
                Some(
                    "The warning was recorded, but I couldn't apply the automatic action. \
                     Check bot permissions and configuration."
                        .to_owned(),
                )
            }
        };

    let action = format!("warned ({} active)", outcome.active_warnings);
    let target_profile = fetch_target_profile(http, target_user_id).await;
    let embed =
        moderation_action_embed(&target_profile, target_user_id, &action, Some(reason), None)?;
    http.create_message(msg.channel_id).embeds(&[embed]).await?;

    if let Some(note) = escalation_note {
        http.create_message(msg.channel_id).content(&note).await?;
    }

    Ok(())
}
