use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};
use twilight_http::request::AuditLogReason as _;
use twilight_http::Client;
use twilight_model::id::{
    marker::{GuildMarker, RoleMarker, UserMarker},
    Id,
};

use warden_core::Context;
use warden_store::escalation::{decide, EscalationAction};
use warden_store::{RestrictionRecord, WarningOutcome};
use warden_utils::parse::format_duration_ms;

/// Issuer label recorded on automatic escalation actions.
const AUTO_ISSUER_LABEL: &str = "warden (automatic)";

/// Evaluate the escalation policy for a freshly committed warning and enact
/// the resulting action.
///
/// The history entry for a removal is committed to the store before the
/// gateway call; a gateway failure bubbles up without rolling that back.
/// Returns a summary line for the invoking channel when an action fired.
pub async fn apply_escalation(
    ctx: &Context,
    guild_id: Id<GuildMarker>,
    user_id: Id<UserMarker>,
    outcome: WarningOutcome,
    now_ms: u64,
) -> anyhow::Result<Option<String>> {
    let action = decide(outcome.active_warnings, outcome.escalation_level);

    match action {
        EscalationAction::None => Ok(None),
        EscalationAction::TimedRestriction { duration_ms } => {
            let reason = action
                .reason(outcome.active_warnings)
                .unwrap_or_default();
            restrict_member(ctx, guild_id, user_id, duration_ms, &reason).await?;

            let duration = format_duration_ms(duration_ms);
            notify_member(
                &ctx.http,
                user_id,
                &format!("You have been restricted for {duration}. Reason: {reason}"),
            )
            .await;

            Ok(Some(format!("Automatic restriction applied for {duration}.")))
        }
        EscalationAction::TimedRemoval { duration_ms, .. } => {
            let reason = action
                .reason(outcome.active_warnings)
                .unwrap_or_default();

            let entry = RestrictionRecord {
                created_at: now_ms,
                duration_ms: Some(duration_ms),
                reason: reason.clone(),
                issuer_id: 0,
                issuer_label: AUTO_ISSUER_LABEL.to_owned(),
            };
            let level = ctx
                .store
                .record_removal(guild_id.get(), user_id.get(), entry)
                .await;

            let duration = format_duration_ms(duration_ms);
            notify_member(
                &ctx.http,
                user_id,
                &format!("You have been removed from the server for {duration}. Reason: {reason}"),
            )
            .await;

            ctx.http
                .create_ban(guild_id, user_id)
                .reason(&reason)
                .await?;
            schedule_removal_lift(ctx, guild_id, user_id, duration_ms);

            Ok(Some(format!(
                "Automatic removal applied for {duration} (escalation level {level})."
            )))
        }
    }
}

/// Apply the restriction role and schedule its reversal.
///
/// Fails when no restriction role is configured or the gateway call fails.
pub async fn restrict_member(
    ctx: &Context,
    guild_id: Id<GuildMarker>,
    user_id: Id<UserMarker>,
    duration_ms: u64,
    reason: &str,
) -> anyhow::Result<()> {
    let Some(role_id) = ctx.config.muted_role else {
        anyhow::bail!("MUTED_ROLE_ID is not configured");
    };

    ctx.http
        .add_guild_member_role(guild_id, user_id, role_id)
        .reason(reason)
        .await?;

    let http = Arc::clone(&ctx.http);
    ctx.scheduler.schedule(
        Duration::from_millis(duration_ms),
        lift_restriction(http, guild_id, user_id, role_id),
    );

    Ok(())
}

/// Remove the restriction role. A target already without the role (or no
/// longer in the guild) counts as success.
pub async fn remove_restriction(
    ctx: &Context,
    guild_id: Id<GuildMarker>,
    user_id: Id<UserMarker>,
    reason: &str,
) -> anyhow::Result<()> {
    let Some(role_id) = ctx.config.muted_role else {
        anyhow::bail!("MUTED_ROLE_ID is not configured");
    };

    match ctx
        .http
        .remove_guild_member_role(guild_id, user_id, role_id)
        .reason(reason)
        .await
    {
        Ok(_) => Ok(()),
        Err(source) if is_already_reversed(&source) => Ok(()),
        Err(source) => Err(source.into()),
    }
}

/// Schedule the unban that ends a timed removal. The handle is not retained;
/// the reversal always runs to its scheduled time and relies on idempotence.
pub fn schedule_removal_lift(
    ctx: &Context,
    guild_id: Id<GuildMarker>,
    user_id: Id<UserMarker>,
    duration_ms: u64,
) {
    let http = Arc::clone(&ctx.http);
    ctx.scheduler.schedule(
        Duration::from_millis(duration_ms),
        lift_removal(http, guild_id, user_id),
    );
}

/// Scheduled reversal: take the restriction role off again.
async fn lift_restriction(
    http: Arc<Client>,
    guild_id: Id<GuildMarker>,
    user_id: Id<UserMarker>,
    role_id: Id<RoleMarker>,
) {
    match http
        .remove_guild_member_role(guild_id, user_id, role_id)
        .reason("Restriction expired")
        .await
    {
        Ok(_) => {}
        Err(source) if is_already_reversed(&source) => {
            debug!(user = user_id.get(), "restriction already lifted");
        }
        Err(source) => {
            error!(?source, user = user_id.get(), "failed to lift restriction");
        }
    }
}

/// Scheduled reversal: lift a timed removal. "Not banned" is success; the
/// ban may have been lifted manually in the meantime.
async fn lift_removal(http: Arc<Client>, guild_id: Id<GuildMarker>, user_id: Id<UserMarker>) {
    match http
        .delete_ban(guild_id, user_id)
        .reason("Temporary removal expired")
        .await
    {
        Ok(_) => {}
        Err(source) if is_already_reversed(&source) => {
            debug!(user = user_id.get(), "removal already lifted");
        }
        Err(source) => {
            error!(?source, user = user_id.get(), "failed to lift removal");
        }
    }
}

/// Deliver a direct notice. Best-effort: failures are logged, never fatal.
pub async fn notify_member(http: &Client, user_id: Id<UserMarker>, text: &str) {
    let channel = match http.create_private_channel(user_id).await {
        Ok(response) => match response.model().await {
            Ok(channel) => channel,
            Err(source) => {
                warn!(?source, user = user_id.get(), "could not read DM channel");
                return;
            }
        },
        Err(source) => {
            warn!(?source, user = user_id.get(), "could not open DM channel");
            return;
        }
    };

    if let Err(source) = http.create_message(channel.id).content(text).await {
        warn!(?source, user = user_id.get(), "could not deliver direct notice");
    }
}

fn is_already_reversed(error: &twilight_http::Error) -> bool {
    matches!(
        error.kind(),
        twilight_http::error::ErrorType::Response { status, .. } if status.get() == 404
    )
}
