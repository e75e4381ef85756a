use twilight_http::Client;
use twilight_model::{channel::message::embed::Embed, id::marker::UserMarker, id::Id};
use twilight_util::builder::embed::{EmbedAuthorBuilder, EmbedBuilder, ImageSource};

use warden_store::{RestrictionRecord, WarningRecord};
use warden_utils::embed::DEFAULT_EMBED_COLOR;
use warden_utils::parse::format_duration_ms;

/// Most listing entries shown per embed; history beyond this is summarized.
const LISTING_LIMIT: usize = 10;

#[derive(Clone, Debug)]
pub struct TargetProfile {
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// Resolve a moderation target profile for display in embeds.
pub async fn fetch_target_profile(http: &Client, user_id: Id<UserMarker>) -> TargetProfile {
    let user = match http.user(user_id).await {
        Ok(response) => match response.model().await {
            Ok(model) => model,
            Err(_) => {
                return TargetProfile {
                    display_name: format!("User {}", user_id.get()),
                    avatar_url: None,
                };
            }
        },
        Err(_) => {
            return TargetProfile {
                display_name: format!("User {}", user_id.get()),
                avatar_url: None,
            };
        }
    };

    let display_name = user.global_name.unwrap_or(user.name);
    let avatar_url = Some(match user.avatar {
        Some(avatar) => format!(
            "https://cdn.discordapp.com/avatars/{}/{}.png?size=128",
            user_id.get(),
            avatar
        ),
        None => {
            let default_avatar_index = (user_id.get() >> 22) % 6;
            format!(
                "https://cdn.discordapp.com/embed/avatars/{}.png",
                default_avatar_index
            )
        }
    });

    TargetProfile {
        display_name,
        avatar_url,
    }
}

/// Build a moderation action-result embed.
///
/// This is a pure view/template helper and does not perform HTTP requests.
pub fn moderation_action_embed(
    target_profile: &TargetProfile,
    target_user_id: Id<UserMarker>,
    action_past_tense: &str,
    reason: Option<&str>,
    duration: Option<&str>,
) -> anyhow::Result<Embed> {
    let reason = sanitize_reason(reason.unwrap_or("No reason provided"));

    let description = match duration {
        Some(duration) => format!(
            "Target: <@{}>\nReason: {}\nDuration: {}",
            target_user_id.get(),
            reason,
            duration
        ),
        None => format!("Target: <@{}>\nReason: {}", target_user_id.get(), reason),
    };

    let builder = EmbedBuilder::new()
        .color(DEFAULT_EMBED_COLOR)
        .description(description);

    let builder = match target_profile.avatar_url.as_deref() {
        Some(url) => {
            let icon = ImageSource::url(url.to_owned())?;
            let author = EmbedAuthorBuilder::new(format!(
                "{} has been {}",
                target_profile.display_name, action_past_tense
            ))
            .icon_url(icon)
            .build();
            builder.author(author)
        }
        None => builder.title(format!(
            "{} has been {}",
            target_profile.display_name, action_past_tense
        )),
    };

    Ok(builder.validate()?.build())
}

/// Flat chronological listing of a user's active warnings.
pub fn warnings_overview_embed(
    target_profile: &TargetProfile,
    warnings: &[WarningRecord],
) -> anyhow::Result<Embed> {
    let mut description = format!("Active warnings: **{}**\n\n", warnings.len());

    if warnings.is_empty() {
        description.push_str("No active warnings.");
    } else {
        let start = warnings.len().saturating_sub(LISTING_LIMIT);
        if start > 0 {
            description.push_str(&format!("(showing the most recent {LISTING_LIMIT})\n\n"));
        }
        for (index, entry) in warnings.iter().enumerate().skip(start) {
            description.push_str(&format!(
                "#{idx} • <t:{ts}:F> • by {issuer}\nReason: {reason}\n\n",
                idx = index + 1,
                ts = entry.created_at / 1_000,
                issuer = sanitize_reason(&entry.issuer_label),
                reason = sanitize_reason(&entry.reason),
            ));
        }
    }

    let title = format!("Warnings for {}", target_profile.display_name);
    build_profile_embed(target_profile, title, description)
}

/// Flat chronological listing of a user's ban/removal history.
pub fn restrictions_overview_embed(
    target_profile: &TargetProfile,
    escalation_level: u8,
    restrictions: &[RestrictionRecord],
) -> anyhow::Result<Embed> {
    let mut description = format!(
        "Recorded bans: **{}** • escalation level: **{}**\n\n",
        restrictions.len(),
        escalation_level
    );

    if restrictions.is_empty() {
        description.push_str("No recorded bans.");
    } else {
        let start = restrictions.len().saturating_sub(LISTING_LIMIT);
        if start > 0 {
            description.push_str(&format!("(showing the most recent {LISTING_LIMIT})\n\n"));
        }
        for (index, entry) in restrictions.iter().enumerate().skip(start) {
            let duration = entry
                .duration_ms
                .map_or_else(|| "permanent".to_owned(), format_duration_ms);
            description.push_str(&format!(
                "#{idx} • <t:{ts}:F> • {duration} • by {issuer}\nReason: {reason}\n\n",
                idx = index + 1,
                ts = entry.created_at / 1_000,
                issuer = sanitize_reason(&entry.issuer_label),
                reason = sanitize_reason(&entry.reason),
            ));
        }
    }

    let title = format!("Bans for {}", target_profile.display_name);
    build_profile_embed(target_profile, title, description)
}

fn build_profile_embed(
    target_profile: &TargetProfile,
    title: String,
    description: String,
) -> anyhow::Result<Embed> {
    let builder = EmbedBuilder::new()
        .color(DEFAULT_EMBED_COLOR)
        .description(description);

    let builder = match target_profile.avatar_url.as_deref() {
        Some(url) => {
            let icon = ImageSource::url(url.to_owned())?;
            let author = EmbedAuthorBuilder::new(title).icon_url(icon).build();
            builder.author(author)
        }
        None => builder.title(title),
    };

    Ok(builder.validate()?.build())
}

pub fn usage_message(usage: &str) -> String {
    format!("Usage: `{usage}`")
}

pub fn guild_only_message() -> &'static str {
    "This command only works in servers."
}

pub fn permission_denied_message() -> &'static str {
    "You are not permitted to use this command."
}

pub fn moderation_self_action_message(action: &str) -> String {
    format!("You can't {action} yourself.")
}

pub fn gateway_failure_message(action: &str) -> String {
    format!("I couldn't {action} that user. Check role hierarchy and bot permissions.")
}

fn sanitize_reason(reason: &str) -> String {
    reason.replace('@', "@\u{200B}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> TargetProfile {
        TargetProfile {
            display_name: "Tester".to_owned(),
            avatar_url: None,
        }
    }

    #[test]
    fn warnings_listing_is_chronological_and_one_based() {
        let warnings = vec![
            WarningRecord {
                created_at: 1_000,
                reason: "first".to_owned(),
                issuer_id: 1,
                issuer_label: "mod".to_owned(),
            },
            WarningRecord {
                created_at: 2_000,
                reason: "second".to_owned(),
                issuer_id: 1,
                issuer_label: "mod".to_owned(),
            },
        ];

        let embed = warnings_overview_embed(&profile(), &warnings).unwrap();
        let description = embed.description.unwrap();
        let first = description.find("#1").unwrap();
        let second = description.find("#2").unwrap();
        assert!(first < second);
        assert!(description.contains("Active warnings: **2**"));
    }

    #[test]
    fn permanent_restrictions_are_labeled() {
        let restrictions = vec![RestrictionRecord {
            created_at: 1_000,
            duration_ms: None,
            reason: "spam".to_owned(),
            issuer_id: 1,
            issuer_label: "mod".to_owned(),
        }];

        let embed = restrictions_overview_embed(&profile(), 1, &restrictions).unwrap();
        let description = embed.description.unwrap();
        assert!(description.contains("permanent"));
        assert!(description.contains("escalation level: **1**"));
    }

    #[test]
    fn reasons_cannot_smuggle_mentions() {
        let embed = moderation_action_embed(
            &profile(),
            Id::new(5),
            "warned",
            Some("@everyone look"),
            None,
        )
        .unwrap();
        assert!(!embed.description.unwrap().contains("@everyone"));
    }
}
