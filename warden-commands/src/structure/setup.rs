use std::collections::HashSet;

use tracing::{error, info};
use twilight_http::request::AuditLogReason as _;
use twilight_model::{gateway::payload::incoming::MessageCreate, guild::Permissions};

use crate::moderation::embeds::{guild_only_message, permission_denied_message};
use crate::structure::layout::{
    fetch_guild_channels, find_or_create_category, find_or_create_channel, SERVER_LAYOUT,
};
use crate::CommandMeta;
use warden_core::Context;
use warden_utils::permissions::has_message_permission;

pub const META: CommandMeta = CommandMeta {
    name: "setupserver",
    desc: "Create the layout's categories and channels, pruning extras inside them.",
    category: "structure",
    usage: "!setupserver",
};

/// Converge the guild's categories/channels towards the declared layout.
pub async fn run(ctx: Context, msg: Box<MessageCreate>) -> anyhow::Result<()> {
    let http = &ctx.http;
    let Some(guild_id) = msg.guild_id else {
        http.create_message(msg.channel_id)
            .content(guild_only_message())
            .await?;
        return Ok(());
    };

    if !has_message_permission(http, &msg, Permissions::ADMINISTRATOR).await? {
        http.create_message(msg.channel_id)
            .content(permission_denied_message())
            .await?;
        return Ok(());
    }

    http.create_message(msg.channel_id)
        .content("Applying the server layout, this can take a moment...")
        .await?;

    let protection = ctx.protected.guild_protection(guild_id.get()).await;
    let channels = fetch_guild_channels(http, guild_id).await?;

    for category_def in SERVER_LAYOUT {
        let category =
            find_or_create_category(http, guild_id, &channels, category_def.name).await?;
        let category_protected = protection.categories.contains(&category.id.get());

        let required: HashSet<&str> = category_def
            .children
            .iter()
            .map(|child| child.name)
            .collect();

        // Prune extras inside the category unless something protects them.
        for channel in channels
            .iter()
            .filter(|channel| channel.parent_id == Some(category.id))
        {
            let keep = channel
                .name
                .as_deref()
                .is_some_and(|name| required.contains(name))
                || protection.channels.contains(&channel.id.get())
                || category_protected;
            if keep {
                continue;
            }

            info!(channel = ?channel.name, "deleting channel not in layout");
            if let Err(source) = http
                .delete_channel(channel.id)
                .reason("setupserver: not in layout")
                .await
            {
                error!(?source, channel = channel.id.get(), "failed to delete channel");
            }
        }

        for child in category_def.children {
            find_or_create_channel(http, guild_id, &channels, &category, child).await?;
        }
    }

    http.create_message(msg.channel_id)
        .content("Server layout applied.")
        .await?;

    Ok(())
}
