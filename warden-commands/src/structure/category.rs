use tracing::{error, info};
use twilight_http::request::AuditLogReason as _;
use twilight_model::{gateway::payload::incoming::MessageCreate, guild::Permissions};

use crate::moderation::embeds::{guild_only_message, permission_denied_message, usage_message};
use crate::structure::layout::{fetch_guild_channels, find_category};
use crate::CommandMeta;
use warden_core::Context;
use warden_utils::permissions::has_message_permission;

pub const META: CommandMeta = CommandMeta {
    name: "deletecategory",
    desc: "Delete a category and its unprotected channels by exact name.",
    category: "structure",
    usage: "!deletecategory <name>",
};

/// Delete a named category and everything inside it that is not protected.
pub async fn run(ctx: Context, msg: Box<MessageCreate>, rest: Option<&str>) -> anyhow::Result<()> {
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

    let Some(name) = rest.map(str::trim).filter(|value| !value.is_empty()) else {
        let usage = usage_message(META.usage);
        http.create_message(msg.channel_id).content(&usage).await?;
        return Ok(());
    };

    let channels = fetch_guild_channels(http, guild_id).await?;
    let Some(category) = find_category(&channels, name) else {
        http.create_message(msg.channel_id)
            .content("No category with that exact name was found.")
            .await?;
        return Ok(());
    };

    let protection = ctx.protected.guild_protection(guild_id.get()).await;
    if protection.categories.contains(&category.id.get()) {
        http.create_message(msg.channel_id)
            .content("That category is protected and can't be deleted.")
            .await?;
        return Ok(());
    }

    for channel in channels
        .iter()
        .filter(|channel| channel.parent_id == Some(category.id))
    {
        if protection.channels.contains(&channel.id.get()) {
            continue;
        }
        if let Err(source) = http
            .delete_channel(channel.id)
            .reason("deletecategory")
            .await
        {
            error!(?source, channel = channel.id.get(), "failed to delete channel");
        }
    }

    info!(category = name, "deleting category");
    if let Err(source) = http
        .delete_channel(category.id)
        .reason("deletecategory")
        .await
    {
        error!(?source, category = category.id.get(), "failed to delete category");
        http.create_message(msg.channel_id)
            .content("I couldn't delete that category. Check bot permissions.")
            .await?;
        return Ok(());
    }

    let reply = format!("Category `{name}` and its unprotected channels were deleted.");
    http.create_message(msg.channel_id).content(&reply).await?;

    Ok(())
}
