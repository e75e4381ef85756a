use twilight_model::{gateway::payload::incoming::MessageCreate, guild::Permissions};

use crate::moderation::embeds::{guild_only_message, permission_denied_message, usage_message};
use crate::structure::layout::{fetch_guild_channels, find_category};
use crate::CommandMeta;
use warden_core::Context;
use warden_utils::parse::parse_target_channel_id;
use warden_utils::permissions::has_message_permission;

pub const PROTECT_CHANNEL_META: CommandMeta = CommandMeta {
    name: "protectchannel",
    desc: "Shield a channel from layout cleanup.",
    category: "structure",
    usage: "!protectchannel <#channel>",
};

pub const UNPROTECT_CHANNEL_META: CommandMeta = CommandMeta {
    name: "unprotectchannel",
    desc: "Remove a channel's cleanup protection.",
    category: "structure",
    usage: "!unprotectchannel <#channel>",
};

pub const PROTECT_CATEGORY_META: CommandMeta = CommandMeta {
    name: "protectcategory",
    desc: "Shield a category (by exact name) from layout cleanup.",
    category: "structure",
    usage: "!protectcategory <name>",
};

pub const UNPROTECT_CATEGORY_META: CommandMeta = CommandMeta {
    name: "unprotectcategory",
    desc: "Remove a category's cleanup protection.",
    category: "structure",
    usage: "!unprotectcategory <name>",
};

/// Shared admin gate for the protection commands.
///
/// Returns `None` after replying when the caller may not proceed.
async fn admin_guild_gate(
    ctx: &Context,
    msg: &MessageCreate,
) -> anyhow::Result<Option<u64>> {
    let http = &ctx.http;
    let Some(guild_id) = msg.guild_id else {
        http.create_message(msg.channel_id)
            .content(guild_only_message())
            .await?;
        return Ok(None);
    };

    if !has_message_permission(http, msg, Permissions::ADMINISTRATOR).await? {
        http.create_message(msg.channel_id)
            .content(permission_denied_message())
            .await?;
        return Ok(None);
    }

    Ok(Some(guild_id.get()))
}

pub async fn run_protect_channel(
    ctx: Context,
    msg: Box<MessageCreate>,
    arg1: Option<&str>,
) -> anyhow::Result<()> {
    let Some(guild_id) = admin_guild_gate(&ctx, &msg).await? else {
        return Ok(());
    };

    let Some(channel_id) = arg1.and_then(parse_target_channel_id) else {
        let usage = usage_message(PROTECT_CHANNEL_META.usage);
        ctx.http
            .create_message(msg.channel_id)
            .content(&usage)
            .await?;
        return Ok(());
    };

    let added = ctx.protected.protect_channel(guild_id, channel_id.get()).await;
    let reply = if added {
        format!("<#{}> is now protected from cleanup.", channel_id.get())
    } else {
        format!("<#{}> was already protected.", channel_id.get())
    };
    ctx.http
        .create_message(msg.channel_id)
        .content(&reply)
        .await?;

    Ok(())
}

pub async fn run_unprotect_channel(
    ctx: Context,
    msg: Box<MessageCreate>,
    arg1: Option<&str>,
) -> anyhow::Result<()> {
    let Some(guild_id) = admin_guild_gate(&ctx, &msg).await? else {
        return Ok(());
    };

    let Some(channel_id) = arg1.and_then(parse_target_channel_id) else {
        let usage = usage_message(UNPROTECT_CHANNEL_META.usage);
        ctx.http
            .create_message(msg.channel_id)
            .content(&usage)
            .await?;
        return Ok(());
    };

    let removed = ctx
        .protected
        .unprotect_channel(guild_id, channel_id.get())
        .await;
    let reply = if removed {
        format!("<#{}> is no longer protected.", channel_id.get())
    } else {
        format!("<#{}> wasn't protected.", channel_id.get())
    };
    ctx.http
        .create_message(msg.channel_id)
        .content(&reply)
        .await?;

    Ok(())
}

pub async fn run_protect_category(
    ctx: Context,
    msg: Box<MessageCreate>,
    rest: Option<&str>,
) -> anyhow::Result<()> {
    let Some(guild_id) = admin_guild_gate(&ctx, &msg).await? else {
        return Ok(());
    };

    let Some(category) = resolve_category(&ctx, &msg, rest, PROTECT_CATEGORY_META.usage).await?
    else {
        return Ok(());
    };

    let added = ctx.protected.protect_category(guild_id, category).await;
    let reply = if added {
        "Category is now protected from cleanup.".to_owned()
    } else {
        "That category was already protected.".to_owned()
    };
    ctx.http
        .create_message(msg.channel_id)
        .content(&reply)
        .await?;

    Ok(())
}

pub async fn run_unprotect_category(
    ctx: Context,
    msg: Box<MessageCreate>,
    rest: Option<&str>,
) -> anyhow::Result<()> {
    let Some(guild_id) = admin_guild_gate(&ctx, &msg).await? else {
        return Ok(());
    };

    let Some(category) = resolve_category(&ctx, &msg, rest, UNPROTECT_CATEGORY_META.usage).await?
    else {
        return Ok(());
    };

    let removed = ctx.protected.unprotect_category(guild_id, category).await;
    let reply = if removed {
        "Category protection removed.".to_owned()
    } else {
        "That category wasn't protected.".to_owned()
    };
    ctx.http
        .create_message(msg.channel_id)
        .content(&reply)
        .await?;

    Ok(())
}

/// Resolve a category argument (exact name) to its channel id, replying with
/// usage or a not-found notice when that fails.
async fn resolve_category(
    ctx: &Context,
    msg: &MessageCreate,
    rest: Option<&str>,
    usage: &str,
) -> anyhow::Result<Option<u64>> {
    let Some(name) = rest.map(str::trim).filter(|value| !value.is_empty()) else {
        let usage = usage_message(usage);
        ctx.http
            .create_message(msg.channel_id)
            .content(&usage)
            .await?;
        return Ok(None);
    };

    // The gate already established a guild context.
    let Some(guild_id) = msg.guild_id else {
        return Ok(None);
    };

    let channels = fetch_guild_channels(&ctx.http, guild_id).await?;
    let Some(category) = find_category(&channels, name) else {
        ctx.http
            .create_message(msg.channel_id)
            .content("No category with that exact name was found.")
            .await?;
        return Ok(None);
    };

    Ok(Some(category.id.get()))
}
