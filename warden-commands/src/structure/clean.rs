use tracing::{error, info};
use twilight_http::request::AuditLogReason as _;
use twilight_model::{
    channel::ChannelType, gateway::payload::incoming::MessageCreate, guild::Permissions,
};

use crate::moderation::embeds::{guild_only_message, permission_denied_message};
use crate::structure::layout::{fetch_guild_channels, is_layout_category};
use crate::CommandMeta;
use warden_core::Context;
use warden_utils::permissions::has_message_permission;

pub const META: CommandMeta = CommandMeta {
    name: "cleanserver",
    desc: "Delete categories and root channels that are not in the layout and not protected.",
    category: "structure",
    usage: "!cleanserver",
};

/// Remove structure that neither the layout nor the protected registry claims.
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
        .content("Cleaning structure outside the layout (protected entries are kept)...")
        .await?;

    let protection = ctx.protected.guild_protection(guild_id.get()).await;
    let channels = fetch_guild_channels(http, guild_id).await?;

    for channel in &channels {
        let delete = match channel.kind {
            ChannelType::GuildCategory => {
                !is_layout_category(channel.name.as_deref())
                    && !protection.categories.contains(&channel.id.get())
            }
            ChannelType::GuildText | ChannelType::GuildVoice => {
                channel.parent_id.is_none() && !protection.channels.contains(&channel.id.get())
            }
            _ => false,
        };
        if !delete {
            continue;
        }

        info!(channel = ?channel.name, "deleting structure not in layout");
        if let Err(source) = http
            .delete_channel(channel.id)
            .reason("cleanserver: not in layout")
            .await
        {
            error!(?source, channel = channel.id.get(), "failed to delete channel");
        }
    }

    http.create_message(msg.channel_id)
        .content("Cleanup finished.")
        .await?;

    Ok(())
}
