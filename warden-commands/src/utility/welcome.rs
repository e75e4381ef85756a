use tracing::{debug, error};
use twilight_model::{
    gateway::payload::incoming::MessageCreate,
    id::{marker::UserMarker, Id},
};
use twilight_util::builder::embed::{EmbedBuilder, EmbedFooterBuilder};

use crate::CommandMeta;
use warden_core::Context;
use warden_utils::embed::DEFAULT_EMBED_COLOR;

pub const META: CommandMeta = CommandMeta {
    name: "testwelcome",
    desc: "Send yourself a test welcome notice.",
    category: "utility",
    usage: "!testwelcome",
};

/// Post the welcome notice for a newly joined member.
///
/// Skipped silently when no welcome channel is configured.
pub async fn send_welcome(ctx: &Context, user_id: Id<UserMarker>, username: &str) {
    let Some(channel_id) = ctx.config.welcome_channel else {
        debug!("no welcome channel configured, skipping notice");
        return;
    };

    let embed = EmbedBuilder::new()
        .color(DEFAULT_EMBED_COLOR)
        .title(format!("Welcome, {username}!"))
        .description(
            "Glad to have you here. Take a moment to read the rules channel, \
             then come say hi in the general chat.",
        )
        .footer(EmbedFooterBuilder::new("Warden • welcome").build())
        .validate()
        .map(|builder| builder.build());

    let embed = match embed {
        Ok(embed) => embed,
        Err(source) => {
            error!(?source, "failed to build welcome embed");
            return;
        }
    };

    let mention = format!("👋 <@{}> welcome to the server!", user_id.get());
    let embeds = [embed];
    let request = ctx
        .http
        .create_message(channel_id)
        .content(&mention)
        .embeds(&embeds);

    if let Err(source) = request.await {
        error!(?source, "failed to send welcome notice");
    }
}

/// Trigger the welcome notice for the invoking member.
pub async fn run_test(ctx: Context, msg: Box<MessageCreate>) -> anyhow::Result<()> {
    let http = &ctx.http;
    if msg.guild_id.is_none() {
        http.create_message(msg.channel_id)
            .content("This command only works in servers.")
            .await?;
        return Ok(());
    }

    if ctx.config.welcome_channel.is_none() {
        http.create_message(msg.channel_id)
            .content("WELCOME_CHANNEL_ID is not configured.")
            .await?;
        return Ok(());
    }

    send_welcome(&ctx, msg.author.id, &msg.author.name).await;
    http.create_message(msg.channel_id)
        .content("Test welcome notice sent.")
        .await?;

    Ok(())
}
