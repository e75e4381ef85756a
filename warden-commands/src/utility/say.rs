use twilight_model::gateway::payload::incoming::MessageCreate;

use crate::moderation::embeds::usage_message;
use crate::CommandMeta;
use warden_core::Context;

pub const META: CommandMeta = CommandMeta {
    name: "say",
    desc: "Repeat a message in the current channel.",
    category: "utility",
    usage: "!say <text>",
};

/// Echo the given text back into the invoking channel.
pub async fn run(ctx: Context, msg: Box<MessageCreate>, rest: Option<&str>) -> anyhow::Result<()> {
    let http = &ctx.http;

    let Some(text) = rest.map(str::trim).filter(|value| !value.is_empty()) else {
        let usage = usage_message(META.usage);
        http.create_message(msg.channel_id).content(&usage).await?;
        return Ok(());
    };

    // Relaying mentions verbatim would let anyone ping through the bot.
    let text = text.replace('@', "@\u{200B}");
    http.create_message(msg.channel_id).content(&text).await?;

    Ok(())
}
