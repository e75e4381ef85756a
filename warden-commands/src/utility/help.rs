use std::fmt::Write as _;

use twilight_model::gateway::payload::incoming::MessageCreate;

use crate::{CommandMeta, COMMANDS};
use warden_core::Context;
use warden_utils::embed::build_notice_embed_with_footer;

pub const META: CommandMeta = CommandMeta {
    name: "help",
    desc: "List all commands.",
    category: "utility",
    usage: "!help",
};

/// Send the command catalog grouped by category.
pub async fn run(ctx: Context, msg: Box<MessageCreate>) -> anyhow::Result<()> {
    let http = &ctx.http;

    let mut description = String::new();
    for category in ["moderation", "structure", "utility"] {
        let mut entries: Vec<&CommandMeta> = COMMANDS
            .iter()
            .filter(|meta| meta.category == category)
            .collect();
        if entries.is_empty() {
            continue;
        }
        entries.sort_by_key(|meta| meta.name);

        let _ = writeln!(description, "**{category}**");
        for meta in entries {
            let _ = writeln!(description, "`{}` — {}", meta.usage, meta.desc);
        }
        description.push('\n');
    }

    let embed = build_notice_embed_with_footer(
        "Warden commands",
        description.trim_end(),
        Some("Moderation commands require the matching guild permission."),
    )?;
    http.create_message(msg.channel_id).embeds(&[embed]).await?;

    Ok(())
}
