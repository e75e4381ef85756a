use twilight_model::channel::message::embed::Embed;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFooterBuilder};

/// Default embed color used across the bot UI.
pub const DEFAULT_EMBED_COLOR: u32 = 0x90_54_30;

/// Build a standard notice embed with consistent styling.
pub fn build_notice_embed(title: &str, description: impl Into<String>) -> anyhow::Result<Embed> {
    build_notice_embed_with_footer(title, description, None)
}

/// Build a standard notice embed with an optional footer line.
pub fn build_notice_embed_with_footer(
    title: &str,
    description: impl Into<String>,
    footer_note: Option<&str>,
) -> anyhow::Result<Embed> {
    let builder = EmbedBuilder::new()
        .title(title)
        .color(DEFAULT_EMBED_COLOR)
        .description(description);

    let embed = match footer_note.filter(|note| !note.is_empty()) {
        Some(note) => {
            let footer = EmbedFooterBuilder::new(note).build();
            builder.footer(footer).validate()?.build()
        }
        None => builder.validate()?.build(),
    };

    Ok(embed)
}
