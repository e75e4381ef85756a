use twilight_http::Client;
use twilight_model::{
    channel::{Channel, ChannelType},
    id::{marker::GuildMarker, Id},
};
use tracing::info;

/// One channel inside a layout category.
pub struct ChannelDef {
    pub name: &'static str,
    pub voice: bool,
}

/// One top-level category and its required channels.
pub struct CategoryDef {
    pub name: &'static str,
    pub children: &'static [ChannelDef],
}

const fn text(name: &'static str) -> ChannelDef {
    ChannelDef { name, voice: false }
}

const fn voice(name: &'static str) -> ChannelDef {
    ChannelDef { name, voice: true }
}

/// The server layout the structure commands converge the guild towards.
pub const SERVER_LAYOUT: &[CategoryDef] = &[
    CategoryDef {
        name: "SERVER INFO",
        children: &[text("announcements"), text("rules"), text("faq-and-guides")],
    },
    CategoryDef {
        name: "COMMUNITY",
        children: &[
            text("general-chat"),
            text("media-and-screenshots"),
            text("introductions"),
        ],
    },
    CategoryDef {
        name: "VOICE",
        children: &[voice("General Voice"), voice("Gaming 1"), voice("Gaming 2")],
    },
    CategoryDef {
        name: "SUPPORT",
        children: &[text("help-desk"), text("suggestions")],
    },
    CategoryDef {
        name: "STAFF",
        children: &[text("staff-chat"), text("mod-logs")],
    },
];

/// Fetch the guild's channel list once for a structure pass.
pub async fn fetch_guild_channels(
    http: &Client,
    guild_id: Id<GuildMarker>,
) -> anyhow::Result<Vec<Channel>> {
    Ok(http.guild_channels(guild_id).await?.models().await?)
}

/// Find a category by exact name.
pub fn find_category<'a>(channels: &'a [Channel], name: &str) -> Option<&'a Channel> {
    channels.iter().find(|channel| {
        channel.kind == ChannelType::GuildCategory && channel.name.as_deref() == Some(name)
    })
}

/// Create a layout category if it is missing, returning its channel record.
pub async fn find_or_create_category(
    http: &Client,
    guild_id: Id<GuildMarker>,
    channels: &[Channel],
    name: &str,
) -> anyhow::Result<Channel> {
    if let Some(existing) = find_category(channels, name) {
        return Ok(existing.clone());
    }

    let created = http
        .create_guild_channel(guild_id, name)
        .kind(ChannelType::GuildCategory)
        .await?
        .model()
        .await?;
    info!(category = name, "created layout category");
    Ok(created)
}

/// Create a layout channel inside its category if it is missing.
pub async fn find_or_create_channel(
    http: &Client,
    guild_id: Id<GuildMarker>,
    channels: &[Channel],
    category: &Channel,
    def: &ChannelDef,
) -> anyhow::Result<()> {
    let exists = channels.iter().any(|channel| {
        channel.parent_id == Some(category.id) && channel.name.as_deref() == Some(def.name)
    });
    if exists {
        return Ok(());
    }

    let kind = if def.voice {
        ChannelType::GuildVoice
    } else {
        ChannelType::GuildText
    };

    http.create_guild_channel(guild_id, def.name)
        .kind(kind)
        .parent_id(category.id)
        .await?;
    info!(channel = def.name, category = ?category.name, "created layout channel");
    Ok(())
}

/// Whether a channel id belongs to any layout category name.
pub fn is_layout_category(name: Option<&str>) -> bool {
    name.is_some_and(|name| SERVER_LAYOUT.iter().any(|category| category.name == name))
}
