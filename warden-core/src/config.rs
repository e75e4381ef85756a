use std::env;
use std::path::PathBuf;

use twilight_model::id::{
    marker::{ChannelMarker, RoleMarker},
    Id,
};

/// Runtime configuration, read once from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Bot token. Required.
    pub token: String,
    /// Path of the punishment document.
    pub data_file: PathBuf,
    /// Path of the protected-structure document.
    pub protected_file: PathBuf,
    /// Role applied by timed restrictions. Restriction commands report a
    /// configuration error when unset.
    pub muted_role: Option<Id<RoleMarker>>,
    /// Channel for member-join notices. Unset disables them.
    pub welcome_channel: Option<Id<ChannelMarker>>,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let token = env::var("DISCORD_TOKEN")?;

        let data_file = env::var("WARDEN_DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("warden.json"));
        let protected_file = env::var("WARDEN_PROTECTED_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("protected.json"));

        Ok(Self {
            token,
            data_file,
            protected_file,
            muted_role: optional_id("MUTED_ROLE_ID"),
            welcome_channel: optional_id("WELCOME_CHANNEL_ID"),
        })
    }
}

fn optional_id<T>(name: &str) -> Option<Id<T>> {
    let raw = env::var(name).ok()?;
    let value = raw.trim().parse::<u64>().ok().filter(|id| *id != 0)?;
    Some(Id::new(value))
}
