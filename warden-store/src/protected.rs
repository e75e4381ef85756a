use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::error;

/// Protected structure ids for one guild.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GuildProtection {
    #[serde(default)]
    pub categories: HashSet<u64>,
    #[serde(default)]
    pub channels: HashSet<u64>,
}

type ProtectionMap = HashMap<u64, GuildProtection>;

/// Registry of categories/channels the structure commands must never touch.
///
/// Separate document from the punishment store; the moderation core shares
/// no state with it.
#[derive(Clone)]
pub struct ProtectedStore {
    path: Arc<PathBuf>,
    guilds: Arc<RwLock<ProtectionMap>>,
}

impl ProtectedStore {
    /// Load the registry from `path`. A missing file yields an empty registry.
    pub async fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();

        let guilds = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<ProtectionMap>(&bytes)?,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                ProtectionMap::default()
            }
            Err(source) => return Err(source.into()),
        };

        Ok(Self {
            path: Arc::new(path),
            guilds: Arc::new(RwLock::new(guilds)),
        })
    }

    /// Snapshot of one guild's protected ids.
    pub async fn guild_protection(&self, guild_id: u64) -> GuildProtection {
        let guilds = self.guilds.read().await;
        guilds.get(&guild_id).cloned().unwrap_or_default()
    }

    /// Mark a category as protected. Returns false if it already was.
    pub async fn protect_category(&self, guild_id: u64, category_id: u64) -> bool {
        let mut guilds = self.guilds.write().await;
        let added = guilds
            .entry(guild_id)
            .or_default()
            .categories
            .insert(category_id);
        self.persist_locked(&guilds).await;
        added
    }

    /// Unmark a protected category. Returns false if it was not protected.
    pub async fn unprotect_category(&self, guild_id: u64, category_id: u64) -> bool {
        let mut guilds = self.guilds.write().await;
        let removed = guilds
            .entry(guild_id)
            .or_default()
            .categories
            .remove(&category_id);
        self.persist_locked(&guilds).await;
        removed
    }

    /// Mark a channel as protected. Returns false if it already was.
    pub async fn protect_channel(&self, guild_id: u64, channel_id: u64) -> bool {
        let mut guilds = self.guilds.write().await;
        let added = guilds
            .entry(guild_id)
            .or_default()
            .channels
            .insert(channel_id);
        self.persist_locked(&guilds).await;
        added
    }

    /// Unmark a protected channel. Returns false if it was not protected.
    pub async fn unprotect_channel(&self, guild_id: u64, channel_id: u64) -> bool {
        let mut guilds = self.guilds.write().await;
        let removed = guilds
            .entry(guild_id)
            .or_default()
            .channels
            .remove(&channel_id);
        self.persist_locked(&guilds).await;
        removed
    }

    async fn persist_locked(&self, guilds: &ProtectionMap) {
        let bytes = match serde_json::to_vec_pretty(guilds) {
            Ok(bytes) => bytes,
            Err(source) => {
                error!(?source, "failed to serialize protected registry");
                return;
            }
        };

        if let Err(source) = tokio::fs::write(self.path.as_ref(), &bytes).await {
            error!(?source, path = %self.path.display(), "failed to persist protected registry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUILD: u64 = 42;

    #[tokio::test]
    async fn protection_round_trips_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("protected.json");

        {
            let store = ProtectedStore::load(&path).await.unwrap();
            assert!(store.protect_category(GUILD, 10).await);
            assert!(store.protect_channel(GUILD, 20).await);
            assert!(!store.protect_channel(GUILD, 20).await);
        }

        let reloaded = ProtectedStore::load(&path).await.unwrap();
        let protection = reloaded.guild_protection(GUILD).await;
        assert!(protection.categories.contains(&10));
        assert!(protection.channels.contains(&20));
    }

    #[tokio::test]
    async fn unprotect_removes_only_the_named_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProtectedStore::load(dir.path().join("protected.json"))
            .await
            .unwrap();

        store.protect_channel(GUILD, 1).await;
        store.protect_channel(GUILD, 2).await;

        assert!(store.unprotect_channel(GUILD, 1).await);
        assert!(!store.unprotect_channel(GUILD, 1).await);

        let protection = store.guild_protection(GUILD).await;
        assert!(!protection.channels.contains(&1));
        assert!(protection.channels.contains(&2));
    }
}
