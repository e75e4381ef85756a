use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::model::{
    RestrictionRecord, SpaceStore, UserPunishmentRecord, WarningRecord, MAX_ESCALATION_LEVEL,
};

/// Typed failures surfaced to command handlers.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("warning index {index} is out of range (1..={active})")]
    OutOfRange { index: usize, active: usize },
}

/// Result of committing a warning, fed into the escalation policy.
#[derive(Clone, Copy, Debug)]
pub struct WarningOutcome {
    pub active_warnings: usize,
    pub escalation_level: u8,
}

/// Durable punishment state for all guilds.
///
/// Loaded once at startup and flushed in full after every mutation. The
/// flush is best-effort: a failed write is logged and the in-memory state
/// stays authoritative until the next successful flush.
///
/// Cheap to clone; all clones share the same underlying state.
#[derive(Clone)]
pub struct PunishmentStore {
    path: Arc<PathBuf>,
    spaces: Arc<RwLock<SpaceStore>>,
}

impl PunishmentStore {
    /// Load the store from `path`. A missing file yields an empty store.
    pub async fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();

        let spaces = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<SpaceStore>(&bytes)?,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no punishment document yet, starting empty");
                SpaceStore::default()
            }
            Err(source) => return Err(source.into()),
        };

        Ok(Self {
            path: Arc::new(path),
            spaces: Arc::new(RwLock::new(spaces)),
        })
    }

    /// Append a warning after pruning, then flush.
    ///
    /// The entry's own `created_at` is the clock for pruning, so the active
    /// count in the outcome is consistent with the moment of the warning.
    pub async fn add_warning(
        &self,
        space_id: u64,
        user_id: u64,
        entry: WarningRecord,
    ) -> WarningOutcome {
        let now_ms = entry.created_at;
        let mut spaces = self.spaces.write().await;
        let record = record_mut(&mut spaces, space_id, user_id);

        record.prune_expired_warnings(now_ms);
        record.warnings.push(entry);

        let outcome = WarningOutcome {
            active_warnings: record.warnings.len(),
            escalation_level: record.escalation_level,
        };

        self.persist_locked(&spaces).await;
        outcome
    }

    /// Remove the 1-based `index`th active warning.
    ///
    /// Prunes first; an index outside `[1, active]` fails with
    /// [`StoreError::OutOfRange`] and skips the flush.
    pub async fn remove_warning(
        &self,
        space_id: u64,
        user_id: u64,
        index: usize,
        now_ms: u64,
    ) -> Result<WarningRecord, StoreError> {
        let mut spaces = self.spaces.write().await;
        let record = record_mut(&mut spaces, space_id, user_id);

        record.prune_expired_warnings(now_ms);
        let active = record.warnings.len();
        if index == 0 || index > active {
            return Err(StoreError::OutOfRange { index, active });
        }

        let removed = record.warnings.remove(index - 1);
        self.persist_locked(&spaces).await;
        Ok(removed)
    }

    /// Empty a user's warning list. Returns how many entries were dropped.
    pub async fn clear_warnings(&self, space_id: u64, user_id: u64) -> usize {
        let mut spaces = self.spaces.write().await;
        let record = record_mut(&mut spaces, space_id, user_id);

        let removed = record.warnings.len();
        record.warnings.clear();
        self.persist_locked(&spaces).await;
        removed
    }

    /// Current active warnings in chronological order.
    ///
    /// Pruning is a side effect of this read; the flush only happens when
    /// pruning actually removed something.
    pub async fn active_warnings(
        &self,
        space_id: u64,
        user_id: u64,
        now_ms: u64,
    ) -> Vec<WarningRecord> {
        let mut spaces = self.spaces.write().await;
        let record = record_mut(&mut spaces, space_id, user_id);

        let pruned = record.prune_expired_warnings(now_ms);
        let warnings = record.warnings.clone();
        if pruned > 0 {
            self.persist_locked(&spaces).await;
        }
        warnings
    }

    /// Append a removal history entry and advance the escalation level
    /// (capped at the ladder's last rung). Returns the new level.
    pub async fn record_removal(
        &self,
        space_id: u64,
        user_id: u64,
        entry: RestrictionRecord,
    ) -> u8 {
        let mut spaces = self.spaces.write().await;
        let record = record_mut(&mut spaces, space_id, user_id);

        record.restrictions.push(entry);
        record.escalation_level = record
            .escalation_level
            .saturating_add(1)
            .min(MAX_ESCALATION_LEVEL);

        let level = record.escalation_level;
        self.persist_locked(&spaces).await;
        level
    }

    /// Removal history in chronological order. Never pruned automatically.
    pub async fn restrictions(&self, space_id: u64, user_id: u64) -> Vec<RestrictionRecord> {
        let spaces = self.spaces.read().await;
        spaces
            .get(&space_id)
            .and_then(|users| users.get(&user_id))
            .map(|record| record.restrictions.clone())
            .unwrap_or_default()
    }

    /// Empty a user's removal history and reset their escalation level.
    /// Returns how many entries were dropped.
    pub async fn clear_restrictions(&self, space_id: u64, user_id: u64) -> usize {
        let mut spaces = self.spaces.write().await;
        let record = record_mut(&mut spaces, space_id, user_id);

        let removed = record.restrictions.len();
        record.restrictions.clear();
        record.escalation_level = 0;
        self.persist_locked(&spaces).await;
        removed
    }

    /// Current escalation level, without creating a record.
    pub async fn escalation_level(&self, space_id: u64, user_id: u64) -> u8 {
        let spaces = self.spaces.read().await;
        spaces
            .get(&space_id)
            .and_then(|users| users.get(&user_id))
            .map_or(0, |record| record.escalation_level)
    }

    /// Flush the full document to disk now.
    pub async fn persist(&self) {
        let spaces = self.spaces.read().await;
        self.persist_locked(&spaces).await;
    }

    async fn persist_locked(&self, spaces: &SpaceStore) {
        if let Err(source) = write_document(&self.path, spaces).await {
            error!(?source, path = %self.path.display(), "failed to persist punishment store");
        }
    }
}

fn record_mut<'a>(
    spaces: &'a mut SpaceStore,
    space_id: u64,
    user_id: u64,
) -> &'a mut UserPunishmentRecord {
    spaces
        .entry(space_id)
        .or_default()
        .entry(user_id)
        .or_default()
}

/// Write the whole document atomically: temp file in the same directory,
/// then rename over the target. A crash mid-write leaves the previous
/// document intact.
async fn write_document(path: &Path, spaces: &SpaceStore) -> anyhow::Result<()> {
    let bytes = serde_json::to_vec_pretty(spaces)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escalation::{decide, EscalationAction};

    const SPACE: u64 = 1000;
    const USER: u64 = 2000;
    const HOUR_MS: u64 = 60 * 60 * 1_000;
    const DAY_MS: u64 = 24 * HOUR_MS;

    fn warning(created_at: u64, reason: &str) -> WarningRecord {
        WarningRecord {
            created_at,
            reason: reason.to_owned(),
            issuer_id: 7,
            issuer_label: "mod".to_owned(),
        }
    }

    fn removal(created_at: u64, duration_ms: Option<u64>) -> RestrictionRecord {
        RestrictionRecord {
            created_at,
            duration_ms,
            reason: "because".to_owned(),
            issuer_id: 7,
            issuer_label: "mod".to_owned(),
        }
    }

    async fn fresh_store(dir: &tempfile::TempDir) -> PunishmentStore {
        PunishmentStore::load(dir.path().join("punishments.json"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;
        assert!(store.active_warnings(SPACE, USER, 0).await.is_empty());
        assert!(store.restrictions(SPACE, USER).await.is_empty());
        assert_eq!(store.escalation_level(SPACE, USER).await, 0);
    }

    #[tokio::test]
    async fn three_warnings_trigger_first_restriction_step() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;

        let t0 = 1_700_000_000_000;
        store.add_warning(SPACE, USER, warning(t0, "a")).await;
        store
            .add_warning(SPACE, USER, warning(t0 + HOUR_MS, "b"))
            .await;
        let outcome = store
            .add_warning(SPACE, USER, warning(t0 + 2 * HOUR_MS, "c"))
            .await;

        assert_eq!(outcome.active_warnings, 3);
        assert_eq!(
            decide(outcome.active_warnings, outcome.escalation_level),
            EscalationAction::TimedRestriction {
                duration_ms: 6 * HOUR_MS
            }
        );

        // Timed restrictions leave no rows in the removal history.
        assert!(store.restrictions(SPACE, USER).await.is_empty());
        let active = store.active_warnings(SPACE, USER, t0 + 2 * HOUR_MS).await;
        let reasons: Vec<&str> = active.iter().map(|w| w.reason.as_str()).collect();
        assert_eq!(reasons, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn sixth_warning_escalates_to_one_day_removal() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;

        let t0 = 1_700_000_000_000;
        let mut outcome = store.add_warning(SPACE, USER, warning(t0, "w1")).await;
        for n in 1..6u64 {
            outcome = store
                .add_warning(SPACE, USER, warning(t0 + n * HOUR_MS, "again"))
                .await;
        }

        assert_eq!(outcome.active_warnings, 6);
        let action = decide(outcome.active_warnings, outcome.escalation_level);
        let EscalationAction::TimedRemoval {
            duration_ms,
            new_level,
        } = action
        else {
            panic!("expected a timed removal, got {action:?}");
        };
        assert_eq!(duration_ms, DAY_MS);
        assert_eq!(new_level, 1);

        let level = store
            .record_removal(SPACE, USER, removal(t0 + 5 * HOUR_MS, Some(duration_ms)))
            .await;
        assert_eq!(level, 1);

        let history = store.restrictions(SPACE, USER).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].duration_ms, Some(86_400_000));
    }

    #[tokio::test]
    async fn expired_warnings_are_pruned_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;

        let t0 = 1_700_000_000_000;
        store.add_warning(SPACE, USER, warning(t0, "old")).await;

        let active = store.active_warnings(SPACE, USER, t0 + 5 * DAY_MS).await;
        assert!(active.is_empty());

        // Physically gone, not merely filtered from the view.
        let reloaded = fresh_store(&dir).await;
        assert!(reloaded.active_warnings(SPACE, USER, t0).await.is_empty());
    }

    #[tokio::test]
    async fn out_of_range_unwarn_mutates_and_persists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;

        let t0 = 1_700_000_000_000;
        for reason in ["a", "b", "c"] {
            store.add_warning(SPACE, USER, warning(t0, reason)).await;
        }

        let path = dir.path().join("punishments.json");
        let before = std::fs::read(&path).unwrap();

        let result = store.remove_warning(SPACE, USER, 5, t0).await;
        assert!(matches!(
            result,
            Err(StoreError::OutOfRange { index: 5, active: 3 })
        ));

        assert_eq!(store.active_warnings(SPACE, USER, t0).await.len(), 3);
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn remove_warning_uses_one_based_indexing() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;

        let t0 = 1_700_000_000_000;
        for reason in ["first", "second", "third"] {
            store.add_warning(SPACE, USER, warning(t0, reason)).await;
        }

        let removed = store.remove_warning(SPACE, USER, 2, t0).await.unwrap();
        assert_eq!(removed.reason, "second");

        let reasons: Vec<String> = store
            .active_warnings(SPACE, USER, t0)
            .await
            .into_iter()
            .map(|w| w.reason)
            .collect();
        assert_eq!(reasons, ["first", "third"]);

        assert!(matches!(
            store.remove_warning(SPACE, USER, 0, t0).await,
            Err(StoreError::OutOfRange { .. })
        ));
    }

    #[tokio::test]
    async fn permanent_removal_has_no_duration_and_bumps_level() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;

        let level = store.record_removal(SPACE, USER, removal(1, None)).await;
        assert_eq!(level, 1);

        let history = store.restrictions(SPACE, USER).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].duration_ms, None);
    }

    #[tokio::test]
    async fn escalation_level_saturates_at_ladder_end() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;

        for n in 0..7u64 {
            store.record_removal(SPACE, USER, removal(n, None)).await;
        }
        assert_eq!(store.escalation_level(SPACE, USER).await, 4);
    }

    #[tokio::test]
    async fn clear_restrictions_resets_the_ladder() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;

        store
            .record_removal(SPACE, USER, removal(1, Some(DAY_MS)))
            .await;
        store.record_removal(SPACE, USER, removal(2, None)).await;

        assert_eq!(store.clear_restrictions(SPACE, USER).await, 2);
        assert!(store.restrictions(SPACE, USER).await.is_empty());
        assert_eq!(store.escalation_level(SPACE, USER).await, 0);
    }

    #[tokio::test]
    async fn mutations_survive_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let t0 = 1_700_000_000_000;

        {
            let store = fresh_store(&dir).await;
            store.add_warning(SPACE, USER, warning(t0, "kept")).await;
            store
                .record_removal(SPACE, USER, removal(t0, Some(DAY_MS)))
                .await;
        }

        let reloaded = fresh_store(&dir).await;
        let warnings = reloaded.active_warnings(SPACE, USER, t0).await;
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].reason, "kept");
        assert_eq!(reloaded.escalation_level(SPACE, USER).await, 1);
        assert_eq!(
            reloaded.restrictions(SPACE, USER).await[0].duration_ms,
            Some(DAY_MS)
        );
    }
}
