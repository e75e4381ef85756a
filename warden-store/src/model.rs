use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// How long a warning stays active before it is pruned.
pub const WARN_LIFETIME_MS: u64 = 4 * 24 * 60 * 60 * 1_000;

/// Highest index into the removal-duration ladder.
pub const MAX_ESCALATION_LEVEL: u8 = 4;

/// A single warning issued to a user. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningRecord {
    pub created_at: u64,
    pub reason: String,
    pub issuer_id: u64,
    pub issuer_label: String,
}

/// A ban/removal history entry. Append-only; `duration_ms` of `None`
/// means permanent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictionRecord {
    pub created_at: u64,
    pub duration_ms: Option<u64>,
    pub reason: String,
    pub issuer_id: u64,
    pub issuer_label: String,
}

/// Per-user punishment state inside one guild.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPunishmentRecord {
    #[serde(default)]
    pub warnings: Vec<WarningRecord>,
    #[serde(rename = "bans", default)]
    pub restrictions: Vec<RestrictionRecord>,
    #[serde(rename = "banLevel", default)]
    pub escalation_level: u8,
}

impl UserPunishmentRecord {
    /// Physically remove warnings older than [`WARN_LIFETIME_MS`].
    ///
    /// Must run before any active-count read; callers rely on
    /// `self.warnings.len()` being the active count afterwards.
    /// Returns how many warnings were removed.
    pub fn prune_expired_warnings(&mut self, now_ms: u64) -> usize {
        let before = self.warnings.len();
        self.warnings
            .retain(|warning| now_ms.saturating_sub(warning.created_at) <= WARN_LIFETIME_MS);
        before - self.warnings.len()
    }

    /// Whether this record holds no state worth persisting.
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.restrictions.is_empty() && self.escalation_level == 0
    }
}

/// The entire persisted document: guild id -> user id -> record.
pub type SpaceStore = HashMap<u64, HashMap<u64, UserPunishmentRecord>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn warning(created_at: u64) -> WarningRecord {
        WarningRecord {
            created_at,
            reason: "test".to_owned(),
            issuer_id: 1,
            issuer_label: "mod".to_owned(),
        }
    }

    #[test]
    fn prune_removes_only_expired_warnings() {
        let now = 10 * WARN_LIFETIME_MS;
        let mut record = UserPunishmentRecord {
            warnings: vec![
                warning(now - WARN_LIFETIME_MS - 1),
                warning(now - WARN_LIFETIME_MS),
                warning(now),
            ],
            ..UserPunishmentRecord::default()
        };

        assert_eq!(record.prune_expired_warnings(now), 1);
        assert_eq!(record.warnings.len(), 2);
        // Exactly-at-lifetime is still active.
        assert_eq!(record.warnings[0].created_at, now - WARN_LIFETIME_MS);
    }

    #[test]
    fn prune_is_idempotent_at_fixed_time() {
        let now = WARN_LIFETIME_MS * 3;
        let mut record = UserPunishmentRecord {
            warnings: vec![warning(now - WARN_LIFETIME_MS * 2), warning(now)],
            ..UserPunishmentRecord::default()
        };

        record.prune_expired_warnings(now);
        let after_first = record.warnings.clone();
        assert_eq!(record.prune_expired_warnings(now), 0);
        assert_eq!(record.warnings, after_first);
    }

    #[test]
    fn five_day_old_warning_is_physically_removed() {
        let day_ms = 24 * 60 * 60 * 1_000;
        let t0 = 1_000_000;
        let mut record = UserPunishmentRecord {
            warnings: vec![warning(t0)],
            ..UserPunishmentRecord::default()
        };

        record.prune_expired_warnings(t0 + 5 * day_ms);
        assert!(record.warnings.is_empty());
    }

    #[test]
    fn document_field_names_match_layout() {
        let record = UserPunishmentRecord {
            warnings: vec![warning(42)],
            restrictions: vec![RestrictionRecord {
                created_at: 43,
                duration_ms: None,
                reason: "spam".to_owned(),
                issuer_id: 1,
                issuer_label: "mod".to_owned(),
            }],
            escalation_level: 2,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("warnings").is_some());
        assert!(json.get("bans").is_some());
        assert_eq!(json.get("banLevel").unwrap(), 2);
        assert_eq!(json["warnings"][0]["createdAt"], 42);
        assert_eq!(json["bans"][0]["durationMs"], serde_json::Value::Null);
    }
}
