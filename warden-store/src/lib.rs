/// Escalation policy: pure mapping from warning pressure to action.
pub mod escalation;
/// Punishment record shapes and lifetime rules.
pub mod model;
/// Protected category/channel registry for structure commands.
pub mod protected;
/// Durable per-guild, per-user punishment store.
pub mod store;

pub use model::{RestrictionRecord, UserPunishmentRecord, WarningRecord, WARN_LIFETIME_MS};
pub use store::{PunishmentStore, StoreError, WarningOutcome};
