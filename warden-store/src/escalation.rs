use crate::model::MAX_ESCALATION_LEVEL;

const MS_PER_HOUR: u64 = 60 * 60 * 1_000;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Timed-restriction durations for the 3rd, 4th, and 5th active warning.
pub const RESTRICTION_STEPS_MS: [u64; 3] = [6 * MS_PER_HOUR, 12 * MS_PER_HOUR, 24 * MS_PER_HOUR];

/// Removal-duration ladder, indexed by escalation level.
pub const REMOVAL_LADDER_MS: [u64; 5] = [
    MS_PER_DAY,
    3 * MS_PER_DAY,
    7 * MS_PER_DAY,
    14 * MS_PER_DAY,
    30 * MS_PER_DAY,
];

/// Number of active warnings that triggers a timed removal.
pub const REMOVAL_THRESHOLD: usize = 6;

/// What to do after a warning has been committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EscalationAction {
    None,
    TimedRestriction { duration_ms: u64 },
    TimedRemoval { duration_ms: u64, new_level: u8 },
}

/// Map the freshly pruned active-warning count and the current escalation
/// level to the action to take.
///
/// Pure and deterministic. Evaluated exactly once per warning-add event, so
/// thresholds use exactly-equal semantics; counts past the removal threshold
/// without an intervening reset yield `None`.
pub fn decide(active_warnings: usize, escalation_level: u8) -> EscalationAction {
    match active_warnings {
        3 | 4 | 5 => EscalationAction::TimedRestriction {
            duration_ms: RESTRICTION_STEPS_MS[active_warnings - 3],
        },
        n if n == REMOVAL_THRESHOLD => {
            let step = usize::from(escalation_level.min(MAX_ESCALATION_LEVEL));
            EscalationAction::TimedRemoval {
                duration_ms: REMOVAL_LADDER_MS[step],
                new_level: escalation_level
                    .saturating_add(1)
                    .min(MAX_ESCALATION_LEVEL),
            }
        }
        _ => EscalationAction::None,
    }
}

impl EscalationAction {
    /// Human-readable reason line for notices and the restriction history.
    pub fn reason(&self, active_warnings: usize) -> Option<String> {
        match self {
            EscalationAction::None => None,
            EscalationAction::TimedRestriction { .. } => Some(format!(
                "Automatic restriction: {active_warnings} active warnings"
            )),
            EscalationAction::TimedRemoval { .. } => Some(format!(
                "Automatic removal: {active_warnings} active warnings"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_counts_never_escalate() {
        for count in 0..=2 {
            for level in 0..=5 {
                assert_eq!(decide(count, level), EscalationAction::None);
            }
        }
    }

    #[test]
    fn middle_counts_map_to_fixed_restrictions() {
        for level in 0..=5 {
            assert_eq!(
                decide(3, level),
                EscalationAction::TimedRestriction {
                    duration_ms: 6 * MS_PER_HOUR
                }
            );
            assert_eq!(
                decide(4, level),
                EscalationAction::TimedRestriction {
                    duration_ms: 12 * MS_PER_HOUR
                }
            );
            assert_eq!(
                decide(5, level),
                EscalationAction::TimedRestriction {
                    duration_ms: 24 * MS_PER_HOUR
                }
            );
        }
    }

    #[test]
    fn sixth_warning_walks_the_ladder() {
        for level in 0..=6u8 {
            let step = usize::from(level.min(4));
            assert_eq!(
                decide(6, level),
                EscalationAction::TimedRemoval {
                    duration_ms: REMOVAL_LADDER_MS[step],
                    new_level: (level + 1).min(4),
                }
            );
        }
    }

    #[test]
    fn ladder_saturates_at_last_rung() {
        assert_eq!(
            decide(6, 4),
            EscalationAction::TimedRemoval {
                duration_ms: 30 * MS_PER_DAY,
                new_level: 4,
            }
        );
        assert_eq!(
            decide(6, u8::MAX),
            EscalationAction::TimedRemoval {
                duration_ms: 30 * MS_PER_DAY,
                new_level: 4,
            }
        );
    }

    #[test]
    fn counts_past_threshold_do_not_refire() {
        for count in 7..=12 {
            assert_eq!(decide(count, 0), EscalationAction::None);
        }
    }
}
