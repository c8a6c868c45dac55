//! Retention policy
//!
//! Two phases, always in this order:
//! 1. age: delete non-pinned entries created before the cutoff
//! 2. count: delete the oldest non-pinned entries until at most `max_items` remain
//!
//! Pinned entries are never counted and never deleted. Stores run both phases
//! as one unit through [`RetentionTarget`].

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::error::HistoryResult;

/// Limits resolved against a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPlan {
    /// Non-pinned entries created strictly before this instant expire
    pub cutoff: DateTime<Utc>,
    pub max_items: usize,
}

impl RetentionPlan {
    /// An age reaching past the earliest representable instant expires nothing.
    pub fn new(max_items: usize, max_age_days: u32, now: DateTime<Utc>) -> Self {
        let cutoff = now
            .checked_sub_signed(Duration::days(i64::from(max_age_days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        RetentionPlan { cutoff, max_items }
    }

    /// Plan from the live configuration
    pub fn from_config(config: &Config, now: DateTime<Utc>) -> Self {
        Self::new(config.get_max_items(), config.get_max_age_days(), now)
    }
}

/// Number of entries removed by each phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub expired: usize,
    pub overflow: usize,
}

impl CleanupReport {
    pub fn total(&self) -> usize {
        self.expired + self.overflow
    }
}

/// The deletion primitives the policy needs.
///
/// Implemented by a store's transaction so both phases commit together.
pub trait RetentionTarget {
    /// Delete entries created before `cutoff`; returns the number deleted.
    fn delete_older_than(&mut self, cutoff: DateTime<Utc>, exclude_pinned: bool)
        -> HistoryResult<usize>;

    fn count_non_pinned(&mut self) -> HistoryResult<usize>;

    /// Delete the `n` oldest non-pinned entries by `(created_at, id)`.
    fn delete_oldest_non_pinned(&mut self, n: usize) -> HistoryResult<usize>;
}

/// Run both phases against `target`.
pub fn apply<T: RetentionTarget + ?Sized>(
    target: &mut T,
    plan: &RetentionPlan,
) -> HistoryResult<CleanupReport> {
    let expired = target.delete_older_than(plan.cutoff, true)?;

    let remaining = target.count_non_pinned()?;
    let overflow = if remaining > plan.max_items {
        target.delete_oldest_non_pinned(remaining - plan.max_items)?
    } else {
        0
    };

    let report = CleanupReport { expired, overflow };
    if report.total() > 0 {
        info!(
            expired = report.expired,
            overflow = report.overflow,
            max_items = plan.max_items,
            cutoff = %plan.cutoff,
            "Pruned clipboard history"
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Row {
        id: String,
        created_at: DateTime<Utc>,
        pinned: bool,
    }

    #[derive(Default)]
    struct VecTarget {
        rows: Vec<Row>,
    }

    impl VecTarget {
        fn push(&mut self, id: &str, created_at: DateTime<Utc>, pinned: bool) {
            self.rows.push(Row {
                id: id.to_string(),
                created_at,
                pinned,
            });
        }

        fn ids(&self) -> Vec<&str> {
            let mut ids: Vec<_> = self.rows.iter().map(|r| r.id.as_str()).collect();
            ids.sort();
            ids
        }
    }

    impl RetentionTarget for VecTarget {
        fn delete_older_than(
            &mut self,
            cutoff: DateTime<Utc>,
            exclude_pinned: bool,
        ) -> HistoryResult<usize> {
            let before = self.rows.len();
            self.rows
                .retain(|r| r.created_at >= cutoff || (exclude_pinned && r.pinned));
            Ok(before - self.rows.len())
        }

        fn count_non_pinned(&mut self) -> HistoryResult<usize> {
            Ok(self.rows.iter().filter(|r| !r.pinned).count())
        }

        fn delete_oldest_non_pinned(&mut self, n: usize) -> HistoryResult<usize> {
            let mut candidates: Vec<_> = self.rows.iter().filter(|r| !r.pinned).cloned().collect();
            candidates.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
            let doomed: Vec<String> = candidates.into_iter().take(n).map(|r| r.id).collect();
            self.rows.retain(|r| !doomed.contains(&r.id));
            Ok(doomed.len())
        }
    }

    fn at(day: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap() + Duration::days(day)
    }

    #[test]
    fn test_plan_cutoff_is_now_minus_age() {
        let plan = RetentionPlan::new(10, 7, at(10));
        assert_eq!(plan.cutoff, at(3));
        assert_eq!(plan.max_items, 10);
    }

    #[test]
    fn test_plan_from_default_config() {
        let plan = RetentionPlan::from_config(&Config::default(), at(30));
        assert_eq!(plan.cutoff, at(23));
        assert_eq!(plan.max_items, 100);
    }

    #[test]
    fn test_huge_max_age_clamps_cutoff() {
        let plan = RetentionPlan::new(10, 100_000_000, at(0));
        assert_eq!(plan.cutoff, DateTime::<Utc>::MIN_UTC);

        let plan = RetentionPlan::new(10, u32::MAX, at(0));
        assert_eq!(plan.cutoff, DateTime::<Utc>::MIN_UTC);

        let mut target = VecTarget::default();
        target.push("ancient", at(-36_500), false);
        let report = apply(&mut target, &plan).unwrap();
        assert_eq!(report.expired, 0);
        assert_eq!(target.ids(), vec!["ancient"]);
    }

    #[test]
    fn test_count_phase_keeps_newest_and_pinned() {
        let mut target = VecTarget::default();
        target.push("p1", at(0), true);
        target.push("p2", at(1), true);
        for (i, id) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            target.push(id, at(i as i64), false);
        }

        let plan = RetentionPlan::new(3, 365, at(5));
        let report = apply(&mut target, &plan).unwrap();

        assert_eq!(report, CleanupReport { expired: 0, overflow: 2 });
        assert_eq!(target.ids(), vec!["c", "d", "e", "p1", "p2"]);
    }

    #[test]
    fn test_age_phase_spares_pinned() {
        let mut target = VecTarget::default();
        target.push("old", at(0), false);
        target.push("old-pinned", at(0), true);
        target.push("fresh", at(9), false);

        let plan = RetentionPlan::new(100, 7, at(10));
        let report = apply(&mut target, &plan).unwrap();

        assert_eq!(report.expired, 1);
        assert_eq!(report.overflow, 0);
        assert_eq!(target.ids(), vec!["fresh", "old-pinned"]);
    }

    #[test]
    fn test_age_phase_runs_before_count_phase() {
        let mut target = VecTarget::default();
        target.push("expired-1", at(0), false);
        target.push("expired-2", at(1), false);
        target.push("keep-1", at(8), false);
        target.push("keep-2", at(9), false);

        // Two survive the age phase, which already satisfies the count limit.
        let plan = RetentionPlan::new(2, 7, at(10));
        let report = apply(&mut target, &plan).unwrap();

        assert_eq!(report, CleanupReport { expired: 2, overflow: 0 });
        assert_eq!(target.ids(), vec!["keep-1", "keep-2"]);
    }

    #[test]
    fn test_created_at_ties_break_by_id() {
        let mut target = VecTarget::default();
        target.push("b", at(1), false);
        target.push("a", at(1), false);
        target.push("c", at(2), false);

        let report = apply(&mut target, &RetentionPlan::new(2, 365, at(3))).unwrap();
        assert_eq!(report.overflow, 1);
        assert_eq!(target.ids(), vec!["b", "c"]);
    }

    #[test]
    fn test_pinned_only_history_is_untouched() {
        let mut target = VecTarget::default();
        for i in 0..5 {
            target.push(&format!("p{}", i), at(0), true);
        }

        let report = apply(&mut target, &RetentionPlan::new(1, 1, at(100))).unwrap();
        assert_eq!(report.total(), 0);
        assert_eq!(target.rows.len(), 5);
    }
}
