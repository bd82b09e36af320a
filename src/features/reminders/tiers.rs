//! Notification tier classification.
//!
//! A pending reminder passes through up to three notification checkpoints:
//! an early "approaching" notice one to two minutes out, a "final" notice in
//! the last minute that also completes the reminder, and an "overdue" notice
//! for reminders the process slept through entirely. Each checkpoint is
//! guarded by a field that the scheduler sets through an atomic store commit,
//! so every checkpoint fires at most once per reminder.

use crate::core::time::{TimeKeeper, UtcTime};

use super::model::{Reminder, ReminderStatus};

/// Outcome of classifying one reminder at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Nothing to do at this instant.
    None,
    /// One to two minutes out and never notified: early warning.
    Approaching { minutes_left: i64 },
    /// Inside the last minute and the final notice has not fired: notify and
    /// complete.
    Final,
    /// Already due and never notified at all (process was down): late notice,
    /// status stays pending.
    Overdue,
}

/// Classify `reminder` at instant `now`.
///
/// Checked in a fixed order (approaching, final, overdue) and only the
/// first qualifying tier is reported; anything else waits for a later cycle.
pub fn evaluate(reminder: &Reminder, now: UtcTime, keeper: &TimeKeeper) -> Tier {
    if reminder.status != ReminderStatus::Pending {
        return Tier::None;
    }

    let due = keeper.rehydrate(reminder.due_date);
    let until = due.since(now);
    let seconds_left = until.num_seconds();
    let minutes_left = until.num_minutes();

    if (1..=2).contains(&minutes_left) && reminder.last_reminded.is_none() {
        return Tier::Approaching { minutes_left };
    }

    if (0..=60).contains(&seconds_left) && !reminder.immediate_notified {
        return Tier::Final;
    }

    if seconds_left <= 0 && reminder.last_reminded.is_none() {
        return Tier::Overdue;
    }

    Tier::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::StoredUtc;
    use crate::features::reminders::model::ReminderPriority;
    use chrono::{Duration, NaiveDate};
    use chrono_tz::America::Caracas;

    fn keeper() -> TimeKeeper {
        TimeKeeper::new(Caracas)
    }

    fn base_now() -> UtcTime {
        let k = keeper();
        let local = k
            .local_from_parts(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(), 10, 0)
            .unwrap();
        k.to_utc(local)
    }

    fn reminder_due_in(seconds: i64) -> Reminder {
        let k = keeper();
        let now = base_now();
        let due = k.strip_zone(now.plus(Duration::seconds(seconds)));
        let stamp = k.strip_zone(now);
        Reminder {
            id: "r1".to_string(),
            owner: "ana".to_string(),
            title: "llamar al doctor".to_string(),
            description: None,
            due_date: due,
            priority: ReminderPriority::Medium,
            tags: vec![],
            status: ReminderStatus::Pending,
            created_at: stamp,
            updated_at: stamp,
            completed_at: None,
            last_reminded: None,
            immediate_notified: false,
            is_recurring: false,
            recurrence_pattern: None,
        }
    }

    fn stamp() -> StoredUtc {
        keeper().strip_zone(base_now())
    }

    #[test]
    fn test_approaching_window() {
        let k = keeper();
        let now = base_now();
        // 90 seconds out: one full minute remaining.
        assert_eq!(
            evaluate(&reminder_due_in(90), now, &k),
            Tier::Approaching { minutes_left: 1 }
        );
        assert_eq!(
            evaluate(&reminder_due_in(179), now, &k),
            Tier::Approaching { minutes_left: 2 }
        );
        // Three minutes out: too early.
        assert_eq!(evaluate(&reminder_due_in(180), now, &k), Tier::None);
    }

    #[test]
    fn test_approaching_guarded_by_last_reminded() {
        let k = keeper();
        let now = base_now();
        let mut r = reminder_due_in(90);
        r.last_reminded = Some(stamp());
        // Guard set: approaching is out, but the final window still applies.
        assert_eq!(evaluate(&r, now, &k), Tier::None);
        let mut r = reminder_due_in(45);
        r.last_reminded = Some(stamp());
        assert_eq!(evaluate(&r, now, &k), Tier::Final);
    }

    #[test]
    fn test_final_window() {
        let k = keeper();
        let now = base_now();
        assert_eq!(evaluate(&reminder_due_in(30), now, &k), Tier::Final);
        // Exactly due counts.
        let mut r = reminder_due_in(0);
        r.last_reminded = Some(stamp());
        assert_eq!(evaluate(&r, now, &k), Tier::Final);
    }

    #[test]
    fn test_final_guarded_by_immediate_notified() {
        let k = keeper();
        let now = base_now();
        let mut r = reminder_due_in(30);
        r.immediate_notified = true;
        r.last_reminded = Some(stamp());
        assert_eq!(evaluate(&r, now, &k), Tier::None);
    }

    #[test]
    fn test_approaching_wins_tie_at_sixty_seconds() {
        let k = keeper();
        let now = base_now();
        // 60 s out is both "1 minute left" and inside the final window; the
        // fixed order picks approaching.
        assert_eq!(
            evaluate(&reminder_due_in(60), now, &k),
            Tier::Approaching { minutes_left: 1 }
        );
    }

    #[test]
    fn test_overdue_only_when_never_reminded() {
        let k = keeper();
        let now = base_now();
        let mut r = reminder_due_in(-300);
        r.immediate_notified = true;
        assert_eq!(evaluate(&r, now, &k), Tier::Overdue);
        r.last_reminded = Some(stamp());
        assert_eq!(evaluate(&r, now, &k), Tier::None);
    }

    #[test]
    fn test_final_beats_overdue_at_zero() {
        let k = keeper();
        let now = base_now();
        // Exactly due, never touched: the final tier claims it first.
        assert_eq!(evaluate(&reminder_due_in(0), now, &k), Tier::Final);
    }

    #[test]
    fn test_non_pending_is_ignored() {
        let k = keeper();
        let now = base_now();
        for status in [
            ReminderStatus::Completed,
            ReminderStatus::Cancelled,
            ReminderStatus::Snoozed,
        ] {
            let mut r = reminder_due_in(30);
            r.status = status;
            assert_eq!(evaluate(&r, now, &k), Tier::None);
        }
    }
}
