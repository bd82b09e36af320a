//! Store contract the reminder engine is written against.
//!
//! The engine defines the exact queries it issues; drivers only translate
//! them. The three tier commits are conditional updates: the guard check and
//! the write happen in one store round trip, so two pollers racing on the
//! same reminder cannot both win.

use async_trait::async_trait;

use crate::core::error::StoreError;
use crate::core::time::StoredUtc;

use super::model::{NewReminder, NewScheduledEvent, Reminder, ReminderId, ReminderStatus};

/// Conjunction of equality/range terms over the reminder collection.
#[derive(Debug, Clone, Default)]
pub struct ReminderQuery {
    pub owner: Option<String>,
    pub status: Option<ReminderStatus>,
    /// `due_date > t`
    pub due_after: Option<StoredUtc>,
    /// `due_date <= t`
    pub due_at_or_before: Option<StoredUtc>,
    /// `last_reminded` is unset
    pub never_reminded: bool,
    /// `immediate_notified` is not true
    pub awaiting_final: bool,
    pub sort_due_ascending: bool,
    pub limit: Option<i64>,
}

impl ReminderQuery {
    pub fn any() -> ReminderQuery {
        ReminderQuery::default()
    }

    pub fn with_status(status: ReminderStatus) -> ReminderQuery {
        ReminderQuery {
            status: Some(status),
            ..ReminderQuery::default()
        }
    }

    pub fn pending() -> ReminderQuery {
        ReminderQuery::with_status(ReminderStatus::Pending)
    }

    pub fn for_owner(mut self, owner: &str) -> ReminderQuery {
        self.owner = Some(owner.to_string());
        self
    }

    pub fn due_after(mut self, t: StoredUtc) -> ReminderQuery {
        self.due_after = Some(t);
        self
    }

    pub fn due_at_or_before(mut self, t: StoredUtc) -> ReminderQuery {
        self.due_at_or_before = Some(t);
        self
    }

    pub fn never_reminded(mut self) -> ReminderQuery {
        self.never_reminded = true;
        self
    }

    pub fn awaiting_final(mut self) -> ReminderQuery {
        self.awaiting_final = true;
        self
    }

    pub fn sorted_by_due(mut self) -> ReminderQuery {
        self.sort_due_ascending = true;
        self
    }
}

/// Per-status totals for the stats surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderCounts {
    pub total: u64,
    pub pending: u64,
    pub completed: u64,
}

#[async_trait]
pub trait ReminderStore: Send + Sync {
    async fn insert(&self, reminder: NewReminder, now: StoredUtc) -> Result<ReminderId, StoreError>;

    async fn find(&self, query: ReminderQuery) -> Result<Vec<Reminder>, StoreError>;

    /// Returns false when no reminder has this id. Setting `Completed` stamps
    /// `completed_at`; any other status clears it.
    async fn set_status(
        &self,
        id: &str,
        status: ReminderStatus,
        now: StoredUtc,
    ) -> Result<bool, StoreError>;

    /// Record the approaching notification iff none was recorded yet.
    /// Returns whether this caller won the guard.
    async fn mark_approached(&self, id: &str, now: StoredUtc) -> Result<bool, StoreError>;

    /// Complete the reminder after a delivered final notification iff the
    /// final tier has not fired yet. Returns whether this caller won.
    async fn complete_final(&self, id: &str, now: StoredUtc) -> Result<bool, StoreError>;

    /// Record the overdue notification iff none was recorded yet; the
    /// reminder stays pending.
    async fn mark_overdue_notified(&self, id: &str, now: StoredUtc) -> Result<bool, StoreError>;

    async fn counts(&self, owner: Option<&str>) -> Result<ReminderCounts, StoreError>;
}

/// Write-once side collections: meeting records and the interaction audit log.
#[async_trait]
pub trait EventJournal: Send + Sync {
    async fn record_event(
        &self,
        event: NewScheduledEvent,
        now: StoredUtc,
    ) -> Result<String, StoreError>;

    async fn log_interaction(
        &self,
        owner: &str,
        input: &str,
        reply: &str,
        now: StoredUtc,
    ) -> Result<(), StoreError>;
}
