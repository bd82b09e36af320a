//! In-memory store double for the unit tests.
//!
//! Mirrors the guard semantics of the MongoDB implementation: each tier
//! commit checks and sets under one lock acquisition, so it reports a single
//! winner exactly like the server-side conditional update does.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::core::error::StoreError;
use crate::core::time::StoredUtc;
use crate::features::reminders::model::{
    NewReminder, NewScheduledEvent, Reminder, ReminderId, ReminderStatus,
};
use crate::features::reminders::store::{
    EventJournal, ReminderCounts, ReminderQuery, ReminderStore,
};

#[derive(Default)]
struct Inner {
    seq: u64,
    reminders: Vec<Reminder>,
    events: Vec<NewScheduledEvent>,
    interactions: Vec<(String, String, String)>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub async fn get(&self, id: &str) -> Option<Reminder> {
        self.inner
            .lock()
            .await
            .reminders
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub async fn events(&self) -> Vec<NewScheduledEvent> {
        self.inner.lock().await.events.clone()
    }

    pub async fn interactions(&self) -> Vec<(String, String, String)> {
        self.inner.lock().await.interactions.clone()
    }
}

#[async_trait]
impl ReminderStore for MemoryStore {
    async fn insert(&self, reminder: NewReminder, now: StoredUtc) -> Result<ReminderId, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.seq += 1;
        let id = format!("{:024x}", inner.seq);
        inner.reminders.push(Reminder {
            id: id.clone(),
            owner: reminder.owner,
            title: reminder.title,
            description: reminder.description,
            due_date: reminder.due_date,
            priority: reminder.priority,
            tags: reminder.tags,
            status: ReminderStatus::Pending,
            created_at: now,
            updated_at: now,
            completed_at: None,
            last_reminded: None,
            immediate_notified: false,
            is_recurring: reminder.is_recurring,
            recurrence_pattern: reminder.recurrence_pattern,
        });
        Ok(id)
    }

    async fn find(&self, query: ReminderQuery) -> Result<Vec<Reminder>, StoreError> {
        let inner = self.inner.lock().await;
        // Raw comparisons are fine here: this *is* the storage boundary and
        // every stored instant shares the same convention.
        let mut results: Vec<Reminder> = inner
            .reminders
            .iter()
            .filter(|r| {
                if let Some(owner) = &query.owner {
                    if &r.owner != owner {
                        return false;
                    }
                }
                if let Some(status) = query.status {
                    if r.status != status {
                        return false;
                    }
                }
                if let Some(after) = query.due_after {
                    if r.due_date.raw() <= after.raw() {
                        return false;
                    }
                }
                if let Some(until) = query.due_at_or_before {
                    if r.due_date.raw() > until.raw() {
                        return false;
                    }
                }
                if query.never_reminded && r.last_reminded.is_some() {
                    return false;
                }
                if query.awaiting_final && r.immediate_notified {
                    return false;
                }
                true
            })
            .cloned()
            .collect();

        if query.sort_due_ascending {
            results.sort_by_key(|r| r.due_date.raw());
        }
        if let Some(limit) = query.limit {
            results.truncate(limit as usize);
        }
        Ok(results)
    }

    async fn set_status(
        &self,
        id: &str,
        status: ReminderStatus,
        now: StoredUtc,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.reminders.iter_mut().find(|r| r.id == id) {
            Some(r) => {
                r.status = status;
                r.completed_at = if status == ReminderStatus::Completed {
                    Some(now)
                } else {
                    None
                };
                r.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_approached(&self, id: &str, now: StoredUtc) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.reminders.iter_mut().find(|r| r.id == id) {
            Some(r) if r.status == ReminderStatus::Pending && r.last_reminded.is_none() => {
                r.last_reminded = Some(now);
                r.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn complete_final(&self, id: &str, now: StoredUtc) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.reminders.iter_mut().find(|r| r.id == id) {
            Some(r) if r.status == ReminderStatus::Pending && !r.immediate_notified => {
                r.status = ReminderStatus::Completed;
                r.completed_at = Some(now);
                r.immediate_notified = true;
                r.last_reminded = Some(now);
                r.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_overdue_notified(&self, id: &str, now: StoredUtc) -> Result<bool, StoreError> {
        self.mark_approached(id, now).await
    }

    async fn counts(&self, owner: Option<&str>) -> Result<ReminderCounts, StoreError> {
        let inner = self.inner.lock().await;
        let matching: Vec<_> = inner
            .reminders
            .iter()
            .filter(|r| owner.map_or(true, |o| r.owner == o))
            .collect();
        Ok(ReminderCounts {
            total: matching.len() as u64,
            pending: matching
                .iter()
                .filter(|r| r.status == ReminderStatus::Pending)
                .count() as u64,
            completed: matching
                .iter()
                .filter(|r| r.status == ReminderStatus::Completed)
                .count() as u64,
        })
    }
}

#[async_trait]
impl EventJournal for MemoryStore {
    async fn record_event(
        &self,
        event: NewScheduledEvent,
        _now: StoredUtc,
    ) -> Result<String, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.seq += 1;
        let id = format!("{:024x}", inner.seq);
        inner.events.push(event);
        Ok(id)
    }

    async fn log_interaction(
        &self,
        owner: &str,
        input: &str,
        reply: &str,
        _now: StoredUtc,
    ) -> Result<(), StoreError> {
        self.inner.lock().await.interactions.push((
            owner.to_string(),
            input.to_string(),
            reply.to_string(),
        ));
        Ok(())
    }
}
