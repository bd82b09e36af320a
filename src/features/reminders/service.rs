//! Reminder-facing service API.
//!
//! This is the surface an HTTP layer (out of scope here) or the interactive
//! assistant drives: create a reminder from a phrase or an explicit instant,
//! list a user's reminders, flip a status, schedule a meeting with its
//! automatic advance reminder.

use std::sync::Arc;

use chrono::Duration;
use log::info;

use crate::core::error::{ServiceError, StoreError};
use crate::core::time::{StoredUtc, TimeKeeper};
use crate::features::natural_time::TimeResolver;

use super::model::{
    NewReminder, NewScheduledEvent, Reminder, ReminderId, ReminderPriority, ReminderStatus,
};
use super::store::{EventJournal, ReminderCounts, ReminderQuery, ReminderStore};

/// Minutes before a meeting that its linked reminder comes due.
const MEETING_LEAD_MINUTES: i64 = 15;

/// When the caller specifies the due instant directly it is taken as-is;
/// free text goes through the resolver and is guaranteed to land in the
/// future.
#[derive(Debug, Clone)]
pub enum DueSpec {
    Text(String),
    Instant(StoredUtc),
}

#[derive(Debug, Clone)]
pub struct CreateReminder {
    pub owner: String,
    pub title: String,
    pub description: Option<String>,
    pub due: DueSpec,
    pub priority: ReminderPriority,
    pub tags: Vec<String>,
    pub is_recurring: bool,
    pub recurrence_pattern: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub enum StatusFilter {
    Any,
    Only(ReminderStatus),
}

#[derive(Debug, Clone)]
pub struct CreatedReminder {
    pub id: ReminderId,
    pub due_date: StoredUtc,
}

#[derive(Debug, Clone)]
pub struct ScheduledMeeting {
    pub reminder_id: ReminderId,
    pub meeting_at: StoredUtc,
    pub reminder_at: StoredUtc,
}

pub struct ReminderService<S> {
    store: Arc<S>,
    resolver: TimeResolver,
    keeper: TimeKeeper,
}

impl<S: ReminderStore + EventJournal> ReminderService<S> {
    pub fn new(store: Arc<S>, keeper: TimeKeeper) -> ReminderService<S> {
        ReminderService {
            store,
            resolver: TimeResolver::new(keeper),
            keeper,
        }
    }

    pub fn keeper(&self) -> &TimeKeeper {
        &self.keeper
    }

    pub async fn create(&self, request: CreateReminder) -> Result<CreatedReminder, ServiceError> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(ServiceError::EmptyTitle);
        }

        let due_date = match &request.due {
            DueSpec::Text(phrase) => self.resolver.resolve(phrase, self.keeper.now_local())?,
            DueSpec::Instant(instant) => *instant,
        };

        let now = self.keeper.strip_zone(self.keeper.now_utc());
        let id = self
            .store
            .insert(
                NewReminder {
                    owner: request.owner.clone(),
                    title: title.to_string(),
                    description: request.description.clone(),
                    due_date,
                    priority: request.priority,
                    tags: request.tags.clone(),
                    is_recurring: request.is_recurring,
                    recurrence_pattern: request.recurrence_pattern.clone(),
                },
                now,
            )
            .await?;

        info!("Created reminder {id} '{title}' for {}", request.owner);
        Ok(CreatedReminder { id, due_date })
    }

    /// Reminders for one owner, soonest due first.
    pub async fn list(
        &self,
        owner: &str,
        filter: StatusFilter,
    ) -> Result<Vec<Reminder>, ServiceError> {
        let query = match filter {
            StatusFilter::Any => ReminderQuery::any(),
            StatusFilter::Only(status) => ReminderQuery::with_status(status),
        }
        .for_owner(owner)
        .sorted_by_due();
        Ok(self.store.find(query).await?)
    }

    pub async fn set_status(&self, id: &str, status: ReminderStatus) -> Result<(), ServiceError> {
        let now = self.keeper.strip_zone(self.keeper.now_utc());
        match self.store.set_status(id, status, now).await {
            Ok(true) => {
                info!("Reminder {id} set to {}", status.as_str());
                Ok(())
            }
            Ok(false) => Err(ServiceError::NotFound),
            // A malformed id cannot name anything: same client error.
            Err(StoreError::BadId(_)) => Err(ServiceError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Record a meeting and create its linked reminder 15 minutes before.
    pub async fn schedule_meeting(
        &self,
        owner: &str,
        title: &str,
        when_text: &str,
        raw_request: &str,
    ) -> Result<ScheduledMeeting, ServiceError> {
        let meeting_at = self.resolver.resolve(when_text, self.keeper.now_local())?;
        let reminder_at = self.keeper.strip_zone(
            self.keeper
                .rehydrate(meeting_at)
                .minus(Duration::minutes(MEETING_LEAD_MINUTES)),
        );

        let now = self.keeper.strip_zone(self.keeper.now_utc());
        self.store
            .record_event(
                NewScheduledEvent {
                    owner: owner.to_string(),
                    event_type: "meeting".to_string(),
                    payload: serde_json::json!({
                        "title": title,
                        "description": raw_request,
                        "scheduled_datetime": meeting_at.raw().format("%Y-%m-%dT%H:%M:%S").to_string(),
                    }),
                },
                now,
            )
            .await?;

        let reminder_id = self
            .store
            .insert(
                NewReminder {
                    owner: owner.to_string(),
                    title: format!("Reunión: {title}"),
                    description: Some(format!("Reunión programada: {raw_request}")),
                    due_date: reminder_at,
                    priority: ReminderPriority::Medium,
                    tags: vec!["reunión".to_string(), "automático".to_string()],
                    is_recurring: false,
                    recurrence_pattern: None,
                },
                now,
            )
            .await?;

        info!("Scheduled meeting '{title}' for {owner} with reminder {reminder_id}");
        Ok(ScheduledMeeting {
            reminder_id,
            meeting_at,
            reminder_at,
        })
    }

    pub async fn stats(&self, owner: Option<&str>) -> Result<ReminderCounts, ServiceError> {
        Ok(self.store.counts(owner).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use chrono_tz::America::Caracas;

    fn service() -> (Arc<MemoryStore>, ReminderService<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let keeper = TimeKeeper::new(Caracas);
        (store.clone(), ReminderService::new(store, keeper))
    }

    fn request(title: &str, due: DueSpec) -> CreateReminder {
        CreateReminder {
            owner: "ana".to_string(),
            title: title.to_string(),
            description: None,
            due,
            priority: ReminderPriority::Medium,
            tags: vec![],
            is_recurring: false,
            recurrence_pattern: None,
        }
    }

    #[tokio::test]
    async fn test_create_from_phrase_lands_in_the_future() {
        let (_, service) = service();
        let created = service
            .create(request("llamar a Juan", DueSpec::Text("en 5 minutos".into())))
            .await
            .unwrap();
        let keeper = *service.keeper();
        assert!(keeper.rehydrate(created.due_date) > keeper.now_utc());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let (_, service) = service();
        let result = service
            .create(request("   ", DueSpec::Text("en 5 minutos".into())))
            .await;
        assert!(matches!(result, Err(ServiceError::EmptyTitle)));
    }

    #[tokio::test]
    async fn test_create_surfaces_resolution_failure() {
        let (_, service) = service();
        // Interval amount far beyond any representable instant.
        let result = service
            .create(request("x", DueSpec::Text("en 99999999999999999 minutos".into())))
            .await;
        assert!(matches!(result, Err(ServiceError::Resolve(_))));
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_due() {
        let (_, service) = service();
        let keeper = *service.keeper();
        let base = keeper.now_utc();
        for minutes in [30i64, 10, 20] {
            let due = keeper.strip_zone(base.plus(Duration::minutes(minutes)));
            service
                .create(request(&format!("r{minutes}"), DueSpec::Instant(due)))
                .await
                .unwrap();
        }
        let listed = service.list("ana", StatusFilter::Any).await.unwrap();
        let titles: Vec<_> = listed.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["r10", "r20", "r30"]);
    }

    #[tokio::test]
    async fn test_list_filters_by_status_and_owner() {
        let (_, service) = service();
        let keeper = *service.keeper();
        let due = keeper.strip_zone(keeper.now_utc().plus(Duration::minutes(10)));
        let created = service
            .create(request("mía", DueSpec::Instant(due)))
            .await
            .unwrap();
        let mut other = request("ajena", DueSpec::Instant(due));
        other.owner = "luis".to_string();
        service.create(other).await.unwrap();

        service
            .set_status(&created.id, ReminderStatus::Completed)
            .await
            .unwrap();

        let pending = service
            .list("ana", StatusFilter::Only(ReminderStatus::Pending))
            .await
            .unwrap();
        assert!(pending.is_empty());
        let completed = service
            .list("ana", StatusFilter::Only(ReminderStatus::Completed))
            .await
            .unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].title, "mía");
    }

    #[tokio::test]
    async fn test_set_status_keeps_completion_stamp_consistent() {
        let (store, service) = service();
        let keeper = *service.keeper();
        let due = keeper.strip_zone(keeper.now_utc().plus(Duration::minutes(10)));
        let created = service
            .create(request("tarea", DueSpec::Instant(due)))
            .await
            .unwrap();

        service
            .set_status(&created.id, ReminderStatus::Completed)
            .await
            .unwrap();
        let r = store.get(&created.id).await.unwrap();
        assert_eq!(r.completed_at.is_some(), r.status == ReminderStatus::Completed);

        // Reopening clears the stamp.
        service
            .set_status(&created.id, ReminderStatus::Pending)
            .await
            .unwrap();
        let r = store.get(&created.id).await.unwrap();
        assert!(r.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_set_status_unknown_id_is_not_found() {
        let (_, service) = service();
        let result = service
            .set_status("000000000000000000000000", ReminderStatus::Cancelled)
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_schedule_meeting_creates_advance_reminder() {
        let (store, service) = service();
        let keeper = *service.keeper();
        let meeting = service
            .schedule_meeting("ana", "revisión de equipo", "mañana a las 3 pm", "reunión mañana a las 3 pm")
            .await
            .unwrap();

        let gap = keeper
            .rehydrate(meeting.meeting_at)
            .since(keeper.rehydrate(meeting.reminder_at));
        assert_eq!(gap, Duration::minutes(15));

        let r = store.get(&meeting.reminder_id).await.unwrap();
        assert_eq!(r.title, "Reunión: revisión de equipo");
        assert!(r.tags.contains(&"automático".to_string()));
        assert_eq!(store.events().await.len(), 1);
    }

    #[tokio::test]
    async fn test_stats_counts_by_status() {
        let (_, service) = service();
        let keeper = *service.keeper();
        let due = keeper.strip_zone(keeper.now_utc().plus(Duration::minutes(10)));
        let a = service.create(request("a", DueSpec::Instant(due))).await.unwrap();
        service.create(request("b", DueSpec::Instant(due))).await.unwrap();
        service.set_status(&a.id, ReminderStatus::Completed).await.unwrap();

        let counts = service.stats(Some("ana")).await.unwrap();
        assert_eq!(counts.total, 2);
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.completed, 1);
    }
}
