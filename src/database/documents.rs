//! MongoDB document schemas and BSON boundary conversions.

use bson::{oid::ObjectId, Bson, DateTime as BsonDateTime};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::time::StoredUtc;
use crate::features::reminders::model::{
    NewReminder, Reminder, ReminderPriority, ReminderStatus,
};

pub const REMINDERS_COLLECTION: &str = "reminders";
pub const EVENTS_COLLECTION: &str = "scheduled_events";
pub const INTERACTIONS_COLLECTION: &str = "interactions";

/// BSON datetimes are UTC by definition, which is exactly the stored-instant
/// convention; these two functions are the only place the conversion lives.
pub fn to_bson_date(stored: StoredUtc) -> BsonDateTime {
    BsonDateTime::from_chrono(DateTime::<Utc>::from_naive_utc_and_offset(stored.raw(), Utc))
}

pub fn from_bson_date(date: BsonDateTime) -> StoredUtc {
    StoredUtc::from_raw(date.to_chrono().naive_utc())
}

/// Reminder document. Optional fields default so documents written by older
/// builds (without the guard fields) still deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub due_date: BsonDateTime,
    pub priority: ReminderPriority,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: ReminderStatus,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
    #[serde(default)]
    pub completed_at: Option<BsonDateTime>,
    #[serde(default)]
    pub last_reminded: Option<BsonDateTime>,
    #[serde(default)]
    pub immediate_notified: bool,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurrence_pattern: Option<String>,
}

impl ReminderDoc {
    pub fn from_new(reminder: NewReminder, now: StoredUtc) -> ReminderDoc {
        ReminderDoc {
            id: None,
            user_id: reminder.owner,
            title: reminder.title,
            description: reminder.description,
            due_date: to_bson_date(reminder.due_date),
            priority: reminder.priority,
            tags: reminder.tags,
            status: ReminderStatus::Pending,
            created_at: to_bson_date(now),
            updated_at: to_bson_date(now),
            completed_at: None,
            last_reminded: None,
            immediate_notified: false,
            is_recurring: reminder.is_recurring,
            recurrence_pattern: reminder.recurrence_pattern,
        }
    }

    /// Returns `None` for a document missing its `_id`, which a read from
    /// the server never produces in practice.
    pub fn into_domain(self) -> Option<Reminder> {
        let id = self.id?;
        Some(Reminder {
            id: id.to_hex(),
            owner: self.user_id,
            title: self.title,
            description: self.description,
            due_date: from_bson_date(self.due_date),
            priority: self.priority,
            tags: self.tags,
            status: self.status,
            created_at: from_bson_date(self.created_at),
            updated_at: from_bson_date(self.updated_at),
            completed_at: self.completed_at.map(from_bson_date),
            last_reminded: self.last_reminded.map(from_bson_date),
            immediate_notified: self.immediate_notified,
            is_recurring: self.is_recurring,
            recurrence_pattern: self.recurrence_pattern,
        })
    }
}

/// Write-once meeting record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub event_type: String,
    pub event_data: Bson,
    pub scheduled_at: BsonDateTime,
    pub status: String,
}

/// One assistant exchange, append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub user_input: String,
    pub assistant_response: String,
    pub timestamp: BsonDateTime,
    pub processed: bool,
}
