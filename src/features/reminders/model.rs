//! Reminder domain types.

use serde::{Deserialize, Serialize};

use crate::core::time::StoredUtc;

/// Opaque store-assigned identifier (ObjectId hex at this surface).
pub type ReminderId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    Pending,
    Completed,
    Cancelled,
    Snoozed,
}

impl ReminderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderStatus::Pending => "pending",
            ReminderStatus::Completed => "completed",
            ReminderStatus::Cancelled => "cancelled",
            ReminderStatus::Snoozed => "snoozed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl ReminderPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderPriority::Low => "low",
            ReminderPriority::Medium => "medium",
            ReminderPriority::High => "high",
            ReminderPriority::Urgent => "urgent",
        }
    }
}

/// A reminder as read back from the store.
///
/// `due_date` is immutable after creation. `last_reminded` and
/// `immediate_notified` are the per-tier guards: once set they keep the
/// approaching and final notifications from ever firing again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub owner: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: StoredUtc,
    pub priority: ReminderPriority,
    pub tags: Vec<String>,
    pub status: ReminderStatus,
    pub created_at: StoredUtc,
    pub updated_at: StoredUtc,
    pub completed_at: Option<StoredUtc>,
    pub last_reminded: Option<StoredUtc>,
    pub immediate_notified: bool,
    pub is_recurring: bool,
    pub recurrence_pattern: Option<String>,
}

/// Fields the caller provides when creating a reminder; the store assigns
/// the id and stamps `created_at`/`updated_at`.
#[derive(Debug, Clone)]
pub struct NewReminder {
    pub owner: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: StoredUtc,
    pub priority: ReminderPriority,
    pub tags: Vec<String>,
    pub is_recurring: bool,
    pub recurrence_pattern: Option<String>,
}

/// Write-once meeting record; the core never touches it again after insert.
#[derive(Debug, Clone)]
pub struct NewScheduledEvent {
    pub owner: String,
    pub event_type: String,
    pub payload: serde_json::Value,
}
