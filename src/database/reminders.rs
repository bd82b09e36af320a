//! `ReminderStore` implementation over the MongoDB collections.
//!
//! The tier guard commits put the guard's unset-ness in the update filter,
//! so check and set happen in one server-side operation: of any number of
//! concurrent pollers, exactly one sees `modified_count == 1`.

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use futures_util::StreamExt;
use log::{error, warn};

use crate::core::error::StoreError;
use crate::core::time::StoredUtc;
use crate::features::reminders::model::{NewReminder, Reminder, ReminderId, ReminderStatus};
use crate::features::reminders::store::{ReminderCounts, ReminderQuery, ReminderStore};

use super::documents::{to_bson_date, ReminderDoc};
use super::Database;

fn db_err(context: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::Database(format!("{context}: {e}"))
}

fn parse_id(id: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id).map_err(|_| StoreError::BadId(id.to_string()))
}

/// Matches documents where `field` is null or absent entirely (reminders
/// written before the guard fields existed).
fn guard_unset(field: &str) -> Bson {
    Bson::Array(vec![
        Bson::Document(doc! { field: Bson::Null }),
        Bson::Document(doc! { field: { "$exists": false } }),
    ])
}

fn query_filter(query: &ReminderQuery) -> Document {
    let mut filter = Document::new();
    if let Some(owner) = &query.owner {
        filter.insert("user_id", owner);
    }
    if let Some(status) = query.status {
        filter.insert("status", status.as_str());
    }
    let mut due = Document::new();
    if let Some(after) = query.due_after {
        due.insert("$gt", to_bson_date(after));
    }
    if let Some(until) = query.due_at_or_before {
        due.insert("$lte", to_bson_date(until));
    }
    if !due.is_empty() {
        filter.insert("due_date", due);
    }
    if query.never_reminded {
        filter.insert("$or", guard_unset("last_reminded"));
    }
    if query.awaiting_final {
        filter.insert("immediate_notified", doc! { "$ne": true });
    }
    filter
}

#[async_trait]
impl ReminderStore for Database {
    async fn insert(&self, reminder: NewReminder, now: StoredUtc) -> Result<ReminderId, StoreError> {
        let document = ReminderDoc::from_new(reminder, now);
        let result = self
            .reminders
            .insert_one(document)
            .await
            .map_err(|e| db_err("insert failed", e))?;
        result
            .inserted_id
            .as_object_id()
            .map(|oid| oid.to_hex())
            .ok_or_else(|| StoreError::Database("insert returned no object id".to_string()))
    }

    async fn find(&self, query: ReminderQuery) -> Result<Vec<Reminder>, StoreError> {
        let filter = query_filter(&query);
        let mut find = self.reminders.find(filter);
        if query.sort_due_ascending {
            find = find.sort(doc! { "due_date": 1 });
        }
        if let Some(limit) = query.limit {
            find = find.limit(limit);
        }

        let mut cursor = find.await.map_err(|e| db_err("find failed", e))?;
        let mut results = Vec::new();
        while let Some(item) = cursor.next().await {
            match item {
                Ok(document) => match document.into_domain() {
                    Some(reminder) => results.push(reminder),
                    None => warn!("skipping reminder document without _id"),
                },
                Err(e) => error!("error reading reminder document: {e}"),
            }
        }
        Ok(results)
    }

    async fn set_status(
        &self,
        id: &str,
        status: ReminderStatus,
        now: StoredUtc,
    ) -> Result<bool, StoreError> {
        let oid = parse_id(id)?;
        let completed_at = if status == ReminderStatus::Completed {
            Bson::DateTime(to_bson_date(now))
        } else {
            Bson::Null
        };
        let update = doc! {
            "$set": {
                "status": status.as_str(),
                "completed_at": completed_at,
                "updated_at": to_bson_date(now),
            }
        };
        let result = self
            .reminders
            .update_one(doc! { "_id": oid }, update)
            .await
            .map_err(|e| db_err("status update failed", e))?;
        Ok(result.matched_count > 0)
    }

    async fn mark_approached(&self, id: &str, now: StoredUtc) -> Result<bool, StoreError> {
        let oid = parse_id(id)?;
        let filter = doc! {
            "_id": oid,
            "status": ReminderStatus::Pending.as_str(),
            "$or": guard_unset("last_reminded"),
        };
        let update = doc! {
            "$set": {
                "last_reminded": to_bson_date(now),
                "updated_at": to_bson_date(now),
            }
        };
        let result = self
            .reminders
            .update_one(filter, update)
            .await
            .map_err(|e| db_err("approaching commit failed", e))?;
        Ok(result.modified_count == 1)
    }

    async fn complete_final(&self, id: &str, now: StoredUtc) -> Result<bool, StoreError> {
        let oid = parse_id(id)?;
        let filter = doc! {
            "_id": oid,
            "status": ReminderStatus::Pending.as_str(),
            "immediate_notified": { "$ne": true },
        };
        let update = doc! {
            "$set": {
                "status": ReminderStatus::Completed.as_str(),
                "completed_at": to_bson_date(now),
                "immediate_notified": true,
                "last_reminded": to_bson_date(now),
                "updated_at": to_bson_date(now),
            }
        };
        let result = self
            .reminders
            .update_one(filter, update)
            .await
            .map_err(|e| db_err("final commit failed", e))?;
        Ok(result.modified_count == 1)
    }

    async fn mark_overdue_notified(&self, id: &str, now: StoredUtc) -> Result<bool, StoreError> {
        let oid = parse_id(id)?;
        let filter = doc! {
            "_id": oid,
            "status": ReminderStatus::Pending.as_str(),
            "$or": guard_unset("last_reminded"),
        };
        let update = doc! {
            "$set": {
                "last_reminded": to_bson_date(now),
                "updated_at": to_bson_date(now),
            }
        };
        let result = self
            .reminders
            .update_one(filter, update)
            .await
            .map_err(|e| db_err("overdue commit failed", e))?;
        Ok(result.modified_count == 1)
    }

    async fn counts(&self, owner: Option<&str>) -> Result<ReminderCounts, StoreError> {
        let mut base = Document::new();
        if let Some(owner) = owner {
            base.insert("user_id", owner);
        }

        let mut pending = base.clone();
        pending.insert("status", ReminderStatus::Pending.as_str());
        let mut completed = base.clone();
        completed.insert("status", ReminderStatus::Completed.as_str());

        Ok(ReminderCounts {
            total: self
                .reminders
                .count_documents(base)
                .await
                .map_err(|e| db_err("count failed", e))?,
            pending: self
                .reminders
                .count_documents(pending)
                .await
                .map_err(|e| db_err("count failed", e))?,
            completed: self
                .reminders
                .count_documents(completed)
                .await
                .map_err(|e| db_err("count failed", e))?,
        })
    }
}
