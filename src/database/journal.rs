//! `EventJournal` implementation: meetings and the interaction audit log.

use async_trait::async_trait;

use crate::core::error::StoreError;
use crate::core::time::StoredUtc;
use crate::features::reminders::model::NewScheduledEvent;
use crate::features::reminders::store::EventJournal;

use super::documents::{to_bson_date, EventDoc, InteractionDoc};
use super::Database;

#[async_trait]
impl EventJournal for Database {
    async fn record_event(
        &self,
        event: NewScheduledEvent,
        now: StoredUtc,
    ) -> Result<String, StoreError> {
        let payload = bson::to_bson(&event.payload)
            .map_err(|e| StoreError::Database(format!("payload encoding failed: {e}")))?;
        let document = EventDoc {
            id: None,
            user_id: event.owner,
            event_type: event.event_type,
            event_data: payload,
            scheduled_at: to_bson_date(now),
            status: "scheduled".to_string(),
        };
        let result = self
            .events
            .insert_one(document)
            .await
            .map_err(|e| StoreError::Database(format!("event insert failed: {e}")))?;
        Ok(result
            .inserted_id
            .as_object_id()
            .map(|oid| oid.to_hex())
            .unwrap_or_default())
    }

    async fn log_interaction(
        &self,
        owner: &str,
        input: &str,
        reply: &str,
        now: StoredUtc,
    ) -> Result<(), StoreError> {
        let document = InteractionDoc {
            id: None,
            user_id: owner.to_string(),
            user_input: input.to_string(),
            assistant_response: reply.to_string(),
            timestamp: to_bson_date(now),
            processed: true,
        };
        self.interactions
            .insert_one(document)
            .await
            .map_err(|e| StoreError::Database(format!("interaction insert failed: {e}")))?;
        Ok(())
    }
}
