//! # Database Module
//!
//! MongoDB persistence: typed collections for reminders, scheduled events,
//! and the interaction log, with startup ping and index creation.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Guarded tier commits as server-side conditional updates
//! - 1.0.0: Initial collections and indexes

pub mod documents;
mod journal;
mod reminders;

#[cfg(test)]
pub mod memory;

use bson::doc;
use log::info;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};

use crate::core::config::Config;
use crate::core::error::StoreError;

use documents::{
    EventDoc, InteractionDoc, ReminderDoc, EVENTS_COLLECTION, INTERACTIONS_COLLECTION,
    REMINDERS_COLLECTION,
};

/// Handle to the assistant's collections. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    reminders: Collection<ReminderDoc>,
    events: Collection<EventDoc>,
    interactions: Collection<InteractionDoc>,
}

impl Database {
    /// Connect, verify with a ping, and make sure the indexes exist.
    pub async fn connect(config: &Config) -> Result<Database, StoreError> {
        // Bounded server selection so startup fails fast when the cluster is
        // unreachable instead of hanging.
        let uri = if config.mongodb_url.contains('?') {
            format!(
                "{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000",
                config.mongodb_url
            )
        } else {
            format!(
                "{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000",
                config.mongodb_url
            )
        };

        let client = Client::with_uri_str(&uri)
            .await
            .map_err(|e| StoreError::Database(format!("failed to connect to MongoDB: {e}")))?;

        let db = client.database(&config.database_name);
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Database(format!("MongoDB ping failed: {e}")))?;

        info!("Connected to MongoDB database '{}'", config.database_name);

        let database = Database {
            reminders: db.collection(REMINDERS_COLLECTION),
            events: db.collection(EVENTS_COLLECTION),
            interactions: db.collection(INTERACTIONS_COLLECTION),
        };
        database.ensure_indexes().await?;
        Ok(database)
    }

    /// The two query shapes the scheduler and the list surface lean on.
    async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let indices = vec![
            IndexModel::builder()
                .keys(doc! { "user_id": 1, "due_date": 1 })
                .options(IndexOptions::builder().name("user_due".to_string()).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "status": 1, "due_date": 1 })
                .options(IndexOptions::builder().name("status_due".to_string()).build())
                .build(),
        ];
        self.reminders
            .create_indexes(indices)
            .await
            .map_err(|e| StoreError::Database(format!("failed to create indexes: {e}")))?;
        Ok(())
    }
}
