//! # Reminders Feature
//!
//! The reminder lifecycle engine: domain model, store contract, notification
//! tier classification, the background scheduler, and the service API the
//! interactive surfaces drive.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Tier commits became conditional store updates; one tier per cycle
//! - 1.1.0: Meeting scheduling with automatic advance reminder
//! - 1.0.0: Initial model, scheduler and service

pub mod model;
pub mod scheduler;
pub mod service;
pub mod store;
pub mod tiers;

pub use model::{NewReminder, Reminder, ReminderId, ReminderPriority, ReminderStatus};
pub use scheduler::ReminderScheduler;
pub use service::{CreateReminder, DueSpec, ReminderService, StatusFilter};
pub use store::{EventJournal, ReminderQuery, ReminderStore};
pub use tiers::{evaluate, Tier};
