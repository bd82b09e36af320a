//! # Features Module
//!
//! All feature modules of the assistant backend.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

pub mod assistant;
pub mod natural_time;
pub mod notify;
pub mod reminders;

// Re-export the items the binary composes at startup
pub use assistant::Assistant;
pub use natural_time::TimeResolver;
pub use notify::{Notifier, TelegramNotifier};
pub use reminders::{ReminderScheduler, ReminderService};
