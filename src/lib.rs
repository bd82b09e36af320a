// Core layer - configuration, error taxonomy, clock/timezone adapter
pub mod core;

// Features layer - all feature modules
pub mod features;

// Infrastructure - MongoDB persistence
pub mod database;

// Re-export core config for convenience
pub use self::core::Config;

// Re-export feature items the binary composes
pub use features::{
    // Assistant front door
    Assistant,
    // Natural-language time resolution
    TimeResolver,
    // Outbound delivery
    Notifier, TelegramNotifier,
    // Reminder engine
    ReminderScheduler, ReminderService,
};
