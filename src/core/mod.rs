//! # Core Module
//!
//! Configuration, error taxonomy, and the clock/timezone adapter every other
//! component depends on.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod config;
pub mod error;
pub mod time;

// Re-export commonly used items
pub use config::Config;
pub use error::{ResolveError, ServiceError, StoreError};
pub use time::{LocalTime, StoredUtc, TimeKeeper, UtcTime};
