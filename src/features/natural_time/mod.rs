//! # Natural Time Feature
//!
//! Turns free-text phrases ("mañana a las 3 pm", "in 20 minutes") into
//! future instants, interpreted in the configured civil timezone.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: English keyword spellings alongside the Spanish tables
//! - 1.0.0: Initial staged resolver

pub mod resolver;

pub use resolver::TimeResolver;
