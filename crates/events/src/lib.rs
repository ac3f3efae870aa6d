//! # Confluence Events
//!
//! This crate defines the outbound notifications emitted by the signal engine.
//!
//! As a Layer 0 crate, it depends only on `core-types` and provides the definitive
//! language between the engine and whatever delivers the alerts (Telegram, logs).

// Declare the modules that make up this crate.
pub mod messages;

// Re-export the core types to provide a clean public API.
pub use messages::{Notification, Session, TradeResult};
