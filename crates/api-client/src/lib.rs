//! Adapters for the engine's external data sources: the economic calendar
//! feeding the news blackout and the WebSocket stream of bar updates.

pub mod calendar;
pub mod error;
pub mod feed;

// --- Public API ---
pub use calendar::{CalendarEvent, CalendarSource, ForexFactoryCalendar};
pub use error::ApiError;
pub use feed::{parse_frame, BarFeed};
