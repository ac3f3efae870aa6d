//! # Confluence Strategy Library
//!
//! This crate contains the confluence rules of the signal engine. It defines a
//! universal `Strategy` trait and the four concrete rules.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** Rules have no knowledge of gates, timers or notifications.
//!   They depend only on `core-types`, `indicators` and `configuration`.
//! - **Stateless Rules:** A rule is a predicate over the current bar window. All
//!   history lives in the engine's bar store, so the same window always yields the
//!   same candidate.
//! - **Fixed Priority:** `RuleSet` evaluates the enabled rules in `StrategyId`
//!   order and the first rule that fires wins.
//!
//! ## Public API
//!
//! - `Strategy`: The core trait all rules implement.
//! - `RuleSet`: The ordered collection built from configuration.
//! - The concrete rule structs themselves (e.g., `FvgFlip`).

pub mod error;
pub mod factory;
pub mod fvg_flip;
pub mod stoch_macd_scalp;
pub mod trend_rider;
pub mod triangle_sync;

pub use error::StrategyError;
pub use factory::{create_strategy, RuleSet};
pub use fvg_flip::FvgFlip;
pub use stoch_macd_scalp::StochMacdScalp;
pub use trend_rider::TrendRider;
pub use triangle_sync::TriangleSync;

pub use core_types::StrategyId;

use core_types::{Bar, Candidate};

/// The core trait that all confluence rules implement.
///
/// The `Send + Sync` bounds allow the rule set to be shared by every
/// instrument's evaluation task.
pub trait Strategy: Send + Sync {
    /// Which rule this is.
    fn id(&self) -> StrategyId;

    /// Evaluates the rule against the bar window, newest bar last.
    ///
    /// # Returns
    ///
    /// * `Some(Candidate)` - the rule's conditions are met on the newest bar.
    /// * `None` - the conditions are not met, or there is not enough history for
    ///   one of the indicators the rule needs.
    fn evaluate(&self, bars: &[Bar]) -> Option<Candidate>;
}
