//! Deterministic session logic
//!
//! All gameplay rules live here. This module must be pure and deterministic:
//! - Time arrives with each event; the core never reads a clock
//! - Seeded RNG only
//! - Stable iteration order (active orders keyed by id)
//! - No rendering or platform dependencies
//!
//! The host feeds [`Event`]s into [`apply`] and executes the [`Effect`]s it
//! gets back. Scheduling requests carry core-allocated [`TimerId`]s; the
//! host reports firings with the same ids and the core drops any it no
//! longer recognizes.

pub mod effect;
pub mod state;
pub mod step;

pub use effect::{Effect, Event, FeedbackKind};
pub use state::{
    GamePhase, HudSnapshot, Order, OrderId, Outcome, SessionState, SessionSummary, TimerId,
    TimerPurpose,
};
pub use step::apply;
