//! Barista Rush - an error-budget coffee shop arcade game
//!
//! Core modules:
//! - `session`: Deterministic game logic (levels, orders, SLO accounting)
//! - `config`: Data-driven campaign (SLO targets, order catalog, levels)
//! - `leaderboard`: Bounded top-10 score table
//!
//! The crate is a headless core: it never renders, never sleeps, and never
//! reads a clock. A host drives it with [`session::Event`]s (timer firings,
//! order clicks) plus the current timestamp, and executes the returned
//! [`session::Effect`] requests (draw an order, schedule a callback, show a
//! banner). See `main.rs` for a simulated host.

pub mod config;
pub mod leaderboard;
pub mod session;

pub use config::{Complexity, GameConfig, Level, OrderType, SloTarget};
pub use leaderboard::{Leaderboard, LeaderboardEntry, ScoreStore};
pub use session::{Effect, Event, GamePhase, Outcome, SessionState, apply};

/// Game tuning constants
pub mod consts {
    /// Delay between the level banner appearing and orders starting to spawn
    pub const LEVEL_LEADIN_MS: u64 = 2000;

    /// Cadence of per-order countdown checks. Display-refresh only; expiry
    /// truth is `now - spawned_at >= lifetime`, whenever the check lands.
    pub const COUNTDOWN_TICK_MS: u64 = 50;

    /// Points for completing an order, before the speed bonus
    pub const ORDER_BASE_POINTS: u64 = 100;

    /// One bonus point per this many milliseconds of remaining lifetime
    pub const SPEED_BONUS_DIVISOR_MS: u64 = 100;
}
