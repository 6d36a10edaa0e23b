//! The event/effect surface between core and host
//!
//! [`Event`] is everything the host may tell the core; [`Effect`] is
//! everything the core may ask of the host. The core owns no timers and no
//! screen: it requests callbacks and drawing through effects and trusts the
//! host to deliver clicks and firings back as events.

use glam::Vec2;

use super::state::{HudSnapshot, OrderId, SessionSummary, TimerId};
use crate::config::Level;

/// A host occurrence delivered to the core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Player committed to an SLO target (index into `config.slo_options`)
    SloSelected { index: usize },
    /// A timer previously requested via [`Effect::Schedule`] fired
    TimerFired { id: TimerId },
    /// Player clicked a rendered order
    OrderSelected { id: OrderId },
}

/// Success or failure flash next to an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Success,
    Failure,
}

/// A request from the core to the host
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Call back with `TimerFired { id: timer }` after `delay_ms`
    Schedule { timer: TimerId, delay_ms: u64 },
    /// Forget a pending callback. Idempotent: the handle may have already
    /// fired or been cancelled.
    CancelTimer { timer: TimerId },
    /// Draw a new order card
    RenderOrder {
        id: OrderId,
        name: String,
        icon: String,
        pos: Vec2,
        lifetime_ms: u64,
    },
    /// Refresh an order's countdown bar. Display-only; expiry does not
    /// depend on the host honoring this.
    UpdateOrderCountdown { id: OrderId, remaining_fraction: f32 },
    /// Release an order card's presentation resources
    RemoveOrder { id: OrderId },
    /// Flash feedback text at a position
    ShowFeedback {
        pos: Vec2,
        text: String,
        kind: FeedbackKind,
    },
    /// Announce a level
    ShowLevelBanner { level: Level },
    /// Refresh the header stats
    UpdateHud(HudSnapshot),
    /// Show the end screen; the host submits the score to its store from
    /// this summary once it has a player name
    ShowGameOver(SessionSummary),
}
