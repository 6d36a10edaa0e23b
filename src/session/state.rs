//! Session state and core types
//!
//! One [`SessionState`] aggregate per game session, created by
//! [`SessionState::new`] and discarded wholesale on "play again". Nothing in
//! here survives a reset.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::config::{OrderType, SloTarget};

/// Current phase of a session. Strictly forward; the only way back to
/// `SloSelection` is a full reset that recreates the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Waiting for the player to commit to an SLO target
    SloSelection,
    /// Active gameplay
    Playing,
    /// Session ended
    GameOver,
}

/// How a session ended. Exactly one of the two; there is no third outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// All levels completed
    Won,
    /// Error budget exhausted
    Lost,
}

/// Stable identity of a live order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderId(pub u32);

/// Handle for a scheduling request. Allocated by the core, mapped to a real
/// cancellable timer by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u32);

/// A live order, spawn until completion or expiry
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub kind: OrderType,
    pub spawned_at_ms: u64,
    /// Fixed at spawn from global config, identical across order kinds
    pub lifetime_ms: u64,
    /// Where the card is drawn. Display-only.
    pub pos: Vec2,
}

impl Order {
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.spawned_at_ms)
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.lifetime_ms.saturating_sub(self.elapsed_ms(now_ms))
    }

    /// Fraction of lifetime left, for the countdown bar
    pub fn remaining_fraction(&self, now_ms: u64) -> f32 {
        if self.lifetime_ms == 0 {
            return 0.0;
        }
        self.remaining_ms(now_ms) as f32 / self.lifetime_ms as f32
    }

    /// The authoritative expiry test
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.elapsed_ms(now_ms) >= self.lifetime_ms
    }
}

/// What a registered timer is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPurpose {
    /// Lead-in between level banner and first spawn
    LevelStart,
    /// Level duration elapsed, advance to the next
    LevelEnd,
    /// Next order spawn
    Spawn,
    /// Per-order countdown check
    CountdownTick(OrderId),
}

/// Live timer handles, keyed by purpose.
///
/// Cancellation on level transition or game over drains the registry rather
/// than chasing individually tracked variables; a firing whose id is no
/// longer registered is stale and ignored.
#[derive(Debug, Clone, Default)]
pub struct TimerRegistry {
    level_start: Option<TimerId>,
    level_end: Option<TimerId>,
    spawn: Option<TimerId>,
    countdown: BTreeMap<TimerId, OrderId>,
}

impl TimerRegistry {
    /// Register a timer under its purpose. Returns the handle it displaced,
    /// which the caller must cancel.
    pub fn register(&mut self, id: TimerId, purpose: TimerPurpose) -> Option<TimerId> {
        match purpose {
            TimerPurpose::LevelStart => self.level_start.replace(id),
            TimerPurpose::LevelEnd => self.level_end.replace(id),
            TimerPurpose::Spawn => self.spawn.replace(id),
            TimerPurpose::CountdownTick(order) => {
                self.countdown.insert(id, order);
                None
            }
        }
    }

    /// Consume a firing. `None` means the handle was cancelled or already
    /// fired; the firing must be ignored.
    pub fn acknowledge(&mut self, id: TimerId) -> Option<TimerPurpose> {
        if self.level_start == Some(id) {
            self.level_start = None;
            return Some(TimerPurpose::LevelStart);
        }
        if self.level_end == Some(id) {
            self.level_end = None;
            return Some(TimerPurpose::LevelEnd);
        }
        if self.spawn == Some(id) {
            self.spawn = None;
            return Some(TimerPurpose::Spawn);
        }
        self.countdown.remove(&id).map(TimerPurpose::CountdownTick)
    }

    /// Drop the level-scoped timers (spawn, level start/end), returning the
    /// handles to cancel. Per-order countdown timers keep running; orders
    /// outlive level transitions.
    pub fn take_level_timers(&mut self) -> Vec<TimerId> {
        [self.level_start.take(), self.level_end.take(), self.spawn.take()]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Drop the countdown timer watching a specific order, if any
    pub fn take_countdown_for(&mut self, order: OrderId) -> Option<TimerId> {
        let id = self
            .countdown
            .iter()
            .find(|(_, watched)| **watched == order)
            .map(|(id, _)| *id)?;
        self.countdown.remove(&id);
        Some(id)
    }

    /// Drop everything, returning every live handle to cancel
    pub fn drain(&mut self) -> Vec<TimerId> {
        let mut ids = self.take_level_timers();
        ids.extend(std::mem::take(&mut self.countdown).into_keys());
        ids
    }

    pub fn is_registered(&self, id: TimerId) -> bool {
        self.level_start == Some(id)
            || self.level_end == Some(id)
            || self.spawn == Some(id)
            || self.countdown.contains_key(&id)
    }
}

/// HUD contents, emitted whenever the numbers change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub target_name: String,
    pub target_value: f64,
    pub budget_remaining: u32,
    pub measured_slo: f64,
    pub score: u64,
    /// 1-based level shown to the player
    pub level_number: u32,
    pub successful_orders: u32,
    pub total_orders: u32,
}

/// Final stats, for the game-over screen and leaderboard submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub outcome: Outcome,
    pub score: u64,
    pub target_name: String,
    pub target_value: f64,
    pub measured_slo: f64,
    pub successful_orders: u32,
    pub failed_orders: u32,
    pub total_orders: u32,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub phase: GamePhase,
    /// Set exactly once, when `phase` becomes `GameOver`
    pub outcome: Option<Outcome>,
    /// Chosen at SLO selection, never mutated afterwards
    pub target: Option<SloTarget>,
    /// Index into the configured level sequence
    pub level_index: usize,
    pub total_orders: u32,
    pub successful_orders: u32,
    pub failed_orders: u32,
    pub budget_remaining: u32,
    /// successful / total, or 1.0 before any order has resolved
    pub measured_slo: f64,
    pub score: u64,
    /// Live orders. Removal is the linearization point deciding the
    /// completion/expiry race.
    active_orders: BTreeMap<OrderId, Order>,
    pub timers: TimerRegistry,
    pub(crate) rng: Pcg32,
    next_order_id: u32,
    next_timer_id: u32,
}

impl SessionState {
    /// Create a fresh session in `SloSelection`. This is the one reset
    /// operation; "play again" builds a new state rather than rewinding the
    /// old one.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            phase: GamePhase::SloSelection,
            outcome: None,
            target: None,
            level_index: 0,
            total_orders: 0,
            successful_orders: 0,
            failed_orders: 0,
            budget_remaining: 0,
            measured_slo: 1.0,
            score: 0,
            active_orders: BTreeMap::new(),
            timers: TimerRegistry::default(),
            rng: Pcg32::seed_from_u64(seed),
            next_order_id: 1,
            next_timer_id: 1,
        }
    }

    pub fn next_order_id(&mut self) -> OrderId {
        let id = OrderId(self.next_order_id);
        self.next_order_id += 1;
        id
    }

    pub fn next_timer_id(&mut self) -> TimerId {
        let id = TimerId(self.next_timer_id);
        self.next_timer_id += 1;
        id
    }

    pub fn active_order(&self, id: OrderId) -> Option<&Order> {
        self.active_orders.get(&id)
    }

    pub fn active_order_count(&self) -> usize {
        self.active_orders.len()
    }

    pub fn insert_order(&mut self, order: Order) {
        self.active_orders.insert(order.id, order);
    }

    /// Compare-and-remove: whichever terminal transition gets the order out
    /// of the map wins; the loser sees `None` and must do nothing.
    pub fn take_order(&mut self, id: OrderId) -> Option<Order> {
        self.active_orders.remove(&id)
    }

    /// Remove every live order (session end cleanup)
    pub fn drain_orders(&mut self) -> Vec<Order> {
        std::mem::take(&mut self.active_orders).into_values().collect()
    }

    pub fn recompute_slo(&mut self) {
        self.measured_slo = if self.total_orders > 0 {
            f64::from(self.successful_orders) / f64::from(self.total_orders)
        } else {
            1.0
        };
    }

    /// Snapshot for the HUD. `None` before an SLO target is chosen.
    pub fn hud_snapshot(&self) -> Option<HudSnapshot> {
        let target = self.target.as_ref()?;
        Some(HudSnapshot {
            target_name: target.name.clone(),
            target_value: target.value,
            budget_remaining: self.budget_remaining,
            measured_slo: self.measured_slo,
            score: self.score,
            level_number: self.level_index as u32 + 1,
            successful_orders: self.successful_orders,
            total_orders: self.total_orders,
        })
    }

    /// Final stats. `None` until the session has ended.
    pub fn summary(&self) -> Option<SessionSummary> {
        let target = self.target.as_ref()?;
        Some(SessionSummary {
            outcome: self.outcome?,
            score: self.score,
            target_name: target.name.clone(),
            target_value: target.value,
            measured_slo: self.measured_slo,
            successful_orders: self.successful_orders,
            failed_orders: self.failed_orders,
            total_orders: self.total_orders,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: u32) -> Order {
        Order {
            id: OrderId(id),
            kind: OrderType {
                name: "Latte".into(),
                icon: "🥤".into(),
                prep_time_ms: 3000,
            },
            spawned_at_ms: 1000,
            lifetime_ms: 10_000,
            pos: Vec2::new(400.0, 300.0),
        }
    }

    #[test]
    fn test_order_time_accounting() {
        let o = order(1);
        assert_eq!(o.elapsed_ms(4000), 3000);
        assert_eq!(o.remaining_ms(4000), 7000);
        assert!((o.remaining_fraction(6000) - 0.5).abs() < 1e-6);
        assert!(!o.is_expired(10_999));
        assert!(o.is_expired(11_000));
        // Clock running "before" spawn (host jitter) reads as zero elapsed
        assert_eq!(o.elapsed_ms(500), 0);
        assert!((o.remaining_fraction(500) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_registry_acknowledge_consumes() {
        let mut timers = TimerRegistry::default();
        timers.register(TimerId(1), TimerPurpose::Spawn);
        assert_eq!(timers.acknowledge(TimerId(1)), Some(TimerPurpose::Spawn));
        // Second firing of the same handle is stale
        assert_eq!(timers.acknowledge(TimerId(1)), None);
    }

    #[test]
    fn test_registry_register_reports_displaced_handle() {
        let mut timers = TimerRegistry::default();
        assert_eq!(timers.register(TimerId(1), TimerPurpose::Spawn), None);
        assert_eq!(
            timers.register(TimerId(2), TimerPurpose::Spawn),
            Some(TimerId(1))
        );
        assert!(!timers.is_registered(TimerId(1)));
        assert!(timers.is_registered(TimerId(2)));
    }

    #[test]
    fn test_registry_level_timers_leave_countdowns() {
        let mut timers = TimerRegistry::default();
        timers.register(TimerId(1), TimerPurpose::Spawn);
        timers.register(TimerId(2), TimerPurpose::LevelEnd);
        timers.register(TimerId(3), TimerPurpose::CountdownTick(OrderId(7)));

        let cancelled = timers.take_level_timers();
        assert_eq!(cancelled.len(), 2);
        assert!(timers.is_registered(TimerId(3)));

        assert_eq!(timers.take_countdown_for(OrderId(7)), Some(TimerId(3)));
        assert_eq!(timers.take_countdown_for(OrderId(7)), None);
    }

    #[test]
    fn test_registry_drain_empties_everything() {
        let mut timers = TimerRegistry::default();
        timers.register(TimerId(1), TimerPurpose::LevelStart);
        timers.register(TimerId(2), TimerPurpose::CountdownTick(OrderId(1)));
        timers.register(TimerId(3), TimerPurpose::CountdownTick(OrderId(2)));

        let mut ids = timers.drain();
        ids.sort();
        assert_eq!(ids, vec![TimerId(1), TimerId(2), TimerId(3)]);
        assert!(timers.drain().is_empty());
    }

    #[test]
    fn test_take_order_is_first_wins() {
        let mut state = SessionState::new(7);
        state.insert_order(order(1));
        assert!(state.take_order(OrderId(1)).is_some());
        // The racing transition loses and must no-op
        assert!(state.take_order(OrderId(1)).is_none());
    }

    #[test]
    fn test_fresh_state_vacuous_slo() {
        let state = SessionState::new(42);
        assert_eq!(state.phase, GamePhase::SloSelection);
        assert_eq!(state.measured_slo, 1.0);
        assert_eq!(state.total_orders, 0);
        assert!(state.hud_snapshot().is_none());
        assert!(state.summary().is_none());
    }
}
