//! The session transition function
//!
//! One entry point, [`apply`]: the host hands in an event and the current
//! timestamp, the core mutates the session and hands back effect requests.
//! Every timer callback re-checks phase and registry membership before
//! acting, so late firings after a transition degrade to no-ops.

use rand::Rng;

use super::effect::{Effect, Event, FeedbackKind};
use super::state::{GamePhase, Order, OrderId, Outcome, SessionState, TimerId, TimerPurpose};
use crate::config::GameConfig;
use crate::consts::*;

/// Advance the session by one host event
pub fn apply(
    state: &mut SessionState,
    config: &GameConfig,
    event: Event,
    now_ms: u64,
) -> Vec<Effect> {
    match event {
        Event::SloSelected { index } => select_slo(state, config, index),
        Event::TimerFired { id } => timer_fired(state, config, id, now_ms),
        Event::OrderSelected { id } => complete_order(state, config, id, now_ms),
    }
}

/// Commit to an SLO target and begin the first level
fn select_slo(state: &mut SessionState, config: &GameConfig, index: usize) -> Vec<Effect> {
    if state.phase != GamePhase::SloSelection {
        log::warn!("SLO selection ignored in {:?}", state.phase);
        return Vec::new();
    }
    let Some(target) = config.slo_options.get(index) else {
        log::warn!("SLO selection index {index} out of range");
        return Vec::new();
    };

    log::info!(
        "session start: target {} (budget {})",
        target.name,
        target.error_budget
    );
    state.target = Some(target.clone());
    state.budget_remaining = target.error_budget;
    state.phase = GamePhase::Playing;

    let mut effects = Vec::new();
    effects.extend(state.hud_snapshot().map(Effect::UpdateHud));
    start_level(state, config, &mut effects);
    effects
}

/// Dispatch a timer firing. Unregistered handles are stale (cancelled or
/// already consumed) and ignored.
fn timer_fired(
    state: &mut SessionState,
    config: &GameConfig,
    id: TimerId,
    now_ms: u64,
) -> Vec<Effect> {
    let Some(purpose) = state.timers.acknowledge(id) else {
        log::debug!("stale timer {id:?} ignored");
        return Vec::new();
    };
    if state.phase != GamePhase::Playing {
        // The session ended while this callback was pending
        return Vec::new();
    }

    let mut effects = Vec::new();
    match purpose {
        TimerPurpose::LevelStart => {
            let Some(level) = config.levels.get(state.level_index) else {
                return effects;
            };
            let (spawn_delay, duration) = (level.spawn_delay_ms, level.duration_ms);
            // First order lands immediately; the chain continues from it
            spawn_order(state, config, now_ms, &mut effects);
            schedule(state, TimerPurpose::Spawn, spawn_delay, &mut effects);
            schedule(state, TimerPurpose::LevelEnd, duration, &mut effects);
        }
        TimerPurpose::Spawn => {
            let Some(level) = config.levels.get(state.level_index) else {
                return effects;
            };
            let spawn_delay = level.spawn_delay_ms;
            spawn_order(state, config, now_ms, &mut effects);
            schedule(state, TimerPurpose::Spawn, spawn_delay, &mut effects);
        }
        TimerPurpose::LevelEnd => {
            state.level_index += 1;
            start_level(state, config, &mut effects);
        }
        TimerPurpose::CountdownTick(order_id) => {
            let status = state
                .active_order(order_id)
                .map(|o| (o.is_expired(now_ms), o.remaining_fraction(now_ms)));
            match status {
                None => {} // order already resolved
                Some((false, remaining_fraction)) => {
                    effects.push(Effect::UpdateOrderCountdown {
                        id: order_id,
                        remaining_fraction,
                    });
                    schedule(
                        state,
                        TimerPurpose::CountdownTick(order_id),
                        COUNTDOWN_TICK_MS,
                        &mut effects,
                    );
                }
                Some((true, _)) => expire_order(state, order_id, &mut effects),
            }
        }
    }
    effects
}

/// Enter the level at `state.level_index`, or declare the session won when
/// the sequence is exhausted
fn start_level(state: &mut SessionState, config: &GameConfig, effects: &mut Vec<Effect>) {
    for timer in state.timers.take_level_timers() {
        effects.push(Effect::CancelTimer { timer });
    }

    match config.levels.get(state.level_index) {
        None => end_session(state, Outcome::Won, effects),
        Some(level) => {
            log::info!("level {} starting: {}", level.number, level.name);
            effects.push(Effect::ShowLevelBanner {
                level: level.clone(),
            });
            schedule(state, TimerPurpose::LevelStart, LEVEL_LEADIN_MS, effects);
        }
    }
}

/// Spawn one order from the current level's pool
fn spawn_order(
    state: &mut SessionState,
    config: &GameConfig,
    now_ms: u64,
    effects: &mut Vec<Effect>,
) {
    let Some(level) = config.levels.get(state.level_index) else {
        return;
    };
    let pool = config.orders.pool(level.complexity);
    if pool.is_empty() {
        log::warn!("order pool '{}' is empty", level.complexity.as_str());
        return;
    }

    let kind = pool[state.rng.random_range(0..pool.len())].clone();
    let area = config.settings.spawn_area;
    let pos = glam::Vec2::new(
        state.rng.random_range(area.min_x..=area.max_x),
        state.rng.random_range(area.min_y..=area.max_y),
    );

    let id = state.next_order_id();
    let order = Order {
        id,
        kind,
        spawned_at_ms: now_ms,
        lifetime_ms: config.settings.order_lifetime_ms,
        pos,
    };
    log::debug!("order {:?} spawned: {}", id, order.kind.name);

    state.total_orders += 1;
    effects.push(Effect::RenderOrder {
        id,
        name: order.kind.name.clone(),
        icon: order.kind.icon.clone(),
        pos,
        lifetime_ms: order.lifetime_ms,
    });
    state.insert_order(order);
    schedule(
        state,
        TimerPurpose::CountdownTick(id),
        COUNTDOWN_TICK_MS,
        effects,
    );
    effects.extend(state.hud_snapshot().map(Effect::UpdateHud));
}

/// Player clicked an order. No-op if it already expired (the removal from
/// the active map decides the race).
fn complete_order(
    state: &mut SessionState,
    config: &GameConfig,
    id: OrderId,
    now_ms: u64,
) -> Vec<Effect> {
    if state.phase != GamePhase::Playing {
        return Vec::new();
    }
    let Some(order) = state.take_order(id) else {
        return Vec::new();
    };

    let mut effects = Vec::new();
    if let Some(timer) = state.timers.take_countdown_for(id) {
        effects.push(Effect::CancelTimer { timer });
    }

    state.successful_orders += 1;
    let elapsed = order.elapsed_ms(now_ms);
    let bonus = order.lifetime_ms.saturating_sub(elapsed) / SPEED_BONUS_DIVISOR_MS;
    let points = ORDER_BASE_POINTS + bonus;
    state.score += points;
    state.recompute_slo();
    log::debug!(
        "order {:?} completed in {}ms: +{} points",
        id,
        elapsed,
        points
    );

    let text = if elapsed <= config.settings.perfect_window_ms {
        format!("Perfect! +{points}")
    } else {
        format!("+{points}")
    };
    effects.push(Effect::ShowFeedback {
        pos: order.pos,
        text,
        kind: FeedbackKind::Success,
    });
    effects.push(Effect::RemoveOrder { id });
    effects.extend(state.hud_snapshot().map(Effect::UpdateHud));
    effects
}

/// An order's lifetime elapsed. Burns error budget and may end the session.
fn expire_order(state: &mut SessionState, id: OrderId, effects: &mut Vec<Effect>) {
    let Some(order) = state.take_order(id) else {
        return;
    };

    state.failed_orders += 1;
    let budget = state.target.as_ref().map(|t| t.error_budget).unwrap_or(0);
    let mut exhausted = false;
    if budget > 0 {
        // A zero-budget target is an informational floor: it is never
        // decremented and never ends the session
        state.budget_remaining = state.budget_remaining.saturating_sub(1);
        exhausted = state.budget_remaining == 0;
    }
    state.recompute_slo();
    log::debug!(
        "order {:?} expired ({} budget remaining)",
        id,
        state.budget_remaining
    );

    effects.push(Effect::ShowFeedback {
        pos: order.pos,
        text: "✗ FAILED".to_string(),
        kind: FeedbackKind::Failure,
    });
    effects.push(Effect::RemoveOrder { id });
    effects.extend(state.hud_snapshot().map(Effect::UpdateHud));

    if exhausted {
        end_session(state, Outcome::Lost, effects);
    }
}

/// Freeze the session: cancel every pending timer, clear the board, report
/// the final stats
fn end_session(state: &mut SessionState, outcome: Outcome, effects: &mut Vec<Effect>) {
    log::info!(
        "session over: {:?}, score {}, slo {:.4} ({}/{} orders)",
        outcome,
        state.score,
        state.measured_slo,
        state.successful_orders,
        state.total_orders
    );
    state.phase = GamePhase::GameOver;
    state.outcome = Some(outcome);

    for timer in state.timers.drain() {
        effects.push(Effect::CancelTimer { timer });
    }
    for order in state.drain_orders() {
        effects.push(Effect::RemoveOrder { id: order.id });
    }
    effects.extend(state.summary().map(Effect::ShowGameOver));
}

/// Allocate a timer, register it, emit the scheduling request. A displaced
/// handle of the same purpose gets a cancellation request.
fn schedule(
    state: &mut SessionState,
    purpose: TimerPurpose,
    delay_ms: u64,
    effects: &mut Vec<Effect>,
) -> TimerId {
    let id = state.next_timer_id();
    if let Some(old) = state.timers.register(id, purpose) {
        effects.push(Effect::CancelTimer { timer: old });
    }
    effects.push(Effect::Schedule {
        timer: id,
        delay_ms,
    });
    id
}
