//! Barista Rush entry point
//!
//! Headless demo driver: a simulated host with a virtual clock and timer
//! queue runs one autoplay session per configured SLO target, then prints
//! the resulting leaderboard. Real hosts replace this file; the core only
//! ever sees [`Event`]s and [`Effect`]s.

use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use barista_rush::GameConfig;
use barista_rush::leaderboard::{Leaderboard, ScoreStore};
use barista_rush::session::{
    Effect, Event, GamePhase, OrderId, SessionState, SessionSummary, TimerId, apply,
};

/// In-memory score storage; a real host would persist this
#[derive(Default)]
struct MemoryStore {
    json: RefCell<Option<String>>,
}

impl ScoreStore for MemoryStore {
    fn load(&self) -> Option<String> {
        self.json.borrow().clone()
    }

    fn save(&self, json: &str) {
        *self.json.borrow_mut() = Some(json.to_string());
    }
}

/// A queued host occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Pending {
    Timer(TimerId),
    Click(OrderId),
}

/// Simulated host: virtual clock, ordered callback queue, and a barista bot
/// that completes most orders after a human-ish reaction delay
struct SimHost {
    queue: BinaryHeap<Reverse<(u64, u64, Pending)>>,
    seq: u64,
    cancelled: HashSet<TimerId>,
    rng: Pcg32,
    /// Probability the bot gets to an order at all
    skill: f64,
}

impl SimHost {
    fn new(seed: u64, skill: f64) -> Self {
        Self {
            queue: BinaryHeap::new(),
            seq: 0,
            cancelled: HashSet::new(),
            rng: Pcg32::seed_from_u64(seed),
            skill,
        }
    }

    fn push(&mut self, at_ms: u64, pending: Pending) {
        self.seq += 1;
        self.queue.push(Reverse((at_ms, self.seq, pending)));
    }

    fn pop(&mut self) -> Option<(u64, Pending)> {
        while let Some(Reverse((at, _, pending))) = self.queue.pop() {
            if let Pending::Timer(id) = pending {
                if self.cancelled.remove(&id) {
                    continue;
                }
            }
            return Some((at, pending));
        }
        None
    }

    /// Execute the core's requests
    fn run_effects(&mut self, now_ms: u64, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::Schedule { timer, delay_ms } => {
                    self.push(now_ms + delay_ms, Pending::Timer(*timer));
                }
                Effect::CancelTimer { timer } => {
                    self.cancelled.insert(*timer);
                }
                Effect::RenderOrder { id, name, .. } => {
                    // Bot "notices" most orders and clicks after a delay
                    if self.rng.random_bool(self.skill) {
                        let reaction = self.rng.random_range(500..=6000);
                        self.push(now_ms + reaction, Pending::Click(*id));
                    } else {
                        log::debug!("bot ignores {name}");
                    }
                }
                Effect::ShowLevelBanner { level } => {
                    log::info!("== Level {}: {} ==", level.number, level.name);
                }
                Effect::ShowFeedback { text, .. } => {
                    log::debug!("feedback: {text}");
                }
                Effect::ShowGameOver(summary) => {
                    log::info!(
                        "game over: {:?}, score {}, measured SLO {:.2}% vs target {}",
                        summary.outcome,
                        summary.score,
                        summary.measured_slo * 100.0,
                        summary.target_name
                    );
                }
                Effect::UpdateOrderCountdown { .. }
                | Effect::RemoveOrder { .. }
                | Effect::UpdateHud(_) => {}
            }
        }
    }
}

/// Run one full autoplay session against the given SLO target
fn run_session(config: &GameConfig, seed: u64, slo_index: usize, skill: f64) -> Option<SessionSummary> {
    let mut state = SessionState::new(seed);
    let mut host = SimHost::new(seed.rotate_left(17), skill);

    let effects = apply(&mut state, config, Event::SloSelected { index: slo_index }, 0);
    host.run_effects(0, &effects);

    while let Some((now_ms, pending)) = host.pop() {
        let event = match pending {
            Pending::Timer(id) => Event::TimerFired { id },
            Pending::Click(id) => Event::OrderSelected { id },
        };
        let effects = apply(&mut state, config, event, now_ms);
        host.run_effects(now_ms, &effects);

        if state.phase == GamePhase::GameOver {
            break;
        }
    }

    state.summary()
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GameConfig::default();
    let problems = config.validate();
    if !problems.is_empty() {
        for problem in &problems {
            log::error!("config: {problem}");
        }
        std::process::exit(1);
    }

    let store = MemoryStore::default();
    let mut board = Leaderboard::load(&store);

    for (index, target) in config.slo_options.iter().enumerate() {
        log::info!("--- session: target {} ---", target.name);
        let seed = 0xC0FFEE + index as u64;
        match run_session(&config, seed, index, 0.9) {
            Some(summary) => {
                board.submit(
                    &format!("barista-bot-{}", index + 1),
                    summary.score,
                    &summary.target_name,
                    unix_millis(),
                );
            }
            None => log::warn!("session against {} never finished", target.name),
        }
    }

    board.save(&store);

    println!("\n  Leaderboard");
    println!("  -----------");
    for (rank, entry) in board.entries.iter().enumerate() {
        println!(
            "  {:>2}. {:<16} {:>6}  ({})",
            rank + 1,
            entry.player_name,
            entry.score,
            entry.slo_name
        );
    }
}
