//! Data-driven game configuration
//!
//! The campaign (SLO targets, order catalog, level sequence, global tuning)
//! is plain data: the core reads it, never mutates it. The built-in default
//! matches the shipped coffee-shop campaign; hosts can load a replacement
//! from JSON.

use serde::{Deserialize, Serialize};

/// An SLO target the player commits to for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SloTarget {
    /// Display label ("99.9%")
    pub name: String,
    /// Target success ratio in (0, 1]
    pub value: f64,
    /// Tolerated failures for the run. Zero means the target is an
    /// informational floor, not a counter.
    pub error_budget: u32,
    /// Flavor text shown on the selection screen
    pub description: String,
}

/// Order pool selector, per level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Medium => "medium",
            Complexity::Complex => "complex",
        }
    }
}

/// A catalog entry for one drink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderType {
    pub name: String,
    pub icon: String,
    /// Nominal preparation time. Flavor/display only; every live order uses
    /// the global `order_lifetime_ms` for expiry.
    pub prep_time_ms: u64,
}

/// The order catalog, one pool per complexity tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCatalog {
    pub simple: Vec<OrderType>,
    pub medium: Vec<OrderType>,
    pub complex: Vec<OrderType>,
}

impl OrderCatalog {
    /// The pool a level draws from
    pub fn pool(&self, complexity: Complexity) -> &[OrderType] {
        match complexity {
            Complexity::Simple => &self.simple,
            Complexity::Medium => &self.medium,
            Complexity::Complex => &self.complex,
        }
    }
}

/// One level of the campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// 1-based ordinal shown to the player
    pub number: u32,
    pub name: String,
    pub description: String,
    pub complexity: Complexity,
    /// Milliseconds between order spawns
    pub spawn_delay_ms: u64,
    /// Milliseconds the level runs before auto-advancing
    pub duration_ms: u64,
}

/// Rectangle orders can spawn in (display coordinates)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpawnArea {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

/// Global game tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSettings {
    /// How long an order stays before timing out, identical for all orders
    pub order_lifetime_ms: u64,
    /// Completions within this window of spawn get "Perfect!" feedback
    pub perfect_window_ms: u64,
    /// Canvas dimensions, display-only
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub spawn_area: SpawnArea,
}

/// Complete game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub slo_options: Vec<SloTarget>,
    pub orders: OrderCatalog,
    pub levels: Vec<Level>,
    pub settings: GameSettings,
}

impl Default for GameConfig {
    fn default() -> Self {
        let slo = |name: &str, value: f64, error_budget: u32, description: &str| SloTarget {
            name: name.into(),
            value,
            error_budget,
            description: description.into(),
        };
        let drink = |name: &str, icon: &str, prep_time_ms: u64| OrderType {
            name: name.into(),
            icon: icon.into(),
            prep_time_ms,
        };

        Self {
            slo_options: vec![
                slo("100%", 1.0, 0, "Perfect - No errors allowed!"),
                slo("99.95%", 0.9995, 5, "Very High - Only 5 errors per 10,000 orders"),
                slo("99.9%", 0.999, 10, "High - 10 errors per 10,000 orders"),
                slo("80%", 0.80, 2000, "Relaxed - 2,000 errors per 10,000 orders"),
            ],
            orders: OrderCatalog {
                simple: vec![
                    drink("Regular Coffee", "☕", 2000),
                    drink("Black Coffee", "☕", 2000),
                    drink("Coffee with Milk", "🥛", 2500),
                ],
                medium: vec![
                    drink("Cappuccino", "🫖", 3000),
                    drink("Latte", "🥤", 3000),
                    drink("Americano", "☕", 2500),
                ],
                complex: vec![
                    drink("Oat Milk Latte", "🌾", 3500),
                    drink("Double Shot Espresso", "⚡", 3000),
                    drink("Caramel Macchiato", "🍮", 4000),
                    drink("Mocha Frappuccino", "🍫", 4500),
                    drink("Vanilla Latte (Extra Hot)", "🔥", 4000),
                ],
            },
            levels: vec![
                Level {
                    number: 1,
                    name: "Morning Rush - Easy".into(),
                    description: "Start your day with simple orders".into(),
                    complexity: Complexity::Simple,
                    spawn_delay_ms: 5000,
                    duration_ms: 30_000,
                },
                Level {
                    number: 2,
                    name: "Lunch Break - Medium".into(),
                    description: "Orders are getting more complex".into(),
                    complexity: Complexity::Medium,
                    spawn_delay_ms: 4000,
                    duration_ms: 40_000,
                },
                Level {
                    number: 3,
                    name: "Afternoon Specialty - Hard".into(),
                    description: "Complex specialty drinks".into(),
                    complexity: Complexity::Complex,
                    spawn_delay_ms: 3500,
                    duration_ms: 50_000,
                },
                Level {
                    number: 4,
                    name: "Peak Hour - Expert".into(),
                    description: "Fast-paced complex orders".into(),
                    complexity: Complexity::Complex,
                    spawn_delay_ms: 2500,
                    duration_ms: 60_000,
                },
            ],
            settings: GameSettings {
                order_lifetime_ms: 10_000,
                perfect_window_ms: 500,
                canvas_width: 800.0,
                canvas_height: 600.0,
                spawn_area: SpawnArea {
                    min_x: 50.0,
                    max_x: 750.0,
                    min_y: 150.0,
                    max_y: 550.0,
                },
            },
        }
    }
}

impl GameConfig {
    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check configuration constraints. Returns a description of every
    /// violation; an empty list means the config is playable.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.slo_options.is_empty() {
            problems.push("no SLO targets configured".to_string());
        }
        for slo in &self.slo_options {
            if !(slo.value > 0.0 && slo.value <= 1.0) {
                problems.push(format!("SLO '{}' value {} outside (0, 1]", slo.name, slo.value));
            }
        }

        if self.levels.is_empty() {
            problems.push("no levels configured".to_string());
        }
        for level in &self.levels {
            if level.spawn_delay_ms == 0 {
                problems.push(format!("level {} has zero spawn delay", level.number));
            }
            if level.duration_ms == 0 {
                problems.push(format!("level {} has zero duration", level.number));
            }
            if self.orders.pool(level.complexity).is_empty() {
                problems.push(format!(
                    "level {} draws from empty '{}' pool",
                    level.number,
                    level.complexity.as_str()
                ));
            }
        }

        if self.settings.order_lifetime_ms == 0 {
            problems.push("order lifetime must be positive".to_string());
        }
        let area = &self.settings.spawn_area;
        if area.min_x > area.max_x || area.min_y > area.max_y {
            problems.push("spawn area is inverted".to_string());
        }

        problems
    }
}
