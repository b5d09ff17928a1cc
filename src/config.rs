//! Gameplay tuning knobs.
//!
//! Every number the simulation depends on lives in [`GameConfig`]. The browser
//! entrypoint starts from the page's optional `data-config` JSON (see
//! [`GameConfig::from_json`]) and overrides the field size (measured from the DOM)
//! and optionally the leaderboard URL.

use serde::Deserialize;

/// Deployed leaderboard script; answers `GET` with a best-first JSON score list and
/// `GET ?action=submit&name=..&score=..` with an acknowledgement.
pub const DEFAULT_LEADERBOARD_URL: &str = "https://script.google.com/macros/s/AKfycbyC8SkANXAA2zPTCChzZ_AHi8oEl2Dc8dpHpCP5Gzt3IO6hXgU9sTDCPloMBj7SQ4GeWw/exec";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub field_width: f64,
    pub field_height: f64,
    /// Edge length of the (square) enemy sprite.
    pub enemy_size: f64,
    pub pool_capacity: usize,
    pub initial_enemies: usize,
    pub starting_health: i32,
    pub hit_damage: i32,
    /// Fall speed range in units per second, `min` inclusive and `max` exclusive.
    pub min_fall_speed: f64,
    pub max_fall_speed: f64,
    pub points_per_kill: i64,
    pub leaderboard_url: String,
    pub leaderboard_size: usize,
    pub max_name_len: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            field_width: 800.0,
            field_height: 600.0,
            enemy_size: 64.0,
            pool_capacity: 20,
            initial_enemies: 5,
            starting_health: 100,
            hit_damage: 5,
            min_fall_speed: 50.0,
            max_fall_speed: 100.0,
            points_per_kill: 10,
            leaderboard_url: DEFAULT_LEADERBOARD_URL.to_string(),
            leaderboard_size: 10,
            max_name_len: 10,
        }
    }
}

impl GameConfig {
    /// Parses a partial JSON object; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Lowest y at which an enemy touches the base.
    pub fn bottom_line(&self) -> f64 {
        self.field_height - self.enemy_size
    }

    /// Widest x an enemy can spawn at while staying fully inside the field.
    pub fn spawn_span(&self) -> f64 {
        (self.field_width - self.enemy_size).max(0.0)
    }
}
