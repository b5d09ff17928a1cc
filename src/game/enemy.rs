use rand::Rng;

use crate::config::GameConfig;

/// Identity of an enemy; also the key its visual is registered under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(pub u32);

/// Lifecycle of a single enemy. Anything but `Falling` is frozen in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyState {
    Falling,
    /// Hit the base; crash effect running, respawns at the top once it ends.
    Crashing,
    /// Clicked by the player; explode effect running, removed once it ends.
    Exploding,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub id: EnemyId,
    pub x: f64,
    pub y: f64,
    /// Units per second.
    pub fall_speed: f64,
    pub state: EnemyState,
}

impl Enemy {
    pub fn new(id: EnemyId, config: &GameConfig, rng: &mut impl Rng) -> Self {
        let mut enemy = Self {
            id,
            x: 0.0,
            y: 0.0,
            fall_speed: 0.0,
            state: EnemyState::Falling,
        };
        enemy.respawn(config, rng);
        enemy
    }

    /// Puts the enemy back above the field with a fresh column and speed.
    pub fn respawn(&mut self, config: &GameConfig, rng: &mut impl Rng) {
        self.x = (rng.gen_range(0.0..1.0) * config.spawn_span()).floor();
        self.y = -config.enemy_size;
        let spread = config.max_fall_speed - config.min_fall_speed;
        self.fall_speed = (rng.gen_range(0.0..1.0) * spread + config.min_fall_speed).floor();
        self.state = EnemyState::Falling;
    }

    pub fn is_frozen(&self) -> bool {
        self.state != EnemyState::Falling
    }

    /// Moves the enemy down by `dt` seconds. Returns true when it reached `bottom`.
    /// Frozen enemies stay put and never report a hit.
    pub fn fall(&mut self, dt: f64, bottom: f64) -> bool {
        if self.is_frozen() {
            return false;
        }
        self.y += self.fall_speed * dt;
        self.y >= bottom
    }
}
