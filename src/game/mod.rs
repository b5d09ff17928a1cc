//! Game session: enemy pool, lifecycle transitions and the per-frame step.
//!
//! A [`Session`] owns all mutable game state. The browser glue keeps exactly one
//! alive, calls [`Session::step`] once per animation frame and forwards clicks and
//! animation completions as [`Session::click`] / [`Session::effect_finished`].
//! Resetting swaps in a fresh session via [`Session::reset`].

use log::{debug, info};
use rand::Rng;
use rand::rngs::SmallRng;

use crate::config::GameConfig;
use crate::surface::{Effect, Hud, Surface};

mod enemy;
mod pool;

pub use enemy::{Enemy, EnemyId, EnemyState};
pub use pool::EnemyPool;

/// What the frame loop should do after a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Still running; request another frame.
    Continue,
    /// Health ran out this frame. Carries the final score for the leaderboard.
    GameOver { score: i64 },
    /// Every enemy was cleared this frame.
    LevelComplete,
    /// Session had already stopped; nothing was touched.
    Halted,
}

pub struct Session {
    config: GameConfig,
    pool: EnemyPool,
    rng: SmallRng,
    next_id: u32,
    health: i32,
    score: i64,
    kills: u32,
    elapsed_secs: f64,
    running: bool,
    last_frame_ms: Option<f64>,
}

impl Session {
    pub fn new(config: GameConfig, rng: SmallRng) -> Self {
        let pool = EnemyPool::new(config.pool_capacity);
        Self::with_pool(config, rng, pool, 0)
    }

    fn with_pool(config: GameConfig, rng: SmallRng, pool: EnemyPool, next_id: u32) -> Self {
        Self {
            health: config.starting_health,
            config,
            pool,
            rng,
            next_id,
            score: 0,
            kills: 0,
            elapsed_secs: 0.0,
            running: true,
            last_frame_ms: None,
        }
    }

    /// Replaces this session with a fresh one. Enemy ids keep counting up so a
    /// late event aimed at an old enemy can never hit a new one.
    pub fn reset(self) -> Self {
        let Session {
            config,
            mut pool,
            rng,
            next_id,
            ..
        } = self;
        pool.reset();
        Self::with_pool(config, rng, pool, next_id)
    }

    /// Populates the field and paints the initial HUD.
    pub fn start(&mut self, surface: &mut impl Surface) {
        for _ in 0..self.config.initial_enemies {
            self.spawn_enemy(surface);
        }
        surface.show_reset_control(false);
        surface.show_hud(&self.hud());
        surface.show_health(self.health);
        info!("Game is running with {} enemies", self.pool.count());
    }

    /// Creates an enemy with a visual and puts it in the first free slot. When the
    /// pool is full the fresh visual is dropped again and `None` is returned.
    pub fn spawn_enemy(&mut self, surface: &mut impl Surface) -> Option<EnemyId> {
        let id = EnemyId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let enemy = Enemy::new(id, &self.config, &mut self.rng);
        let (x, y) = (enemy.x, enemy.y);
        surface.create_visual(id);
        match self.pool.insert(enemy) {
            Ok(id) => {
                surface.place_visual(id, x, y);
                Some(id)
            }
            Err(rejected) => {
                surface.remove_visual(rejected.id);
                debug!("enemy pool full, spawn skipped");
                None
            }
        }
    }

    /// Advances the simulation to `now_ms` (host timestamp in milliseconds).
    pub fn step(&mut self, now_ms: f64, surface: &mut impl Surface) -> FrameOutcome {
        if !self.running {
            return FrameOutcome::Halted;
        }
        let dt = match self.last_frame_ms {
            Some(last) => ((now_ms - last) / 1000.0).max(0.0),
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);

        self.elapsed_secs += dt;
        surface.show_hud(&self.hud());

        // Index walk: a base hit spawns into the pool while we are iterating it.
        let bottom = self.config.bottom_line();
        for slot in 0..self.pool.capacity() {
            let hit = self
                .pool
                .slot_mut(slot)
                .and_then(|enemy| enemy.fall(dt, bottom).then_some(enemy.id));
            if let Some(id) = hit {
                self.hit_base(id, surface);
            }
        }

        let outcome = if self.health <= 0 && self.running {
            self.running = false;
            surface.show_reset_control(true);
            info!("GAME OVER with score {}", self.score);
            FrameOutcome::GameOver { score: self.score }
        } else if self.pool.count() == 0 {
            self.running = false;
            info!("LEVEL COMPLETE after {:.1}s", self.elapsed_secs);
            FrameOutcome::LevelComplete
        } else {
            FrameOutcome::Continue
        };

        for enemy in self.pool.iter() {
            surface.place_visual(enemy.id, enemy.x, enemy.y);
        }
        surface.show_health(self.health);

        outcome
    }

    fn hit_base(&mut self, id: EnemyId, surface: &mut impl Surface) {
        info!("Enemy attacked base!");
        self.health -= self.config.hit_damage;
        if let Some(enemy) = self.pool.get_mut(id) {
            enemy.state = EnemyState::Crashing;
        }
        surface.add_effect(id, Effect::Crash);
        surface.shake_field();
        self.spawn_enemy(surface);
    }

    /// Player clicked enemy `id`. Only the first click on a live enemy counts;
    /// returns whether it started the kill.
    pub fn click(&mut self, id: EnemyId, surface: &mut impl Surface) -> bool {
        if !self.running {
            return false;
        }
        match self.pool.get_mut(id) {
            Some(enemy) if enemy.state != EnemyState::Exploding => {
                enemy.state = EnemyState::Exploding;
                surface.add_effect(id, Effect::Explode);
                true
            }
            _ => false,
        }
    }

    /// The `effect` animation on enemy `id` ended. Events for enemies that are
    /// gone, or that no longer match the enemy's state, are ignored.
    pub fn effect_finished(&mut self, id: EnemyId, effect: Effect, surface: &mut impl Surface) {
        let Some(enemy) = self.pool.get_mut(id) else {
            return;
        };
        match (enemy.state, effect) {
            (EnemyState::Crashing, Effect::Crash) => {
                surface.remove_effect(id, Effect::Crash);
                enemy.respawn(&self.config, &mut self.rng);
            }
            // Clicked mid-crash: the crash animation still ends first.
            (EnemyState::Exploding, Effect::Crash) => {
                surface.remove_effect(id, Effect::Crash);
            }
            (EnemyState::Exploding, Effect::Explode) => self.complete_kill(id, surface),
            _ => {}
        }
    }

    fn complete_kill(&mut self, id: EnemyId, surface: &mut impl Surface) {
        if self.pool.remove(id).is_none() {
            return;
        }
        surface.remove_visual(id);
        // The score already went out with the game over.
        if !self.running {
            debug!("kill finished after the game stopped, not counted");
            return;
        }
        self.kills += 1;
        self.score += self.config.points_per_kill;

        let free = self.pool.free_slots();
        let replacements = (self.rng.gen_range(0.0..1.0) * free as f64 / 2.0).floor() as usize;
        for _ in 0..replacements {
            self.spawn_enemy(surface);
        }
        info!(
            "complete kill, {} replacements, {} enemies alive",
            replacements,
            self.pool.count()
        );
    }

    /// Tracks a resized play field. Enemies already on screen keep their column.
    pub fn resize_field(&mut self, width: f64, height: f64) {
        self.config.field_width = width;
        self.config.field_height = height;
    }

    pub fn hud(&self) -> Hud {
        Hud {
            kills: self.kills,
            elapsed_secs: self.elapsed_secs,
            score: self.score,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn pool(&self) -> &EnemyPool {
        &self.pool
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
