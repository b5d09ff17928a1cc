// Shared helpers for the native integration tests.

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use robot_rush::{Effect, EnemyId, GameConfig, Hud, Session, Surface};

/// Surface fake that remembers what the simulation asked it to draw.
#[derive(Default)]
pub struct RecordingSurface {
    pub created: Vec<EnemyId>,
    pub removed: Vec<EnemyId>,
    pub positions: HashMap<EnemyId, (f64, f64)>,
    pub effects: Vec<(EnemyId, Effect, bool)>,
    pub shakes: usize,
    pub last_hud: Option<Hud>,
    pub last_health: Option<i32>,
    pub reset_visible: Vec<bool>,
}

impl RecordingSurface {
    pub fn live_visuals(&self) -> usize {
        self.created.len() - self.removed.len()
    }
}

impl Surface for RecordingSurface {
    fn create_visual(&mut self, id: EnemyId) {
        self.created.push(id);
    }
    fn remove_visual(&mut self, id: EnemyId) {
        self.removed.push(id);
        self.positions.remove(&id);
    }
    fn place_visual(&mut self, id: EnemyId, x: f64, y: f64) {
        self.positions.insert(id, (x, y));
    }
    fn add_effect(&mut self, id: EnemyId, effect: Effect) {
        self.effects.push((id, effect, true));
    }
    fn remove_effect(&mut self, id: EnemyId, effect: Effect) {
        self.effects.push((id, effect, false));
    }
    fn shake_field(&mut self) {
        self.shakes += 1;
    }
    fn show_hud(&mut self, hud: &Hud) {
        self.last_hud = Some(*hud);
    }
    fn show_health(&mut self, health: i32) {
        self.last_health = Some(health);
    }
    fn show_reset_control(&mut self, visible: bool) {
        self.reset_visible.push(visible);
    }
}

pub fn started(config: GameConfig, seed: u64) -> (Session, RecordingSurface) {
    let mut surface = RecordingSurface::default();
    let mut session = Session::new(config, SmallRng::seed_from_u64(seed));
    session.start(&mut surface);
    (session, surface)
}

pub fn ids(session: &Session) -> Vec<EnemyId> {
    session.pool().iter().map(|e| e.id).collect()
}
