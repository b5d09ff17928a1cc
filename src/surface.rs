//! Narrow contract between the simulation and whatever draws it.
//!
//! The DOM implementation lives in `dom.rs`; tests use a recording fake. The
//! simulation never touches web APIs directly, only this trait.

use crate::game::EnemyId;

/// Named visual state toggled on an enemy while an effect animation plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Effect {
    Crash,
    Explode,
}

impl Effect {
    /// CSS class (and animation name) used for this effect.
    pub fn class_name(self) -> &'static str {
        match self {
            Effect::Crash => "crash",
            Effect::Explode => "explode",
        }
    }

    pub fn from_animation_name(name: &str) -> Option<Self> {
        match name {
            "crash" => Some(Effect::Crash),
            "explode" => Some(Effect::Explode),
            _ => None,
        }
    }
}

/// Heads-up display values refreshed every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hud {
    pub kills: u32,
    pub elapsed_secs: f64,
    pub score: i64,
}

pub trait Surface {
    fn create_visual(&mut self, id: EnemyId);
    /// Drops the visual and any input registered on it.
    fn remove_visual(&mut self, id: EnemyId);
    fn place_visual(&mut self, id: EnemyId, x: f64, y: f64);
    fn add_effect(&mut self, id: EnemyId, effect: Effect);
    fn remove_effect(&mut self, id: EnemyId, effect: Effect);
    /// Plays the screen shake; clears itself when the animation ends.
    fn shake_field(&mut self);
    fn show_hud(&mut self, hud: &Hud);
    fn show_health(&mut self, health: i32);
    fn show_reset_control(&mut self, visible: bool);
}
