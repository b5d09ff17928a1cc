//! Robot Rush core crate.
//!
//! Robots drop from the top of the play field; click them before they reach the
//! base. Every robot that lands costs health, every kill may call in more robots.
//! When health runs out the score is offered to the remote leaderboard.
//!
//! The simulation ([`game::Session`]) is plain Rust and runs natively under
//! `cargo test`. Browser specifics (DOM sprites, listeners, the animation-frame loop,
//! `fetch`) live in `dom.rs` and `leaderboard.rs` and are reached through
//! [`start_game`] / [`reset_game`].

use wasm_bindgen::prelude::*;

pub mod config;
mod dom;
pub mod game;
pub mod leaderboard;
mod logger;
pub mod surface;

pub use config::GameConfig;
pub use game::{Enemy, EnemyId, EnemyPool, EnemyState, FrameOutcome, Session};
pub use surface::{Effect, Hud, Surface};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logger::init(if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    });
}

/// Builds the play field (reusing page elements where present) and starts the loop.
/// Calling it again behaves like [`reset_game`].
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    dom::start()
}

#[wasm_bindgen]
pub fn reset_game() -> Result<(), JsValue> {
    dom::reset()
}
