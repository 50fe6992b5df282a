//! Ring Shooter core crate.
//!
//! A ring-shaped player auto-fires up the screen, charges a special attack on SPACE and
//! survives a countdown until the boss flag rises. The simulation (`game`, `clock`,
//! `weapons`, `input`, `state`) is plain Rust driven by a virtual clock; `web` is the
//! thin browser shell that forwards DOM events and draws the canvas.

use wasm_bindgen::prelude::*;

pub mod clock;
pub mod config;
pub mod game;
pub mod input;
pub mod rng;
pub mod state;
pub mod weapons;
mod web;

pub use config::{GameConfig, RING_COLORS, SpecialVariant};
pub use game::{Game, PowerUp};
pub use state::Screen;
pub use weapons::{SpecialBlocked, SpecialStatus};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    // Fails only when a logger is already installed.
    console_log::init_with_level(level).ok();
}

// -----------------------------------------------------------------------------
// Page entrypoints
// -----------------------------------------------------------------------------

/// Mount the game with the stock configuration.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    web::mount(GameConfig::default())
}

/// Mount the game with a JSON configuration; missing fields keep their defaults.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> Result<(), JsValue> {
    let cfg = GameConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    web::mount(cfg)
}

/// Trigger the special attack from a page control. Returns `false` when it was ignored.
#[wasm_bindgen]
pub fn trigger_special() -> bool {
    match web::trigger_special() {
        Ok(()) => true,
        Err(reason) => {
            log::debug!("special ignored: {reason}");
            false
        }
    }
}

/// Apply a power-up (`"fireRate"` or `"special"`). Returns `false` when it was ignored.
#[wasm_bindgen]
pub fn choose_powerup(kind: &str) -> bool {
    match PowerUp::parse(kind) {
        Some(choice) => web::choose_powerup(choice),
        None => {
            log::debug!("unknown power-up {kind:?}");
            false
        }
    }
}
