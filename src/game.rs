//! The game controller: owns the state, the input unifier and every timer, and
//! exposes the operations the page can invoke. Nothing here touches the DOM, so the
//! whole loop runs natively in tests by feeding synthetic timestamps.

use crate::clock::{Millis, Missed, Scheduler, TimerId};
use crate::config::{self, GameConfig};
use crate::input::{Arrow, InputState, SPECIAL_KEY};
use crate::rng::Rng;
use crate::state::{GameState, Screen};
use crate::weapons::{self, Release, SpecialBlocked, SpecialStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerEvent {
    CountdownTick,
    AutoFire,
    SpecialRelease,
    SpecialRearm,
}

/// The two fixed choices on the power-up screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerUp {
    /// Move one fire-rate tier up.
    FireRate,
    /// Halve the special-attack cooldown.
    Cooldown,
}

impl PowerUp {
    /// Accepts the identifiers used by the page (`fireRate`, `special`) and snake-case aliases.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "fireRate" | "fire_rate" => Some(PowerUp::FireRate),
            "special" | "cooldown" => Some(PowerUp::Cooldown),
            _ => None,
        }
    }
}

pub struct Game {
    cfg: GameConfig,
    state: GameState,
    input: InputState,
    timers: Scheduler<TimerEvent>,
    rng: Rng,
    countdown_timer: Option<TimerId>,
    fire_timer: Option<TimerId>,
    charge_timer: Option<TimerId>,
}

impl Game {
    pub fn new(cfg: GameConfig, rng: Rng) -> Self {
        Self::starting_at(cfg, rng, 0)
    }

    /// Create a game whose virtual clock starts at `now` (e.g. `performance.now()`).
    pub fn starting_at(cfg: GameConfig, mut rng: Rng, now: Millis) -> Self {
        let state = GameState::new(&cfg, &mut rng);
        Self {
            cfg,
            state,
            input: InputState::new(),
            timers: Scheduler::new(now),
            rng,
            countdown_timer: None,
            fire_timer: None,
            charge_timer: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.cfg
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn now(&self) -> Millis {
        self.timers.now()
    }

    pub fn screen(&self) -> Screen {
        self.state.screen
    }

    pub fn special_status(&self) -> SpecialStatus {
        self.state.special.status(self.now())
    }

    // --- Screen state machine ---------------------------------------------------

    /// Pick the ring color on the start screen. Unknown names are ignored.
    pub fn select_ring(&mut self, name: &str) -> bool {
        if self.state.screen != Screen::Start {
            log::debug!("ring selection ignored outside start screen");
            return false;
        }
        match config::ring_color(name) {
            Some(color) => {
                self.state.selected = Some(color);
                true
            }
            None => {
                log::debug!("unknown ring color {name:?}");
                false
            }
        }
    }

    pub fn can_start(&self) -> bool {
        self.state.screen == Screen::Start && self.state.selected.is_some()
    }

    /// Leave the start screen. No-op without a selected color.
    pub fn start(&mut self) -> bool {
        if !self.can_start() {
            log::debug!("start ignored: no ring selected");
            return false;
        }
        self.state.screen = Screen::Playing;
        self.state.spawn_enemies(self.cfg.first_wave_enemies, &self.cfg, &mut self.rng);
        self.start_phase_timers();
        log::info!(
            "game started with {} ring",
            self.state.selected.map(|c| c.name).unwrap_or("?")
        );
        true
    }

    /// Apply a power-up choice and resume play. Only valid on the power-up screen.
    pub fn choose_powerup(&mut self, choice: PowerUp) -> bool {
        if self.state.screen != Screen::PowerUp {
            log::debug!("power-up {choice:?} ignored outside power-up screen");
            return false;
        }
        match choice {
            PowerUp::FireRate => {
                self.state.fire_level = (self.state.fire_level + 1).min(GameConfig::MAX_FIRE_LEVEL);
            }
            PowerUp::Cooldown => {
                self.state.special.reduce_cooldown(self.cfg.special.min_cooldown_ms);
            }
        }
        self.state.boss_active = false;
        self.state.spawn_enemies(self.cfg.next_wave_enemies, &self.cfg, &mut self.rng);
        self.state.screen = Screen::Playing;
        self.start_phase_timers();
        log::info!(
            "power-up {choice:?} applied (fire level {}, special cooldown {} ms)",
            self.state.fire_level,
            self.state.special.cooldown_ms()
        );
        true
    }

    fn enter_powerup(&mut self) {
        self.cancel_phase_timers();
        if let Some(id) = self.charge_timer.take() {
            self.timers.cancel(id);
        }
        self.state.special.abort();
        self.state.screen = Screen::PowerUp;
        log::info!("boss phase cleared, waiting for power-up choice");
    }

    fn start_phase_timers(&mut self) {
        self.cancel_phase_timers();
        self.state.countdown = self.cfg.game_seconds;
        self.countdown_timer = Some(self.timers.every(
            self.cfg.countdown_tick_ms,
            Missed::Burst,
            TimerEvent::CountdownTick,
        ));
        let tier = self.cfg.fire_tier(self.state.fire_level);
        self.fire_timer = Some(self.timers.every(tier.interval_ms, Missed::Skip, TimerEvent::AutoFire));
    }

    fn cancel_phase_timers(&mut self) {
        for id in [self.countdown_timer.take(), self.fire_timer.take()].into_iter().flatten() {
            self.timers.cancel(id);
        }
    }

    // --- Input ------------------------------------------------------------------

    /// Returns `true` when the page should suppress the key's default action.
    pub fn key_down(&mut self, key: &str) -> bool {
        if let Some(arrow) = Arrow::from_key(key) {
            self.input.set_arrow(arrow, true);
            return false;
        }
        if key == SPECIAL_KEY && self.state.screen == Screen::Playing {
            if let Err(reason) = self.trigger_special() {
                log::debug!("special ignored: {reason}");
            }
            return true;
        }
        false
    }

    pub fn key_up(&mut self, key: &str) {
        if let Some(arrow) = Arrow::from_key(key) {
            self.input.set_arrow(arrow, false);
        }
    }

    /// Touch coordinates are canvas pixels (see [`crate::input::CanvasRect`]).
    pub fn touch_start(&mut self, id: i32, x: f64, y: f64) -> bool {
        self.input.touch_start(id, x, y)
    }

    pub fn touch_move(&mut self, id: i32, x: f64, y: f64) -> bool {
        self.input.touch_move(id, x, y)
    }

    /// Handles both `touchend` and `touchcancel`.
    pub fn touch_end(&mut self, id: i32) -> bool {
        self.input.touch_end(id)
    }

    pub fn release_all_input(&mut self) {
        self.input.clear();
    }

    // --- Weapons ----------------------------------------------------------------

    /// Start charging the special attack. The release fires from the timer loop.
    pub fn trigger_special(&mut self) -> Result<(), SpecialBlocked> {
        if self.state.screen != Screen::Playing {
            return Err(SpecialBlocked::NotPlaying);
        }
        let now = self.now();
        let release_at = self.state.special.trigger(now, self.cfg.special.charge_ms)?;
        self.charge_timer = Some(self.timers.after(release_at - now, TimerEvent::SpecialRelease));
        Ok(())
    }

    fn auto_fire(&mut self, now: Millis) {
        if self.state.screen != Screen::Playing {
            return;
        }
        let interval = self.cfg.fire_tier(self.state.fire_level).interval_ms;
        if self.state.last_shot_ms.is_some_and(|last| now - last < interval) {
            return;
        }
        let shots = weapons::volley(
            &self.cfg,
            self.state.fire_level,
            self.state.player_x,
            self.state.player_y,
        );
        self.state.bullets.extend(shots);
        self.state.last_shot_ms = Some(now);
    }

    fn release_special(&mut self, now: Millis) {
        self.charge_timer = None;
        let Some((ready_at, release)) =
            self.state
                .special
                .release(now, &self.cfg, self.state.player_x, self.state.player_y)
        else {
            return;
        };
        if let Release::Bullet(bullet) = release {
            self.state.bullets.push(bullet);
        }
        self.timers.after(ready_at - now, TimerEvent::SpecialRearm);
    }

    fn countdown_tick(&mut self) {
        self.state.countdown = self.state.countdown.saturating_sub(1);
        if self.state.countdown == 0 {
            if let Some(id) = self.countdown_timer.take() {
                self.timers.cancel(id);
            }
            self.state.boss_active = true;
            log::info!("boss arrived");
        }
    }

    // --- Frame loop -------------------------------------------------------------

    /// Run every timer due up to `now`, in order. Time never moves backwards.
    pub fn advance(&mut self, now: Millis) {
        while let Some((at, event)) = self.timers.pop_due(now) {
            match event {
                TimerEvent::CountdownTick => self.countdown_tick(),
                TimerEvent::AutoFire => self.auto_fire(at),
                TimerEvent::SpecialRelease => self.release_special(at),
                TimerEvent::SpecialRearm => {
                    self.state.special.rearm();
                }
            }
        }
    }

    /// One display frame: timers first, then the per-screen update.
    pub fn frame(&mut self, now: Millis) {
        self.advance(now);
        match self.state.screen {
            Screen::Start => self.state.drift_start_rings(&self.cfg, &mut self.rng),
            Screen::Playing => self.update_playing(),
            Screen::PowerUp => {}
        }
    }

    fn update_playing(&mut self) {
        let (x, y) = self.input.apply(&self.cfg, self.state.player_x, self.state.player_y);
        self.state.player_x = x;
        self.state.player_y = y;
        self.state.advance_bullets();
        self.state.special.update_beam(self.now(), x);
        // Enemies are never removed, so with a non-empty batch this stays false.
        if self.state.boss_active && self.state.enemies.is_empty() {
            self.enter_powerup();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(cfg: GameConfig) -> Game {
        let mut g = Game::new(cfg, Rng::seeded(11));
        assert!(g.select_ring("RED"));
        assert!(g.start());
        g
    }

    #[test]
    fn start_requires_color() {
        let mut g = Game::new(GameConfig::default(), Rng::seeded(1));
        assert!(!g.can_start());
        assert!(!g.start());
        assert_eq!(g.screen(), Screen::Start);
        assert!(!g.select_ring("TEAL"));
        assert!(g.select_ring("blue"));
        assert!(g.can_start());
        assert!(g.start());
        assert_eq!(g.screen(), Screen::Playing);
        assert_eq!(g.state().enemies.len(), 5);
        assert!(!g.select_ring("RED"));
    }

    #[test]
    fn one_volley_per_interval() {
        let mut g = playing(GameConfig::default());
        g.advance(199);
        assert!(g.state().bullets.is_empty());
        g.advance(200);
        assert_eq!(g.state().bullets.len(), 1);
        g.advance(399);
        assert_eq!(g.state().bullets.len(), 1);
        g.advance(1_000);
        assert_eq!(g.state().bullets.len(), 2);
    }

    #[test]
    fn powerup_screen_cancels_phase_timers() {
        let cfg = GameConfig { first_wave_enemies: 0, game_seconds: 2, ..GameConfig::default() };
        let mut g = playing(cfg);
        g.frame(2_000);
        assert!(g.state().boss_active);
        assert_eq!(g.screen(), Screen::PowerUp);
        let bullets = g.state().bullets.len();
        g.frame(10_000);
        assert_eq!(g.state().bullets.len(), bullets);
        assert_eq!(g.state().countdown, 0);
    }

    #[test]
    fn powerup_choice_only_on_modal() {
        let mut g = playing(GameConfig::default());
        assert!(!g.choose_powerup(PowerUp::FireRate));
        assert_eq!(g.state().fire_level, 1);
    }

    #[test]
    fn powerup_names() {
        assert_eq!(PowerUp::parse("fireRate"), Some(PowerUp::FireRate));
        assert_eq!(PowerUp::parse("special"), Some(PowerUp::Cooldown));
        assert_eq!(PowerUp::parse("shield"), None);
    }

    #[test]
    fn space_prevents_default_only_while_playing() {
        let mut g = Game::new(GameConfig::default(), Rng::seeded(2));
        assert!(!g.key_down(" "));
        g.select_ring("WHITE");
        g.start();
        assert!(g.key_down(" "));
        assert!(matches!(g.special_status(), SpecialStatus::Charging { .. }));
        assert!(!g.key_down("ArrowLeft"));
        assert!(g.input().is_held(Arrow::Left));
        g.key_up("ArrowLeft");
        assert!(!g.input().is_held(Arrow::Left));
    }
}
