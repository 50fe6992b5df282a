//! Plain game records: the single [`GameState`] and the entities it owns.

use crate::clock::Millis;
use crate::config::{BulletColor, BulletSpec, GameConfig, RING_COLORS, RingColor};
use crate::rng::Rng;
use crate::weapons::SpecialAttack;

/// Which screen is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    /// Ring selection with the idle background animation.
    Start,
    /// Frame loop and gameplay timers running.
    Playing,
    /// Power-up modal; gameplay paused.
    PowerUp,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub size: f64,
    pub color: BulletColor,
    pub special: bool,
}

impl Bullet {
    pub fn from_spec(spec: &BulletSpec, x: f64, y: f64, special: bool) -> Self {
        Self { x, y, speed: spec.speed, size: spec.size, color: spec.color, special }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: &'static str,
}

pub const ENEMY_COLOR: &str = "#a00";

/// Vertical beam released by the beam variant of the special attack.
#[derive(Clone, Debug, PartialEq)]
pub struct Beam {
    pub x: f64,
    pub started_ms: Millis,
    pub duration_ms: Millis,
    pub width: f64,
}

impl Beam {
    /// Linear fade from 1 at activation down to 0 at the end of its lifetime.
    pub fn intensity(&self, now: Millis) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        let elapsed = now.saturating_sub(self.started_ms) as f64;
        (1.0 - elapsed / self.duration_ms as f64).clamp(0.0, 1.0)
    }

    pub fn expired(&self, now: Millis) -> bool {
        now >= self.started_ms + self.duration_ms
    }
}

/// Decorative ring drifting up the start screen.
#[derive(Clone, Debug, PartialEq)]
pub struct StartRing {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: &'static str,
}

const START_RING_RISE: f64 = 0.5;

impl StartRing {
    fn random(rng: &mut Rng, width: f64, height: f64) -> Self {
        Self {
            x: rng.range(0.0, width),
            y: rng.range(0.0, height),
            radius: rng.range(5.0, 15.0),
            color: RING_COLORS[rng.index(RING_COLORS.len())].1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GameState {
    pub screen: Screen,
    pub selected: Option<RingColor>,
    pub player_x: f64,
    pub player_y: f64,
    /// 1-based index into the fire tiers.
    pub fire_level: u8,
    pub last_shot_ms: Option<Millis>,
    pub bullets: Vec<Bullet>,
    pub special: SpecialAttack,
    pub enemies: Vec<Enemy>,
    /// Whole seconds left before the boss flag is raised.
    pub countdown: u32,
    pub boss_active: bool,
    pub start_rings: Vec<StartRing>,
}

impl GameState {
    pub fn new(cfg: &GameConfig, rng: &mut Rng) -> Self {
        let (player_x, player_y) = cfg.player_start();
        let start_rings = (0..cfg.start_rings)
            .map(|_| StartRing::random(rng, cfg.canvas_width, cfg.canvas_height))
            .collect();
        Self {
            screen: Screen::Start,
            selected: None,
            player_x,
            player_y,
            fire_level: 1,
            last_shot_ms: None,
            bullets: Vec::new(),
            special: SpecialAttack::new(cfg.special.cooldown_ms),
            enemies: Vec::new(),
            countdown: cfg.game_seconds,
            boss_active: false,
            start_rings,
        }
    }

    pub fn spawn_enemies(&mut self, count: usize, cfg: &GameConfig, rng: &mut Rng) {
        let size = cfg.enemy_size;
        self.enemies.extend((0..count).map(|_| Enemy {
            x: rng.range(size / 2.0, cfg.canvas_width - size / 2.0),
            y: rng.range(50.0, 150.0),
            size,
            color: ENEMY_COLOR,
        }));
    }

    /// Move every bullet up by its speed and drop the ones past the top edge.
    pub fn advance_bullets(&mut self) {
        self.bullets.retain_mut(|b| {
            b.y -= b.speed;
            b.y >= 0.0
        });
    }

    /// Start-screen idle animation: rings rise and respawn at the bottom.
    pub fn drift_start_rings(&mut self, cfg: &GameConfig, rng: &mut Rng) {
        for ring in &mut self.start_rings {
            ring.y -= START_RING_RISE;
            if ring.y < 0.0 {
                ring.y = cfg.canvas_height;
                ring.x = rng.range(0.0, cfg.canvas_width);
                ring.radius = rng.range(5.0, 15.0);
                ring.color = RING_COLORS[rng.index(RING_COLORS.len())].1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bullet_at(y: f64, speed: f64) -> Bullet {
        Bullet { x: 100.0, y, speed, size: 5.0, color: BulletColor::White, special: false }
    }

    #[test]
    fn bullets_pruned_only_after_crossing_top() {
        let cfg = GameConfig::default();
        let mut s = GameState::new(&cfg, &mut Rng::seeded(1));
        s.bullets = vec![bullet_at(10.0, 10.0), bullet_at(9.0, 10.0), bullet_at(300.0, 10.0)];
        s.advance_bullets();
        let ys: Vec<f64> = s.bullets.iter().map(|b| b.y).collect();
        assert_eq!(ys, vec![0.0, 290.0]);
    }

    #[test]
    fn enemies_spawn_inside_band() {
        let cfg = GameConfig::default();
        let mut rng = Rng::seeded(3);
        let mut s = GameState::new(&cfg, &mut rng);
        s.spawn_enemies(50, &cfg, &mut rng);
        assert_eq!(s.enemies.len(), 50);
        for e in &s.enemies {
            assert!(e.x >= 10.0 && e.x < 790.0);
            assert!(e.y >= 50.0 && e.y < 150.0);
            assert_eq!(e.color, ENEMY_COLOR);
        }
    }

    #[test]
    fn start_rings_wrap_to_bottom() {
        let cfg = GameConfig::default();
        let mut rng = Rng::seeded(5);
        let mut s = GameState::new(&cfg, &mut rng);
        assert_eq!(s.start_rings.len(), 20);
        s.start_rings[0].y = 0.2;
        s.drift_start_rings(&cfg, &mut rng);
        let ring = &s.start_rings[0];
        assert_eq!(ring.y, cfg.canvas_height);
        assert!(ring.radius >= 5.0 && ring.radius < 15.0);
    }

    #[test]
    fn beam_fades_linearly() {
        let beam = Beam { x: 0.0, started_ms: 1_000, duration_ms: 1_000, width: 30.0 };
        assert_eq!(beam.intensity(1_000), 1.0);
        assert!((beam.intensity(1_500) - 0.5).abs() < 1e-9);
        assert_eq!(beam.intensity(2_500), 0.0);
        assert!(!beam.expired(1_999));
        assert!(beam.expired(2_000));
    }
}
