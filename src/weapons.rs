//! Primary volleys and the charged special attack.

use std::fmt;

use crate::clock::Millis;
use crate::config::{GameConfig, SpecialVariant};
use crate::state::{Beam, Bullet};

/// Build one auto-fire volley for the given fire-rate level, centered on the player.
///
/// Projectiles are spaced `spread_spacing` apart horizontally; with a non-zero
/// `spread_stagger` each step away from the center also sits that much lower, giving
/// the arrowhead shape of the multi-missile spread.
pub fn volley(cfg: &GameConfig, level: u8, x: f64, y: f64) -> Vec<Bullet> {
    let count = cfg.fire_tier(level).projectiles.max(1) as i32;
    let center = (count - 1) as f64 / 2.0;
    let spawn_y = y - cfg.bullet.offset_y;
    (0..count)
        .map(|i| {
            let step = i as f64 - center;
            let bx = x + step * cfg.spread_spacing;
            let by = spawn_y + step.abs() * cfg.spread_stagger;
            Bullet::from_spec(&cfg.bullet, bx, by, false)
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialPhase {
    Ready,
    Charging { release_at: Millis },
    CoolingDown { ready_at: Millis },
}

/// Why a special-attack trigger was ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialBlocked {
    NotPlaying,
    Charging,
    BeamActive,
    CoolingDown,
}

impl fmt::Display for SpecialBlocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPlaying => write!(f, "special attack only fires while playing"),
            Self::Charging => write!(f, "special attack is already charging"),
            Self::BeamActive => write!(f, "special beam is still active"),
            Self::CoolingDown => write!(f, "special attack is cooling down"),
        }
    }
}

/// What the HUD shows for the special attack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpecialStatus {
    Ready,
    Charging { remaining_ms: Millis },
    Active,
    CoolingDown { remaining_ms: Millis },
}

impl fmt::Display for SpecialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Ready => write!(f, "READY"),
            Self::Charging { .. } => write!(f, "CHARGING"),
            Self::Active => write!(f, "ACTIVE"),
            Self::CoolingDown { remaining_ms } => {
                write!(f, "{:.1}s", remaining_ms as f64 / 1000.0)
            }
        }
    }
}

/// What an activation produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Release {
    Bullet(Bullet),
    Beam,
}

/// Charge → activation → cooldown cycle for the secondary weapon.
#[derive(Clone, Debug)]
pub struct SpecialAttack {
    phase: SpecialPhase,
    cooldown_ms: Millis,
    beam: Option<Beam>,
    activations: u32,
}

impl SpecialAttack {
    pub fn new(cooldown_ms: Millis) -> Self {
        Self { phase: SpecialPhase::Ready, cooldown_ms, beam: None, activations: 0 }
    }

    pub fn phase(&self) -> SpecialPhase {
        self.phase
    }

    pub fn cooldown_ms(&self) -> Millis {
        self.cooldown_ms
    }

    pub fn beam(&self) -> Option<&Beam> {
        self.beam.as_ref()
    }

    /// Completed activations since the game was created.
    pub fn activations(&self) -> u32 {
        self.activations
    }

    /// Begin charging. Returns the release time on success.
    pub fn trigger(&mut self, now: Millis, charge_ms: Millis) -> Result<Millis, SpecialBlocked> {
        match self.phase {
            SpecialPhase::Charging { .. } => return Err(SpecialBlocked::Charging),
            SpecialPhase::CoolingDown { .. } => return Err(SpecialBlocked::CoolingDown),
            SpecialPhase::Ready => {}
        }
        if self.beam.is_some() {
            return Err(SpecialBlocked::BeamActive);
        }
        let release_at = now + charge_ms;
        self.phase = SpecialPhase::Charging { release_at };
        Ok(release_at)
    }

    /// Finish the charge: emit the projectile or beam and enter cooldown. Returns the
    /// cooldown end together with the release, or `None` if nothing was charging.
    pub fn release(
        &mut self,
        now: Millis,
        cfg: &GameConfig,
        x: f64,
        y: f64,
    ) -> Option<(Millis, Release)> {
        if !matches!(self.phase, SpecialPhase::Charging { .. }) {
            return None;
        }
        let ready_at = now + self.cooldown_ms;
        self.phase = SpecialPhase::CoolingDown { ready_at };
        self.activations += 1;
        let release = match cfg.special.variant {
            SpecialVariant::Bullet => Release::Bullet(Bullet::from_spec(
                &cfg.special_bullet,
                x,
                y - cfg.special_bullet.offset_y,
                true,
            )),
            SpecialVariant::Beam => {
                self.beam = Some(Beam {
                    x,
                    started_ms: now,
                    duration_ms: cfg.special.beam_duration_ms,
                    width: cfg.special.beam_width,
                });
                Release::Beam
            }
        };
        Some((ready_at, release))
    }

    /// Cooldown expiry. Ignored unless actually cooling down.
    pub fn rearm(&mut self) -> bool {
        if matches!(self.phase, SpecialPhase::CoolingDown { .. }) {
            self.phase = SpecialPhase::Ready;
            true
        } else {
            false
        }
    }

    /// Drop a pending charge and any live beam. Cooldown, if running, is kept.
    pub fn abort(&mut self) {
        if matches!(self.phase, SpecialPhase::Charging { .. }) {
            self.phase = SpecialPhase::Ready;
        }
        self.beam = None;
    }

    /// Keep the beam on the player and remove it once its lifetime is over.
    pub fn update_beam(&mut self, now: Millis, x: f64) {
        if self.beam.as_ref().is_some_and(|b| b.expired(now)) {
            self.beam = None;
        }
        if let Some(beam) = &mut self.beam {
            beam.x = x;
        }
    }

    /// Halve the cooldown down to `floor`. Applies from the next activation.
    pub fn reduce_cooldown(&mut self, floor: Millis) {
        self.cooldown_ms = (self.cooldown_ms / 2).max(floor);
    }

    pub fn status(&self, now: Millis) -> SpecialStatus {
        match self.phase {
            SpecialPhase::Charging { release_at } => SpecialStatus::Charging {
                remaining_ms: release_at.saturating_sub(now),
            },
            _ if self.beam.is_some() => SpecialStatus::Active,
            SpecialPhase::CoolingDown { ready_at } => SpecialStatus::CoolingDown {
                remaining_ms: ready_at.saturating_sub(now),
            },
            SpecialPhase::Ready => SpecialStatus::Ready,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volley_counts_follow_tiers() {
        let cfg = GameConfig::default();
        for (level, n) in [(1, 1), (2, 3), (3, 5)] {
            assert_eq!(volley(&cfg, level, 400.0, 550.0).len(), n);
        }
    }

    #[test]
    fn volley_is_centered_and_staggered() {
        let cfg = GameConfig::default();
        let shots = volley(&cfg, 3, 400.0, 550.0);
        let xs: Vec<f64> = shots.iter().map(|b| b.x).collect();
        assert_eq!(xs, vec![372.0, 386.0, 400.0, 414.0, 428.0]);
        let ys: Vec<f64> = shots.iter().map(|b| b.y).collect();
        assert_eq!(ys, vec![542.0, 536.0, 530.0, 536.0, 542.0]);
        assert!(shots.iter().all(|b| !b.special));
    }

    #[test]
    fn stagger_can_be_disabled() {
        let cfg = GameConfig { spread_stagger: 0.0, ..GameConfig::default() };
        let shots = volley(&cfg, 2, 100.0, 500.0);
        assert!(shots.iter().all(|b| b.y == 480.0));
    }

    #[test]
    fn one_cycle_per_trigger() {
        let cfg = GameConfig::default();
        let mut sp = SpecialAttack::new(cfg.special.cooldown_ms);
        assert_eq!(sp.trigger(0, 600), Ok(600));
        assert_eq!(sp.trigger(100, 600), Err(SpecialBlocked::Charging));
        let (ready_at, release) = sp.release(600, &cfg, 400.0, 550.0).unwrap();
        assert_eq!(ready_at, 10_600);
        assert_eq!(release, Release::Beam);
        assert!(sp.release(601, &cfg, 400.0, 550.0).is_none());
        assert_eq!(sp.activations(), 1);
        assert_eq!(sp.trigger(700, 600), Err(SpecialBlocked::CoolingDown));
        assert!(sp.rearm());
        assert!(!sp.rearm());
    }

    #[test]
    fn live_beam_blocks_trigger_even_after_rearm() {
        let mut cfg = GameConfig::default();
        cfg.special.cooldown_ms = 100;
        let mut sp = SpecialAttack::new(cfg.special.cooldown_ms);
        sp.trigger(0, 0).unwrap();
        sp.release(0, &cfg, 10.0, 500.0).unwrap();
        sp.rearm();
        assert_eq!(sp.trigger(200, 0), Err(SpecialBlocked::BeamActive));
        sp.update_beam(1_500, 10.0);
        assert!(sp.beam().is_none());
        assert!(sp.trigger(1_500, 0).is_ok());
    }

    #[test]
    fn bullet_variant_releases_gold_projectile() {
        let mut cfg = GameConfig::default();
        cfg.special.variant = SpecialVariant::Bullet;
        let mut sp = SpecialAttack::new(cfg.special.cooldown_ms);
        sp.trigger(0, 600).unwrap();
        let (_, release) = sp.release(600, &cfg, 200.0, 500.0).unwrap();
        let Release::Bullet(b) = release else { panic!("expected a bullet") };
        assert!(b.special);
        assert_eq!((b.x, b.y, b.size, b.speed), (200.0, 470.0, 15.0, 7.0));
        assert!(sp.beam().is_none());
    }

    #[test]
    fn cooldown_reduction_has_floor() {
        let mut sp = SpecialAttack::new(10_000);
        sp.reduce_cooldown(5_000);
        assert_eq!(sp.cooldown_ms(), 5_000);
        sp.reduce_cooldown(5_000);
        assert_eq!(sp.cooldown_ms(), 5_000);
    }

    #[test]
    fn status_reports_phases() {
        let cfg = GameConfig::default();
        let mut sp = SpecialAttack::new(cfg.special.cooldown_ms);
        assert_eq!(sp.status(0), SpecialStatus::Ready);
        sp.trigger(0, 600).unwrap();
        assert_eq!(sp.status(100), SpecialStatus::Charging { remaining_ms: 500 });
        sp.release(600, &cfg, 0.0, 500.0);
        assert_eq!(sp.status(700), SpecialStatus::Active);
        sp.update_beam(2_100, 0.0);
        assert_eq!(sp.status(2_100), SpecialStatus::CoolingDown { remaining_ms: 8_500 });
        assert_eq!(sp.status(2_100).to_string(), "8.5s");
    }
}
