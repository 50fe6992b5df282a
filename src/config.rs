//! Tunables for the arcade loop.
//!
//! Every gameplay constant lives in [`GameConfig`]; `Default` reproduces the stock
//! prototype. With the `serde` feature the whole struct (de)serializes, missing fields
//! falling back to their defaults, and `serde_json` adds [`GameConfig::from_json`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Selectable ring colors shown on the start screen (name, CSS color).
pub const RING_COLORS: &[(&str, &str)] = &[
    ("WHITE", "#fff"),
    ("BROWN", "#a0522d"),
    ("RED", "#ff0000"),
    ("BLUE", "#0000ff"),
    ("GREEN", "#00ff00"),
    ("YELLOW", "#ffff00"),
    ("PURPLE", "#800080"),
];

/// Look up a palette entry by its display name (case-insensitive).
pub fn ring_color(name: &str) -> Option<RingColor> {
    RING_COLORS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(name, css)| RingColor { name, css })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RingColor {
    pub name: &'static str,
    pub css: &'static str,
}

/// One auto-fire tier: how often a volley leaves and how many projectiles it holds.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FireTier {
    pub interval_ms: u64,
    pub projectiles: u8,
}

/// Spawn parameters shared by regular and special bullets.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BulletSpec {
    /// Spawn distance above the player center.
    pub offset_y: f64,
    /// Pixels travelled upward per frame.
    pub speed: f64,
    pub size: f64,
    pub color: BulletColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BulletColor {
    White,
    Gold,
}

impl BulletColor {
    pub fn css(self) -> &'static str {
        match self {
            BulletColor::White => "#fff",
            BulletColor::Gold => "#ffd700",
        }
    }
}

/// What the special attack releases once its charge completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SpecialVariant {
    /// A single large projectile.
    Bullet,
    /// A vertical beam that follows the player and fades out.
    Beam,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpecialConfig {
    pub variant: SpecialVariant,
    pub charge_ms: u64,
    pub cooldown_ms: u64,
    /// Floor for the cooldown-reduction power-up.
    pub min_cooldown_ms: u64,
    pub beam_duration_ms: u64,
    pub beam_width: f64,
}

impl Default for SpecialConfig {
    fn default() -> Self {
        Self {
            variant: SpecialVariant::Beam,
            charge_ms: 600,
            cooldown_ms: 10_000,
            min_cooldown_ms: 5_000,
            beam_duration_ms: 1_500,
            beam_width: 36.0,
        }
    }
}

/// Purely cosmetic switches; the simulation never reads them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Effects {
    pub glow: bool,
    pub trail: bool,
}

impl Default for Effects {
    fn default() -> Self {
        Self { glow: true, trail: true }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Pixels moved per frame while an arrow key is held.
    pub player_speed: f64,
    /// Distance the player center keeps from the canvas edges.
    pub player_margin: f64,
    /// Countdown length in whole seconds before the boss flag is raised.
    pub game_seconds: u32,
    pub countdown_tick_ms: u64,
    /// Indexed by fire-rate level minus one.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "partial::fire_tiers"))]
    pub fire_tiers: [FireTier; 3],
    pub spread_spacing: f64,
    /// Extra downward offset per step away from the volley center; 0 disables it.
    pub spread_stagger: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "partial::bullet"))]
    pub bullet: BulletSpec,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "partial::special_bullet"))]
    pub special_bullet: BulletSpec,
    pub special: SpecialConfig,
    pub first_wave_enemies: usize,
    pub next_wave_enemies: usize,
    pub enemy_size: f64,
    pub start_rings: usize,
    pub effects: Effects,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 600.0,
            player_speed: 5.0,
            player_margin: 10.0,
            game_seconds: 60,
            countdown_tick_ms: 1_000,
            fire_tiers: [
                FireTier { interval_ms: 200, projectiles: 1 },
                FireTier { interval_ms: 160, projectiles: 3 },
                FireTier { interval_ms: 120, projectiles: 5 },
            ],
            spread_spacing: 14.0,
            spread_stagger: 6.0,
            bullet: BulletSpec {
                offset_y: 20.0,
                speed: 10.0,
                size: 5.0,
                color: BulletColor::White,
            },
            special_bullet: BulletSpec {
                offset_y: 30.0,
                speed: 7.0,
                size: 15.0,
                color: BulletColor::Gold,
            },
            special: SpecialConfig::default(),
            first_wave_enemies: 5,
            next_wave_enemies: 8,
            enemy_size: 20.0,
            start_rings: 20,
            effects: Effects::default(),
        }
    }
}

impl GameConfig {
    pub const MAX_FIRE_LEVEL: u8 = 3;

    /// Tier for a 1-based fire-rate level; out-of-range levels clamp to the nearest tier.
    pub fn fire_tier(&self, level: u8) -> FireTier {
        let idx = level.clamp(1, Self::MAX_FIRE_LEVEL) as usize - 1;
        self.fire_tiers[idx]
    }

    pub fn player_start(&self) -> (f64, f64) {
        (self.canvas_width / 2.0, self.canvas_height - 50.0)
    }

    /// Horizontal range available to the player center. Always `min <= max`, even when
    /// the margins overlap on a tiny canvas.
    pub fn x_bounds(&self) -> (f64, f64) {
        let min = self.player_margin;
        (min, (self.canvas_width - self.player_margin).max(min))
    }

    /// Vertical range: the lower half of the canvas only. Always `min <= max`.
    pub fn y_bounds(&self) -> (f64, f64) {
        let min = self.canvas_height / 2.0;
        (min, (self.canvas_height - self.player_margin).max(min))
    }

    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Nested tables in JSON may list only the fields they change; the rest keep the
/// stock values of the slot they land in (a special-bullet override keeps the gold
/// special defaults, tier 3 keeps tier 3's).
#[cfg(feature = "serde")]
mod partial {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    use super::{BulletColor, BulletSpec, FireTier, GameConfig};

    #[derive(Deserialize)]
    struct BulletPatch {
        offset_y: Option<f64>,
        speed: Option<f64>,
        size: Option<f64>,
        color: Option<BulletColor>,
    }

    impl BulletPatch {
        fn over(self, base: BulletSpec) -> BulletSpec {
            BulletSpec {
                offset_y: self.offset_y.unwrap_or(base.offset_y),
                speed: self.speed.unwrap_or(base.speed),
                size: self.size.unwrap_or(base.size),
                color: self.color.unwrap_or(base.color),
            }
        }
    }

    #[derive(Deserialize)]
    struct TierPatch {
        interval_ms: Option<u64>,
        projectiles: Option<u8>,
    }

    pub(super) fn bullet<'de, D: Deserializer<'de>>(d: D) -> Result<BulletSpec, D::Error> {
        Ok(BulletPatch::deserialize(d)?.over(GameConfig::default().bullet))
    }

    pub(super) fn special_bullet<'de, D: Deserializer<'de>>(d: D) -> Result<BulletSpec, D::Error> {
        Ok(BulletPatch::deserialize(d)?.over(GameConfig::default().special_bullet))
    }

    /// Up to three tiers, applied from level 1 upward.
    pub(super) fn fire_tiers<'de, D: Deserializer<'de>>(d: D) -> Result<[FireTier; 3], D::Error> {
        let patches = Vec::<TierPatch>::deserialize(d)?;
        let mut tiers = GameConfig::default().fire_tiers;
        if patches.len() > tiers.len() {
            return Err(D::Error::invalid_length(patches.len(), &"at most 3 fire tiers"));
        }
        for (tier, patch) in tiers.iter_mut().zip(patches) {
            tier.interval_ms = patch.interval_ms.unwrap_or(tier.interval_ms);
            tier.projectiles = patch.projectiles.unwrap_or(tier.projectiles);
        }
        Ok(tiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_lookup_is_case_insensitive() {
        let c = ring_color("purple").unwrap();
        assert_eq!(c.name, "PURPLE");
        assert_eq!(c.css, "#800080");
        assert!(ring_color("ORANGE").is_none());
    }

    #[test]
    fn fire_tier_clamps_level() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.fire_tier(0), cfg.fire_tiers[0]);
        assert_eq!(cfg.fire_tier(2).projectiles, 3);
        assert_eq!(cfg.fire_tier(9).projectiles, 5);
    }

    #[test]
    fn player_bounds_cover_lower_half() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.x_bounds(), (10.0, 790.0));
        assert_eq!(cfg.y_bounds(), (300.0, 590.0));
        assert_eq!(cfg.player_start(), (400.0, 550.0));
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = GameConfig::from_json(r#"{"game_seconds": 5, "special": {"variant": "bullet"}}"#)
            .unwrap();
        assert_eq!(cfg.game_seconds, 5);
        assert_eq!(cfg.special.variant, SpecialVariant::Bullet);
        assert_eq!(cfg.special.cooldown_ms, 10_000);
        assert_eq!(cfg.canvas_width, 800.0);
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn nested_tables_may_be_partial() {
        let cfg = GameConfig::from_json(
            r#"{
                "bullet": {"speed": 3.0},
                "special_bullet": {"size": 20.0},
                "fire_tiers": [{}, {}, {"interval_ms": 90}]
            }"#,
        )
        .unwrap();
        let stock = GameConfig::default();
        assert_eq!(cfg.bullet.speed, 3.0);
        assert_eq!(cfg.bullet.offset_y, stock.bullet.offset_y);
        assert_eq!(cfg.bullet.color, BulletColor::White);
        assert_eq!(cfg.special_bullet.size, 20.0);
        assert_eq!(cfg.special_bullet.speed, 7.0);
        assert_eq!(cfg.special_bullet.color, BulletColor::Gold);
        assert_eq!(cfg.fire_tiers[0], stock.fire_tiers[0]);
        assert_eq!(cfg.fire_tiers[2], FireTier { interval_ms: 90, projectiles: 5 });

        assert!(GameConfig::from_json(r#"{"fire_tiers": [{}, {}, {}, {}]}"#).is_err());
    }

    #[test]
    fn bounds_never_invert_on_tiny_canvas() {
        let cfg = GameConfig { canvas_width: 15.0, canvas_height: 15.0, ..GameConfig::default() };
        let (min_x, max_x) = cfg.x_bounds();
        let (min_y, max_y) = cfg.y_bounds();
        assert!(min_x <= max_x);
        assert!(min_y <= max_y);
        assert_eq!(cfg.y_bounds(), (7.5, 7.5));
    }
}
