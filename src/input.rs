//! Keyboard and touch input merged into one player-position update.

use crate::config::GameConfig;

/// Arrow keys the movement logic cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arrow {
    Left,
    Right,
    Up,
    Down,
}

impl Arrow {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Arrow::Left),
            "ArrowRight" => Some(Arrow::Right),
            "ArrowUp" => Some(Arrow::Up),
            "ArrowDown" => Some(Arrow::Down),
            _ => None,
        }
    }
}

/// Key that triggers the special attack.
pub const SPECIAL_KEY: &str = " ";

/// The single finger currently steering the player, in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveTouch {
    pub id: i32,
    pub x: f64,
    pub y: f64,
}

/// Canvas placement on the page, as reported by `getBoundingClientRect`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasRect {
    /// Convert client coordinates to canvas pixels, compensating for CSS scaling.
    /// A collapsed rect (hidden canvas) maps nothing.
    pub fn to_canvas(&self, client_x: f64, client_y: f64, cfg: &GameConfig) -> Option<(f64, f64)> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let sx = cfg.canvas_width / self.width;
        let sy = cfg.canvas_height / self.height;
        Some(((client_x - self.left) * sx, (client_y - self.top) * sy))
    }
}

#[derive(Clone, Debug, Default)]
pub struct InputState {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
    touch: Option<ActiveTouch>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_arrow(&mut self, arrow: Arrow, held: bool) {
        match arrow {
            Arrow::Left => self.left = held,
            Arrow::Right => self.right = held,
            Arrow::Up => self.up = held,
            Arrow::Down => self.down = held,
        }
    }

    pub fn is_held(&self, arrow: Arrow) -> bool {
        match arrow {
            Arrow::Left => self.left,
            Arrow::Right => self.right,
            Arrow::Up => self.up,
            Arrow::Down => self.down,
        }
    }

    pub fn touch(&self) -> Option<ActiveTouch> {
        self.touch
    }

    /// Adopt a new finger only if none is tracked yet.
    pub fn touch_start(&mut self, id: i32, x: f64, y: f64) -> bool {
        if self.touch.is_some() {
            return false;
        }
        self.touch = Some(ActiveTouch { id, x, y });
        true
    }

    pub fn touch_move(&mut self, id: i32, x: f64, y: f64) -> bool {
        match &mut self.touch {
            Some(t) if t.id == id => {
                t.x = x;
                t.y = y;
                true
            }
            _ => false,
        }
    }

    /// Release (end or cancel) of the tracked finger; other fingers are ignored.
    pub fn touch_end(&mut self, id: i32) -> bool {
        if self.touch.is_some_and(|t| t.id == id) {
            self.touch = None;
            true
        } else {
            false
        }
    }

    /// Drop everything held, e.g. when the page loses focus.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Next player position. An active touch wins and the player snaps to it; otherwise
    /// each held arrow applies `player_speed`. Both are clamped to the player area.
    pub fn apply(&self, cfg: &GameConfig, x: f64, y: f64) -> (f64, f64) {
        let (min_x, max_x) = cfg.x_bounds();
        let (min_y, max_y) = cfg.y_bounds();
        if let Some(t) = self.touch {
            return (t.x.clamp(min_x, max_x), t.y.clamp(min_y, max_y));
        }
        let speed = cfg.player_speed;
        let mut nx = x;
        let mut ny = y;
        if self.left {
            nx -= speed;
        }
        if self.right {
            nx += speed;
        }
        if self.up {
            ny -= speed;
        }
        if self.down {
            ny += speed;
        }
        (nx.clamp(min_x, max_x), ny.clamp(min_y, max_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_move_and_clamp() {
        let cfg = GameConfig::default();
        let mut input = InputState::new();
        input.set_arrow(Arrow::Left, true);
        input.set_arrow(Arrow::Up, true);
        assert_eq!(input.apply(&cfg, 400.0, 550.0), (395.0, 545.0));
        assert_eq!(input.apply(&cfg, 12.0, 302.0), (10.0, 300.0));
        input.set_arrow(Arrow::Left, false);
        assert!(!input.is_held(Arrow::Left));
    }

    #[test]
    fn opposite_arrows_cancel() {
        let cfg = GameConfig::default();
        let mut input = InputState::new();
        input.set_arrow(Arrow::Left, true);
        input.set_arrow(Arrow::Right, true);
        assert_eq!(input.apply(&cfg, 400.0, 550.0), (400.0, 550.0));
    }

    #[test]
    fn touch_overrides_keys_and_is_clamped() {
        let cfg = GameConfig::default();
        let mut input = InputState::new();
        input.set_arrow(Arrow::Right, true);
        assert!(input.touch_start(3, 100.0, 50.0));
        assert_eq!(input.apply(&cfg, 400.0, 550.0), (100.0, 300.0));
        assert!(input.touch_end(3));
        assert_eq!(input.apply(&cfg, 400.0, 550.0), (405.0, 550.0));
    }

    #[test]
    fn only_first_finger_is_tracked() {
        let mut input = InputState::new();
        assert!(input.touch_start(1, 10.0, 10.0));
        assert!(!input.touch_start(2, 50.0, 50.0));
        assert!(!input.touch_move(2, 60.0, 60.0));
        assert!(input.touch_move(1, 20.0, 30.0));
        assert!(!input.touch_end(2));
        assert_eq!(input.touch(), Some(ActiveTouch { id: 1, x: 20.0, y: 30.0 }));
    }

    #[test]
    fn rect_mapping_scales_css_size() {
        let cfg = GameConfig::default();
        let rect = CanvasRect { left: 10.0, top: 20.0, width: 400.0, height: 300.0 };
        assert_eq!(rect.to_canvas(210.0, 170.0, &cfg), Some((400.0, 300.0)));
        let hidden = CanvasRect { left: 0.0, top: 0.0, width: 0.0, height: 0.0 };
        assert_eq!(hidden.to_canvas(1.0, 1.0, &cfg), None);
    }

    #[test]
    fn key_names() {
        assert_eq!(Arrow::from_key("ArrowDown"), Some(Arrow::Down));
        assert_eq!(Arrow::from_key("a"), None);
    }
}
