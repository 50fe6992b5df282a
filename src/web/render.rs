//! Canvas drawing. Reads the game, never mutates it.

use std::f64::consts::TAU;

use web_sys::CanvasRenderingContext2d;

use crate::game::Game;
use crate::weapons::SpecialStatus;

const BACKGROUND: &str = "#000033";
const HUD_FONT: &str = "20px 'Courier New', monospace";

fn clear(ctx: &CanvasRenderingContext2d, w: f64, h: f64) {
    ctx.clear_rect(0.0, 0.0, w, h);
    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(0.0, 0.0, w, h);
}

fn ring(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64, color: &str, width: f64) {
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(width);
    ctx.begin_path();
    ctx.arc(x, y, radius, 0.0, TAU).ok();
    ctx.stroke();
}

pub(super) fn draw_start_screen(ctx: &CanvasRenderingContext2d, game: &Game) {
    let cfg = game.config();
    clear(ctx, cfg.canvas_width, cfg.canvas_height);
    for r in &game.state().start_rings {
        ring(ctx, r.x, r.y, r.radius, r.color, 6.0);
    }
}

pub(super) fn draw_playfield(ctx: &CanvasRenderingContext2d, game: &Game) {
    let cfg = game.config();
    clear(ctx, cfg.canvas_width, cfg.canvas_height);
    draw_beam(ctx, game);
    draw_player(ctx, game);
    draw_enemies(ctx, game);
    draw_bullets(ctx, game);
    draw_hud(ctx, game);
}

fn draw_player(ctx: &CanvasRenderingContext2d, game: &Game) {
    let state = game.state();
    let color = state.selected.map(|c| c.css).unwrap_or("#fff");
    let (x, y) = (state.player_x, state.player_y);

    if game.config().effects.glow {
        ctx.set_shadow_color(color);
        ctx.set_shadow_blur(18.0);
    }
    ring(ctx, x, y, 12.0, color, 5.0);
    ctx.set_shadow_blur(0.0);
    ctx.set_fill_style_str("#fff");
    ctx.fill_rect(x - 2.0, y - 2.0, 4.0, 4.0);

    // Charge indicator: an arc closing around the ring as the release approaches.
    if let SpecialStatus::Charging { remaining_ms } = game.special_status() {
        let total = game.config().special.charge_ms.max(1) as f64;
        let progress = 1.0 - remaining_ms as f64 / total;
        ctx.set_stroke_style_str("#ffd700");
        ctx.set_line_width(3.0);
        ctx.begin_path();
        ctx.arc(x, y, 20.0, -TAU / 4.0, -TAU / 4.0 + TAU * progress).ok();
        ctx.stroke();
    }
}

fn draw_enemies(ctx: &CanvasRenderingContext2d, game: &Game) {
    for e in &game.state().enemies {
        ctx.set_fill_style_str(e.color);
        ctx.begin_path();
        ctx.move_to(e.x, e.y);
        ctx.line_to(e.x - e.size / 2.0, e.y + e.size);
        ctx.line_to(e.x + e.size / 2.0, e.y + e.size);
        ctx.close_path();
        ctx.fill();
    }
}

fn draw_bullets(ctx: &CanvasRenderingContext2d, game: &Game) {
    let effects = game.config().effects;
    for b in &game.state().bullets {
        let color = b.color.css();
        let (w, h) = if b.special { (b.size, b.size) } else { (b.size, b.size * 2.0) };
        if effects.trail {
            // Fading copies along the path already travelled.
            ctx.set_fill_style_str(color);
            for step in 1..=3 {
                ctx.set_global_alpha(0.45 / step as f64);
                let ty = b.y + b.speed * step as f64;
                ctx.fill_rect(b.x - w / 2.0, ty - w / 2.0, w, h);
            }
            ctx.set_global_alpha(1.0);
        }
        if effects.glow && b.special {
            ctx.set_shadow_color(color);
            ctx.set_shadow_blur(14.0);
        }
        ctx.set_fill_style_str(color);
        ctx.fill_rect(b.x - w / 2.0, b.y - w / 2.0, w, h);
        ctx.set_shadow_blur(0.0);
    }
}

fn draw_beam(ctx: &CanvasRenderingContext2d, game: &Game) {
    let Some(beam) = game.state().special.beam() else {
        return;
    };
    let intensity = beam.intensity(game.now());
    if intensity <= 0.0 {
        return;
    }
    let top = 0.0;
    let bottom = game.state().player_y - 14.0;
    let width = beam.width * (0.35 + 0.65 * intensity);
    let left = beam.x - width / 2.0;

    let gradient = ctx.create_linear_gradient(left, 0.0, left + width, 0.0);
    let edge = "rgba(255,215,0,0)";
    let core = format!("rgba(255,250,200,{intensity:.3})");
    gradient.add_color_stop(0.0, edge).ok();
    gradient.add_color_stop(0.5, &core).ok();
    gradient.add_color_stop(1.0, edge).ok();

    if game.config().effects.glow {
        ctx.set_shadow_color("#ffd700");
        ctx.set_shadow_blur(24.0 * intensity);
    }
    ctx.set_fill_style_canvas_gradient(&gradient);
    ctx.fill_rect(left, top, width, bottom - top);
    ctx.set_shadow_blur(0.0);
}

fn draw_hud(ctx: &CanvasRenderingContext2d, game: &Game) {
    let state = game.state();
    let cfg = game.config();
    ctx.set_fill_style_str("#fff");
    ctx.set_font(HUD_FONT);

    ctx.set_text_align("left");
    ctx.fill_text(&format!("TIME: {}", state.countdown), 10.0, 30.0).ok();

    ctx.set_text_align("right");
    ctx.fill_text(
        &format!("SPECIAL (SPACE): {}", game.special_status()),
        cfg.canvas_width - 10.0,
        30.0,
    )
    .ok();

    if state.boss_active {
        ctx.set_text_align("center");
        ctx.set_fill_style_str("#ff4444");
        ctx.fill_text("BOSS!", cfg.canvas_width / 2.0, 30.0).ok();
    }
}
