//! Browser shell around [`Game`]: canvas + DOM screens, event listeners and the
//! `requestAnimationFrame` loop. All gameplay decisions live in `game`; this module only
//! forwards events, drives the clock and mirrors the screen state onto the DOM.

mod render;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, window};

use crate::clock::Millis;
use crate::config::{GameConfig, RING_COLORS};
use crate::game::{Game, PowerUp};
use crate::input::CanvasRect;
use crate::rng::Rng;
use crate::state::Screen;
use crate::weapons::SpecialBlocked;

const CANVAS_ID: &str = "gameCanvas";
const START_SCREEN_ID: &str = "startScreen";
const RING_CHOICES_ID: &str = "ringChoices";
const START_BUTTON_ID: &str = "startButton";
const POWERUP_SCREEN_ID: &str = "powerUpScreen";
const POWERUP_FIRE_ID: &str = "pu-fireRate";
const POWERUP_SPECIAL_ID: &str = "pu-special";

struct WebGame {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    game: Game,
    /// Screen last mirrored onto the DOM overlays.
    shown: Option<Screen>,
}

thread_local! {
    static GAME: RefCell<Option<WebGame>> = const { RefCell::new(None) };
}

fn with_game<R>(f: impl FnOnce(&mut WebGame) -> R) -> Option<R> {
    GAME.with(|cell| cell.borrow_mut().as_mut().map(f))
}

fn now_ms() -> Millis {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
        .max(0.0) as Millis
}

/// Mount the game on the current page and start the frame loop.
pub fn mount(cfg: GameConfig) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if GAME.with(|cell| cell.borrow().is_some()) {
        log::warn!("game already mounted; ignoring second start");
        return Ok(());
    }

    let canvas = ensure_canvas(&doc, &cfg)?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;

    let now = now_ms();
    #[cfg(feature = "rng")]
    let rng = Rng::from_entropy(now);
    #[cfg(not(feature = "rng"))]
    let rng = Rng::seeded(now ^ 0x5DEE_CE66);

    ensure_screens(&doc)?;
    GAME.with(|cell| {
        *cell.borrow_mut() = Some(WebGame {
            canvas: canvas.clone(),
            ctx,
            game: Game::starting_at(cfg, rng, now),
            shown: None,
        });
    });

    build_ring_choices(&doc)?;
    wire_buttons(&doc)?;
    wire_keyboard(&win)?;
    wire_touch(&canvas)?;
    start_loop();
    log::info!("ring shooter mounted");
    Ok(())
}

/// Special attack from a page-provided control (e.g. an on-screen button on touch devices).
pub fn trigger_special() -> Result<(), SpecialBlocked> {
    with_game(|wg| {
        wg.game.advance(now_ms());
        wg.game.trigger_special()
    })
    .unwrap_or(Err(SpecialBlocked::NotPlaying))
}

pub fn choose_powerup(choice: PowerUp) -> bool {
    with_game(|wg| {
        wg.game.advance(now_ms());
        wg.game.choose_powerup(choice)
    })
    .unwrap_or(false)
}

// --- DOM scaffolding ----------------------------------------------------------

fn ensure_canvas(doc: &Document, cfg: &GameConfig) -> Result<HtmlCanvasElement, JsValue> {
    let canvas: HtmlCanvasElement = if let Some(el) = doc.get_element_by_id(CANVAS_ID) {
        el.dyn_into()?
    } else {
        let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
        c.set_id(CANVAS_ID);
        c.set_attribute(
            "style",
            "display:block; margin:0 auto; max-width:100%; touch-action:none; background:#000033;",
        )?;
        body(doc)?.append_child(&c)?;
        c
    };
    canvas.set_width(cfg.canvas_width as u32);
    canvas.set_height(cfg.canvas_height as u32);
    Ok(canvas)
}

fn body(doc: &Document) -> Result<HtmlElement, JsValue> {
    doc.body().ok_or_else(|| JsValue::from_str("no body"))
}

/// Create the start screen and power-up modal when the host page does not provide them.
fn ensure_screens(doc: &Document) -> Result<(), JsValue> {
    const OVERLAY: &str = "position:fixed; inset:0; display:flex; flex-direction:column; align-items:center; justify-content:center; gap:16px; background:rgba(0,0,20,0.82); color:#fff; font-family:'Courier New', monospace; z-index:30;";
    const BUTTON: &str = "padding:8px 18px; font-family:'Courier New', monospace; font-size:18px; background:#111; color:#fff; border:2px solid #fff; cursor:pointer;";

    if doc.get_element_by_id(START_SCREEN_ID).is_none() {
        let screen = doc.create_element("div")?;
        screen.set_id(START_SCREEN_ID);
        screen.set_attribute("style", OVERLAY)?;
        let title = doc.create_element("h1")?;
        title.set_text_content(Some("CHOOSE YOUR RING"));
        screen.append_child(&title)?;
        let choices = doc.create_element("div")?;
        choices.set_id(RING_CHOICES_ID);
        choices.set_attribute("style", "display:flex; flex-wrap:wrap; gap:10px; justify-content:center;")?;
        screen.append_child(&choices)?;
        let start = doc.create_element("button")?;
        start.set_id(START_BUTTON_ID);
        start.set_text_content(Some("START"));
        start.set_attribute("style", BUTTON)?;
        screen.append_child(&start)?;
        body(doc)?.append_child(&screen)?;
    }
    if doc.get_element_by_id(POWERUP_SCREEN_ID).is_none() {
        let screen = doc.create_element("div")?;
        screen.set_id(POWERUP_SCREEN_ID);
        screen.set_attribute("style", OVERLAY)?;
        let title = doc.create_element("h2")?;
        title.set_text_content(Some("CHOOSE A POWER-UP"));
        screen.append_child(&title)?;
        for (id, label) in [
            (POWERUP_FIRE_ID, "FIRE RATE +"),
            (POWERUP_SPECIAL_ID, "SPECIAL COOLDOWN -50%"),
        ] {
            let b = doc.create_element("button")?;
            b.set_id(id);
            b.set_text_content(Some(label));
            b.set_attribute("style", BUTTON)?;
            screen.append_child(&b)?;
        }
        body(doc)?.append_child(&screen)?;
    }
    if let Some(start) = doc.get_element_by_id(START_BUTTON_ID) {
        start.set_attribute("disabled", "")?;
    }
    Ok(())
}

fn set_display(doc: &Document, id: &str, display: &str) {
    if let Some(el) = doc
        .get_element_by_id(id)
        .and_then(|e| e.dyn_into::<HtmlElement>().ok())
    {
        el.style().set_property("display", display).ok();
    }
}

/// One clickable choice per palette entry, highlighted on selection.
fn build_ring_choices(doc: &Document) -> Result<(), JsValue> {
    let container = doc
        .get_element_by_id(RING_CHOICES_ID)
        .ok_or_else(|| JsValue::from_str("no ring choice container"))?;
    let mut buttons: Vec<HtmlElement> = Vec::with_capacity(RING_COLORS.len());
    for &(name, css) in RING_COLORS {
        let el: HtmlElement = doc.create_element("div")?.dyn_into()?;
        el.set_class_name("ring-choice");
        el.set_text_content(Some(name));
        el.set_attribute("data-color", css)?;
        el.set_attribute(
            "style",
            &format!("color:{css}; border:2px solid #fff; padding:6px 12px; cursor:pointer; font-family:'Courier New', monospace;"),
        )?;
        container.append_child(&el)?;
        buttons.push(el);
    }
    let buttons = Rc::new(buttons);

    for (idx, &(name, css)) in RING_COLORS.iter().enumerate() {
        let all = buttons.clone();
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            if with_game(|wg| wg.game.select_ring(name)) != Some(true) {
                return;
            }
            for b in all.iter() {
                b.style().set_property("border", "2px solid #fff").ok();
            }
            all[idx]
                .style()
                .set_property("border", &format!("4px solid {css}"))
                .ok();
            if let Some(start) = window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id(START_BUTTON_ID))
            {
                start.remove_attribute("disabled").ok();
            }
        }) as Box<dyn FnMut(_)>);
        buttons[idx].add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

fn wire_buttons(doc: &Document) -> Result<(), JsValue> {
    if let Some(start) = doc.get_element_by_id(START_BUTTON_ID) {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            with_game(|wg| {
                wg.game.advance(now_ms());
                wg.game.start();
            });
        }) as Box<dyn FnMut(_)>);
        start.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    for (id, choice) in [
        (POWERUP_FIRE_ID, PowerUp::FireRate),
        (POWERUP_SPECIAL_ID, PowerUp::Cooldown),
    ] {
        let Some(button) = doc.get_element_by_id(id) else {
            log::warn!("power-up button #{id} missing");
            continue;
        };
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            choose_powerup(choice);
        }) as Box<dyn FnMut(_)>);
        button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

// --- Input listeners ----------------------------------------------------------

fn wire_keyboard(win: &web_sys::Window) -> Result<(), JsValue> {
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            let key = evt.key();
            let suppress = with_game(|wg| {
                wg.game.advance(now_ms());
                wg.game.key_down(&key)
            });
            if suppress == Some(true) {
                evt.prevent_default();
            }
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            let key = evt.key();
            with_game(|wg| wg.game.key_up(&key));
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    // Keys released while the tab is unfocused never deliver a keyup.
    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            with_game(|wg| wg.game.release_all_input());
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum TouchPhase {
    Start,
    Move,
    End,
}

fn wire_touch(canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    for (kind, phase) in [
        ("touchstart", TouchPhase::Start),
        ("touchmove", TouchPhase::Move),
        ("touchend", TouchPhase::End),
        ("touchcancel", TouchPhase::End),
    ] {
        let canvas_ref = canvas.clone();
        let closure = Closure::wrap(Box::new(move |evt: web_sys::TouchEvent| {
            evt.prevent_default();
            let r = canvas_ref.get_bounding_client_rect();
            let rect = CanvasRect {
                left: r.left(),
                top: r.top(),
                width: r.width(),
                height: r.height(),
            };
            let touches = evt.changed_touches();
            with_game(|wg| {
                for i in 0..touches.length() {
                    let Some(t) = touches.get(i) else { continue };
                    let id = t.identifier();
                    match phase {
                        TouchPhase::End => {
                            wg.game.touch_end(id);
                        }
                        TouchPhase::Start | TouchPhase::Move => {
                            let Some((x, y)) = rect.to_canvas(
                                t.client_x() as f64,
                                t.client_y() as f64,
                                wg.game.config(),
                            ) else {
                                continue;
                            };
                            if matches!(phase, TouchPhase::Start) {
                                wg.game.touch_start(id, x, y);
                            } else {
                                wg.game.touch_move(id, x, y);
                            }
                        }
                    }
                }
            });
        }) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

// --- Frame loop -----------------------------------------------------------------

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        with_game(|wg| tick(wg, ts.max(0.0) as Millis));
        request_frame(&f);
    }) as Box<dyn FnMut(f64)>));
    request_frame(&g);
}

fn request_frame(f: &FrameCallback) {
    let Some(w) = window() else { return };
    if let Some(cb) = f.borrow().as_ref() {
        if let Err(e) = w.request_animation_frame(cb.as_ref().unchecked_ref()) {
            log::error!("requestAnimationFrame failed: {e:?}");
        }
    }
}

fn tick(wg: &mut WebGame, now: Millis) {
    wg.game.frame(now);
    match wg.game.screen() {
        Screen::Start => render::draw_start_screen(&wg.ctx, &wg.game),
        Screen::Playing | Screen::PowerUp => render::draw_playfield(&wg.ctx, &wg.game),
    }
    sync_overlays(wg);
}

/// Show exactly the overlay that matches the current screen.
fn sync_overlays(wg: &mut WebGame) {
    let screen = wg.game.screen();
    if wg.shown == Some(screen) {
        return;
    }
    let Some(doc) = window().and_then(|w| w.document()) else {
        return;
    };
    let (start, powerup) = match screen {
        Screen::Start => ("flex", "none"),
        Screen::Playing => ("none", "none"),
        Screen::PowerUp => ("none", "flex"),
    };
    set_display(&doc, START_SCREEN_ID, start);
    set_display(&doc, POWERUP_SCREEN_ID, powerup);
    if screen == Screen::Playing {
        wg.canvas.focus().ok();
    }
    wg.shown = Some(screen);
}
