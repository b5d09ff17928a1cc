//! Browser glue: DOM-backed [`Surface`], input listeners and the animation-frame loop.
//!
//! Expected page skeleton (created on the fly when missing):
//! `#gamefield > #enemies`, `#healthbar`, `#killcount`, `#timecount`, `#scorecount`,
//! `#resetButton`. Enemy sprites are `div.enemy` elements positioned through the
//! `--x` / `--y` CSS custom properties; effects are CSS animations named `crash`,
//! `explode` and `shake` triggered by the class of the same name.

use std::cell::RefCell;
use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, AnimationEvent, Document, Element, HtmlElement, MouseEvent, window,
};

use crate::config::GameConfig;
use crate::game::{EnemyId, FrameOutcome, Session};
use crate::leaderboard::{HttpScoreService, Leaderboard, LeaderboardUi, ScoreEntry};
use crate::surface::{Effect, Hud, Surface};

/// One on-screen enemy plus the listeners bound to it. Dropping it unregisters them.
struct Visual {
    element: HtmlElement,
    _on_click: Closure<dyn FnMut(MouseEvent)>,
    _on_animation_end: Closure<dyn FnMut(AnimationEvent)>,
}

pub struct DomSurface {
    document: Document,
    field: HtmlElement,
    enemies: HtmlElement,
    healthbar: HtmlElement,
    kill_count: HtmlElement,
    time_count: HtmlElement,
    score_count: HtmlElement,
    reset_button: HtmlElement,
    visuals: HashMap<EnemyId, Visual>,
    // Removed visuals whose closures may still be on the call stack; dropped next frame.
    retired: Vec<Visual>,
    _on_shake_end: Closure<dyn FnMut(AnimationEvent)>,
}

impl DomSurface {
    pub fn new(doc: &Document) -> Result<Self, JsValue> {
        let body: Element = doc
            .body()
            .ok_or_else(|| JsValue::from_str("no body"))?
            .into();
        let field = ensure_element(doc, &body, "div", "gamefield")?;
        let enemies = ensure_element(doc, &field, "div", "enemies")?;
        let healthbar = ensure_element(doc, &body, "div", "healthbar")?;
        let kill_count = ensure_element(doc, &body, "div", "killcount")?;
        let time_count = ensure_element(doc, &body, "div", "timecount")?;
        let score_count = ensure_element(doc, &body, "div", "scorecount")?;
        let reset_button = ensure_element(doc, &body, "button", "resetButton")?;
        if reset_button.text_content().unwrap_or_default().is_empty() {
            reset_button.set_text_content(Some("Play again"));
        }
        reset_button.set_hidden(true);

        // Crash / explode animations bubble up here too; only react to our own.
        let shaken = field.clone();
        let on_shake_end = Closure::wrap(Box::new(move |evt: AnimationEvent| {
            if evt.animation_name() == "shake" {
                shaken.class_list().remove_1("shake").ok();
            }
        }) as Box<dyn FnMut(_)>);
        field.add_event_listener_with_callback(
            "animationend",
            on_shake_end.as_ref().unchecked_ref(),
        )?;

        Ok(Self {
            document: doc.clone(),
            field,
            enemies,
            healthbar,
            kill_count,
            time_count,
            score_count,
            reset_button,
            visuals: HashMap::new(),
            retired: Vec::new(),
            _on_shake_end: on_shake_end,
        })
    }

    /// Client size of the play field, if it has been laid out.
    pub fn field_size(&self) -> Option<(f64, f64)> {
        let w = self.field.client_width();
        let h = self.field.client_height();
        (w > 0 && h > 0).then_some((w as f64, h as f64))
    }

    pub fn leaderboard_url(&self) -> Option<String> {
        self.field.get_attribute("data-leaderboard-url")
    }

    /// Tuning from the field's `data-config` JSON; defaults when absent or malformed.
    pub fn page_config(&self) -> GameConfig {
        let Some(json) = self.field.get_attribute("data-config") else {
            return GameConfig::default();
        };
        GameConfig::from_json(&json).unwrap_or_else(|err| {
            log::warn!("ignoring malformed data-config: {err}");
            GameConfig::default()
        })
    }

    /// Tears down every enemy visual (used by reset).
    pub fn clear(&mut self) {
        self.enemies.set_inner_html("");
        self.retired.extend(self.visuals.drain().map(|(_, v)| v));
    }

    pub fn flush_retired(&mut self) {
        self.retired.clear();
    }

    fn build_visual(&self, id: EnemyId) -> Result<Visual, JsValue> {
        let element: HtmlElement = self.document.create_element("div")?.dyn_into()?;
        element.set_text_content(Some("🤖"));
        element.class_list().add_1("enemy")?;
        self.enemies.append_child(&element)?;

        let on_click = Closure::wrap(Box::new(move |_evt: MouseEvent| {
            with_app(|app| app.session.click(id, &mut app.surface));
        }) as Box<dyn FnMut(_)>);
        let once = AddEventListenerOptions::new();
        once.set_once(true);
        element.add_event_listener_with_callback_and_add_event_listener_options(
            "mousedown",
            on_click.as_ref().unchecked_ref(),
            &once,
        )?;

        let on_animation_end = Closure::wrap(Box::new(move |evt: AnimationEvent| {
            if let Some(effect) = Effect::from_animation_name(&evt.animation_name()) {
                with_app(|app| app.session.effect_finished(id, effect, &mut app.surface));
            }
        }) as Box<dyn FnMut(_)>);
        element.add_event_listener_with_callback(
            "animationend",
            on_animation_end.as_ref().unchecked_ref(),
        )?;

        Ok(Visual {
            element,
            _on_click: on_click,
            _on_animation_end: on_animation_end,
        })
    }

    fn element(&self, id: EnemyId) -> Option<&HtmlElement> {
        self.visuals.get(&id).map(|v| &v.element)
    }
}

impl Surface for DomSurface {
    fn create_visual(&mut self, id: EnemyId) {
        match self.build_visual(id) {
            Ok(visual) => {
                self.visuals.insert(id, visual);
            }
            Err(err) => log::warn!("could not create enemy visual: {err:?}"),
        }
    }

    fn remove_visual(&mut self, id: EnemyId) {
        if let Some(visual) = self.visuals.remove(&id) {
            visual.element.remove();
            self.retired.push(visual);
        }
    }

    fn place_visual(&mut self, id: EnemyId, x: f64, y: f64) {
        if let Some(el) = self.element(id) {
            let style = el.style();
            style.set_property("--x", &x.to_string()).ok();
            style.set_property("--y", &y.to_string()).ok();
        }
    }

    fn add_effect(&mut self, id: EnemyId, effect: Effect) {
        if let Some(el) = self.element(id) {
            el.class_list().add_1(effect.class_name()).ok();
        }
    }

    fn remove_effect(&mut self, id: EnemyId, effect: Effect) {
        if let Some(el) = self.element(id) {
            el.class_list().remove_1(effect.class_name()).ok();
        }
    }

    fn shake_field(&mut self) {
        self.field.class_list().add_1("shake").ok();
    }

    fn show_hud(&mut self, hud: &Hud) {
        self.kill_count
            .set_text_content(Some(&format!("Kills: {}", hud.kills)));
        self.time_count
            .set_text_content(Some(&format!("Time: {:.1}s", hud.elapsed_secs)));
        self.score_count
            .set_text_content(Some(&format!("Score: {}", hud.score)));
    }

    fn show_health(&mut self, health: i32) {
        self.healthbar
            .style()
            .set_property("--health", &health.max(0).to_string())
            .ok();
    }

    fn show_reset_control(&mut self, visible: bool) {
        self.reset_button.set_hidden(!visible);
    }
}

/// Returns the element with `id`, creating it under `parent` when the page lacks it.
fn ensure_element(
    doc: &Document,
    parent: &Element,
    tag: &str,
    id: &str,
) -> Result<HtmlElement, JsValue> {
    if let Some(el) = doc.get_element_by_id(id) {
        return Ok(el.dyn_into()?);
    }
    let el: HtmlElement = doc.create_element(tag)?.dyn_into()?;
    el.set_id(id);
    parent.append_child(&el)?;
    Ok(el)
}

// --- Session ownership & frame loop ------------------------------------------

struct App {
    session: Session,
    surface: DomSurface,
    pending_frame: Option<i32>,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
    static FRAME: RefCell<Option<Closure<dyn FnMut(f64)>>> = const { RefCell::new(None) };
}

/// Runs `f` against the live game. Events arriving while the state is borrowed
/// (or before the game started) are dropped.
fn with_app<R>(f: impl FnOnce(&mut App) -> R) -> Option<R> {
    APP.with(|cell| match cell.try_borrow_mut() {
        Ok(mut guard) => guard.as_mut().map(f),
        Err(_) => {
            log::warn!("game state busy, event dropped");
            None
        }
    })
}

pub fn start() -> Result<(), JsValue> {
    if APP.with(|cell| cell.borrow().is_some()) {
        return reset();
    }
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let mut surface = DomSurface::new(&doc)?;
    let mut config = surface.page_config();
    if let Some(url) = surface.leaderboard_url() {
        config.leaderboard_url = url;
    }
    if let Some((w, h)) = surface.field_size() {
        config.field_width = w;
        config.field_height = h;
    }

    let mut session = Session::new(config, SmallRng::from_entropy());
    session.start(&mut surface);
    APP.with(|cell| {
        *cell.borrow_mut() = Some(App {
            session,
            surface,
            pending_frame: None,
        });
    });

    // Keep the simulation's field size in step with the layout
    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            with_app(|app| {
                if let Some((w, h)) = app.surface.field_size() {
                    app.session.resize_field(w, h);
                }
            });
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Reset button
    if let Some(button) = doc.get_element_by_id("resetButton") {
        let closure = Closure::wrap(Box::new(move |_evt: MouseEvent| {
            if let Err(err) = reset() {
                log::error!("reset failed: {err:?}");
            }
        }) as Box<dyn FnMut(_)>);
        button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    install_frame_loop();
    schedule_frame();
    Ok(())
}

/// Discards every enemy and all game state, then restarts the loop.
pub fn reset() -> Result<(), JsValue> {
    let restarted = APP.with(|cell| -> Result<bool, JsValue> {
        let mut guard = cell
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("game state busy"))?;
        let Some(App {
            session,
            mut surface,
            pending_frame,
        }) = guard.take()
        else {
            return Ok(false);
        };
        if let (Some(frame), Some(win)) = (pending_frame, window()) {
            win.cancel_animation_frame(frame).ok();
        }
        surface.clear();
        let mut session = session.reset();
        if let Some((w, h)) = surface.field_size() {
            session.resize_field(w, h);
        }
        session.start(&mut surface);
        *guard = Some(App {
            session,
            surface,
            pending_frame: None,
        });
        Ok(true)
    })?;
    if restarted {
        schedule_frame();
        log::info!("GAME RESET");
    }
    Ok(())
}

fn install_frame_loop() {
    FRAME.with(|cell| {
        if cell.borrow().is_some() {
            return;
        }
        let closure = Closure::wrap(Box::new(on_frame) as Box<dyn FnMut(f64)>);
        *cell.borrow_mut() = Some(closure);
    });
}

fn schedule_frame() {
    let requested = FRAME.with(|cell| -> Result<i32, JsValue> {
        let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
        let cb = cell.borrow();
        let cb = cb
            .as_ref()
            .ok_or_else(|| JsValue::from_str("frame loop not installed"))?;
        win.request_animation_frame(cb.as_ref().unchecked_ref())
    });
    match requested {
        Ok(handle) => {
            with_app(|app| app.pending_frame = Some(handle));
        }
        Err(err) => log::error!("could not request animation frame: {err:?}"),
    }
}

fn on_frame(ts: f64) {
    let Some(outcome) = with_app(|app| {
        app.pending_frame = None;
        app.surface.flush_retired();
        app.session.step(ts, &mut app.surface)
    }) else {
        return;
    };
    match outcome {
        FrameOutcome::Continue => schedule_frame(),
        FrameOutcome::GameOver { score } => submit_score_later(score),
        FrameOutcome::LevelComplete | FrameOutcome::Halted => {}
    }
}

/// Detached leaderboard round trip; never feeds back into the session.
fn submit_score_later(score: i64) {
    let Some(config) = with_app(|app| app.session.config().clone()) else {
        return;
    };
    wasm_bindgen_futures::spawn_local(async move {
        let board = Leaderboard::new(
            HttpScoreService::new(config.leaderboard_url),
            DomLeaderboardUi {
                max_name_len: config.max_name_len,
            },
            config.leaderboard_size,
            config.max_name_len,
        );
        board.record(score).await;
    });
}

// --- Leaderboard view ----------------------------------------------------------

struct DomLeaderboardUi {
    max_name_len: usize,
}

impl LeaderboardUi for DomLeaderboardUi {
    fn ask_name(&self) -> Option<String> {
        let message = format!(
            "New High Score! Enter initials (max {} chars):",
            self.max_name_len
        );
        window()?
            .prompt_with_message_and_default(&message, "AAA")
            .ok()
            .flatten()
    }

    fn show_scores(&self, scores: &[ScoreEntry]) {
        if let Err(err) = render_high_scores(scores) {
            log::warn!("could not render high scores: {err:?}");
        }
    }
}

fn render_high_scores(scores: &[ScoreEntry]) -> Result<(), JsValue> {
    let doc = window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body: Element = doc
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?
        .into();
    let container = ensure_element(&doc, &body, "div", "highScores")?;
    container.set_text_content(None);

    let heading = doc.create_element("h3")?;
    heading.set_text_content(Some("🏆 High Scores"));
    container.append_child(&heading)?;
    let list = doc.create_element("ol")?;
    for entry in scores {
        let item = doc.create_element("li")?;
        item.set_text_content(Some(&score_line(entry)));
        list.append_child(&item)?;
    }
    container.append_child(&list)?;
    Ok(())
}

fn score_line(entry: &ScoreEntry) -> String {
    format!("{} — {}", entry.name, entry.score)
}
