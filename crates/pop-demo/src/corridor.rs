//! The corridor program
//!
//! Builds its page, listens for keys on the document, and runs one game tick
//! per sandbox tick until the recorded input has played out.

use std::cell::RefCell;
use std::rc::Rc;

use pop_dom::{Event, Listener, NodeId};
use pop_replay::{Frame, Host, Program, ProgramError, StatsSnapshot};
use tracing::debug;

use crate::canvas::{Canvas, Color};
use crate::game::{Controls, GameState, LANE_WIDTH, SLIME_PERIOD, START_HEALTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorridorSettings {
    pub episode: i32,
    pub mission: i32,
    pub skill: i32,
    /// Keep running this long after the last recorded input
    pub trailing_ms: u32,
    /// Hard stop
    pub max_ticks: u64,
}

impl Default for CorridorSettings {
    fn default() -> Self {
        Self {
            episode: 1,
            mission: 1,
            skill: 2,
            trailing_ms: 1000,
            max_ticks: 35 * 60 * 10,
        }
    }
}

/// Page elements the program updates every tick
struct Page {
    canvas: NodeId,
    hud_text: NodeId,
}

#[derive(Debug, Default)]
pub struct Corridor {
    settings: CorridorSettings,
}

impl Corridor {
    pub fn new(settings: CorridorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CorridorSettings {
        &self.settings
    }

    fn build_page(host: &mut Host<'_>) -> Result<Page, ProgramError> {
        let (width, height) = (host.config().frame_width, host.config().frame_height);
        let doc = host.document_mut();
        let body = doc.body();

        let canvas = doc.create_element("canvas");
        if let Some(elem) = doc.tree_mut().element_mut(canvas) {
            elem.set_property("id", "screen")?;
            elem.set_property("width", width)?;
            elem.set_property("height", height)?;
            elem.style.set("imageRendering", "pixelated");
            elem.set_data("tick", "0");
        }

        let hud = doc.create_element("div");
        if let Some(elem) = doc.tree_mut().element_mut(hud) {
            elem.set_property("id", "hud")?;
            elem.class_name = "hud".to_string();
        }
        let hud_text = doc.create_text_node(&hud_line(&GameState::new(0, 0, 0)));

        let tree = doc.tree_mut();
        tree.append_child(hud, hud_text)?;
        tree.append_child(body, canvas)?;
        tree.append_child(body, hud)?;
        Ok(Page { canvas, hud_text })
    }

    fn bind_keys(host: &mut Host<'_>, controls: &Rc<RefCell<Controls>>) {
        for (event_type, pressed) in [("keydown", true), ("keyup", false)] {
            let controls = Rc::clone(controls);
            let listener: Listener = Rc::new(move |event: &mut Event| {
                let Some(data) = &event.keyboard else {
                    return;
                };
                if controls.borrow_mut().apply(&data.parsed_key(), pressed) {
                    event.prevent_default();
                }
            });
            host.document_mut().add_event_listener(event_type, listener);
        }
    }
}

impl Program for Corridor {
    fn run(&mut self, host: &mut Host<'_>) -> Result<(), ProgramError> {
        let settings = self.settings;
        let page = Self::build_page(host)?;
        let controls = Rc::new(RefCell::new(Controls::default()));
        Self::bind_keys(host, &controls);

        let mut state = GameState::new(settings.episode, settings.mission, settings.skill);
        let mut canvas = Canvas::new(host.config().frame_width, host.config().frame_height);
        let stop_at = host.last_input_time().unwrap_or(0.0) + f64::from(settings.trailing_ms);

        host.log(format!(
            "Corridor: episode {} mission {} skill {}",
            state.episode, state.mission, state.skill
        ));

        loop {
            let now = host.begin_tick()?;
            let held = *controls.borrow();
            for happening in state.step(&held) {
                host.log(happening.message());
            }

            render(&mut canvas, &state);
            host.present(Frame::new(canvas.width(), canvas.height(), canvas.as_bytes())?)?;
            update_page(host, &page, &state)?;
            host.record_stats(StatsSnapshot {
                timestamp: now,
                health: state.health,
                armor: state.armor,
                episode: state.episode,
                mission: state.mission,
                skill: state.skill,
            });

            let played_out = host.input_exhausted() && now >= stop_at;
            if played_out || state.is_dead() || host.ticks() >= settings.max_ticks {
                debug!(ticks = host.ticks(), now, dead = state.is_dead(), "corridor finished");
                break;
            }
        }

        host.log(format!("Session over after {} ticks.", host.ticks()));
        host.end_session();
        Ok(())
    }
}

fn hud_line(state: &GameState) -> String {
    format!("HEALTH {}% ARMOR {}% AMMO {}", state.health, state.armor, state.ammo)
}

fn update_page(host: &mut Host<'_>, page: &Page, state: &GameState) -> Result<(), ProgramError> {
    let ticks = host.ticks();
    let tree = host.document_mut().tree_mut();
    if let Some(elem) = tree.element_mut(page.canvas) {
        elem.set_data("tick", ticks.to_string());
    }
    let line = hud_line(state);
    if let Some(text) = tree.get_mut(page.hud_text).and_then(|n| n.as_text_mut()) {
        if text.content != line {
            let len = text.len();
            text.replace_data(0, len, &line);
        }
    }
    Ok(())
}

const CEILING: Color = Color::rgb(72, 72, 80);
const FLOOR: Color = Color::rgb(96, 80, 64);
const SLIME: Color = Color::rgb(40, 160, 40);
const WALL: Color = Color::rgb(140, 100, 72);
const HEALTH_BAR: Color = Color::rgb(200, 32, 32);
const ARMOR_BAR: Color = Color::rgb(32, 96, 200);

/// Draw the corridor as seen from the current lane and depth
fn render(canvas: &mut Canvas, state: &GameState) {
    let (w, h) = (canvas.width(), canvas.height());
    let horizon = h / 2;
    let hud_height = (h / 10).max(2).min(h);
    let view_bottom = h - hud_height;

    canvas.fill_rect(0, 0, w, horizon, CEILING);
    let floor = if state.in_slime() { SLIME } else { FLOOR };
    canvas.fill_rect(0, horizon, w, h - horizon, floor);

    // Walls narrow toward the horizon; the lane shifts them sideways.
    let shift = (state.lane - LANE_WIDTH / 2) * (w as i32 / (LANE_WIDTH * 2)).max(1);
    for y in 0..view_bottom {
        let dist = y.abs_diff(horizon);
        let half = (dist * w / h.max(1)) as i32;
        let stripe = ((state.depth as u32 + dist * 4) / 16) % 2;
        let color = WALL.shade(if stripe == 0 { 16 } else { 12 });
        let center = w as i32 / 2 - shift;
        let left_edge = (center - half - w as i32 / 4).max(0) as u32;
        let right_start = (center + half + w as i32 / 4).clamp(0, w as i32) as u32;
        canvas.fill_rect(0, y, left_edge.min(w), 1, color);
        canvas.fill_rect(right_start, y, w - right_start, 1, color);
    }

    // Depth into the slime period as a thin progress line above the HUD.
    let progress = (state.depth % SLIME_PERIOD) as u32 * w / SLIME_PERIOD as u32;
    canvas.fill_rect(0, view_bottom.saturating_sub(1), progress, 1, Color::WHITE);

    canvas.fill_rect(0, view_bottom, w, hud_height, Color::BLACK);
    let health_w = state.health.clamp(0, START_HEALTH) as u32 * (w / 2) / START_HEALTH as u32;
    let armor_w = state.armor.clamp(0, 200) as u32 * (w / 2) / 200;
    canvas.fill_rect(0, view_bottom, health_w, hud_height / 2, HEALTH_BAR);
    canvas.fill_rect(w / 2, view_bottom, armor_w, hud_height / 2, ARMOR_BAR);
}
