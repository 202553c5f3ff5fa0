//! Browser adapters: 2D canvas presenter and frame clock helpers

use std::f64::consts::TAU;

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::Presenter;
use crate::sim::CloudSize;

const SKY: &str = "#70c5ce";
const PIPE: &str = "#2e8b57";
const PIPE_LIP: &str = "#246b43";
const FROG: &str = "#4caf50";
const FROG_EYE: &str = "#ffffff";
const FLY: &str = "#222222";
const NEAR_RING: &str = "#ffeb3b";
const TONGUE: &str = "#e91e63";
const TEXT: &str = "#ffffff";

/// Frames a near-miss highlight stays visible
const NEAR_FLASH_FRAMES: u8 = 12;

/// Immediate-mode renderer; the whole scene is redrawn every frame
pub struct CanvasPresenter {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
    player_x: f64,
    player_size: (f64, f64),
    pipe_width: f64,
    near: Option<(u32, u8)>,
    game_over: Option<(u32, u32, bool)>,
}

impl CanvasPresenter {
    /// Size `canvas` to the playfield and grab its 2D context
    pub fn new(
        canvas: &HtmlCanvasElement,
        tuning: &crate::tuning::Tuning,
    ) -> Result<Self, wasm_bindgen::JsValue> {
        canvas.set_width(tuning.playfield.width as u32);
        canvas.set_height(tuning.playfield.height as u32);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| wasm_bindgen::JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;

        Ok(Self {
            ctx,
            width: tuning.playfield.width as f64,
            height: tuning.playfield.height as f64,
            player_x: tuning.player.x as f64,
            player_size: (tuning.player.width as f64, tuning.player.height as f64),
            pipe_width: tuning.pipes.width as f64,
            near: None,
            game_over: None,
        })
    }

    fn centered_text(&self, text: &str, y: f64, font: &str) {
        self.ctx.set_font(font);
        self.ctx.set_text_align("center");
        self.ctx.set_fill_style_str(TEXT);
        self.ctx.fill_text(text, self.width / 2.0, y).ok();
    }

    fn circle(&self, x: f64, y: f64, r: f64, color: &str) {
        self.ctx.begin_path();
        self.ctx.set_fill_style_str(color);
        if self.ctx.arc(x, y, r, 0.0, TAU).is_ok() {
            self.ctx.fill();
        }
    }
}

impl Presenter for CanvasPresenter {
    fn begin_frame(&mut self) {
        self.ctx.set_fill_style_str(SKY);
        self.ctx.fill_rect(0.0, 0.0, self.width, self.height);
        if let Some((id, frames)) = self.near {
            self.near = frames.checked_sub(1).filter(|f| *f > 0).map(|f| (id, f));
        }
    }

    fn render_player(&mut self, y: f32) {
        let (w, h) = self.player_size;
        let y = y as f64;
        self.ctx.set_fill_style_str(FROG);
        self.ctx.fill_rect(self.player_x, y, w, h);
        self.circle(self.player_x + w * 0.7, y + h * 0.25, 5.0, FROG_EYE);
        self.circle(self.player_x + w * 0.75, y + h * 0.25, 2.0, FLY);
    }

    fn render_obstacle(&mut self, _id: u32, x: f32, top_height: f32, bottom_height: f32) {
        let x = x as f64;
        let top = top_height as f64;
        let bottom = bottom_height as f64;
        self.ctx.set_fill_style_str(PIPE);
        self.ctx.fill_rect(x, 0.0, self.pipe_width, top);
        self.ctx.fill_rect(x, self.height - bottom, self.pipe_width, bottom);
        self.ctx.set_fill_style_str(PIPE_LIP);
        self.ctx.fill_rect(x - 3.0, top - 12.0, self.pipe_width + 6.0, 12.0);
        self.ctx.fill_rect(x - 3.0, self.height - bottom, self.pipe_width + 6.0, 12.0);
    }

    fn remove_obstacle(&mut self, _id: u32) {}

    fn render_collectible(&mut self, id: u32, x: f32, y: f32) {
        let (x, y) = (x as f64, y as f64);
        if self.near.is_some_and(|(near, _)| near == id) {
            self.circle(x, y, 9.0, NEAR_RING);
        }
        self.circle(x, y, 5.0, FLY);
    }

    fn remove_collectible(&mut self, id: u32) {
        if self.near.is_some_and(|(near, _)| near == id) {
            self.near = None;
        }
    }

    fn render_tongue(&mut self, anchor: Vec2, length: f32) {
        self.ctx.begin_path();
        self.ctx.set_stroke_style_str(TONGUE);
        self.ctx.set_line_width(4.0);
        self.ctx.move_to(anchor.x as f64, anchor.y as f64);
        self.ctx.line_to((anchor.x + length) as f64, anchor.y as f64);
        self.ctx.stroke();
        self.circle((anchor.x + length) as f64, anchor.y as f64, 4.0, TONGUE);
    }

    fn hide_tongue(&mut self) {}

    fn render_cloud(&mut self, _id: u32, x: f32, y: f32, size: CloudSize) {
        let scale = match size {
            CloudSize::Small => 0.6,
            CloudSize::Medium => 1.0,
            CloudSize::Large => 1.5,
        };
        let (x, y) = (x as f64, y as f64);
        self.ctx.set_fill_style_str("rgba(255, 255, 255, 0.8)");
        for (dx, dy, r) in [(0.0, 0.0, 20.0), (22.0, -8.0, 24.0), (46.0, 0.0, 18.0)] {
            self.ctx.begin_path();
            if self.ctx.arc(x + dx * scale, y + dy * scale, r * scale, 0.0, TAU).is_ok() {
                self.ctx.fill();
            }
        }
    }

    fn render_hud(&mut self, score: u32, high_score: u32, fps: Option<u32>) {
        self.centered_text(&score.to_string(), 60.0, "bold 40px sans-serif");

        self.ctx.set_font("14px sans-serif");
        self.ctx.set_text_align("left");
        self.ctx.fill_text(&format!("Best: {}", high_score), 10.0, 20.0).ok();
        if let Some(fps) = fps {
            self.ctx.set_text_align("right");
            self.ctx.fill_text(&format!("{} FPS", fps), self.width - 10.0, 20.0).ok();
        }

        if let Some((score, best, new_record)) = self.game_over {
            self.ctx.set_fill_style_str("rgba(0, 0, 0, 0.5)");
            self.ctx.fill_rect(0.0, 0.0, self.width, self.height);
            let mid = self.height / 2.0;
            self.centered_text("Game Over", mid - 40.0, "bold 36px sans-serif");
            self.centered_text(&format!("Score: {}  Best: {}", score, best), mid, "20px sans-serif");
            if new_record {
                self.centered_text("New high score!", mid + 30.0, "bold 20px sans-serif");
            }
            self.centered_text("Press Space to play again", mid + 70.0, "16px sans-serif");
        }
    }

    fn show_title(&mut self) {
        let mid = self.height / 2.0;
        self.centered_text("Fly Frog", mid - 40.0, "bold 40px sans-serif");
        self.centered_text("Space / tap to flap, T to lick", mid + 10.0, "16px sans-serif");
    }

    fn show_game_over(&mut self, score: u32, high_score: u32, new_record: bool) {
        self.game_over = Some((score, high_score, new_record));
    }

    fn hide_game_over(&mut self) {
        self.game_over = None;
    }

    fn show_near(&mut self, id: u32) {
        self.near = Some((id, NEAR_FLASH_FRAMES));
    }
}

/// High-resolution timestamp on the same clock as requestAnimationFrame
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}
