//! Platform abstraction layer
//!
//! The simulation never touches the DOM, audio or storage directly. Each frame
//! the platform renders the state through a [`Presenter`] and routes drained
//! [`GameEvent`]s to the effect player and the high score store.

#[cfg(target_arch = "wasm32")]
pub mod web;

use glam::Vec2;

use crate::sim::{CloudSize, GameEvent, GamePhase, GameState};

/// Sound effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Flap,
    Hit,
    Catch,
}

/// Presentation sink; every call is fire-and-forget
pub trait Presenter {
    /// Called once before each render pass
    fn begin_frame(&mut self) {}

    fn render_player(&mut self, y: f32);
    fn render_obstacle(&mut self, id: u32, x: f32, top_height: f32, bottom_height: f32);
    fn remove_obstacle(&mut self, id: u32);
    fn render_collectible(&mut self, id: u32, x: f32, y: f32);
    fn remove_collectible(&mut self, id: u32);
    fn render_tongue(&mut self, anchor: Vec2, length: f32);
    fn hide_tongue(&mut self);

    fn render_cloud(&mut self, _id: u32, _x: f32, _y: f32, _size: CloudSize) {}
    fn remove_cloud(&mut self, _id: u32) {}
    fn render_hud(&mut self, _score: u32, _high_score: u32, _fps: Option<u32>) {}
    fn show_title(&mut self) {}
    fn show_game_over(&mut self, _score: u32, _high_score: u32, _new_record: bool) {}
    fn hide_game_over(&mut self) {}
    /// A fly passed close to the tongue tip without being caught
    fn show_near(&mut self, _id: u32) {}
}

/// Audio sink
pub trait EffectPlayer {
    fn play(&mut self, effect: Effect);
}

/// Persistence for the single high score value
pub trait HighScoreStore {
    fn load_high_score(&self) -> u32;
    fn save_high_score(&mut self, score: u32);
}

/// Effect player that plays nothing (native runs, audio unavailable)
#[derive(Debug, Default)]
pub struct Silent;

impl EffectPlayer for Silent {
    fn play(&mut self, _effect: Effect) {}
}

/// Render the current state
pub fn present(state: &GameState, presenter: &mut dyn Presenter, show_fps: bool) {
    presenter.begin_frame();

    for cloud in &state.clouds {
        presenter.render_cloud(cloud.id, cloud.x, cloud.y, cloud.size);
    }

    for pipe in &state.obstacles {
        presenter.render_obstacle(pipe.id, pipe.x, pipe.top_height, pipe.bottom_height);
    }

    for fly in state.flies.iter().filter(|f| !f.caught) {
        presenter.render_collectible(fly.id, fly.pos.x, fly.pos.y);
    }

    if state.tongue.is_extended() {
        presenter.render_tongue(state.tongue.anchor, state.tongue.length);
    } else {
        presenter.hide_tongue();
    }

    presenter.render_player(state.player.y);

    let fps = show_fps.then_some(state.frame_stats.fps);
    presenter.render_hud(state.stats.score, state.stats.high_score, fps);

    if state.phase == GamePhase::NotStarted {
        presenter.show_title();
    }
}

/// Route drained simulation events to the collaborators
pub fn dispatch(
    events: &[GameEvent],
    presenter: &mut dyn Presenter,
    effects: &mut dyn EffectPlayer,
    store: &mut dyn HighScoreStore,
) {
    for event in events {
        match *event {
            GameEvent::Started => presenter.hide_game_over(),
            GameEvent::Flapped => effects.play(Effect::Flap),
            GameEvent::FlyCaught { id, .. } => {
                effects.play(Effect::Catch);
                presenter.remove_collectible(id);
            }
            GameEvent::FlyNear { id } => presenter.show_near(id),
            GameEvent::ObstacleRemoved { id } => presenter.remove_obstacle(id),
            GameEvent::FlyRemoved { id } => presenter.remove_collectible(id),
            GameEvent::CloudRemoved { id } => presenter.remove_cloud(id),
            GameEvent::TongueRetracted => presenter.hide_tongue(),
            GameEvent::ScoreChanged(_) => {}
            GameEvent::GameOver {
                score,
                high_score,
                new_record,
                ..
            } => {
                effects.play(Effect::Hit);
                if new_record {
                    store.save_high_score(high_score);
                }
                presenter.show_game_over(score, high_score, new_record);
            }
        }
    }
}
