use crate::config::{DemoConfig, Variant};
use crate::input::{InputHandler, KeyCode, KeyResponse, KeyStroke};
use crate::render::{frame_uniforms, SceneUniforms};
use crate::transform::TransformState;

/// Current drawable size, used for the projection's aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn update(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Result of replaying a key script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub strokes: usize,
    pub exit_requested: bool,
}

/// Everything the input and frame handlers share: the transform being
/// edited, the held-key set and the viewport.
#[derive(Debug)]
pub struct DemoState {
    transform: TransformState,
    input: InputHandler,
    viewport: Viewport,
}

impl DemoState {
    pub fn new(config: &DemoConfig) -> Self {
        Self {
            transform: TransformState::new(),
            input: InputHandler::new(config.variant),
            viewport: Viewport::new(config.width, config.height),
        }
    }

    pub fn variant(&self) -> Variant {
        self.input.variant()
    }

    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn key_down(&mut self, key: KeyCode) -> KeyResponse {
        self.input.key_down(key, &mut self.transform)
    }

    pub fn key_up(&mut self, key: KeyCode) {
        self.input.key_up(key);
    }

    pub fn idle(&mut self) {
        self.input.idle(&mut self.transform);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport.update(width, height);
    }

    pub fn uniforms(&self) -> SceneUniforms {
        frame_uniforms(&self.transform, self.viewport.aspect())
    }

    /// Feeds each stroke through press, `ticks` idle iterations and release.
    /// Stops at the first key that requests exit.
    pub fn replay(&mut self, strokes: &[KeyStroke]) -> ReplayOutcome {
        let mut outcome = ReplayOutcome {
            strokes: 0,
            exit_requested: false,
        };
        for stroke in strokes {
            outcome.strokes += 1;
            if self.key_down(stroke.key) == KeyResponse::Exit {
                self.key_up(stroke.key);
                outcome.exit_requested = true;
                break;
            }
            for _ in 0..stroke.ticks {
                self.idle();
            }
            self.key_up(stroke.key);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::parse_key_script;

    #[test]
    fn aspect_follows_latest_resize() {
        let mut state = DemoState::new(&DemoConfig::new(Variant::Continuous));
        assert_eq!(state.viewport().aspect(), 800.0 / 600.0);
        state.resize(1024, 768);
        assert_eq!(state.viewport().size(), (1024, 768));
        assert_eq!(state.viewport().aspect(), 1024.0 / 768.0);
    }

    #[test]
    fn zero_height_is_clamped() {
        let mut viewport = Viewport::new(800, 600);
        viewport.update(640, 0);
        assert_eq!(viewport.size(), (640, 1));
    }

    #[test]
    fn replay_holds_rotation_keys() {
        let mut state = DemoState::new(&DemoConfig::new(Variant::Continuous));
        let strokes = parse_key_script("8 8 + w*10 s*2").unwrap();
        let outcome = state.replay(&strokes);
        assert_eq!(outcome.strokes, 5);
        assert!(!outcome.exit_requested);
        let transform = state.transform();
        assert!((transform.translate_y - 0.4).abs() < 1e-6);
        assert!((transform.scale - 1.2).abs() < 1e-6);
        assert_eq!(transform.angle_x, -4.0);
    }

    #[test]
    fn replay_stops_at_exit() {
        let mut state = DemoState::new(&DemoConfig::new(Variant::Grid));
        let strokes = parse_key_script("x q x").unwrap();
        let outcome = state.replay(&strokes);
        assert_eq!(outcome.strokes, 2);
        assert!(outcome.exit_requested);
        assert_eq!(state.transform().angle_x, 5.0);
    }
}
