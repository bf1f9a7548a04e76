use std::collections::HashSet;

use log::debug;
use thiserror::Error;

use crate::config::Variant;
use crate::transform::{
    Axis, TransformState, HOLD_ANGLE_STEP, PRESS_ANGLE_STEP, SCALE_STEP, TRANSLATE_STEP,
};

/// Identifier for a physical keyboard key.
///
/// Letters are stored upper-case so `q` and `Q` are the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
    Digit(u8),
}

/// Keys without a printable letter or digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Escape,
    Plus,
    Minus,
    Space,
}

impl KeyCode {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '\u{1b}' => Some(Self::Named(NamedKey::Escape)),
            '+' => Some(Self::Named(NamedKey::Plus)),
            '-' => Some(Self::Named(NamedKey::Minus)),
            ' ' => Some(Self::Named(NamedKey::Space)),
            '0'..='9' => Some(Self::Digit(ch as u8 - b'0')),
            _ if ch.is_ascii_alphabetic() => Some(Self::Character(ch.to_ascii_uppercase())),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(key) = parse_named_key(name) {
            return Some(key);
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Self::from_char(ch),
            _ => None,
        }
    }
}

fn parse_named_key(name: &str) -> Option<KeyCode> {
    use NamedKey::*;
    let key = match name {
        "Escape" | "Esc" => Escape,
        "Plus" => Plus,
        "Minus" => Minus,
        "Space" => Space,
        _ => return None,
    };
    Some(KeyCode::Named(key))
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResponse {
    Continue,
    Exit,
}

/// Maps key events onto [`TransformState`] mutations.
///
/// Translation and scale keys act once per press. In the continuous variant
/// the rotation keys are remembered while held and applied on every
/// [`InputHandler::idle`] tick; the grid variant rotates once per press.
#[derive(Debug)]
pub struct InputHandler {
    variant: Variant,
    held: HashSet<KeyCode>,
}

impl InputHandler {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            held: HashSet::new(),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    pub fn key_down(&mut self, key: KeyCode, transform: &mut TransformState) -> KeyResponse {
        debug!("key down: {key:?}");
        self.held.insert(key);
        match key {
            KeyCode::Named(NamedKey::Escape) | KeyCode::Character('Q') => {
                return KeyResponse::Exit;
            }
            KeyCode::Named(NamedKey::Plus) => transform.grow(SCALE_STEP),
            KeyCode::Named(NamedKey::Minus) => transform.grow(-SCALE_STEP),
            KeyCode::Digit(8) => transform.translate(0.0, TRANSLATE_STEP),
            KeyCode::Digit(2) => transform.translate(0.0, -TRANSLATE_STEP),
            KeyCode::Digit(6) => transform.translate(TRANSLATE_STEP, 0.0),
            KeyCode::Digit(4) => transform.translate(-TRANSLATE_STEP, 0.0),
            KeyCode::Character('X') if self.variant == Variant::Grid => {
                transform.rotate_positive(Axis::X, PRESS_ANGLE_STEP);
            }
            _ => {}
        }
        KeyResponse::Continue
    }

    pub fn key_up(&mut self, key: KeyCode) {
        debug!("key up: {key:?}");
        self.held.remove(&key);
    }

    /// Applies held-key rotation for one idle tick.
    pub fn idle(&self, transform: &mut TransformState) {
        if self.variant != Variant::Continuous {
            return;
        }
        for (key, axis, increasing) in HOLD_BINDINGS {
            if !self.held.contains(&KeyCode::Character(key)) {
                continue;
            }
            if increasing {
                transform.rotate_positive(axis, HOLD_ANGLE_STEP);
            } else {
                transform.rotate_negative(axis, HOLD_ANGLE_STEP);
            }
        }
    }
}

const HOLD_BINDINGS: [(char, Axis, bool); 6] = [
    ('W', Axis::X, false),
    ('S', Axis::X, true),
    ('A', Axis::Y, false),
    ('D', Axis::Y, true),
    ('Z', Axis::Z, false),
    ('X', Axis::Z, true),
];

/// Longest hold accepted in a key script, in idle ticks.
pub const MAX_HOLD_TICKS: u32 = 100_000;

/// One entry of a replayable key script: press, hold for `ticks` idle
/// iterations, release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStroke {
    pub key: KeyCode,
    pub ticks: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyScriptError {
    #[error("unknown key `{0}`")]
    UnknownKey(String),
    #[error("invalid hold count in `{0}`")]
    InvalidHold(String),
}

/// Parses a whitespace-separated key script such as `8 8 + w*10 Esc`.
pub fn parse_key_script(script: &str) -> Result<Vec<KeyStroke>, KeyScriptError> {
    script.split_whitespace().map(parse_stroke).collect()
}

fn parse_stroke(token: &str) -> Result<KeyStroke, KeyScriptError> {
    // A lone `*` is a key name, not a hold suffix.
    let (name, ticks) = match token.rsplit_once('*') {
        Some((name, count)) if !name.is_empty() => {
            let ticks = count
                .parse::<u32>()
                .ok()
                .filter(|ticks| *ticks <= MAX_HOLD_TICKS)
                .ok_or_else(|| KeyScriptError::InvalidHold(token.to_string()))?;
            (name, ticks)
        }
        _ => (token, 1),
    };
    let key =
        KeyCode::from_name(name).ok_or_else(|| KeyScriptError::UnknownKey(name.to_string()))?;
    Ok(KeyStroke { key, ticks })
}
