//! Input-to-intent translation
//!
//! Turns one tick of raw key signals into discrete decisions. [`translate`]
//! is pure; the cooldown and ammo bookkeeping happens when the intents are
//! applied in [`super::tick`].

use serde::{Deserialize, Serialize};

use super::state::PlayerState;
use crate::Millis;

/// Raw key state for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSignals {
    pub left_held: bool,
    pub right_held: bool,
    /// True only on the tick the key went down
    pub jump_pressed: bool,
    pub shoot_pressed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Movement {
    MoveLeft,
    MoveRight,
    #[default]
    Idle,
}

/// Decisions for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intents {
    pub movement: Movement,
    pub jump: bool,
    pub shoot: bool,
}

/// Derive intents from input and the player's timers
pub fn translate(signals: &InputSignals, player: &PlayerState, now: Millis) -> Intents {
    // Left wins when both are held
    let movement = if signals.left_held {
        Movement::MoveLeft
    } else if signals.right_held {
        Movement::MoveRight
    } else {
        Movement::Idle
    };

    let jump = signals.jump_pressed && player.on_ground && now > player.next_jump_allowed_at;
    let shoot = signals.shoot_pressed && player.ammo > 0 && now > player.next_shot_allowed_at;

    Intents {
        movement,
        jump,
        shoot,
    }
}

/// Turns a held key into a just-pressed edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonEdge {
    was_down: bool,
}

impl ButtonEdge {
    /// Feed the key's held state; true on the first tick it is down
    pub fn update(&mut self, down: bool) -> bool {
        let pressed = down && !self.was_down;
        self.was_down = down;
        pressed
    }
}
