//! Gunrun - gameplay rules for a 2D platformer-shooter
//!
//! Core modules:
//! - `sim`: Deterministic rules layer (entity state, intents, overlap resolution)
//! - `level`: Spawn markers from level-editor object data
//! - `tuning`: Data-driven game balance
//! - `hud`: Reference UI listener
//!
//! Physics, rendering and input polling belong to the host engine. The engine
//! drives [`sim::tick`] once per frame, applies the returned
//! [`sim::PhysicsCommand`]s and reports overlaps through [`sim::resolve`].

pub mod hud;
pub mod level;
pub mod sim;
pub mod tuning;

pub use hud::Hud;
pub use level::{Level, LevelError};
pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Engine clock timestamp in milliseconds
pub type Millis = u64;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    use crate::Millis;

    /// Player health bounds
    pub const MAX_HEALTH: i32 = 100;
    pub const START_HEALTH: i32 = 100;
    pub const START_AMMO: u32 = 150;

    /// Horizontal run speed (pixels/s)
    pub const PLAYER_SPEED: f32 = 200.0;
    /// Negative Y is up
    pub const JUMP_VELOCITY: f32 = -450.0;
    pub const PLAYER_HALF_WIDTH: f32 = 16.0;

    pub const BULLET_SPEED: f32 = 400.0;
    pub const BULLET_WIDTH: f32 = 8.0;
    pub const BULLET_DAMAGE: i32 = 10;
    /// Bullets alive at once
    pub const BULLET_POOL_CAPACITY: usize = 30;

    pub const SHOOT_COOLDOWN: Millis = 200;
    pub const JUMP_COOLDOWN: Millis = 100;
    pub const INVULNERABLE_DURATION: Millis = 1000;

    pub const KILL_REWARD: u64 = 100;

    /// Knockback applied to the player on enemy contact
    pub const KNOCKBACK_X: f32 = 100.0;
    pub const KNOCKBACK_Y: f32 = -150.0;

    /// Enemies closer than this chase the player
    pub const SEEK_RADIUS: f32 = 300.0;
    pub const SEEK_SPEED: f32 = 50.0;

    /// Falling this far below the map ends the run
    pub const FALL_MARGIN: f32 = 100.0;

    pub const HEALTH_PICKUP_VALUE: i32 = 25;
    pub const AMMO_PICKUP_VALUE: i32 = 15;

    /// Invulnerability blink half-period
    pub const BLINK_PERIOD: Millis = 100;
    pub const HIT_TINT_DURATION: Millis = 100;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Unit vector from `from` toward `to` scaled to `speed` (zero if coincident)
#[inline]
pub fn velocity_toward(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    (to - from).normalize_or_zero() * speed
}
