//! Data-driven game balance
//!
//! Every gameplay constant the rules layer reads lives here. Files may name
//! only the values they override; everything else falls back to [`consts`].

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Millis;
use crate::consts::*;
use crate::sim::state::EnemyKind;

/// Failure reading or writing a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to access tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed tuning file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Per-kind enemy stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyParams {
    pub health: i32,
    pub contact_damage: i32,
}

/// Used when the table has no entry for a kind
pub const FALLBACK_ENEMY: EnemyParams = EnemyParams {
    health: 10,
    contact_damage: 10,
};

fn default_enemy_table() -> BTreeMap<EnemyKind, EnemyParams> {
    BTreeMap::from([
        (
            EnemyKind::Imp,
            EnemyParams {
                health: 20,
                contact_damage: 10,
            },
        ),
        (
            EnemyKind::Demon,
            EnemyParams {
                health: 50,
                contact_damage: 20,
            },
        ),
        (
            EnemyKind::Cyberdemon,
            EnemyParams {
                health: 300,
                contact_damage: 30,
            },
        ),
    ])
}

/// Game balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    pub max_health: i32,
    pub start_health: i32,
    pub start_ammo: u32,
    pub player_speed: f32,
    pub jump_velocity: f32,
    /// Bullets spawn this far in front of the player's center
    pub player_half_width: f32,

    // === Timers ===
    pub jump_cooldown: Millis,
    pub shoot_cooldown: Millis,
    pub invulnerable_duration: Millis,

    // === Bullets ===
    pub bullet_speed: f32,
    pub bullet_width: f32,
    pub bullet_damage: i32,
    pub bullet_pool_capacity: usize,

    // === Combat ===
    pub kill_reward: u64,
    pub knockback_x: f32,
    pub knockback_y: f32,

    // === Enemies ===
    pub seek_radius: f32,
    pub seek_speed: f32,
    pub enemies: BTreeMap<EnemyKind, EnemyParams>,

    // === Pickups ===
    pub health_pickup_value: i32,
    pub ammo_pickup_value: i32,

    // === World ===
    pub fall_margin: f32,

    // === Presentation hints ===
    pub blink_period: Millis,
    pub hit_tint_duration: Millis,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_health: MAX_HEALTH,
            start_health: START_HEALTH,
            start_ammo: START_AMMO,
            player_speed: PLAYER_SPEED,
            jump_velocity: JUMP_VELOCITY,
            player_half_width: PLAYER_HALF_WIDTH,

            jump_cooldown: JUMP_COOLDOWN,
            shoot_cooldown: SHOOT_COOLDOWN,
            invulnerable_duration: INVULNERABLE_DURATION,

            bullet_speed: BULLET_SPEED,
            bullet_width: BULLET_WIDTH,
            bullet_damage: BULLET_DAMAGE,
            bullet_pool_capacity: BULLET_POOL_CAPACITY,

            kill_reward: KILL_REWARD,
            knockback_x: KNOCKBACK_X,
            knockback_y: KNOCKBACK_Y,

            seek_radius: SEEK_RADIUS,
            seek_speed: SEEK_SPEED,
            enemies: default_enemy_table(),

            health_pickup_value: HEALTH_PICKUP_VALUE,
            ammo_pickup_value: AMMO_PICKUP_VALUE,

            fall_margin: FALL_MARGIN,

            blink_period: BLINK_PERIOD,
            hit_tint_duration: HIT_TINT_DURATION,
        }
    }
}

impl Tuning {
    /// Stats for an enemy kind
    pub fn enemy(&self, kind: EnemyKind) -> EnemyParams {
        self.enemies.get(&kind).copied().unwrap_or(FALLBACK_ENEMY)
    }

    /// Reject values a session cannot start from
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.max_health <= 0 {
            return Err(TuningError::Invalid(format!(
                "max_health must be positive, got {}",
                self.max_health
            )));
        }
        if !(1..=self.max_health).contains(&self.start_health) {
            return Err(TuningError::Invalid(format!(
                "start_health must be in 1..={}, got {}",
                self.max_health, self.start_health
            )));
        }
        Ok(())
    }

    /// Parse and validate tuning from JSON text
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Write tuning to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TuningError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        log::info!("Tuning saved to {}", path.as_ref().display());
        Ok(())
    }
}
