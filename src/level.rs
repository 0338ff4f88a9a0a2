//! Level data: map bounds and spawn markers
//!
//! Levels come from a level editor's object layer (Tiled JSON). Only the map
//! size and the objects are read; tile layers belong to the engine.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::state::{EnemyKind, PickupKind};

/// Object layer read when none is named
pub const DEFAULT_OBJECT_LAYER: &str = "Objects";

/// Name of the object marking where the player starts
pub const PLAYER_SPAWN_NAME: &str = "PlayerSpawn";

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed level file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("object layer `{0}` not found")]
    MissingLayer(String),
    #[error("no `PlayerSpawn` object in layer")]
    MissingPlayerSpawn,
    #[error("map size must be positive, got {width}x{height}")]
    InvalidSize { width: f32, height: f32 },
}

/// What a marker spawns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerKind {
    Enemy(EnemyKind),
    Pickup(PickupKind),
}

impl MarkerKind {
    /// Map a level-editor object type to a marker kind
    pub fn from_object_type(ty: &str) -> Option<Self> {
        match ty {
            "imp_spawn" => Some(MarkerKind::Enemy(EnemyKind::Imp)),
            "demon_spawn" => Some(MarkerKind::Enemy(EnemyKind::Demon)),
            "cyberdemon_spawn" => Some(MarkerKind::Enemy(EnemyKind::Cyberdemon)),
            "health_pickup" => Some(MarkerKind::Pickup(PickupKind::Health)),
            "ammo_pickup" => Some(MarkerKind::Pickup(PickupKind::Ammo)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnMarker {
    pub kind: MarkerKind,
    pub pos: Vec2,
}

/// Static level description a session is built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// Map size in pixels
    pub width: f32,
    pub height: f32,
    pub player_spawn: Vec2,
    pub markers: Vec<SpawnMarker>,
}

// Subset of the Tiled map format
#[derive(Deserialize)]
struct TiledMap {
    width: u32,
    height: u32,
    tilewidth: u32,
    tileheight: u32,
    #[serde(default)]
    layers: Vec<TiledLayer>,
}

#[derive(Deserialize)]
struct TiledLayer {
    name: String,
    #[serde(default)]
    objects: Vec<TiledObject>,
}

#[derive(Deserialize)]
struct TiledObject {
    #[serde(default)]
    name: String,
    // Tiled 1.9 renamed `type` to `class`
    #[serde(default, rename = "type", alias = "class")]
    ty: String,
    x: f32,
    y: f32,
}

impl Level {
    pub fn new(width: f32, height: f32, player_spawn: Vec2) -> Self {
        Self {
            width,
            height,
            player_spawn,
            markers: Vec::new(),
        }
    }

    /// Add a marker (builder style)
    pub fn with_marker(mut self, kind: MarkerKind, pos: Vec2) -> Self {
        self.markers.push(SpawnMarker { kind, pos });
        self
    }

    pub fn with_enemy(self, kind: EnemyKind, pos: Vec2) -> Self {
        self.with_marker(MarkerKind::Enemy(kind), pos)
    }

    pub fn with_pickup(self, kind: PickupKind, pos: Vec2) -> Self {
        self.with_marker(MarkerKind::Pickup(kind), pos)
    }

    /// Y coordinate below which the player is lost
    pub fn fall_threshold(&self, margin: f32) -> f32 {
        self.height + margin
    }

    /// Build a level from a Tiled JSON map
    pub fn from_tiled_json(json: &str, object_layer: &str) -> Result<Self, LevelError> {
        let map: TiledMap = serde_json::from_str(json)?;

        // u32 x u32 always fits in u64
        let width = (u64::from(map.width) * u64::from(map.tilewidth)) as f32;
        let height = (u64::from(map.height) * u64::from(map.tileheight)) as f32;
        if width <= 0.0 || height <= 0.0 {
            return Err(LevelError::InvalidSize { width, height });
        }

        let layer = map
            .layers
            .iter()
            .find(|l| l.name == object_layer)
            .ok_or_else(|| LevelError::MissingLayer(object_layer.to_string()))?;

        let spawn = layer
            .objects
            .iter()
            .find(|o| o.name == PLAYER_SPAWN_NAME)
            .ok_or(LevelError::MissingPlayerSpawn)?;

        let mut level = Level::new(width, height, Vec2::new(spawn.x, spawn.y));
        for obj in &layer.objects {
            if obj.name == PLAYER_SPAWN_NAME {
                continue;
            }
            match MarkerKind::from_object_type(&obj.ty) {
                Some(kind) => level.markers.push(SpawnMarker {
                    kind,
                    pos: Vec2::new(obj.x, obj.y),
                }),
                None => log::warn!(
                    "Skipping object `{}` with unknown type `{}` at ({}, {})",
                    obj.name,
                    obj.ty,
                    obj.x,
                    obj.y
                ),
            }
        }

        log::info!(
            "Level {}x{}: {} markers",
            level.width,
            level.height,
            level.markers.len()
        );
        Ok(level)
    }

    /// Load a Tiled JSON map from disk
    pub fn load(path: impl AsRef<Path>, object_layer: &str) -> Result<Self, LevelError> {
        let json = fs::read_to_string(path)?;
        Self::from_tiled_json(&json, object_layer)
    }
}
