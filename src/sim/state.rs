//! Game state and entity types
//!
//! Pure gameplay attributes only. Engine objects (sprites, bodies) are linked
//! by [`EntityId`] / [`BulletId`] and never stored here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::{GameEvent, PhysicsCommand, TickOutput};
use super::pool::BulletPool;
use crate::Millis;
use crate::level::{Level, MarkerKind};
use crate::tuning::Tuning;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Run ended; terminal until restart
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverCause {
    /// Health reached zero
    Killed,
    /// Fell below the bottom of the map
    FellOutOfWorld,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// -1 for left, +1 for right
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// Stable identifier shared with the engine object of an enemy or pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    Imp,
    Demon,
    Cyberdemon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Health,
    Ammo,
}

/// The player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub health: i32,
    pub max_health: i32,
    pub ammo: u32,
    pub facing: Facing,
    /// Contact damage is ignored while `now < invulnerable_until`
    pub invulnerable_until: Millis,
    pub next_jump_allowed_at: Millis,
    pub next_shot_allowed_at: Millis,
    /// Last position reported by physics
    pub pos: Vec2,
    pub on_ground: bool,
}

impl PlayerState {
    pub fn new(spawn: Vec2, tuning: &Tuning) -> Self {
        Self {
            health: tuning.start_health.clamp(0, tuning.max_health.max(0)),
            max_health: tuning.max_health.max(0),
            ammo: tuning.start_ammo,
            facing: Facing::Right,
            invulnerable_until: 0,
            next_jump_allowed_at: 0,
            next_shot_allowed_at: 0,
            pos: spawn,
            on_ground: false,
        }
    }

    /// Add `delta` to health, clamped to [0, max_health]. Returns the new value.
    pub fn adjust_health(&mut self, delta: i32) -> i32 {
        self.health = self.health.saturating_add(delta).clamp(0, self.max_health);
        self.health
    }

    /// Add `delta` to ammo, floored at zero. Returns the new value.
    pub fn adjust_ammo(&mut self, delta: i32) -> u32 {
        self.ammo = self.ammo.saturating_add_signed(delta);
        self.ammo
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    pub fn is_invulnerable(&self, now: Millis) -> bool {
        now < self.invulnerable_until
    }

    /// Blink while invulnerable: visible on even `blink_period` slices
    pub fn is_visible(&self, now: Millis, blink_period: Millis) -> bool {
        !self.is_invulnerable(now) || (now / blink_period.max(1)) % 2 == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyState {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub health: i32,
    pub contact_damage: i32,
    pub alive: bool,
    pub pos: Vec2,
}

impl EnemyState {
    pub fn new(id: EntityId, kind: EnemyKind, pos: Vec2, tuning: &Tuning) -> Self {
        let params = tuning.enemy(kind);
        Self {
            id,
            kind,
            health: params.health,
            contact_damage: params.contact_damage,
            alive: true,
            pos,
        }
    }

    /// Apply damage. Returns true if this hit killed the enemy.
    pub fn take_damage(&mut self, damage: i32) -> bool {
        if !self.alive {
            return false;
        }
        self.health = self.health.saturating_sub(damage);
        if self.health <= 0 {
            self.alive = false;
            return true;
        }
        false
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupState {
    pub id: EntityId,
    pub kind: PickupKind,
    pub value: i32,
    pub consumed: bool,
    pub pos: Vec2,
}

/// Complete session state (serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub tuning: Tuning,
    /// Level the session was built from (restart source)
    pub level: Level,
    pub phase: GamePhase,
    pub game_over_cause: Option<GameOverCause>,
    pub player: PlayerState,
    /// Sorted by id
    pub enemies: Vec<EnemyState>,
    /// Sorted by id
    pub pickups: Vec<PickupState>,
    pub bullets: BulletPool,
    pub score: u64,
    /// Timestamp of the latest tick
    pub now: Millis,
    next_id: u32,
}

impl GameState {
    /// Build a fresh session from level data
    pub fn new(level: Level, tuning: Tuning) -> Self {
        let mut state = Self {
            player: PlayerState::new(level.player_spawn, &tuning),
            bullets: BulletPool::new(tuning.bullet_pool_capacity),
            tuning,
            level,
            phase: GamePhase::Playing,
            game_over_cause: None,
            enemies: Vec::new(),
            pickups: Vec::new(),
            score: 0,
            now: 0,
            next_id: 1,
        };
        state.populate();
        state
    }

    /// Reinitialize every entity from the level and re-enter `Playing`
    pub fn restart(&mut self) {
        *self = Self::new(self.level.clone(), self.tuning.clone());
        log::info!("Session restarted");
    }

    fn populate(&mut self) {
        let markers = self.level.markers.clone();
        for marker in markers {
            let id = self.next_entity_id();
            match marker.kind {
                MarkerKind::Enemy(kind) => {
                    self.enemies
                        .push(EnemyState::new(id, kind, marker.pos, &self.tuning));
                }
                MarkerKind::Pickup(kind) => {
                    let value = match kind {
                        PickupKind::Health => self.tuning.health_pickup_value,
                        PickupKind::Ammo => self.tuning.ammo_pickup_value,
                    };
                    self.pickups.push(PickupState {
                        id,
                        kind,
                        value,
                        consumed: false,
                        pos: marker.pos,
                    });
                }
            }
        }
        log::debug!(
            "Spawned {} enemies, {} pickups",
            self.enemies.len(),
            self.pickups.len()
        );
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn enemy(&self, id: EntityId) -> Option<&EnemyState> {
        self.enemies
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.enemies[i])
    }

    pub fn enemy_mut(&mut self, id: EntityId) -> Option<&mut EnemyState> {
        self.enemies
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &mut self.enemies[i])
    }

    pub fn pickup(&self, id: EntityId) -> Option<&PickupState> {
        self.pickups
            .binary_search_by_key(&id, |p| p.id)
            .ok()
            .map(|i| &self.pickups[i])
    }

    pub fn pickup_mut(&mut self, id: EntityId) -> Option<&mut PickupState> {
        self.pickups
            .binary_search_by_key(&id, |p| p.id)
            .ok()
            .map(|i| &mut self.pickups[i])
    }

    pub fn alive_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| e.alive).count()
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Current values for every UI counter (initial display sync)
    pub fn snapshot_events(&self) -> [GameEvent; 3] {
        [
            GameEvent::HealthChanged(self.player.health),
            GameEvent::AmmoChanged(self.player.ammo),
            GameEvent::ScoreChanged(self.score),
        ]
    }

    /// Enter `GameOver`. No-op if the run already ended.
    pub fn end_run(&mut self, cause: GameOverCause, out: &mut TickOutput) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.game_over_cause = Some(cause);
        log::info!("Game over ({:?}) with score {}", cause, self.score);
        out.command(PhysicsCommand::PausePhysics);
        out.event(GameEvent::GameOver { cause });
    }
}
