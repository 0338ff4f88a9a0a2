//! Deterministic gameplay rules
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Time comes from the engine clock passed in, never read here
//! - Stable iteration order (by entity ID / pool slot)
//! - No physics, rendering or platform dependencies

pub mod events;
pub mod intent;
pub mod pool;
pub mod resolve;
pub mod state;
pub mod tick;

pub use events::{EventSink, GameEvent, PhysicsCommand, PlayerAnim, TickOutput};
pub use intent::{ButtonEdge, InputSignals, Intents, Movement, translate};
pub use pool::{BulletId, BulletPool, BulletState};
pub use resolve::{Overlap, bullet_hit_enemy, player_hit_enemy, player_pickup, resolve, resolve_all};
pub use state::{
    EnemyKind, EnemyState, EntityId, Facing, GameOverCause, GamePhase, GameState, PickupKind,
    PickupState, PlayerState,
};
pub use tick::{TickInput, ViewBounds, fire_bullet, tick};
