//! Per-tick output: UI notifications and commands for the physics engine

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pool::BulletId;
use super::state::{EntityId, GameOverCause, PickupKind};
use crate::Millis;

/// Gameplay notification emitted during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    HealthChanged(i32),
    AmmoChanged(u32),
    ScoreChanged(u64),
    /// Enemy took damage but survived; flash it for `tint_ms`
    EnemyHit {
        id: EntityId,
        health: i32,
        tint_ms: Millis,
    },
    EnemyKilled { id: EntityId },
    PickupCollected { id: EntityId, kind: PickupKind },
    BulletFired { id: BulletId },
    GameOver { cause: GameOverCause },
}

/// Listener for gameplay notifications (UI overlay, audio, ...)
pub trait EventSink {
    fn emit(&mut self, event: &GameEvent);
}

impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: &GameEvent) {
        self.push(*event);
    }
}

/// Request to the physics/rendering collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PhysicsCommand {
    SetPlayerVelocityX(f32),
    SetPlayerVelocityY(f32),
    /// Overrides both axes (knockback)
    SetPlayerVelocity(Vec2),
    SetEnemyVelocity { id: EntityId, vel: Vec2 },
    SpawnBullet { id: BulletId, pos: Vec2, vel: Vec2 },
    DespawnBullet { id: BulletId },
    HideEnemy { id: EntityId },
    HidePickup { id: EntityId },
    PausePhysics,
}

/// Player animation the renderer should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerAnim {
    #[default]
    Idle,
    Run,
    Jump,
}

/// Everything a tick or overlap handler produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickOutput {
    pub commands: Vec<PhysicsCommand>,
    pub events: Vec<GameEvent>,
    pub player_anim: PlayerAnim,
    /// False during the dark half of the invulnerability blink
    pub player_visible: bool,
}

impl Default for TickOutput {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            events: Vec::new(),
            player_anim: PlayerAnim::Idle,
            player_visible: true,
        }
    }
}

impl TickOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command(&mut self, command: PhysicsCommand) {
        self.commands.push(command);
    }

    pub fn event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Deliver queued events to a listener, emptying the queue
    pub fn flush_events(&mut self, sink: &mut dyn EventSink) {
        for event in self.events.drain(..) {
            sink.emit(&event);
        }
    }

    /// Deliver queued events to several listeners in order
    pub fn broadcast(&mut self, sinks: &mut [&mut dyn EventSink]) {
        for event in self.events.drain(..) {
            for sink in sinks.iter_mut() {
                sink.emit(&event);
            }
        }
    }

    /// Take the queued commands for the physics engine
    pub fn take_commands(&mut self) -> Vec<PhysicsCommand> {
        std::mem::take(&mut self.commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_drains_in_order() {
        let mut out = TickOutput::new();
        out.event(GameEvent::HealthChanged(90));
        out.event(GameEvent::ScoreChanged(100));

        let mut sink: Vec<GameEvent> = Vec::new();
        out.flush_events(&mut sink);

        assert_eq!(
            sink,
            vec![GameEvent::HealthChanged(90), GameEvent::ScoreChanged(100)]
        );
        assert!(out.events.is_empty());
    }

    #[test]
    fn test_broadcast_reaches_every_sink() {
        let mut out = TickOutput::new();
        out.event(GameEvent::AmmoChanged(3));

        let mut a: Vec<GameEvent> = Vec::new();
        let mut b: Vec<GameEvent> = Vec::new();
        out.broadcast(&mut [&mut a, &mut b]);

        assert_eq!(a, vec![GameEvent::AmmoChanged(3)]);
        assert_eq!(b, vec![GameEvent::AmmoChanged(3)]);
    }
}
