//! Overlap resolution
//!
//! The physics engine reports overlapping pairs; these handlers turn them
//! into state changes, UI events and physics commands. Every handler is a
//! silent no-op for consumed pickups, dead enemies, inactive or stale
//! bullets, unknown ids, and after the run has ended.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::{GameEvent, PhysicsCommand, TickOutput};
use super::pool::BulletId;
use super::state::{EntityId, GameOverCause, GamePhase, GameState, PickupKind};
use crate::Millis;

/// An overlap reported by the physics engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Overlap {
    PlayerPickup(EntityId),
    BulletEnemy(BulletId, EntityId),
    PlayerEnemy(EntityId),
}

/// Dispatch one overlap. Returns true if it changed state.
pub fn resolve(state: &mut GameState, overlap: Overlap, now: Millis, out: &mut TickOutput) -> bool {
    match overlap {
        Overlap::PlayerPickup(pickup) => player_pickup(state, pickup, out),
        Overlap::BulletEnemy(bullet, enemy) => bullet_hit_enemy(state, bullet, enemy, out),
        Overlap::PlayerEnemy(enemy) => player_hit_enemy(state, enemy, now, out),
    }
}

/// Resolve a batch of overlaps in order
pub fn resolve_all(
    state: &mut GameState,
    overlaps: &[Overlap],
    now: Millis,
    out: &mut TickOutput,
) -> usize {
    overlaps
        .iter()
        .filter(|&&overlap| resolve(state, overlap, now, out))
        .count()
}

/// Player touched a pickup
pub fn player_pickup(state: &mut GameState, pickup: EntityId, out: &mut TickOutput) -> bool {
    if state.phase != GamePhase::Playing {
        return false;
    }
    let Some(pickup) = state.pickup_mut(pickup) else {
        return false;
    };
    if pickup.consumed {
        return false;
    }
    pickup.consumed = true;
    let (id, kind, value) = (pickup.id, pickup.kind, pickup.value);

    match kind {
        PickupKind::Health => {
            let health = state.player.adjust_health(value);
            out.event(GameEvent::HealthChanged(health));
        }
        PickupKind::Ammo => {
            let ammo = state.player.adjust_ammo(value);
            out.event(GameEvent::AmmoChanged(ammo));
        }
    }
    log::debug!("Collected {:?} pickup {:?} (+{})", kind, id, value);

    out.event(GameEvent::PickupCollected { id, kind });
    out.command(PhysicsCommand::HidePickup { id });
    true
}

/// A bullet reached an enemy
pub fn bullet_hit_enemy(
    state: &mut GameState,
    bullet: BulletId,
    enemy: EntityId,
    out: &mut TickOutput,
) -> bool {
    if state.phase != GamePhase::Playing {
        return false;
    }
    if state.bullets.get(bullet).is_none() {
        return false;
    }
    let damage = state.tuning.bullet_damage;
    let Some(target) = state.enemy_mut(enemy) else {
        return false;
    };
    if !target.alive {
        return false;
    }

    let killed = target.take_damage(damage);
    let remaining = target.health;

    state.bullets.release(bullet);
    out.command(PhysicsCommand::DespawnBullet { id: bullet });

    if killed {
        state.score += state.tuning.kill_reward;
        log::debug!("Enemy {:?} killed, score {}", enemy, state.score);
        out.command(PhysicsCommand::HideEnemy { id: enemy });
        out.event(GameEvent::EnemyKilled { id: enemy });
        out.event(GameEvent::ScoreChanged(state.score));
    } else {
        out.event(GameEvent::EnemyHit {
            id: enemy,
            health: remaining,
            tint_ms: state.tuning.hit_tint_duration,
        });
    }
    true
}

/// Player ran into an enemy
pub fn player_hit_enemy(
    state: &mut GameState,
    enemy: EntityId,
    now: Millis,
    out: &mut TickOutput,
) -> bool {
    if state.phase != GamePhase::Playing {
        return false;
    }
    if state.player.is_invulnerable(now) {
        return false;
    }
    let Some(attacker) = state.enemy(enemy) else {
        return false;
    };
    if !attacker.alive {
        return false;
    }
    let (damage, enemy_x) = (attacker.contact_damage, attacker.pos.x);

    let health = state.player.adjust_health(-damage);
    state.player.invulnerable_until = now.saturating_add(state.tuning.invulnerable_duration);

    // Push away from the enemy
    let knockback_x = if state.player.pos.x < enemy_x {
        -state.tuning.knockback_x
    } else {
        state.tuning.knockback_x
    };
    out.command(PhysicsCommand::SetPlayerVelocity(Vec2::new(
        knockback_x,
        state.tuning.knockback_y,
    )));
    out.event(GameEvent::HealthChanged(health));
    log::debug!("Player hit by {:?} for {}, health {}", enemy, damage, health);

    if health == 0 {
        state.end_run(GameOverCause::Killed, out);
    }
    true
}
