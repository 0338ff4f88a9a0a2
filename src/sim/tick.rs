//! Per-frame rules update
//!
//! Called once per rendered frame by the engine loop with the current
//! timestamp, input and the body positions physics reported.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::{GameEvent, PhysicsCommand, PlayerAnim, TickOutput};
use super::intent::{InputSignals, Movement, translate};
use super::pool::BulletId;
use super::state::{EntityId, Facing, GameOverCause, GamePhase, GameState};
use crate::{Millis, distance, velocity_toward};

/// Visible play area in world coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for ViewBounds {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1120.0,
            height: 480.0,
        }
    }
}

impl ViewBounds {
    /// True if `x` is within the view, widened by `margin` on both sides
    pub fn contains_x(&self, x: f32, margin: f32) -> bool {
        x >= self.x - margin && x <= self.x + self.width + margin
    }
}

/// Everything the engine reports for one frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickInput {
    /// Engine clock (ms, monotonic)
    pub now: Millis,
    pub signals: InputSignals,
    pub player_pos: Vec2,
    pub on_ground: bool,
    /// Positions for enemies that moved; unlisted enemies keep their last one
    pub enemy_positions: Vec<(EntityId, Vec2)>,
    pub bullet_positions: Vec<(BulletId, Vec2)>,
    pub view: ViewBounds,
}

/// Advance the rules by one frame
pub fn tick(state: &mut GameState, input: &TickInput) -> TickOutput {
    let mut out = TickOutput::new();

    // Physics is paused once the run is over
    if state.phase == GamePhase::GameOver {
        return out;
    }

    let now = input.now;
    state.now = now;
    sync_bodies(state, input);

    // --- Player intents ---
    let intents = translate(&input.signals, &state.player, now);

    let speed = state.tuning.player_speed;
    match intents.movement {
        Movement::MoveLeft => {
            state.player.facing = Facing::Left;
            out.command(PhysicsCommand::SetPlayerVelocityX(-speed));
        }
        Movement::MoveRight => {
            state.player.facing = Facing::Right;
            out.command(PhysicsCommand::SetPlayerVelocityX(speed));
        }
        Movement::Idle => out.command(PhysicsCommand::SetPlayerVelocityX(0.0)),
    }

    if intents.jump {
        out.command(PhysicsCommand::SetPlayerVelocityY(state.tuning.jump_velocity));
        state.player.next_jump_allowed_at = now.saturating_add(state.tuning.jump_cooldown);
    }

    if intents.shoot {
        fire_bullet(state, now, &mut out);
    }

    out.player_anim = if !state.player.on_ground {
        PlayerAnim::Jump
    } else if intents.movement == Movement::Idle {
        PlayerAnim::Idle
    } else {
        PlayerAnim::Run
    };

    seek_player(state, &mut out);
    cull_bullets(state, &input.view, &mut out);

    out.player_visible = state.player.is_visible(now, state.tuning.blink_period);

    if state.player.pos.y > state.level.fall_threshold(state.tuning.fall_margin) {
        state.end_run(GameOverCause::FellOutOfWorld, &mut out);
    }

    out
}

/// Copy reported positions into the store
fn sync_bodies(state: &mut GameState, input: &TickInput) {
    state.player.pos = input.player_pos;
    state.player.on_ground = input.on_ground;

    for &(id, pos) in &input.enemy_positions {
        if let Some(enemy) = state.enemy_mut(id) {
            enemy.pos = pos;
        }
    }
    for &(id, pos) in &input.bullet_positions {
        if let Some(bullet) = state.bullets.get_mut(id) {
            bullet.pos = pos;
        }
    }
}

/// Launch a bullet in the facing direction. Fails silently when the pool is full.
pub fn fire_bullet(state: &mut GameState, now: Millis, out: &mut TickOutput) -> bool {
    let facing = state.player.facing;
    let origin = state.player.pos + Vec2::new(facing.sign() * state.tuning.player_half_width, 0.0);

    let Some(id) = state.bullets.acquire(origin, facing) else {
        log::debug!("Bullet pool exhausted, shot dropped");
        return false;
    };

    let ammo = state.player.adjust_ammo(-1);
    state.player.next_shot_allowed_at = now.saturating_add(state.tuning.shoot_cooldown);

    out.command(PhysicsCommand::SpawnBullet {
        id,
        pos: origin,
        vel: Vec2::new(facing.sign() * state.tuning.bullet_speed, 0.0),
    });
    out.event(GameEvent::BulletFired { id });
    out.event(GameEvent::AmmoChanged(ammo));
    true
}

/// Alive enemies within range walk toward the player
fn seek_player(state: &GameState, out: &mut TickOutput) {
    let target = state.player.pos;
    let radius = state.tuning.seek_radius;
    let speed = state.tuning.seek_speed;

    for enemy in state.enemies.iter().filter(|e| e.alive) {
        if distance(enemy.pos, target) < radius {
            out.command(PhysicsCommand::SetEnemyVelocity {
                id: enemy.id,
                vel: velocity_toward(enemy.pos, target, speed),
            });
        }
    }
}

/// Release bullets that left the visible area
fn cull_bullets(state: &mut GameState, view: &ViewBounds, out: &mut TickOutput) {
    let margin = state.tuning.bullet_width;
    let gone: Vec<BulletId> = state
        .bullets
        .iter_active()
        .filter(|(_, b)| !view.contains_x(b.pos.x, margin))
        .map(|(id, _)| id)
        .collect();

    for id in gone {
        state.bullets.release(id);
        out.command(PhysicsCommand::DespawnBullet { id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::sim::state::EnemyKind;
    use crate::tuning::Tuning;

    const SPAWN: Vec2 = Vec2::new(100.0, 400.0);

    fn new_state() -> GameState {
        let level = Level::new(1120.0, 480.0, SPAWN)
            .with_enemy(EnemyKind::Imp, Vec2::new(300.0, 400.0))
            .with_enemy(EnemyKind::Demon, Vec2::new(1000.0, 400.0));
        GameState::new(level, Tuning::default())
    }

    fn input(now: Millis, signals: InputSignals) -> TickInput {
        TickInput {
            now,
            signals,
            player_pos: SPAWN,
            on_ground: true,
            ..Default::default()
        }
    }

    fn shoot() -> InputSignals {
        InputSignals {
            shoot_pressed: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_movement_commands_and_facing() {
        let mut state = new_state();
        let left = InputSignals {
            left_held: true,
            ..Default::default()
        };
        let out = tick(&mut state, &input(10, left));
        assert!(out.commands.contains(&PhysicsCommand::SetPlayerVelocityX(-200.0)));
        assert_eq!(state.player.facing, Facing::Left);
        assert_eq!(out.player_anim, PlayerAnim::Run);

        let out = tick(&mut state, &input(20, InputSignals::default()));
        assert!(out.commands.contains(&PhysicsCommand::SetPlayerVelocityX(0.0)));
        // Facing persists while idle
        assert_eq!(state.player.facing, Facing::Left);
        assert_eq!(out.player_anim, PlayerAnim::Idle);
    }

    #[test]
    fn test_airborne_anim() {
        let mut state = new_state();
        let mut airborne = input(10, InputSignals::default());
        airborne.on_ground = false;
        assert_eq!(tick(&mut state, &airborne).player_anim, PlayerAnim::Jump);
    }

    #[test]
    fn test_jump_sets_cooldown() {
        let mut state = new_state();
        let jump = InputSignals {
            jump_pressed: true,
            ..Default::default()
        };
        let out = tick(&mut state, &input(500, jump));
        assert!(out.commands.contains(&PhysicsCommand::SetPlayerVelocityY(-450.0)));
        assert_eq!(state.player.next_jump_allowed_at, 600);

        let out = tick(&mut state, &input(550, jump));
        assert!(!out
            .commands
            .iter()
            .any(|c| matches!(c, PhysicsCommand::SetPlayerVelocityY(_))));

        let out = tick(&mut state, &input(601, jump));
        assert!(out.commands.contains(&PhysicsCommand::SetPlayerVelocityY(-450.0)));
    }

    #[test]
    fn test_shoot_spends_ammo_and_spawns() {
        let mut state = new_state();
        let out = tick(&mut state, &input(1000, shoot()));
        assert_eq!(state.player.ammo, 149);
        assert_eq!(state.player.next_shot_allowed_at, 1200);
        assert_eq!(state.bullets.active_count(), 1);
        assert!(out.events.contains(&GameEvent::AmmoChanged(149)));

        let spawn = out
            .commands
            .iter()
            .find_map(|c| match c {
                PhysicsCommand::SpawnBullet { pos, vel, .. } => Some((*pos, *vel)),
                _ => None,
            })
            .unwrap();
        assert_eq!(spawn, (Vec2::new(116.0, 400.0), Vec2::new(400.0, 0.0)));

        // Cooldown blocks the next press
        tick(&mut state, &input(1100, shoot()));
        assert_eq!(state.player.ammo, 149);
        tick(&mut state, &input(1201, shoot()));
        assert_eq!(state.player.ammo, 148);
    }

    #[test]
    fn test_cooldowns_near_clock_limit() {
        let mut state = new_state();
        let both = InputSignals {
            jump_pressed: true,
            shoot_pressed: true,
            ..Default::default()
        };
        let now = u64::MAX - 50;
        tick(&mut state, &input(now, both));
        assert_eq!(state.player.next_jump_allowed_at, u64::MAX);
        assert_eq!(state.player.next_shot_allowed_at, u64::MAX);
        assert_eq!(state.player.ammo, 149);
    }

    #[test]
    fn test_shoot_left_spawns_behind() {
        let mut state = new_state();
        state.player.facing = Facing::Left;
        let out = tick(&mut state, &input(10, shoot()));
        assert!(out.commands.iter().any(|c| matches!(
            c,
            PhysicsCommand::SpawnBullet { pos, vel, .. }
                if *pos == Vec2::new(84.0, 400.0) && *vel == Vec2::new(-400.0, 0.0)
        )));
    }

    #[test]
    fn test_shoot_without_ammo() {
        let mut state = new_state();
        state.player.ammo = 0;
        let out = tick(&mut state, &input(1000, shoot()));
        assert_eq!(state.player.ammo, 0);
        assert_eq!(state.bullets.active_count(), 0);
        assert!(out.events.is_empty());
    }

    #[test]
    fn test_full_pool_drops_shot() {
        let mut state = new_state();
        for _ in 0..30 {
            state.bullets.acquire(SPAWN, Facing::Right).unwrap();
        }
        let mut out = TickOutput::new();
        assert!(!fire_bullet(&mut state, 5000, &mut out));
        assert_eq!(state.bullets.active_count(), 30);
        assert_eq!(state.player.ammo, 150);
        assert_eq!(state.player.next_shot_allowed_at, 0);
        assert!(out.commands.is_empty());
        assert!(out.events.is_empty());
    }

    #[test]
    fn test_enemy_seek_within_radius() {
        let mut state = new_state();
        let imp = state.enemies[0].id;
        let demon = state.enemies[1].id;
        let out = tick(&mut state, &input(10, InputSignals::default()));

        assert!(out.commands.contains(&PhysicsCommand::SetEnemyVelocity {
            id: imp,
            vel: Vec2::new(-50.0, 0.0),
        }));
        assert!(!out.commands.iter().any(|c| matches!(
            c,
            PhysicsCommand::SetEnemyVelocity { id, .. } if *id == demon
        )));
    }

    #[test]
    fn test_dead_enemy_does_not_seek() {
        let mut state = new_state();
        state.enemies[0].alive = false;
        let out = tick(&mut state, &input(10, InputSignals::default()));
        assert!(!out
            .commands
            .iter()
            .any(|c| matches!(c, PhysicsCommand::SetEnemyVelocity { .. })));
    }

    #[test]
    fn test_enemy_positions_sync() {
        let mut state = new_state();
        let demon = state.enemies[1].id;
        let mut frame = input(10, InputSignals::default());
        frame.enemy_positions = vec![(demon, Vec2::new(350.0, 400.0))];
        let out = tick(&mut state, &frame);
        assert_eq!(state.enemy(demon).unwrap().pos, Vec2::new(350.0, 400.0));
        assert!(out.commands.contains(&PhysicsCommand::SetEnemyVelocity {
            id: demon,
            vel: Vec2::new(-50.0, 0.0),
        }));
    }

    #[test]
    fn test_offscreen_bullets_culled() {
        let mut state = new_state();
        let kept = state.bullets.acquire(SPAWN, Facing::Right).unwrap();
        let gone = state.bullets.acquire(SPAWN, Facing::Right).unwrap();

        let mut frame = input(10, InputSignals::default());
        frame.bullet_positions = vec![
            (kept, Vec2::new(1125.0, 400.0)),
            (gone, Vec2::new(1130.0, 400.0)),
        ];
        let out = tick(&mut state, &frame);

        assert!(state.bullets.get(kept).is_some());
        assert!(state.bullets.get(gone).is_none());
        assert!(out.commands.contains(&PhysicsCommand::DespawnBullet { id: gone }));
    }

    #[test]
    fn test_view_scroll_culls_left_edge() {
        let mut state = new_state();
        let id = state.bullets.acquire(SPAWN, Facing::Left).unwrap();
        let mut frame = input(10, InputSignals::default());
        frame.view.x = 500.0;
        frame.bullet_positions = vec![(id, Vec2::new(480.0, 400.0))];
        tick(&mut state, &frame);
        assert!(state.bullets.get(id).is_none());
    }

    #[test]
    fn test_fall_out_of_world() {
        let mut state = new_state();
        let mut frame = input(10, InputSignals::default());
        frame.player_pos = Vec2::new(100.0, 581.0);
        let out = tick(&mut state, &frame);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.game_over_cause, Some(GameOverCause::FellOutOfWorld));
        assert!(out.events.contains(&GameEvent::GameOver {
            cause: GameOverCause::FellOutOfWorld
        }));
    }

    #[test]
    fn test_game_over_is_terminal_until_restart() {
        let mut state = new_state();
        state.end_run(GameOverCause::Killed, &mut TickOutput::new());

        let out = tick(&mut state, &input(10, shoot()));
        assert!(out.commands.is_empty());
        assert_eq!(state.player.ammo, 150);

        state.restart();
        tick(&mut state, &input(20, shoot()));
        assert_eq!(state.player.ammo, 149);
    }

    #[test]
    fn test_blink_while_invulnerable() {
        let mut state = new_state();
        state.player.invulnerable_until = 1000;
        assert!(tick(&mut state, &input(50, InputSignals::default())).player_visible);
        assert!(!tick(&mut state, &input(150, InputSignals::default())).player_visible);
        assert!(tick(&mut state, &input(1150, InputSignals::default())).player_visible);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = new_state();
        let mut state2 = new_state();
        let frames = [
            input(10, shoot()),
            input(
                20,
                InputSignals {
                    right_held: true,
                    ..Default::default()
                },
            ),
            input(
                250,
                InputSignals {
                    jump_pressed: true,
                    shoot_pressed: true,
                    ..Default::default()
                },
            ),
        ];
        for frame in &frames {
            let a = tick(&mut state1, frame);
            let b = tick(&mut state2, frame);
            assert_eq!(a.commands, b.commands);
            assert_eq!(a.events, b.events);
        }
        assert_eq!(state1.player.ammo, state2.player.ammo);
    }
}
