//! Gunrun headless driver
//!
//! Runs a seeded session against a minimal point-body stand-in for the host
//! engine and prints the HUD whenever it changes.
//!
//! Usage: `gunrun [LEVEL_JSON] [TUNING_JSON]` (seed from `GUNRUN_SEED`)

use std::collections::HashMap;
use std::error::Error;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use gunrun::level::DEFAULT_OBJECT_LAYER;
use gunrun::sim::{
    BulletId, ButtonEdge, EntityId, EventSink, GameState, InputSignals, Overlap, PhysicsCommand,
    TickInput, ViewBounds, resolve_all, tick,
};
use gunrun::{Hud, Level, Tuning};

/// Frame length (60 Hz)
const FRAME_MS: f64 = 1000.0 / 60.0;
const MAX_FRAMES: u32 = 60 * 60;
const GRAVITY: f32 = 800.0;
const GROUND_DEPTH: f32 = 64.0;
const TOUCH_RADIUS: f32 = 24.0;

/// Point bodies standing in for the engine's arcade physics
struct HeadlessWorld {
    ground_y: f32,
    player_pos: Vec2,
    player_vel: Vec2,
    enemies: HashMap<EntityId, (Vec2, Vec2)>,
    pickups: HashMap<EntityId, Vec2>,
    bullets: HashMap<BulletId, (Vec2, Vec2)>,
    paused: bool,
}

impl HeadlessWorld {
    fn new(state: &GameState) -> Self {
        let ground_y = state.level.height - GROUND_DEPTH;
        Self {
            ground_y,
            player_pos: state.player.pos,
            player_vel: Vec2::ZERO,
            enemies: state
                .enemies
                .iter()
                .map(|e| (e.id, (e.pos, Vec2::ZERO)))
                .collect(),
            pickups: state.pickups.iter().map(|p| (p.id, p.pos)).collect(),
            bullets: HashMap::new(),
            paused: false,
        }
    }

    fn on_ground(&self) -> bool {
        self.player_pos.y >= self.ground_y
    }

    fn apply(&mut self, command: PhysicsCommand) {
        match command {
            PhysicsCommand::SetPlayerVelocityX(vx) => self.player_vel.x = vx,
            PhysicsCommand::SetPlayerVelocityY(vy) => self.player_vel.y = vy,
            PhysicsCommand::SetPlayerVelocity(vel) => self.player_vel = vel,
            PhysicsCommand::SetEnemyVelocity { id, vel } => {
                if let Some(body) = self.enemies.get_mut(&id) {
                    body.1 = Vec2::new(vel.x, 0.0);
                }
            }
            PhysicsCommand::SpawnBullet { id, pos, vel } => {
                self.bullets.insert(id, (pos, vel));
            }
            PhysicsCommand::DespawnBullet { id } => {
                self.bullets.remove(&id);
            }
            PhysicsCommand::HideEnemy { id } => {
                self.enemies.remove(&id);
            }
            PhysicsCommand::HidePickup { id } => {
                self.pickups.remove(&id);
            }
            PhysicsCommand::PausePhysics => self.paused = true,
        }
    }

    fn step(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        self.player_vel.y += GRAVITY * dt;
        self.player_pos += self.player_vel * dt;
        if self.player_pos.y >= self.ground_y {
            self.player_pos.y = self.ground_y;
            self.player_vel.y = self.player_vel.y.min(0.0);
        }
        for (pos, vel) in self.enemies.values_mut() {
            *pos += *vel * dt;
        }
        for (pos, vel) in self.bullets.values_mut() {
            *pos += *vel * dt;
        }
    }

    /// Overlapping pairs in a stable order
    fn overlaps(&self) -> Vec<Overlap> {
        let mut found = Vec::new();

        let mut pickups: Vec<_> = self.pickups.iter().collect();
        pickups.sort_by_key(|(id, _)| **id);
        for (&id, &pos) in pickups {
            if pos.distance(self.player_pos) < TOUCH_RADIUS {
                found.push(Overlap::PlayerPickup(id));
            }
        }

        let mut enemies: Vec<_> = self.enemies.iter().collect();
        enemies.sort_by_key(|(id, _)| **id);
        let mut bullets: Vec<_> = self.bullets.iter().collect();
        bullets.sort_by_key(|(id, _)| (id.slot, id.generation));

        for &(&enemy, &(enemy_pos, _)) in &enemies {
            for &(&bullet, &(bullet_pos, _)) in &bullets {
                if bullet_pos.distance(enemy_pos) < TOUCH_RADIUS {
                    found.push(Overlap::BulletEnemy(bullet, enemy));
                }
            }
            if enemy_pos.distance(self.player_pos) < TOUCH_RADIUS {
                found.push(Overlap::PlayerEnemy(enemy));
            }
        }
        found
    }

    /// Camera follows the player, clamped to the map
    fn view(&self, level: &Level) -> ViewBounds {
        let mut view = ViewBounds::default();
        let max_x = (level.width - view.width).max(0.0);
        view.x = (self.player_pos.x - view.width / 2.0).clamp(0.0, max_x);
        view
    }
}

fn demo_level() -> Level {
    use gunrun::sim::{EnemyKind, PickupKind};

    let floor = 480.0 - GROUND_DEPTH;
    Level::new(2400.0, 480.0, Vec2::new(64.0, floor))
        .with_pickup(PickupKind::Ammo, Vec2::new(220.0, floor))
        .with_enemy(EnemyKind::Imp, Vec2::new(500.0, floor))
        .with_enemy(EnemyKind::Imp, Vec2::new(800.0, floor))
        .with_pickup(PickupKind::Health, Vec2::new(1000.0, floor))
        .with_enemy(EnemyKind::Demon, Vec2::new(1300.0, floor))
        .with_enemy(EnemyKind::Cyberdemon, Vec2::new(2100.0, floor))
}

fn print_hud(hud: &mut Hud, now: u64) {
    if hud.take_dirty() {
        let [health, ammo, score] = hud.lines();
        println!("[{:>6} ms] {} | {} | {}", now, health, ammo, score);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    log::info!("Gunrun (headless) starting...");

    let mut args = std::env::args().skip(1);
    let level = match args.next() {
        Some(path) => Level::load(&path, DEFAULT_OBJECT_LAYER)?,
        None => demo_level(),
    };
    let tuning = match args.next() {
        Some(path) => Tuning::load(&path)?,
        None => Tuning::default(),
    };
    let seed: u64 = match std::env::var("GUNRUN_SEED") {
        Ok(s) => s.parse()?,
        Err(_) => 12345,
    };
    log::info!("Session seed: {}", seed);

    let mut rng = Pcg32::seed_from_u64(seed);
    let mut state = GameState::new(level, tuning);
    let mut world = HeadlessWorld::new(&state);
    let mut hud = Hud::new();
    let mut jump_key = ButtonEdge::default();
    let mut shoot_key = ButtonEdge::default();

    for event in state.snapshot_events() {
        hud.emit(&event);
    }
    print_hud(&mut hud, 0);

    let mut clock = 0.0_f64;
    for _ in 0..MAX_FRAMES {
        clock += FRAME_MS;
        let now = clock as u64;

        // Bot: push right, hop and fire at random
        let signals = InputSignals {
            left_held: rng.random_bool(0.1),
            right_held: rng.random_bool(0.8),
            jump_pressed: jump_key.update(rng.random_bool(0.05)),
            shoot_pressed: shoot_key.update(rng.random_bool(0.5)),
        };

        let input = TickInput {
            now,
            signals,
            player_pos: world.player_pos,
            on_ground: world.on_ground(),
            enemy_positions: world.enemies.iter().map(|(&id, &(pos, _))| (id, pos)).collect(),
            bullet_positions: world.bullets.iter().map(|(&id, &(pos, _))| (id, pos)).collect(),
            view: world.view(&state.level),
        };

        let mut out = tick(&mut state, &input);
        for command in out.take_commands() {
            world.apply(command);
        }
        world.step((FRAME_MS / 1000.0) as f32);

        let overlaps = world.overlaps();
        resolve_all(&mut state, &overlaps, now, &mut out);
        for command in out.take_commands() {
            world.apply(command);
        }
        out.flush_events(&mut hud);
        print_hud(&mut hud, now);

        if state.is_game_over() {
            println!("GAME OVER ({:?})", state.game_over_cause);
            break;
        }
        if state.alive_enemies() == 0 {
            println!("LEVEL CLEAR");
            break;
        }
    }

    log::info!(
        "Session ended at {} ms: score {}, {} enemies left",
        state.now,
        state.score,
        state.alive_enemies()
    );
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The rules layer is embedded by the host engine on the web
}
