//! HUD overlay text
//!
//! Reference UI listener: keeps the three counters the overlay shows and
//! formats them as fixed labels.

use crate::sim::{EventSink, GameEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hud {
    pub health: i32,
    pub ammo: u32,
    pub score: u64,
    /// Set when any counter changed since the last [`Hud::take_dirty`]
    dirty: bool,
}

impl Default for Hud {
    fn default() -> Self {
        Self {
            health: crate::consts::START_HEALTH,
            ammo: crate::consts::START_AMMO,
            score: 0,
            dirty: true,
        }
    }
}

impl Hud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn health_text(&self) -> String {
        format!("HEALTH: {}", self.health)
    }

    pub fn ammo_text(&self) -> String {
        format!("AMMO: {}", self.ammo)
    }

    pub fn score_text(&self) -> String {
        format!("SCORE: {}", self.score)
    }

    /// All three lines, top to bottom
    pub fn lines(&self) -> [String; 3] {
        [self.health_text(), self.ammo_text(), self.score_text()]
    }

    /// Returns true once after each change
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

impl EventSink for Hud {
    fn emit(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::HealthChanged(health) => self.health = health,
            GameEvent::AmmoChanged(ammo) => self.ammo = ammo,
            GameEvent::ScoreChanged(score) => self.score = score,
            // Not shown on the overlay
            _ => return,
        }
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::EntityId;

    #[test]
    fn test_initial_text() {
        let hud = Hud::new();
        assert_eq!(hud.lines(), ["HEALTH: 100", "AMMO: 150", "SCORE: 0"]);
    }

    #[test]
    fn test_updates_from_events() {
        let mut hud = Hud::new();
        hud.take_dirty();

        hud.emit(&GameEvent::HealthChanged(40));
        hud.emit(&GameEvent::AmmoChanged(12));
        hud.emit(&GameEvent::ScoreChanged(300));
        assert!(hud.take_dirty());
        assert!(!hud.take_dirty());
        assert_eq!(hud.lines(), ["HEALTH: 40", "AMMO: 12", "SCORE: 300"]);
    }

    #[test]
    fn test_ignores_other_events() {
        let mut hud = Hud::new();
        hud.take_dirty();
        hud.emit(&GameEvent::EnemyKilled { id: EntityId(3) });
        assert!(!hud.take_dirty());
    }
}
