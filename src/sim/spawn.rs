//! Enemy spawning
//!
//! Two sources of new problems:
//! - scheduled: one enemy per spawn interval, the very first one placed
//!   right in front of the hero so the player sees it;
//! - escalation: while the player is critically idle, a burst proportional
//!   to the current enemy count every escalation interval.
//!
//! The state machine decides the loss. Spawning only stops once the active
//! count is past the cap, since nothing after that point can change the
//! outcome.

use glam::DVec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::Timer;
use super::idle::IdleLevel;
use super::pool::EntityPool;
use super::state::{EntityId, Facing, GameEvent, HeroState, SpawnCause};
use crate::config::WorldBounds;
use crate::consts::OPENING_SPAWN_HEIGHTS;
use crate::error::Result;
use crate::scaled_count;

/// Borrowed state a spawn pass needs
pub struct SpawnContext<'a> {
    pub enemies: &'a mut EntityPool,
    pub hero: &'a HeroState,
    pub world: &'a WorldBounds,
    pub rng: &'a mut Pcg32,
    pub events: &'a mut Vec<GameEvent>,
    /// Run is lost past this many active enemies
    pub enemy_cap: u32,
}

impl SpawnContext<'_> {
    /// Spawns left before the run is already lost
    fn room(&self) -> u32 {
        self.enemy_cap
            .saturating_add(1)
            .saturating_sub(self.enemies.count_active())
    }

    fn spawn_enemy(&mut self, position: DVec2, cause: SpawnCause) -> Result<EntityId> {
        let id = self.enemies.spawn(position, DVec2::ZERO, Facing::Down)?;
        log::debug!("Enemy {} spawned at {} ({:?})", id.0, position, cause);
        self.events.push(GameEvent::EnemySpawned {
            id,
            position,
            cause,
        });
        Ok(id)
    }

    fn random_position(&mut self) -> DVec2 {
        DVec2::new(
            self.rng.random_range(0.0..self.world.width),
            self.rng.random_range(0.0..self.world.height),
        )
    }

    /// Where the opening enemy goes
    fn opening_position(&self) -> DVec2 {
        let ahead = self
            .hero
            .point_ahead(OPENING_SPAWN_HEIGHTS * self.hero.size.y);
        self.world.clamp(ahead, DVec2::ZERO)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnScheduler {
    opening_done: bool,
    escalating: bool,
}

impl Default for SpawnScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self {
            opening_done: false,
            escalating: false,
        }
    }

    /// Run scheduled spawns due after `delta_ms`; returns how many spawned
    pub fn scheduled(
        &mut self,
        timer: &mut Timer,
        delta_ms: f64,
        ctx: &mut SpawnContext<'_>,
    ) -> Result<u32> {
        timer.advance(delta_ms);
        let due = timer.drain().min(ctx.room());
        for _ in 0..due {
            if self.opening_done {
                let position = ctx.random_position();
                ctx.spawn_enemy(position, SpawnCause::Scheduled)?;
            } else {
                let position = ctx.opening_position();
                ctx.spawn_enemy(position, SpawnCause::Opening)?;
                self.opening_done = true;
            }
        }
        Ok(due)
    }

    /// Run escalation for this tick's idle level; returns how many spawned
    ///
    /// The escalation timer starts from zero on the tick the level turns
    /// critical and is cleared as soon as it drops back.
    pub fn escalate(
        &mut self,
        level: IdleLevel,
        timer: &mut Timer,
        delta_ms: f64,
        growth_factor: f64,
        ctx: &mut SpawnContext<'_>,
    ) -> Result<u32> {
        if level != IdleLevel::Critical {
            if self.escalating {
                log::debug!("Escalation stopped");
                self.cancel(timer);
            }
            return Ok(0);
        }

        if !self.escalating {
            log::debug!("Escalation started");
            self.escalating = true;
            timer.reset();
            return Ok(0);
        }

        timer.advance(delta_ms);
        let mut spawned = 0;
        for _ in 0..timer.drain() {
            let count =
                escalation_count(ctx.enemies.count_active(), growth_factor).min(ctx.room());
            if count == 0 {
                break;
            }
            for _ in 0..count {
                let position = ctx.random_position();
                ctx.spawn_enemy(position, SpawnCause::Escalation)?;
            }
            log::debug!("Escalation burst of {count}");
            ctx.events.push(GameEvent::EscalationBurst { count });
            spawned += count;
        }
        Ok(spawned)
    }

    /// Stop escalating and drop its timer progress
    pub fn cancel(&mut self, timer: &mut Timer) {
        self.escalating = false;
        timer.reset();
    }

    pub fn is_escalating(&self) -> bool {
        self.escalating
    }

    pub fn opening_done(&self) -> bool {
        self.opening_done
    }
}

/// Enemies added by one escalation tick
#[inline]
pub fn escalation_count(active_enemies: u32, growth_factor: f64) -> u32 {
    scaled_count(active_enemies, growth_factor)
}
