//! Simulation state and core entity types
//!
//! Everything a run needs lives in [`SimulationState`]. The host owns one
//! value, feeds it to `sim::tick` once per frame, and replaces nothing
//! else between frames.

use glam::DVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::SimulationClock;
use super::collision::{CollisionResolver, OverlapEvent};
use super::idle::IdleTracker;
use super::machine::GameStateMachine;
use super::pool::EntityPool;
use super::spawn::SpawnScheduler;
use crate::config::{SpawnConfig, WorldBounds};
use crate::error::{Result, SimError};

/// Slot index inside one pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Sprite facing, in degrees as the renderer expects them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    /// 0 degrees
    #[default]
    Down,
    /// 90 degrees
    Left,
    /// 180 degrees
    Up,
    /// -90 degrees
    Right,
}

impl Facing {
    pub fn degrees(self) -> i16 {
        match self {
            Facing::Down => 0,
            Facing::Left => 90,
            Facing::Up => 180,
            Facing::Right => -90,
        }
    }

    /// Unit vector in world space (y down)
    pub fn direction(self) -> DVec2 {
        match self {
            Facing::Down => DVec2::Y,
            Facing::Left => DVec2::NEG_X,
            Facing::Up => DVec2::NEG_Y,
            Facing::Right => DVec2::X,
        }
    }
}

/// A pooled bullet or enemy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    /// Inactive entities are free slots; their other fields are stale
    pub active: bool,
    pub position: DVec2,
    pub velocity: DVec2,
    pub angle: Facing,
}

/// Raw input flags for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Intent {
    pub up: bool,
    pub left: bool,
    pub right: bool,
    pub down: bool,
    pub shoot: bool,
}

impl Intent {
    pub const IDLE: Intent = Intent {
        up: false,
        left: false,
        right: false,
        down: false,
        shoot: false,
    };

    /// True if any flag is held
    #[inline]
    pub fn any(&self) -> bool {
        self.up || self.left || self.right || self.down || self.shoot
    }

    /// Collapse the flags into one action (first match wins)
    pub fn resolve(&self) -> Action {
        if self.left {
            Action::MoveLeft
        } else if self.right {
            Action::MoveRight
        } else if self.up {
            Action::MoveUp
        } else if self.down {
            Action::MoveDown
        } else if self.shoot {
            Action::Shoot
        } else {
            Action::Idle
        }
    }
}

/// What the hero does this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Shoot,
    Idle,
}

impl Action {
    /// Facing implied by a movement action
    pub fn facing(self) -> Option<Facing> {
        match self {
            Action::MoveLeft => Some(Facing::Left),
            Action::MoveRight => Some(Facing::Right),
            Action::MoveUp => Some(Facing::Up),
            Action::MoveDown => Some(Facing::Down),
            Action::Shoot | Action::Idle => None,
        }
    }
}

/// The player's hero
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroState {
    /// Body center
    pub position: DVec2,
    pub facing: Facing,
    /// Body size (width, height)
    pub size: DVec2,
    pub velocity: DVec2,
    pub action: Action,
    /// No velocity this tick
    pub is_stationary: bool,
}

impl HeroState {
    pub fn new(position: DVec2, size: DVec2) -> Self {
        Self {
            position,
            facing: Facing::Down,
            size,
            velocity: DVec2::ZERO,
            action: Action::Idle,
            is_stationary: true,
        }
    }

    /// Set velocity and facing from the resolved action
    ///
    /// Shooting and idling keep the last facing so shots follow the walk direction.
    pub fn apply_action(&mut self, action: Action, walk_velocity: f64) {
        self.action = action;
        match action.facing() {
            Some(facing) => {
                self.facing = facing;
                self.velocity = facing.direction() * walk_velocity;
            }
            None => self.velocity = DVec2::ZERO,
        }
        self.is_stationary = self.velocity == DVec2::ZERO;
    }

    /// Move by velocity, staying inside the world
    pub fn integrate(&mut self, dt_secs: f64, world: &WorldBounds) {
        self.position = world.clamp(self.position + self.velocity * dt_secs, self.size / 2.0);
    }

    /// Point `distance` units ahead of the hero along its facing
    pub fn point_ahead(&self, distance: f64) -> DVec2 {
        self.position + self.facing.direction() * distance
    }

    pub fn pose(&self) -> HeroPose {
        HeroPose {
            position: self.position,
            angle: self.facing,
        }
    }
}

/// What the renderer needs to draw the hero
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeroPose {
    pub position: DVec2,
    pub angle: Facing,
}

/// Authoritative run phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Normal play
    Playing,
    /// Player has idled past the warning threshold
    Warning,
    /// Run ended; only `reset` leaves this phase
    Lost,
}

/// Why a spawn happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnCause {
    /// First scheduled spawn, placed in front of the hero
    Opening,
    Scheduled,
    Escalation,
}

/// Kill notification for the visual effect layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KillEvent {
    pub enemy: EntityId,
    pub position: DVec2,
}

/// One-shot lifecycle events produced during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemySpawned {
        id: EntityId,
        position: DVec2,
        cause: SpawnCause,
    },
    BulletFired {
        id: EntityId,
        position: DVec2,
    },
    EnemyKilled {
        enemy: EntityId,
        bullet: EntityId,
        position: DVec2,
    },
    EnemyCrushed {
        enemy: EntityId,
        position: DVec2,
    },
    BulletCulled {
        id: EntityId,
    },
    EscalationBurst {
        count: u32,
    },
    PhaseChanged {
        from: RunPhase,
        to: RunPhase,
    },
}

/// Complete simulation state (deterministic given config and inputs)
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub(crate) config: SpawnConfig,
    pub(crate) world: WorldBounds,
    pub(crate) hero: HeroState,
    pub(crate) bullets: EntityPool,
    pub(crate) enemies: EntityPool,
    pub(crate) idle: IdleTracker,
    pub(crate) machine: GameStateMachine,
    pub(crate) clock: SimulationClock,
    pub(crate) scheduler: SpawnScheduler,
    pub(crate) resolver: CollisionResolver,
    pub(crate) rng: Pcg32,
    /// Overlaps reported since the last tick, in report order
    pub(crate) pending_overlaps: Vec<OverlapEvent>,
}

impl SimulationState {
    /// Start a fresh run
    pub fn new(config: SpawnConfig, world: WorldBounds, hero_start: DVec2) -> Result<Self> {
        check_run_setup(&config, &world, hero_start)?;
        log::info!(
            "New run: world {}x{}, seed {}, enemy cap {}, contact {}",
            world.width,
            world.height,
            config.rng_seed,
            config.enemy_cap,
            config.contact_policy.as_str()
        );

        Ok(Self {
            hero: HeroState::new(world.clamp(hero_start, config.hero_size / 2.0), config.hero_size),
            bullets: EntityPool::new(),
            enemies: EntityPool::new(),
            idle: IdleTracker::new(config.warning_time_ms, config.critical_time_ms),
            machine: GameStateMachine::new(config.enemy_cap),
            clock: SimulationClock::new(&config),
            scheduler: SpawnScheduler::new(),
            resolver: CollisionResolver::new(config.contact_policy),
            rng: Pcg32::seed_from_u64(config.rng_seed),
            pending_overlaps: Vec::new(),
            config,
            world,
        })
    }

    /// Begin a new run in place
    ///
    /// Pools are emptied but keep their slots, so a long session does not
    /// re-grow them every run.
    pub fn reset(&mut self, config: SpawnConfig, world: WorldBounds, hero_start: DVec2) -> Result<()> {
        check_run_setup(&config, &world, hero_start)?;

        self.bullets.deactivate_all();
        self.enemies.deactivate_all();
        self.hero = HeroState::new(world.clamp(hero_start, config.hero_size / 2.0), config.hero_size);
        self.idle = IdleTracker::new(config.warning_time_ms, config.critical_time_ms);
        self.machine = GameStateMachine::new(config.enemy_cap);
        self.clock = SimulationClock::new(&config);
        self.scheduler = SpawnScheduler::new();
        self.resolver = CollisionResolver::new(config.contact_policy);
        self.rng = Pcg32::seed_from_u64(config.rng_seed);
        self.pending_overlaps.clear();

        log::info!(
            "Run reset: world {}x{}, seed {}, pooled slots {} bullets / {} enemies",
            world.width,
            world.height,
            config.rng_seed,
            self.bullets.slot_count(),
            self.enemies.slot_count()
        );

        self.config = config;
        self.world = world;
        Ok(())
    }

    /// Queue an overlap detected by the host; applied on the next tick
    ///
    /// Ignored once the run is lost.
    pub fn report_overlap(&mut self, event: OverlapEvent) {
        if self.machine.is_lost() {
            return;
        }
        self.pending_overlaps.push(event);
    }

    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    pub fn world(&self) -> &WorldBounds {
        &self.world
    }

    pub fn hero(&self) -> &HeroState {
        &self.hero
    }

    pub fn bullets(&self) -> &EntityPool {
        &self.bullets
    }

    pub fn enemies(&self) -> &EntityPool {
        &self.enemies
    }

    pub fn idle(&self) -> &IdleTracker {
        &self.idle
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn phase(&self) -> RunPhase {
        self.machine.phase()
    }

    pub fn score(&self) -> u64 {
        self.machine.score()
    }
}

fn check_run_setup(config: &SpawnConfig, world: &WorldBounds, hero_start: DVec2) -> Result<()> {
    config.validate()?;
    world.validate()?;
    if !hero_start.is_finite() {
        return Err(SimError::NonFinitePosition {
            x: hero_start.x,
            y: hero_start.y,
        });
    }
    Ok(())
}
