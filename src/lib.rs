//! Slacker Core - simulation core of a top-down idle-punishing arcade shooter
//!
//! The hero walks around shooting "problems". Standing still for too long
//! makes the problems multiply. Too many problems and the run is lost.
//!
//! Core modules:
//! - `sim`: Deterministic simulation (pools, spawning, idle tracking, collisions, run state)
//! - `config`: Per-run tuning loaded from JSON
//! - `error`: Contract violations surfaced to the host
//!
//! Rendering, input capture, and overlap detection belong to the host. The
//! core only consumes a frame delta, an input intent, and overlap events.

pub mod config;
pub mod error;
pub mod sim;

pub use config::{ContactPolicy, SpawnConfig, WorldBounds};
pub use error::{Result, SimError};

/// Default tuning, used by [`SpawnConfig::default`]
pub mod consts {
    /// Hero walk speed (world units per second)
    pub const WALK_VELOCITY: f64 = 200.0;
    /// Bullet speed (world units per second)
    pub const BULLET_SPEED: f64 = 600.0;

    /// Time between scheduled enemy spawns
    pub const SPAWN_INTERVAL_MS: f64 = 2000.0;
    /// Idle time before the "fix the problems" warning shows
    pub const WARNING_TIME_MS: f64 = 3000.0;
    /// Idle time before escalation spawning starts
    pub const CRITICAL_TIME_MS: f64 = 6000.0;
    /// Run is lost when the active enemy count goes above this
    pub const ENEMY_CAP: u32 = 50;
    /// Fraction of active enemies added per escalation tick
    pub const ESCALATION_GROWTH_FACTOR: f64 = 0.25;
    /// Largest growth factor a config may ask for
    pub const MAX_ESCALATION_GROWTH_FACTOR: f64 = 10.0;
    /// Time between escalation bursts
    pub const ESCALATION_INTERVAL_MS: f64 = 1000.0;
    /// Minimum time between shots while shoot is held
    pub const FIRE_RATE_MS: f64 = 250.0;

    /// Hero body size
    pub const HERO_WIDTH: f64 = 32.0;
    pub const HERO_HEIGHT: f64 = 48.0;
    /// The opening enemy appears this many hero heights ahead of the hero
    pub const OPENING_SPAWN_HEIGHTS: f64 = 3.0;

    /// Seed used when a config does not name one
    pub const DEFAULT_SEED: u64 = 0x5EED_0F_1D1E;
}

/// `ceil(count * factor)` as an enemy count, saturating at `u32::MAX`
#[inline]
pub fn scaled_count(count: u32, factor: f64) -> u32 {
    let scaled = (f64::from(count) * factor).ceil();
    if scaled <= 0.0 {
        0
    } else if scaled >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        scaled as u32
    }
}
