//! Per-run tuning and world geometry
//!
//! A run's config is fixed from `reset` until the next `reset`. Hosts
//! usually ship it as JSON next to their assets.

use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SimError};

/// What happens when the hero touches an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ContactPolicy {
    /// Bodies block each other, nothing else happens
    #[default]
    Blocking,
    /// Touching any enemy loses the run
    InstantLoss,
    /// The hero squashes the enemy (no score)
    Crush,
}

impl ContactPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactPolicy::Blocking => "Blocking",
            ContactPolicy::InstantLoss => "InstantLoss",
            ContactPolicy::Crush => "Crush",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "blocking" | "block" => Some(ContactPolicy::Blocking),
            "instantloss" | "instant_loss" | "lose" => Some(ContactPolicy::InstantLoss),
            "crush" => Some(ContactPolicy::Crush),
            _ => None,
        }
    }
}

/// Playable rectangle `[0, width] x [0, height]`, y pointing down
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: f64,
    pub height: f64,
}

impl WorldBounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Center of the world (the hero's usual starting point)
    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Inclusive containment check
    #[inline]
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    /// Clamp a point so a body of `half_extent` stays fully inside
    pub fn clamp(&self, p: DVec2, half_extent: DVec2) -> DVec2 {
        let min = half_extent.min(self.center());
        let max = DVec2::new(self.width, self.height) - min;
        p.clamp(min, max)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.height.is_finite()) {
            return Err(SimError::InvalidConfig(format!(
                "world bounds must be finite, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "world bounds must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Run tuning
///
/// Missing JSON fields fall back to the [`crate::consts`] preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    // === Movement ===
    /// Hero walk speed (units/s)
    pub walk_velocity: f64,
    /// Bullet speed (units/s)
    pub bullet_speed: f64,
    /// Minimum time between shots
    pub fire_rate_ms: f64,
    /// Hero body size (width, height)
    pub hero_size: DVec2,

    // === Spawning ===
    /// Time between scheduled spawns
    pub spawn_interval_ms: f64,
    /// Fraction of active enemies added per escalation tick
    pub escalation_growth_factor: f64,
    /// Time between escalation ticks
    pub escalation_interval_ms: f64,
    /// Run is lost once active enemies exceed this
    pub enemy_cap: u32,

    // === Idle thresholds ===
    pub warning_time_ms: f64,
    pub critical_time_ms: f64,

    // === Rules ===
    pub contact_policy: ContactPolicy,
    /// Seed for spawn positions
    pub rng_seed: u64,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            walk_velocity: WALK_VELOCITY,
            bullet_speed: BULLET_SPEED,
            fire_rate_ms: FIRE_RATE_MS,
            hero_size: DVec2::new(HERO_WIDTH, HERO_HEIGHT),

            spawn_interval_ms: SPAWN_INTERVAL_MS,
            escalation_growth_factor: ESCALATION_GROWTH_FACTOR,
            escalation_interval_ms: ESCALATION_INTERVAL_MS,
            enemy_cap: ENEMY_CAP,

            warning_time_ms: WARNING_TIME_MS,
            critical_time_ms: CRITICAL_TIME_MS,

            contact_policy: ContactPolicy::Blocking,
            rng_seed: DEFAULT_SEED,
        }
    }
}

impl SpawnConfig {
    /// Parse a config from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SpawnConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SimError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[inline]
    pub fn hero_height(&self) -> f64 {
        self.hero_size.y
    }

    /// Reject tunings the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("walk_velocity", self.walk_velocity),
            ("bullet_speed", self.bullet_speed),
            ("fire_rate_ms", self.fire_rate_ms),
            ("hero_size.x", self.hero_size.x),
            ("hero_size.y", self.hero_size.y),
            ("spawn_interval_ms", self.spawn_interval_ms),
            ("escalation_interval_ms", self.escalation_interval_ms),
            ("warning_time_ms", self.warning_time_ms),
            ("critical_time_ms", self.critical_time_ms),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }

        if !(0.0..=MAX_ESCALATION_GROWTH_FACTOR).contains(&self.escalation_growth_factor) {
            return Err(SimError::InvalidConfig(format!(
                "escalation_growth_factor must be within 0..={MAX_ESCALATION_GROWTH_FACTOR}, got {}",
                self.escalation_growth_factor
            )));
        }

        if self.warning_time_ms >= self.critical_time_ms {
            return Err(SimError::InvalidConfig(format!(
                "warning_time_ms ({}) must be below critical_time_ms ({})",
                self.warning_time_ms, self.critical_time_ms
            )));
        }

        Ok(())
    }
}
