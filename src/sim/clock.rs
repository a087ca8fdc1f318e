//! Simulation time
//!
//! The host supplies every frame delta. Timed behavior is a set of
//! accumulators compared against fixed intervals, so identical delta
//! sequences always fire identically.

use serde::{Deserialize, Serialize};

use crate::config::SpawnConfig;
use crate::error::{Result, SimError};

/// Interval accumulator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    interval_ms: f64,
    accumulated_ms: f64,
}

impl Timer {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            accumulated_ms: 0.0,
        }
    }

    #[inline]
    pub fn advance(&mut self, delta_ms: f64) {
        self.accumulated_ms += delta_ms;
    }

    /// Consume one interval if due
    pub fn fire(&mut self) -> bool {
        if self.accumulated_ms >= self.interval_ms {
            self.accumulated_ms -= self.interval_ms;
            true
        } else {
            false
        }
    }

    /// Consume every due interval at once; a long frame can owe several
    ///
    /// Saturates at `u32::MAX`.
    pub fn drain(&mut self) -> u32 {
        if self.accumulated_ms < self.interval_ms {
            return 0;
        }
        let remainder = self.accumulated_ms % self.interval_ms;
        let due = ((self.accumulated_ms - remainder) / self.interval_ms).round();
        self.accumulated_ms = remainder;
        due as u32
    }

    /// Drop accumulated time
    pub fn reset(&mut self) {
        self.accumulated_ms = 0.0;
    }

    /// Make the next `fire` succeed
    pub fn prime(&mut self) {
        self.accumulated_ms = self.interval_ms;
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn accumulated_ms(&self) -> f64 {
        self.accumulated_ms
    }

    /// Time left until the next fire (0 when due)
    pub fn remaining_ms(&self) -> f64 {
        (self.interval_ms - self.accumulated_ms).max(0.0)
    }
}

/// Run time and the timers it drives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationClock {
    elapsed_ms: f64,
    tick_count: u64,
    /// Scheduled enemy spawns
    pub spawn: Timer,
    /// Escalation bursts while critically idle
    pub escalation: Timer,
    /// Shots while shoot is held
    pub fire: Timer,
}

impl SimulationClock {
    pub fn new(config: &SpawnConfig) -> Self {
        let mut fire = Timer::new(config.fire_rate_ms);
        // First press shoots immediately
        fire.prime();
        Self {
            elapsed_ms: 0.0,
            tick_count: 0,
            spawn: Timer::new(config.spawn_interval_ms),
            escalation: Timer::new(config.escalation_interval_ms),
            fire,
        }
    }

    /// Start a new tick of `delta_ms`
    pub fn advance(&mut self, delta_ms: f64) -> Result<()> {
        if !delta_ms.is_finite() || delta_ms < 0.0 {
            return Err(SimError::InvalidDelta(delta_ms));
        }
        self.elapsed_ms += delta_ms;
        self.tick_count += 1;
        Ok(())
    }

    /// Drop all in-flight timer progress (run lost)
    pub fn cancel_timers(&mut self) {
        self.spawn.reset();
        self.escalation.reset();
        self.fire.reset();
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
