//! Player inactivity tracking
//!
//! A fresh run may sit idle forever: the stationary timer only arms once the
//! player gives their first input. After that, every tick without input adds
//! to the stationary time and any input clears it.

use serde::{Deserialize, Serialize};

use super::state::Intent;

/// How long the player has been slacking, bucketed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IdleLevel {
    Active,
    /// Past the warning threshold
    Warning,
    /// Past the critical threshold; escalation spawning runs
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdleTracker {
    /// Slacking is free until the first input
    allow_idle_reset: bool,
    stationary_ms: f64,
    /// A movement intent has been seen this run
    has_ever_moved: bool,
    warning_time_ms: f64,
    critical_time_ms: f64,
}

impl IdleTracker {
    pub fn new(warning_time_ms: f64, critical_time_ms: f64) -> Self {
        Self {
            allow_idle_reset: true,
            stationary_ms: 0.0,
            has_ever_moved: false,
            warning_time_ms,
            critical_time_ms,
        }
    }

    /// Feed one tick of input and report the resulting level
    pub fn update(&mut self, intent: &Intent, stationary: bool, delta_ms: f64) -> IdleLevel {
        if intent.any() {
            self.stationary_ms = 0.0;
            self.allow_idle_reset = false;
            if intent.resolve().facing().is_some() {
                self.has_ever_moved = true;
            }
        } else if stationary && self.is_armed() {
            self.stationary_ms += delta_ms;
        }
        self.level()
    }

    pub fn level(&self) -> IdleLevel {
        if self.stationary_ms >= self.critical_time_ms {
            IdleLevel::Critical
        } else if self.stationary_ms >= self.warning_time_ms {
            IdleLevel::Warning
        } else {
            IdleLevel::Active
        }
    }

    /// Idle time counts only after the first input
    #[inline]
    pub fn is_armed(&self) -> bool {
        !self.allow_idle_reset
    }

    pub fn stationary_ms(&self) -> f64 {
        self.stationary_ms
    }

    pub fn has_ever_moved(&self) -> bool {
        self.has_ever_moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEFT: Intent = Intent {
        left: true,
        ..Intent::IDLE
    };

    #[test]
    fn test_idle_before_first_input_is_free() {
        let mut idle = IdleTracker::new(100.0, 200.0);
        for _ in 0..50 {
            assert_eq!(idle.update(&Intent::IDLE, true, 100.0), IdleLevel::Active);
        }
        assert_eq!(idle.stationary_ms(), 0.0);
        assert!(!idle.is_armed());
    }

    #[test]
    fn test_levels_after_arming() {
        let mut idle = IdleTracker::new(100.0, 200.0);
        idle.update(&LEFT, false, 16.0);
        assert!(idle.is_armed());
        assert!(idle.has_ever_moved());

        assert_eq!(idle.update(&Intent::IDLE, true, 99.0), IdleLevel::Active);
        assert_eq!(idle.update(&Intent::IDLE, true, 1.0), IdleLevel::Warning);
        assert_eq!(idle.update(&Intent::IDLE, true, 100.0), IdleLevel::Critical);
        assert_eq!(idle.level(), IdleLevel::Critical);
    }

    #[test]
    fn test_any_intent_resets() {
        let mut idle = IdleTracker::new(100.0, 200.0);
        idle.update(&LEFT, false, 16.0);
        idle.update(&Intent::IDLE, true, 500.0);
        assert_eq!(idle.level(), IdleLevel::Critical);

        let shoot = Intent {
            shoot: true,
            ..Intent::IDLE
        };
        assert_eq!(idle.update(&shoot, true, 16.0), IdleLevel::Active);
        assert_eq!(idle.stationary_ms(), 0.0);
        // Shooting is input but not movement
        let mut shooter = IdleTracker::new(100.0, 200.0);
        shooter.update(&shoot, true, 16.0);
        assert!(shooter.is_armed());
        assert!(!shooter.has_ever_moved());
    }

    #[test]
    fn test_moving_without_input_does_not_accumulate() {
        let mut idle = IdleTracker::new(100.0, 200.0);
        idle.update(&LEFT, false, 16.0);
        // No intent but still sliding (e.g. knocked back)
        idle.update(&Intent::IDLE, false, 1000.0);
        assert_eq!(idle.stationary_ms(), 0.0);
    }
}
