//! Run state machine
//!
//! ```text
//! Playing --idle >= warning--> Warning --input--> Playing
//!    \                            /
//!     +--enemies > cap / contact-+--> Lost (terminal until reset)
//! ```

use serde::{Deserialize, Serialize};

use super::idle::IdleLevel;
use super::state::RunPhase;

/// Why the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    EnemyCapExceeded { active: u32, cap: u32 },
    HeroContact,
}

/// A phase transition that happened this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseChange {
    pub from: RunPhase,
    pub to: RunPhase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateMachine {
    phase: RunPhase,
    score: u64,
    enemy_cap: u32,
    loss_reason: Option<LossReason>,
}

impl GameStateMachine {
    pub fn new(enemy_cap: u32) -> Self {
        Self {
            phase: RunPhase::Playing,
            score: 0,
            enemy_cap,
            loss_reason: None,
        }
    }

    /// Apply the idle level for this tick
    pub fn observe_idle(&mut self, level: IdleLevel) -> Option<PhaseChange> {
        let next = match (self.phase, level) {
            (RunPhase::Playing, IdleLevel::Warning | IdleLevel::Critical) => RunPhase::Warning,
            (RunPhase::Warning, IdleLevel::Active) => RunPhase::Playing,
            _ => return None,
        };
        Some(self.transition(next))
    }

    /// Lose the run if too many enemies are alive
    pub fn check_enemy_cap(&mut self, active_enemies: u32) -> Option<PhaseChange> {
        if active_enemies > self.enemy_cap {
            self.lose(LossReason::EnemyCapExceeded {
                active: active_enemies,
                cap: self.enemy_cap,
            })
        } else {
            None
        }
    }

    /// End the run. No-op if already lost.
    pub fn lose(&mut self, reason: LossReason) -> Option<PhaseChange> {
        if self.is_lost() {
            return None;
        }
        self.loss_reason = Some(reason);
        log::info!("Run lost with score {}: {:?}", self.score, reason);
        Some(self.transition(RunPhase::Lost))
    }

    /// Returns false (and changes nothing) once lost
    pub fn add_score(&mut self, points: u64) -> bool {
        if self.is_lost() {
            return false;
        }
        self.score += points;
        true
    }

    fn transition(&mut self, to: RunPhase) -> PhaseChange {
        let change = PhaseChange {
            from: self.phase,
            to,
        };
        self.phase = to;
        log::info!("Phase {:?} -> {:?}", change.from, change.to);
        change
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    #[inline]
    pub fn is_lost(&self) -> bool {
        self.phase == RunPhase::Lost
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn enemy_cap(&self) -> u32 {
        self.enemy_cap
    }

    pub fn loss_reason(&self) -> Option<LossReason> {
        self.loss_reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_round_trip() {
        let mut machine = GameStateMachine::new(5);
        assert_eq!(machine.observe_idle(IdleLevel::Active), None);

        let change = machine.observe_idle(IdleLevel::Warning).unwrap();
        assert_eq!(change.from, RunPhase::Playing);
        assert_eq!(change.to, RunPhase::Warning);

        // Escalating further stays in Warning
        assert_eq!(machine.observe_idle(IdleLevel::Critical), None);
        assert_eq!(machine.phase(), RunPhase::Warning);

        let change = machine.observe_idle(IdleLevel::Active).unwrap();
        assert_eq!(change.to, RunPhase::Playing);
    }

    #[test]
    fn test_cap_is_strictly_greater() {
        let mut machine = GameStateMachine::new(5);
        assert_eq!(machine.check_enemy_cap(5), None);
        let change = machine.check_enemy_cap(6).unwrap();
        assert_eq!(change.to, RunPhase::Lost);
        assert_eq!(
            machine.loss_reason(),
            Some(LossReason::EnemyCapExceeded { active: 6, cap: 5 })
        );
    }

    #[test]
    fn test_lost_is_terminal() {
        let mut machine = GameStateMachine::new(5);
        machine.add_score(3);
        machine.lose(LossReason::HeroContact).unwrap();

        assert!(!machine.add_score(1));
        assert_eq!(machine.score(), 3);
        assert_eq!(machine.observe_idle(IdleLevel::Active), None);
        assert_eq!(machine.observe_idle(IdleLevel::Warning), None);
        assert_eq!(machine.check_enemy_cap(100), None);
        assert_eq!(machine.lose(LossReason::HeroContact), None);
        assert_eq!(machine.loss_reason(), Some(LossReason::HeroContact));
        assert_eq!(machine.phase(), RunPhase::Lost);
    }
}
