//! Per-frame simulation step
//!
//! One call per host frame. Order within a tick:
//! clock → intent → reported overlaps → idle → phase → motion/culling →
//! firing → spawning → enemy cap → result.

use serde::{Deserialize, Serialize};

use super::collision::cull_out_of_bounds;
use super::idle::IdleLevel;
use super::machine::{LossReason, PhaseChange};
use super::spawn::SpawnContext;
use super::state::{
    Action, Entity, GameEvent, HeroPose, Intent, KillEvent, RunPhase, SimulationState,
};
use crate::error::{Result, SimError};

/// Everything the presentation layer needs after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickResult {
    pub hero: HeroPose,
    pub active_bullets: Vec<Entity>,
    pub active_enemies: Vec<Entity>,
    pub score: u64,
    pub phase: RunPhase,
    /// Kills this tick, for hit effects
    pub kill_events: Vec<KillEvent>,
    /// Show the "fix the problems" warning
    pub warning_active: bool,
    /// Idle long enough that problems are multiplying
    pub critical_active: bool,
    /// The player has walked at least once this run
    pub has_ever_moved: bool,
    /// Everything else that happened this tick
    pub events: Vec<GameEvent>,
    pub tick: u64,
    pub elapsed_ms: f64,
}

/// Advance the run by `delta_ms` with the given input
///
/// A lost run or a bad delta is rejected before anything changes.
pub fn tick(state: &mut SimulationState, intent: &Intent, delta_ms: f64) -> Result<TickResult> {
    if state.machine.is_lost() {
        log::warn!("tick() after the run was lost; call reset() first");
        return Err(SimError::RunOver);
    }
    state.clock.advance(delta_ms).inspect_err(|e| log::warn!("{e}"))?;

    let mut events = Vec::new();

    // Input
    let action = intent.resolve();
    state.hero.apply_action(action, state.config.walk_velocity);

    // Reported overlaps name slots from the last result; apply them before
    // anything can free or reuse a slot
    let overlaps = std::mem::take(&mut state.pending_overlaps);
    let outcome = state.resolver.resolve(
        &overlaps,
        &mut state.bullets,
        &mut state.enemies,
        &mut events,
    );
    state.machine.add_score(outcome.score);
    if outcome.hero_contact_loss {
        if let Some(change) = state.machine.lose(LossReason::HeroContact) {
            push_phase_change(&mut events, change);
        }
    }

    // Idle tracking drives Playing <-> Warning
    let level = state
        .idle
        .update(intent, state.hero.is_stationary, delta_ms);
    if let Some(change) = state.machine.observe_idle(level) {
        push_phase_change(&mut events, change);
    }

    if !state.machine.is_lost() {
        advance_world(state, action, level, delta_ms, &mut events)?;

        if let Some(change) = state.machine.check_enemy_cap(state.enemies.count_active()) {
            push_phase_change(&mut events, change);
        }
    }

    if state.machine.is_lost() {
        state.clock.cancel_timers();
        state.scheduler.cancel(&mut state.clock.escalation);
        state.pending_overlaps.clear();
    }

    Ok(build_result(state, outcome.kills, events))
}

/// Motion, culling, firing and spawning for a live run
fn advance_world(
    state: &mut SimulationState,
    action: Action,
    level: IdleLevel,
    delta_ms: f64,
    events: &mut Vec<GameEvent>,
) -> Result<()> {
    let dt_secs = delta_ms / 1000.0;
    state.hero.integrate(dt_secs, &state.world);
    state.bullets.advance(dt_secs);
    state.enemies.advance(dt_secs);
    cull_out_of_bounds(&mut state.bullets, &state.world, events);

    fire_control(state, action, delta_ms, events)?;

    let mut ctx = SpawnContext {
        enemies: &mut state.enemies,
        hero: &state.hero,
        world: &state.world,
        rng: &mut state.rng,
        events,
        enemy_cap: state.config.enemy_cap,
    };
    state
        .scheduler
        .scheduled(&mut state.clock.spawn, delta_ms, &mut ctx)?;
    state.scheduler.escalate(
        level,
        &mut state.clock.escalation,
        delta_ms,
        state.config.escalation_growth_factor,
        &mut ctx,
    )?;
    Ok(())
}

/// Spawn a bullet when shoot is the resolved action and the fire timer allows
fn fire_control(
    state: &mut SimulationState,
    action: Action,
    delta_ms: f64,
    events: &mut Vec<GameEvent>,
) -> Result<()> {
    if action != Action::Shoot {
        state.clock.fire.prime();
        return Ok(());
    }

    state.clock.fire.advance(delta_ms);
    if state.clock.fire.fire() {
        let position = state.hero.position;
        let velocity = state.hero.facing.direction() * state.config.bullet_speed;
        let id = state.bullets.spawn(position, velocity, state.hero.facing)?;
        log::debug!("Bullet {} fired {:?}", id.0, state.hero.facing);
        events.push(GameEvent::BulletFired { id, position });
    }
    Ok(())
}

fn push_phase_change(events: &mut Vec<GameEvent>, change: PhaseChange) {
    events.push(GameEvent::PhaseChanged {
        from: change.from,
        to: change.to,
    });
}

fn build_result(
    state: &SimulationState,
    kill_events: Vec<KillEvent>,
    events: Vec<GameEvent>,
) -> TickResult {
    let phase = state.machine.phase();
    TickResult {
        hero: state.hero.pose(),
        active_bullets: state.bullets.active_snapshot(),
        active_enemies: state.enemies.active_snapshot(),
        score: state.machine.score(),
        phase,
        kill_events,
        warning_active: phase == RunPhase::Warning,
        critical_active: phase == RunPhase::Warning && state.scheduler.is_escalating(),
        has_ever_moved: state.idle.has_ever_moved(),
        events,
        tick: state.clock.tick_count(),
        elapsed_ms: state.clock.elapsed_ms(),
    }
}

impl SimulationState {
    /// Current state as a result, without advancing time
    pub fn snapshot(&self) -> TickResult {
        build_result(self, Vec::new(), Vec::new())
    }
}
