//! Gameplay simulation
//!
//! Replaying the same config and the same `(delta, intent, overlaps)` stream
//! gives the same results, so the rules here are strict:
//! - time comes only from host-supplied frame deltas
//! - randomness comes only from the run's seeded `Pcg32`
//! - pools are walked in slot order
//! - nothing here touches rendering, audio, or the platform

pub mod clock;
pub mod collision;
pub mod idle;
pub mod machine;
pub mod pool;
pub mod spawn;
pub mod state;
pub mod tick;

pub use clock::{SimulationClock, Timer};
pub use collision::{CollisionOutcome, CollisionResolver, OverlapEvent, cull_out_of_bounds};
pub use idle::{IdleLevel, IdleTracker};
pub use machine::{GameStateMachine, LossReason, PhaseChange};
pub use pool::EntityPool;
pub use spawn::{SpawnContext, SpawnScheduler, escalation_count};
pub use state::{
    Action, Entity, EntityId, Facing, GameEvent, HeroPose, HeroState, Intent, KillEvent,
    RunPhase, SimulationState, SpawnCause,
};
pub use tick::{TickResult, tick};
