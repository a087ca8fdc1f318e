//! Slacker Core headless runner
//!
//! Plays a scripted session against the simulation and prints the final
//! state as JSON. Usage: `slacker-core [config.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Slacker Core (headless) starting...");

    if let Err(e) = headless::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The core is embedded by a web host; there is nothing to run here
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::DVec2;
    use slacker_core::sim::{Intent, OverlapEvent, RunPhase, SimulationState, TickResult, tick};
    use slacker_core::{Result, SpawnConfig, WorldBounds};

    /// 60 Hz frames
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after five simulated minutes
    const MAX_FRAMES: u32 = 60 * 60 * 5;
    /// Body radius used by the toy overlap detector below
    const BODY_RADIUS: f64 = 20.0;

    pub fn run() -> Result<()> {
        let config = match std::env::args().nth(1) {
            Some(path) => SpawnConfig::load(path)?,
            None => SpawnConfig::default(),
        };
        let world = WorldBounds::new(800.0, 600.0);
        let mut state = SimulationState::new(config, world, world.center())?;

        let mut last = state.snapshot();
        for frame in 0..MAX_FRAMES {
            let intent = scripted_intent(frame);
            report_overlaps(&mut state, &last);
            last = tick(&mut state, &intent, FRAME_MS)?;

            for kill in &last.kill_events {
                log::info!("Problem fixed at {} (score {})", kill.position, last.score);
            }
            if last.phase == RunPhase::Lost {
                log::info!(
                    "Lost after {:.1}s with {} problems and score {}",
                    last.elapsed_ms / 1000.0,
                    last.active_enemies.len(),
                    last.score
                );
                break;
            }
        }

        println!("{}", serde_json::to_string_pretty(&last)?);
        Ok(())
    }

    /// Walk a square while shooting for twenty seconds, then slack off
    fn scripted_intent(frame: u32) -> Intent {
        let seconds = frame / 60;
        if seconds >= 20 {
            return Intent::IDLE;
        }
        let shooting = frame % 30 >= 20;
        match (seconds / 2) % 4 {
            _ if shooting => Intent {
                shoot: true,
                ..Default::default()
            },
            0 => Intent {
                right: true,
                ..Default::default()
            },
            1 => Intent {
                down: true,
                ..Default::default()
            },
            2 => Intent {
                left: true,
                ..Default::default()
            },
            _ => Intent {
                up: true,
                ..Default::default()
            },
        }
    }

    /// Stand-in for the engine's overlap detection: circle checks on the
    /// previous frame's positions
    fn report_overlaps(state: &mut SimulationState, last: &TickResult) {
        let touching = |a: DVec2, b: DVec2| a.distance(b) < BODY_RADIUS * 2.0;

        for enemy in &last.active_enemies {
            if touching(last.hero.position, enemy.position) {
                state.report_overlap(OverlapEvent::HeroEnemy { enemy: enemy.id });
            }
            for bullet in &last.active_bullets {
                if touching(bullet.position, enemy.position) {
                    state.report_overlap(OverlapEvent::BulletEnemy {
                        bullet: bullet.id,
                        enemy: enemy.id,
                    });
                }
            }
        }
    }
}
