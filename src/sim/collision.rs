//! Collision response
//!
//! Detection belongs to the host: it reports each overlapping pair as an
//! [`OverlapEvent`]. This module decides what each overlap does. Events that
//! name entities already freed earlier in the same tick (or never spawned)
//! do nothing, so duplicate reports are harmless.

use serde::{Deserialize, Serialize};

use super::pool::EntityPool;
use super::state::{EntityId, GameEvent, KillEvent};
use crate::config::{ContactPolicy, WorldBounds};

/// A pairwise overlap detected by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlapEvent {
    BulletEnemy { bullet: EntityId, enemy: EntityId },
    HeroEnemy { enemy: EntityId },
    /// Host saw the bullet leave the world
    BulletOutOfBounds { bullet: EntityId },
}

/// Effects of one resolve pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionOutcome {
    /// Points earned this pass
    pub score: u64,
    pub kills: Vec<KillEvent>,
    /// Hero touched an enemy under [`ContactPolicy::InstantLoss`]
    pub hero_contact_loss: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionResolver {
    policy: ContactPolicy,
}

impl CollisionResolver {
    pub fn new(policy: ContactPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ContactPolicy {
        self.policy
    }

    /// Apply overlaps in report order
    ///
    /// Stops at the first overlap that loses the run; later ones are dropped.
    pub fn resolve(
        &self,
        overlaps: &[OverlapEvent],
        bullets: &mut EntityPool,
        enemies: &mut EntityPool,
        events: &mut Vec<GameEvent>,
    ) -> CollisionOutcome {
        let mut outcome = CollisionOutcome::default();

        for overlap in overlaps {
            match *overlap {
                OverlapEvent::BulletEnemy { bullet, enemy } => {
                    // First pairing for a bullet wins
                    if !bullets.is_active(bullet) {
                        continue;
                    }
                    let Some(position) = enemies.get_active(enemy).map(|e| e.position) else {
                        continue;
                    };
                    enemies.deactivate(enemy);
                    bullets.deactivate(bullet);
                    outcome.score += 1;
                    outcome.kills.push(KillEvent { enemy, position });
                    events.push(GameEvent::EnemyKilled {
                        enemy,
                        bullet,
                        position,
                    });
                }
                OverlapEvent::HeroEnemy { enemy } => {
                    let Some(position) = enemies.get_active(enemy).map(|e| e.position) else {
                        continue;
                    };
                    match self.policy {
                        ContactPolicy::Blocking => {}
                        ContactPolicy::InstantLoss => {
                            log::debug!("Hero touched enemy {}", enemy.0);
                            outcome.hero_contact_loss = true;
                            break;
                        }
                        ContactPolicy::Crush => {
                            enemies.deactivate(enemy);
                            events.push(GameEvent::EnemyCrushed { enemy, position });
                        }
                    }
                }
                OverlapEvent::BulletOutOfBounds { bullet } => {
                    if bullets.deactivate(bullet) {
                        events.push(GameEvent::BulletCulled { id: bullet });
                    }
                }
            }
        }

        outcome
    }
}

/// Free every bullet that has left the world; returns how many
pub fn cull_out_of_bounds(
    bullets: &mut EntityPool,
    world: &WorldBounds,
    events: &mut Vec<GameEvent>,
) -> usize {
    let culled = bullets.retain_active(|b| world.contains(b.position));
    for &id in &culled {
        events.push(GameEvent::BulletCulled { id });
    }
    culled.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Facing;
    use glam::DVec2;

    fn pools(bullets: usize, enemies: usize) -> (EntityPool, EntityPool) {
        let mut b = EntityPool::new();
        let mut e = EntityPool::new();
        for i in 0..bullets {
            b.spawn(DVec2::new(i as f64, 0.0), DVec2::Y, Facing::Down).unwrap();
        }
        for i in 0..enemies {
            e.spawn(DVec2::new(10.0 * i as f64, 5.0), DVec2::ZERO, Facing::Down)
                .unwrap();
        }
        (b, e)
    }

    #[test]
    fn test_bullet_kills_enemy() {
        let (mut bullets, mut enemies) = pools(1, 1);
        let mut events = Vec::new();
        let resolver = CollisionResolver::new(ContactPolicy::Blocking);

        let outcome = resolver.resolve(
            &[OverlapEvent::BulletEnemy {
                bullet: EntityId(0),
                enemy: EntityId(0),
            }],
            &mut bullets,
            &mut enemies,
            &mut events,
        );

        assert_eq!(outcome.score, 1);
        assert_eq!(
            outcome.kills,
            vec![KillEvent {
                enemy: EntityId(0),
                position: DVec2::new(0.0, 5.0)
            }]
        );
        assert_eq!(bullets.count_active(), 0);
        assert_eq!(enemies.count_active(), 0);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_single_kill_per_bullet() {
        let (mut bullets, mut enemies) = pools(1, 2);
        let mut events = Vec::new();
        let resolver = CollisionResolver::new(ContactPolicy::Blocking);

        let outcome = resolver.resolve(
            &[
                OverlapEvent::BulletEnemy {
                    bullet: EntityId(0),
                    enemy: EntityId(0),
                },
                OverlapEvent::BulletEnemy {
                    bullet: EntityId(0),
                    enemy: EntityId(1),
                },
            ],
            &mut bullets,
            &mut enemies,
            &mut events,
        );

        assert_eq!(outcome.score, 1);
        assert_eq!(outcome.kills.len(), 1);
        assert_eq!(bullets.count_active(), 0);
        assert_eq!(enemies.count_active(), 1);
        assert!(enemies.is_active(EntityId(1)));
    }

    #[test]
    fn test_stale_and_unknown_overlaps_are_noops() {
        let (mut bullets, mut enemies) = pools(2, 1);
        let mut events = Vec::new();
        let resolver = CollisionResolver::new(ContactPolicy::Blocking);

        let outcome = resolver.resolve(
            &[
                OverlapEvent::BulletEnemy {
                    bullet: EntityId(0),
                    enemy: EntityId(0),
                },
                // Enemy already dead: second bullet survives
                OverlapEvent::BulletEnemy {
                    bullet: EntityId(1),
                    enemy: EntityId(0),
                },
                OverlapEvent::BulletEnemy {
                    bullet: EntityId(7),
                    enemy: EntityId(9),
                },
                OverlapEvent::HeroEnemy { enemy: EntityId(0) },
            ],
            &mut bullets,
            &mut enemies,
            &mut events,
        );

        assert_eq!(outcome.score, 1);
        assert!(bullets.is_active(EntityId(1)));
        assert!(!outcome.hero_contact_loss);
    }

    #[test]
    fn test_contact_policies() {
        let contact = [OverlapEvent::HeroEnemy { enemy: EntityId(0) }];

        let (mut bullets, mut enemies) = pools(0, 1);
        let mut events = Vec::new();
        let outcome = CollisionResolver::new(ContactPolicy::Blocking).resolve(
            &contact,
            &mut bullets,
            &mut enemies,
            &mut events,
        );
        assert!(!outcome.hero_contact_loss);
        assert_eq!(enemies.count_active(), 1);
        assert!(events.is_empty());

        let (mut bullets, mut enemies) = pools(0, 1);
        let outcome = CollisionResolver::new(ContactPolicy::InstantLoss).resolve(
            &contact,
            &mut bullets,
            &mut enemies,
            &mut events,
        );
        assert!(outcome.hero_contact_loss);

        let (mut bullets, mut enemies) = pools(0, 1);
        let outcome = CollisionResolver::new(ContactPolicy::Crush).resolve(
            &contact,
            &mut bullets,
            &mut enemies,
            &mut events,
        );
        assert!(!outcome.hero_contact_loss);
        assert_eq!(outcome.score, 0);
        assert_eq!(enemies.count_active(), 0);
        assert!(matches!(events[0], GameEvent::EnemyCrushed { .. }));
    }

    #[test]
    fn test_instant_loss_drops_later_overlaps() {
        let (mut bullets, mut enemies) = pools(1, 2);
        let mut events = Vec::new();
        let outcome = CollisionResolver::new(ContactPolicy::InstantLoss).resolve(
            &[
                OverlapEvent::HeroEnemy { enemy: EntityId(1) },
                OverlapEvent::BulletEnemy {
                    bullet: EntityId(0),
                    enemy: EntityId(0),
                },
            ],
            &mut bullets,
            &mut enemies,
            &mut events,
        );
        assert!(outcome.hero_contact_loss);
        assert_eq!(outcome.score, 0);
        assert_eq!(enemies.count_active(), 2);
    }

    #[test]
    fn test_cull_out_of_bounds() {
        let world = WorldBounds::new(100.0, 100.0);
        let mut bullets = EntityPool::new();
        let inside = bullets
            .spawn(DVec2::new(50.0, 50.0), DVec2::ZERO, Facing::Down)
            .unwrap();
        let outside = bullets
            .spawn(DVec2::new(50.0, 100.5), DVec2::ZERO, Facing::Down)
            .unwrap();
        let mut events = Vec::new();

        assert_eq!(cull_out_of_bounds(&mut bullets, &world, &mut events), 1);
        assert!(bullets.is_active(inside));
        assert!(!bullets.is_active(outside));
        assert_eq!(events, vec![GameEvent::BulletCulled { id: outside }]);

        // Host-reported exit for a bullet we already culled is a no-op
        let outcome = CollisionResolver::new(ContactPolicy::Blocking).resolve(
            &[OverlapEvent::BulletOutOfBounds { bullet: outside }],
            &mut bullets,
            &mut EntityPool::new(),
            &mut events,
        );
        assert_eq!(outcome, CollisionOutcome::default());
        assert_eq!(events.len(), 1);
    }
}
