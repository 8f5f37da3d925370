#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy AI that turns world snapshots into movement and firing commands.

use std::{collections::BTreeMap, time::Duration};

use catacomb_core::{Command, EntityId, Faction, VISION_DISTANCE};
use catacomb_system_pathfinding::AreaGraph;
use catacomb_world::{Character, Weapon, World};
use glam::Vec2;
use tracing::debug;

/// Minimum time between two path requests of the same hunter.
pub const DEFAULT_REPATH_INTERVAL: Duration = Duration::from_millis(500);

/// Hunting system that steers non-player characters toward their enemies.
#[derive(Debug)]
pub struct Hunting {
    repath_interval: Duration,
    since_repath: BTreeMap<EntityId, Duration>,
}

impl Hunting {
    /// Creates a hunting system that requests paths at most every `repath_interval`.
    #[must_use]
    pub fn new(repath_interval: Duration) -> Self {
        Self {
            repath_interval,
            since_repath: BTreeMap::new(),
        }
    }

    /// Interval between path requests of one hunter.
    #[must_use]
    pub const fn repath_interval(&self) -> Duration {
        self.repath_interval
    }

    /// Computes the commands every living non-player character issues this tick.
    ///
    /// The output buffer is cleared before populating it. A hunter with a clear
    /// line of fire to a target within weapon range stops and shoots; any other
    /// hunter with a target in sight follows a fresh path once its repath timer
    /// expires. An empty path halts the hunter.
    pub fn handle(
        &mut self,
        world: &World,
        graph: &AreaGraph,
        elapsed: Duration,
        out: &mut Vec<Command>,
    ) {
        out.clear();
        self.since_repath.retain(|id, _| {
            world
                .character(*id)
                .is_some_and(|(_, character)| !character.is_dead())
        });

        let interval = self.repath_interval;
        for &hunter in world.character_ids() {
            let Some((body, character)) = world.character(hunter) else {
                continue;
            };
            if character.is_dead() || character.faction() == Faction::Player {
                continue;
            }
            let position = body.position();
            let Some(destination) = closest_hostile(world, hunter, position, character) else {
                continue;
            };

            let in_range = character
                .weapon()
                .is_some_and(|weapon| position.distance(destination) <= weapon.range());
            if in_range && world.raycast(position, destination) {
                halt(hunter, out);
                if character.weapon().is_some_and(Weapon::is_ready) {
                    out.push(Command::FireWeapon {
                        character: hunter,
                        target: destination,
                    });
                }
                continue;
            }

            let waited = self.since_repath.entry(hunter).or_insert(interval);
            *waited += elapsed;
            if *waited < interval {
                continue;
            }
            *waited = Duration::ZERO;

            let waypoints = graph.get_path(position, destination, body.shape().bounding_radius());
            if waypoints.is_empty() {
                debug!(hunter = hunter.get(), "no route to target");
                halt(hunter, out);
            } else {
                out.push(Command::SetWaypoints {
                    character: hunter,
                    waypoints,
                });
            }
        }
    }
}

impl Default for Hunting {
    fn default() -> Self {
        Self::new(DEFAULT_REPATH_INTERVAL)
    }
}

fn closest_hostile(
    world: &World,
    hunter: EntityId,
    position: Vec2,
    character: &Character,
) -> Option<Vec2> {
    let mut best: Option<(Vec2, f32)> = None;
    for candidate in world.characters_except(hunter, VISION_DISTANCE) {
        let Some((body, other)) = world.character(candidate) else {
            continue;
        };
        if !character.is_hostile_to(other) {
            continue;
        }
        let distance = body.position().distance(position);
        if best.map_or(true, |(_, closest)| distance < closest) {
            best = Some((body.position(), distance));
        }
    }
    best.map(|(at, _)| at)
}

fn halt(hunter: EntityId, out: &mut Vec<Command>) {
    out.push(Command::SetWaypoints {
        character: hunter,
        waypoints: Vec::new(),
    });
    out.push(Command::SetVelocity {
        entity: hunter,
        velocity: Vec2::ZERO,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_interval_is_half_a_second() {
        let hunting = Hunting::default();
        assert_eq!(hunting.repath_interval(), Duration::from_millis(500));
    }

    #[test]
    fn empty_world_produces_no_commands() {
        let mut hunting = Hunting::default();
        let mut out = vec![Command::UseGadget {
            character: EntityId::new(3),
        }];
        hunting.handle(
            &World::new(),
            &AreaGraph::new(),
            Duration::from_millis(16),
            &mut out,
        );
        assert!(out.is_empty());
    }
}
