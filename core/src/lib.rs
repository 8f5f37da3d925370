#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Catacomb simulation.
//!
//! This crate defines the vocabulary that connects the authoritative world,
//! the pure systems and the adapters: cell and world geometry, one-dimensional
//! intervals, collision categories and shapes, and the message surface. Systems
//! and adapters describe desired mutations as [`Command`] values, the world
//! applies them and records [`Event`] values for anyone interested in the
//! outcome.

mod category;
mod frontier;
mod geometry;
mod interval;
mod lighting;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use category::{collision_enabled, Category, Shape, MASK_ALL, MASK_NONE};
pub use frontier::MinFrontier;
pub use geometry::{CellCoord, CellRect, WorldRect, TILE_SIZE};
pub use interval::Interval;
pub use lighting::{NoLighting, OccluderSet, OccluderSink};

/// Maximum distance at which a character can pick up an item.
pub const ITEM_PICKUP_MAX_DISTANCE: f32 = 48.0;

/// Distance at which characters notice each other; also the no-spawn radius around the player.
pub const VISION_DISTANCE: f32 = 480.0;

/// Unique identifier assigned to an entity by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Allegiance of a character, used for target filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    /// The player and anything fighting alongside them.
    Player,
    /// Dungeon inhabitants hostile to the player.
    Monster,
    /// Characters that fight nobody.
    Neutral,
}

impl Faction {
    /// Reports whether members of this faction attack members of `other`.
    #[must_use]
    pub fn is_hostile_to(self, other: Faction) -> bool {
        matches!(
            (self, other),
            (Self::Player, Self::Monster) | (Self::Monster, Self::Player)
        )
    }
}

/// Authoritative type of a tile cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Walkable, transparent ground.
    Floor,
    /// Solid rock that blocks movement and sight.
    Wall,
}

impl TileKind {
    /// Reports whether the tile blocks movement and sight.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(self, Self::Wall)
    }
}

/// Commands that express permissible world mutations requested by systems and adapters.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Overrides the velocity of an entity, in pixels per second.
    SetVelocity {
        /// Entity whose velocity changes.
        entity: EntityId,
        /// New velocity.
        velocity: Vec2,
    },
    /// Replaces the waypoint path a character follows. The last element is visited first.
    SetWaypoints {
        /// Character receiving the path.
        character: EntityId,
        /// Waypoints ordered from destination to origin.
        waypoints: Vec<Vec2>,
    },
    /// Requests that a character fire its active weapon toward a point.
    FireWeapon {
        /// Character pulling the trigger.
        character: EntityId,
        /// World position aimed at.
        target: Vec2,
    },
    /// Requests that a character activate its gadget.
    UseGadget {
        /// Character activating the gadget.
        character: EntityId,
    },
    /// Requests that a character pick up the closest item in reach.
    PickUpItem {
        /// Character reaching for the item.
        character: EntityId,
    },
    /// Deals damage to a character.
    Damage {
        /// Character receiving the damage.
        target: EntityId,
        /// Amount of health removed.
        amount: u32,
    },
}

/// Events recorded by the world while applying commands and advancing time.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A character's health reached zero.
    CharacterDied {
        /// Character that died.
        character: EntityId,
        /// Faction the character belonged to.
        faction: Faction,
        /// Position where the character fell.
        position: Vec2,
    },
    /// A character fired a projectile.
    ProjectileFired {
        /// Character that fired.
        shooter: EntityId,
        /// Projectile entity inserted into the world.
        projectile: EntityId,
    },
    /// A character picked up an item, swapping it for its current equipment.
    ItemPickedUp {
        /// Character that picked the item up.
        character: EntityId,
        /// Item entity removed from the world.
        item: EntityId,
    },
    /// A character activated its gadget.
    GadgetUsed {
        /// Character that used the gadget.
        character: EntityId,
    },
}
