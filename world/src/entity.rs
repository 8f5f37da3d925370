//! Spatial entities and the behaviour capability they expose to the world.

use std::time::Duration;

use catacomb_core::{
    collision_enabled, CellCoord, Category, EntityId, Faction, Shape, TileKind, MASK_ALL,
    MASK_NONE, TILE_SIZE,
};
use glam::Vec2;

use crate::{
    character::Character,
    props::{Bullet, Decoration, Item, Tile},
};

/// Physical state shared by every entity: where it is, how it moves and what it collides with.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    position: Vec2,
    velocity: Vec2,
    rotation: f32,
    shape: Shape,
    category: Category,
    mask: Category,
    marked_for_deletion: bool,
    pending_offset: Vec2,
}

impl Body {
    /// Creates a resting body.
    ///
    /// `category` must be a single flag; `mask` lists the categories the body collides with.
    #[must_use]
    pub fn new(position: Vec2, shape: Shape, category: Category, mask: Category) -> Self {
        debug_assert_eq!(
            category.bits().count_ones(),
            1,
            "an entity belongs to exactly one category"
        );
        Self {
            position,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            shape,
            category,
            mask,
            marked_for_deletion: false,
            pending_offset: Vec2::ZERO,
        }
    }

    /// Returns the body with the provided velocity.
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Centre of the body in world pixels.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Moves the body without collision checks.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Velocity in pixels per second.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Replaces the velocity.
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    /// Facing angle in radians.
    #[must_use]
    pub const fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Replaces the facing angle.
    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
    }

    /// Collision shape centred on the position.
    #[must_use]
    pub const fn shape(&self) -> Shape {
        self.shape
    }

    /// Category flag of the body.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Categories the body is willing to collide with.
    #[must_use]
    pub const fn mask(&self) -> Category {
        self.mask
    }

    /// Reports whether the two bodies accept collisions with each other.
    #[must_use]
    pub fn collides_with(&self, other: &Body) -> bool {
        collision_enabled(self.category, self.mask, other.category, other.mask)
    }

    /// Flags the body for removal on the next world pass.
    pub fn mark_for_deletion(&mut self) {
        self.marked_for_deletion = true;
    }

    /// Reports whether the body awaits removal.
    #[must_use]
    pub const fn is_marked_for_deletion(&self) -> bool {
        self.marked_for_deletion
    }

    /// Offset the world will add to the position at the end of the current movement step.
    #[must_use]
    pub const fn pending_offset(&self) -> Vec2 {
        self.pending_offset
    }

    /// Discards the offset of the current movement step, keeping the body in place.
    pub fn cancel_step(&mut self) {
        self.pending_offset = Vec2::ZERO;
    }

    pub(crate) fn begin_step(&mut self, offset: Vec2) {
        self.pending_offset = offset;
    }

    pub(crate) fn finish_step(&mut self) -> f32 {
        let travelled = self.pending_offset.length();
        self.position += self.pending_offset;
        self.pending_offset = Vec2::ZERO;
        travelled
    }
}

/// Summary of the other party in a collision, handed to [`Behavior::on_collide`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// Identifier of the entity touched.
    pub other: EntityId,
    /// Category of the entity touched.
    pub category: Category,
    /// Position of the entity touched.
    pub position: Vec2,
    /// Faction of the entity touched, when it is a character.
    pub faction: Option<Faction>,
}

impl Contact {
    pub(crate) fn describe(id: EntityId, entity: &Entity) -> Self {
        Self {
            other: id,
            category: entity.body.category(),
            position: entity.body.position(),
            faction: entity.role.as_character().map(Character::faction),
        }
    }
}

/// Deferred consequence of a behaviour callback, applied by the world afterwards.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Damages another entity.
    Damage {
        /// Entity receiving the damage.
        target: EntityId,
        /// Amount of health removed.
        amount: u32,
    },
    /// Inserts a new entity into the world.
    Spawn(Entity),
    /// Reports that the entity running the callback has died.
    Died {
        /// Faction of the deceased.
        faction: Faction,
    },
}

/// Capability interface implemented by every entity kind.
///
/// Callbacks receive the entity's own [`Body`] and push cross-entity consequences
/// into `effects`; they never reach into the world directly.
pub trait Behavior {
    /// Runs once per tick for characters, before movement.
    fn on_think(&mut self, _body: &mut Body, _elapsed: Duration, _effects: &mut Vec<Effect>) {}

    /// Runs when a movement test reports a collision with `contact`.
    fn on_collide(&mut self, _body: &mut Body, _contact: &Contact, _effects: &mut Vec<Effect>) {}

    /// Runs after the body moved `distance` pixels.
    fn on_moved(&mut self, _body: &mut Body, _distance: f32) {}

    /// Runs when the entity receives damage.
    fn on_damage(&mut self, _body: &mut Body, _amount: u32, _effects: &mut Vec<Effect>) {}
}

/// Behaviour-carrying part of an entity.
#[derive(Clone, Debug, PartialEq)]
pub enum Role {
    /// Level geometry.
    Tile(Tile),
    /// Player or monster.
    Character(Character),
    /// Projectile fired by a weapon.
    Bullet(Bullet),
    /// Pickup lying on the ground.
    Item(Item),
    /// Visual-only prop.
    Decoration(Decoration),
}

impl Role {
    /// The character state, when the role is a character.
    #[must_use]
    pub fn as_character(&self) -> Option<&Character> {
        match self {
            Self::Character(character) => Some(character),
            _ => None,
        }
    }

    /// Mutable character state, when the role is a character.
    pub fn as_character_mut(&mut self) -> Option<&mut Character> {
        match self {
            Self::Character(character) => Some(character),
            _ => None,
        }
    }

    /// The item capability, when the role is a pickup.
    #[must_use]
    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Self::Item(item) => Some(item),
            _ => None,
        }
    }

    /// The tile state, when the role is level geometry.
    #[must_use]
    pub fn as_tile(&self) -> Option<&Tile> {
        match self {
            Self::Tile(tile) => Some(tile),
            _ => None,
        }
    }

    fn behavior_mut(&mut self) -> &mut dyn Behavior {
        match self {
            Self::Tile(tile) => tile,
            Self::Character(character) => character,
            Self::Bullet(bullet) => bullet,
            Self::Item(item) => item,
            Self::Decoration(decoration) => decoration,
        }
    }
}

impl Behavior for Role {
    fn on_think(&mut self, body: &mut Body, elapsed: Duration, effects: &mut Vec<Effect>) {
        self.behavior_mut().on_think(body, elapsed, effects);
    }

    fn on_collide(&mut self, body: &mut Body, contact: &Contact, effects: &mut Vec<Effect>) {
        self.behavior_mut().on_collide(body, contact, effects);
    }

    fn on_moved(&mut self, body: &mut Body, distance: f32) {
        self.behavior_mut().on_moved(body, distance);
    }

    fn on_damage(&mut self, body: &mut Body, amount: u32, effects: &mut Vec<Effect>) {
        self.behavior_mut().on_damage(body, amount, effects);
    }
}

/// Entity stored by the world: a body plus the role that gives it behaviour.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    /// Physical state.
    pub body: Body,
    /// Behaviour and kind-specific state.
    pub role: Role,
}

impl Entity {
    /// Creates a tile entity covering `cell`.
    ///
    /// Walls collide with everything and occlude sight; floors collide with nothing.
    #[must_use]
    pub fn tile(cell: CellCoord, kind: TileKind) -> Self {
        let mask = if kind.is_solid() { MASK_ALL } else { MASK_NONE };
        let body = Body::new(
            cell.center(),
            Shape::Rectangle {
                half_extents: Vec2::splat(TILE_SIZE * 0.5),
            },
            Category::WORLD,
            mask,
        );
        Self {
            body,
            role: Role::Tile(Tile::new(cell, kind)),
        }
    }

    /// Creates a circular character entity.
    #[must_use]
    pub fn character(position: Vec2, radius: f32, character: Character) -> Self {
        let body = Body::new(
            position,
            Shape::Circle { radius },
            Category::ACTOR,
            Category::WORLD | Category::ACTOR | Category::PARTICLE,
        );
        Self {
            body,
            role: Role::Character(character),
        }
    }

    /// Creates a projectile travelling with `velocity`.
    #[must_use]
    pub fn bullet(position: Vec2, velocity: Vec2, radius: f32, bullet: Bullet) -> Self {
        let body = Body::new(
            position,
            Shape::Circle { radius },
            Category::PARTICLE,
            Category::WORLD | Category::ACTOR,
        )
        .with_velocity(velocity);
        Self {
            body,
            role: Role::Bullet(bullet),
        }
    }

    /// Creates a pickup lying at `position`.
    #[must_use]
    pub fn item(position: Vec2, item: Item) -> Self {
        let body = Body::new(
            position,
            Shape::Circle { radius: 8.0 },
            Category::NONSOLID,
            MASK_NONE,
        );
        Self {
            body,
            role: Role::Item(item),
        }
    }

    /// Creates a visual-only prop.
    #[must_use]
    pub fn decoration(position: Vec2, radius: f32, decoration: Decoration) -> Self {
        let body = Body::new(
            position,
            Shape::Circle { radius },
            Category::DECORATION,
            MASK_NONE,
        );
        Self {
            body,
            role: Role::Decoration(decoration),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finishing_a_step_applies_the_pending_offset() {
        let mut body = Body::new(
            Vec2::ZERO,
            Shape::Circle { radius: 1.0 },
            Category::ACTOR,
            MASK_ALL,
        );
        body.begin_step(Vec2::new(3.0, 4.0));
        assert_eq!(body.finish_step(), 5.0);
        assert_eq!(body.position(), Vec2::new(3.0, 4.0));
        assert_eq!(body.pending_offset(), Vec2::ZERO);
    }

    #[test]
    fn cancelled_step_keeps_position() {
        let mut body = Body::new(
            Vec2::ONE,
            Shape::Circle { radius: 1.0 },
            Category::ACTOR,
            MASK_ALL,
        );
        body.begin_step(Vec2::X);
        body.cancel_step();
        assert_eq!(body.finish_step(), 0.0);
        assert_eq!(body.position(), Vec2::ONE);
    }

    #[test]
    fn wall_tiles_collide_and_floor_tiles_do_not() {
        let wall = Entity::tile(CellCoord::new(0, 0), TileKind::Wall);
        let floor = Entity::tile(CellCoord::new(1, 0), TileKind::Floor);
        let actor = Entity::character(
            Vec2::ZERO,
            10.0,
            Character::new(Faction::Player, 10, 100.0),
        );
        assert!(actor.body.collides_with(&wall.body));
        assert!(!actor.body.collides_with(&floor.body));
        assert_eq!(wall.body.position(), Vec2::splat(TILE_SIZE * 0.5));
    }
}
