//! Non-character entity roles: tiles, bullets, pickups and decorations.

use catacomb_core::{CellCoord, Category, EntityId, TileKind};

use crate::{
    character::{Gadget, Weapon},
    entity::{Behavior, Body, Contact, Effect},
};

/// Immutable level geometry occupying one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    cell: CellCoord,
    kind: TileKind,
}

impl Tile {
    /// Creates a tile for `cell`.
    #[must_use]
    pub const fn new(cell: CellCoord, kind: TileKind) -> Self {
        Self { cell, kind }
    }

    /// Cell covered by the tile.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Floor or wall.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }
}

impl Behavior for Tile {}

/// Projectile that damages the first actor it touches.
#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    owner: EntityId,
    damage: u32,
    remaining_range: f32,
}

impl Bullet {
    /// Creates a bullet fired by `owner`.
    #[must_use]
    pub const fn new(owner: EntityId, damage: u32, range: f32) -> Self {
        Self {
            owner,
            damage,
            remaining_range: range,
        }
    }

    /// Character that fired the bullet.
    #[must_use]
    pub const fn owner(&self) -> EntityId {
        self.owner
    }

    /// Damage dealt on impact.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Distance left before the bullet fizzles.
    #[must_use]
    pub const fn remaining_range(&self) -> f32 {
        self.remaining_range
    }
}

impl Behavior for Bullet {
    fn on_collide(&mut self, body: &mut Body, contact: &Contact, effects: &mut Vec<Effect>) {
        if body.is_marked_for_deletion() || contact.other == self.owner {
            return;
        }
        if contact.category.contains(Category::ACTOR) {
            effects.push(Effect::Damage {
                target: contact.other,
                amount: self.damage,
            });
        }
        body.cancel_step();
        body.mark_for_deletion();
    }

    fn on_moved(&mut self, body: &mut Body, distance: f32) {
        self.remaining_range -= distance;
        if self.remaining_range <= 0.0 {
            body.mark_for_deletion();
        }
    }
}

/// Equipment carried by an item lying on the ground.
#[derive(Clone, Debug, PartialEq)]
pub enum ItemKind {
    /// A weapon replacing the picker's weapon.
    Weapon(Weapon),
    /// A gadget replacing the picker's gadget.
    Gadget(Gadget),
}

impl ItemKind {
    /// Display name of the carried equipment.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Weapon(weapon) => weapon.name(),
            Self::Gadget(gadget) => gadget.name(),
        }
    }
}

/// Pickup entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    kind: ItemKind,
}

impl Item {
    /// Wraps equipment into a pickup.
    #[must_use]
    pub const fn new(kind: ItemKind) -> Self {
        Self { kind }
    }

    /// Equipment handed over on pickup.
    #[must_use]
    pub const fn kind(&self) -> &ItemKind {
        &self.kind
    }

    /// Display name shown next to the pickup.
    #[must_use]
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    pub(crate) fn into_kind(self) -> ItemKind {
        self.kind
    }
}

impl Behavior for Item {}

/// Visual-only prop such as a corpse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoration {
    texture: String,
}

impl Decoration {
    /// Creates a decoration drawn with `texture`.
    #[must_use]
    pub fn new(texture: impl Into<String>) -> Self {
        Self {
            texture: texture.into(),
        }
    }

    /// Texture name used by presentation layers.
    #[must_use]
    pub fn texture(&self) -> &str {
        &self.texture
    }
}

impl Behavior for Decoration {}
