//! Collision categories, masks and shapes.

use bitflags::bitflags;
use glam::Vec2;

bitflags! {
    /// Collision category of an entity, also used as a collision mask.
    ///
    /// An entity carries exactly one category flag. Masks combine any number of
    /// flags. Iteration and draw order follow the flag's ordinal, so
    /// higher categories are drawn on top.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct Category: u8 {
        /// Static level geometry such as tiles.
        const WORLD = 1;
        /// Purely visual props such as corpses.
        const DECORATION = 1 << 1;
        /// Non-blocking pickups.
        const NONSOLID = 1 << 2;
        /// Projectiles.
        const PARTICLE = 1 << 3;
        /// Characters.
        const ACTOR = 1 << 4;
    }
}

/// Mask that collides with every category.
pub const MASK_ALL: Category = Category::all();

/// Mask that collides with nothing.
pub const MASK_NONE: Category = Category::empty();

impl Category {
    /// Number of distinct single-flag categories.
    pub const COUNT: usize = 5;

    /// Zero-based ordinal of a single-flag category.
    ///
    /// # Panics
    ///
    /// Debug builds panic when called on a mask with other than one flag set.
    #[must_use]
    pub fn ordinal(self) -> usize {
        debug_assert_eq!(self.bits().count_ones(), 1, "category must be a single flag");
        self.bits().trailing_zeros() as usize
    }

    /// Single-flag category for the provided ordinal.
    #[must_use]
    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        if ordinal >= Self::COUNT {
            return None;
        }
        Self::from_bits(1 << ordinal)
    }

    /// Reports whether a mask accepts collisions with `category`.
    #[must_use]
    pub fn accepts(self, category: Category) -> bool {
        self.contains(category)
    }
}

/// Reports whether two entities may collide: each mask must accept the other's category.
#[must_use]
pub fn collision_enabled(
    category: Category,
    mask: Category,
    other_category: Category,
    other_mask: Category,
) -> bool {
    mask.accepts(other_category) && other_mask.accepts(category)
}

/// Collision shape of an entity, centred on its position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// Circle with the provided radius.
    Circle {
        /// Radius in world pixels.
        radius: f32,
    },
    /// Axis-aligned rectangle described by half its width and height.
    Rectangle {
        /// Half of the width and height in world pixels.
        half_extents: Vec2,
    },
}

impl Shape {
    /// Half extents of the shape's axis-aligned bounding box.
    #[must_use]
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            Self::Circle { radius } => Vec2::splat(radius),
            Self::Rectangle { half_extents } => half_extents,
        }
    }

    /// Radius of the smallest circle enclosing the shape.
    #[must_use]
    pub fn bounding_radius(&self) -> f32 {
        match *self {
            Self::Circle { radius } => radius,
            Self::Rectangle { half_extents } => half_extents.length(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_round_trip() {
        for ordinal in 0..Category::COUNT {
            let category = Category::from_ordinal(ordinal).expect("valid ordinal");
            assert_eq!(category.ordinal(), ordinal);
        }
        assert!(Category::from_ordinal(Category::COUNT).is_none());
        assert!(Category::ACTOR.ordinal() > Category::WORLD.ordinal());
    }

    #[test]
    fn collision_requires_both_masks() {
        assert!(!collision_enabled(
            Category::WORLD,
            MASK_NONE,
            Category::ACTOR,
            MASK_ALL
        ));
        assert!(collision_enabled(
            Category::ACTOR,
            MASK_ALL,
            Category::ACTOR,
            MASK_ALL
        ));
        assert!(!collision_enabled(
            Category::ACTOR,
            MASK_ALL,
            Category::PARTICLE,
            Category::WORLD
        ));
    }

    #[test]
    fn shape_extents() {
        let circle = Shape::Circle { radius: 4.0 };
        assert_eq!(circle.half_extents(), Vec2::splat(4.0));
        let rectangle = Shape::Rectangle {
            half_extents: Vec2::new(3.0, 4.0),
        };
        assert_eq!(rectangle.bounding_radius(), 5.0);
    }
}
