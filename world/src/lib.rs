#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative spatial world for Catacomb.
//!
//! The world owns every entity in an arena keyed by [`EntityId`], keeps one
//! bucket per [`Category`] in ordinal order and advances movement and
//! behaviour once per tick. Other systems hold identifiers, never references.

mod character;
mod collision;
mod entity;
mod props;

use std::{collections::BTreeMap, time::Duration};

use catacomb_core::{Category, Command, EntityId, Event, ITEM_PICKUP_MAX_DISTANCE, MASK_ALL};
use glam::Vec2;
use tracing::debug;

pub use character::{Character, Gadget, Health, Weapon};
pub use entity::{Behavior, Body, Contact, Effect, Entity, Role};
pub use props::{Bullet, Decoration, Item, ItemKind, Tile};

use collision::{collides, may_touch, segment_blocked, Swept};

/// Entity registry, movement integrator and spatial query surface.
#[derive(Debug)]
pub struct World {
    entities: BTreeMap<EntityId, Entity>,
    buckets: [Vec<EntityId>; Category::COUNT],
    characters: Vec<EntityId>,
    next_entity_id: u64,
    events: Vec<Event>,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            buckets: std::array::from_fn(|_| Vec::new()),
            characters: Vec::new(),
            next_entity_id: 0,
            events: Vec::new(),
        }
    }

    /// Inserts an entity into the bucket of its category.
    pub fn insert(&mut self, entity: Entity) -> EntityId {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id += 1;
        self.buckets[entity.body.category().ordinal()].push(id);
        let _ = self.entities.insert(id, entity);
        id
    }

    /// Inserts a character entity and registers it for thinking.
    ///
    /// # Panics
    ///
    /// Panics in debug builds when the entity does not carry a character role.
    pub fn insert_character(&mut self, entity: Entity) -> EntityId {
        debug_assert!(
            entity.role.as_character().is_some(),
            "insert_character requires a character role"
        );
        let id = self.insert(entity);
        self.characters.push(id);
        id
    }

    /// Removes an entity from the arena, its bucket and the character list.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;
        self.buckets[entity.body.category().ordinal()].retain(|candidate| *candidate != id);
        if entity.role.as_character().is_some() {
            self.characters.retain(|candidate| *candidate != id);
        }
        Some(entity)
    }

    /// Number of entities alive in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Reports whether the arena holds no entity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Runs character behaviour and drops characters that died since the previous tick.
    ///
    /// Must be called before [`World::step`] within a tick.
    pub fn think(&mut self, elapsed: Duration) {
        let characters = self.characters.clone();
        for id in characters {
            let Some(entity) = self.entities.get_mut(&id) else {
                continue;
            };
            if entity.body.is_marked_for_deletion() {
                let _ = self.remove(id);
                continue;
            }
            let mut effects = Vec::new();
            entity.role.on_think(&mut entity.body, elapsed, &mut effects);
            self.apply_effects(id, effects);
        }
    }

    /// Erases deleted non-actor entities and moves everything with a velocity.
    pub fn step(&mut self, elapsed: Duration) {
        let snapshot: Vec<EntityId> = self.buckets.iter().flatten().copied().collect();
        for id in snapshot {
            let Some(entity) = self.entities.get(&id) else {
                continue;
            };
            if entity.body.is_marked_for_deletion() && entity.body.category() != Category::ACTOR {
                let _ = self.remove(id);
                continue;
            }
            if entity.body.velocity() != Vec2::ZERO {
                self.apply_movement(id, elapsed);
            }
        }
    }

    /// Moves one entity by `velocity * elapsed`, dispatching collisions on the way.
    ///
    /// The world never blocks movement itself; behaviours cancel their own
    /// pending offset from `on_collide` when they should stay in place.
    pub fn apply_movement(&mut self, id: EntityId, elapsed: Duration) {
        let Some(mut mover) = self.entities.remove(&id) else {
            return;
        };
        let seconds = elapsed.as_secs_f32();
        let offset = mover.body.velocity() * seconds;
        mover.body.begin_step(offset);
        let swept = Swept {
            position: mover.body.position(),
            shape: mover.body.shape(),
            offset,
        };

        let hits: Vec<EntityId> = self
            .buckets
            .iter()
            .enumerate()
            .filter(|(ordinal, _)| {
                Category::from_ordinal(*ordinal)
                    .is_some_and(|category| mover.body.mask().accepts(category))
            })
            .flat_map(|(_, bucket)| bucket.iter().copied())
            .filter(|other_id| {
                self.entities.get(other_id).is_some_and(|other| {
                    if other.body.is_marked_for_deletion() || !mover.body.collides_with(&other.body)
                    {
                        return false;
                    }
                    let candidate = Swept {
                        position: other.body.position(),
                        shape: other.body.shape(),
                        offset: other.body.velocity() * seconds,
                    };
                    may_touch(&swept, &candidate) && collides(&swept, &candidate)
                })
            })
            .collect();

        let mut effects = Vec::new();
        let mut collateral = Vec::new();
        for other_id in hits {
            let Some(other) = self.entities.get_mut(&other_id) else {
                continue;
            };
            let touched = Contact::describe(other_id, other);
            let toucher = Contact::describe(id, &mover);
            mover.role.on_collide(&mut mover.body, &touched, &mut effects);
            let mut produced = Vec::new();
            other.role.on_collide(&mut other.body, &toucher, &mut produced);
            collateral.push((other_id, produced));
        }

        let distance = mover.body.finish_step();
        mover.role.on_moved(&mut mover.body, distance);
        let _ = self.entities.insert(id, mover);

        self.apply_effects(id, effects);
        for (other_id, produced) in collateral {
            self.apply_effects(other_id, produced);
        }
    }

    fn apply_effects(&mut self, source: EntityId, effects: Vec<Effect>) {
        let mut pending: Vec<(EntityId, Effect)> =
            effects.into_iter().rev().map(|effect| (source, effect)).collect();
        while let Some((source, effect)) = pending.pop() {
            match effect {
                Effect::Damage { target, amount } => {
                    let Some(entity) = self.entities.get_mut(&target) else {
                        continue;
                    };
                    let mut produced = Vec::new();
                    entity.role.on_damage(&mut entity.body, amount, &mut produced);
                    pending.extend(produced.into_iter().rev().map(|effect| (target, effect)));
                }
                Effect::Spawn(entity) => {
                    let _ = if entity.role.as_character().is_some() {
                        self.insert_character(entity)
                    } else {
                        self.insert(entity)
                    };
                }
                Effect::Died { faction } => {
                    let position = self
                        .entities
                        .get(&source)
                        .map_or(Vec2::ZERO, |entity| entity.body.position());
                    self.events.push(Event::CharacterDied {
                        character: source,
                        faction,
                        position,
                    });
                }
            }
        }
    }

    /// Returns the entity registered under `id`.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Returns the body and character state of a character entity.
    #[must_use]
    pub fn character(&self, id: EntityId) -> Option<(&Body, &Character)> {
        let entity = self.entities.get(&id)?;
        entity
            .role
            .as_character()
            .map(|character| (&entity.body, character))
    }

    /// Identifiers stored in the bucket of `category`, in insertion order.
    ///
    /// # Panics
    ///
    /// Panics in debug builds when `category` is not a single flag.
    #[must_use]
    pub fn bucket(&self, category: Category) -> &[EntityId] {
        &self.buckets[category.ordinal()]
    }

    /// Characters registered for thinking, including those awaiting removal.
    #[must_use]
    pub fn character_ids(&self) -> &[EntityId] {
        &self.characters
    }

    /// Entities of any category whose centre lies within `radius` of `position`,
    /// in category ordinal order.
    #[must_use]
    pub fn nearby_sprites(&self, position: Vec2, radius: f32) -> Vec<EntityId> {
        self.ids_matching(MASK_ALL, |entity| {
            entity.body.position().distance_squared(position) <= radius * radius
        })
    }

    /// Closest pickup within [`ITEM_PICKUP_MAX_DISTANCE`] of `position`.
    #[must_use]
    pub fn closest_item(&self, position: Vec2) -> Option<EntityId> {
        self.bucket(Category::NONSOLID)
            .iter()
            .filter_map(|id| {
                let entity = self.entities.get(id)?;
                if entity.role.as_item().is_none() {
                    return None;
                }
                let distance = entity.body.position().distance(position);
                (distance <= ITEM_PICKUP_MAX_DISTANCE && !entity.body.is_marked_for_deletion())
                    .then_some((*id, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Living characters within `max_distance` of `position`.
    ///
    /// A character standing exactly at `position` is excluded, so callers passing
    /// their own position do not find themselves.
    #[must_use]
    pub fn characters(&self, position: Vec2, max_distance: f32) -> Vec<EntityId> {
        self.living_characters(|_, entity| {
            let at = entity.body.position();
            at != position && at.distance(position) <= max_distance
        })
    }

    /// Living characters within `max_distance` of the character `id`, excluding it.
    #[must_use]
    pub fn characters_except(&self, id: EntityId, max_distance: f32) -> Vec<EntityId> {
        let Some(origin) = self.entities.get(&id).map(|entity| entity.body.position()) else {
            return Vec::new();
        };
        self.living_characters(|candidate, entity| {
            candidate != id && entity.body.position().distance(origin) <= max_distance
        })
    }

    /// Reports whether the segment from `from` to `to` is free of sight-blocking geometry.
    ///
    /// Each tile is tested exactly with separating axes: the rectangle's own axes, the
    /// segment normal and the axis from the tile centre to the segment midpoint. A
    /// segment passing close to a corner without touching the tile stays clear.
    #[must_use]
    pub fn raycast(&self, from: Vec2, to: Vec2) -> bool {
        let low = from.min(to);
        let high = from.max(to);
        self.bucket(Category::WORLD).iter().all(|id| {
            let Some(entity) = self.entities.get(id) else {
                return true;
            };
            if !entity.body.mask().accepts(Category::ACTOR) {
                return true;
            }
            let half = entity.body.shape().half_extents();
            let center = entity.body.position();
            let outside_bounds =
                (center + half).cmplt(low).any() || (center - half).cmpgt(high).any();
            outside_bounds || !segment_blocked(from, to, center, half)
        })
    }

    /// Takes every event recorded since the previous drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn ids_matching(&self, mask: Category, keep: impl Fn(&Entity) -> bool) -> Vec<EntityId> {
        self.buckets
            .iter()
            .enumerate()
            .filter(|(ordinal, _)| {
                Category::from_ordinal(*ordinal).is_some_and(|category| mask.accepts(category))
            })
            .flat_map(|(_, bucket)| bucket.iter().copied())
            .filter(|id| self.entities.get(id).is_some_and(&keep))
            .collect()
    }

    fn living_characters(&self, keep: impl Fn(EntityId, &Entity) -> bool) -> Vec<EntityId> {
        self.characters
            .iter()
            .copied()
            .filter(|id| {
                self.entities.get(id).is_some_and(|entity| {
                    let alive = entity
                        .role
                        .as_character()
                        .is_some_and(|character| !character.is_dead());
                    alive && keep(*id, entity)
                })
            })
            .collect()
    }

    fn character_mut(&mut self, id: EntityId) -> Option<(&mut Body, &mut Character)> {
        let Entity { body, role } = self.entities.get_mut(&id)?;
        let character = role.as_character_mut()?;
        Some((body, character))
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, then flushes every recorded event into
/// `out_events`, including those produced by earlier calls to [`World::think`] and
/// [`World::step`].
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SetVelocity { entity, velocity } => {
            if let Some(entity) = world.entities.get_mut(&entity) {
                entity.body.set_velocity(velocity);
            }
        }
        Command::SetWaypoints {
            character,
            waypoints,
        } => {
            if let Some((_, state)) = world.character_mut(character) {
                state.set_waypoints(waypoints);
            }
        }
        Command::FireWeapon { character, target } => {
            let bullet = world
                .character_mut(character)
                .and_then(|(body, state)| state.fire(character, body, target));
            if let Some(bullet) = bullet {
                let projectile = world.insert(bullet);
                world.events.push(Event::ProjectileFired {
                    shooter: character,
                    projectile,
                });
            }
        }
        Command::UseGadget { character } => {
            let used = world
                .character_mut(character)
                .is_some_and(|(_, state)| state.use_gadget());
            if used {
                world.events.push(Event::GadgetUsed { character });
            }
        }
        Command::PickUpItem { character } => pick_up_item(world, character),
        Command::Damage { target, amount } => {
            world.apply_effects(target, vec![Effect::Damage { target, amount }]);
        }
    }
    out_events.append(&mut world.events);
}

fn pick_up_item(world: &mut World, character: EntityId) {
    let Some(position) = world
        .character(character)
        .filter(|(_, state)| !state.is_dead())
        .map(|(body, _)| body.position())
    else {
        return;
    };
    let Some(item_id) = world.closest_item(position) else {
        return;
    };
    let Some(Entity {
        role: Role::Item(item),
        ..
    }) = world.remove(item_id)
    else {
        return;
    };
    let dropped = world
        .character_mut(character)
        .and_then(|(_, state)| state.equip(item.into_kind()));
    if let Some(dropped) = dropped {
        let _ = world.insert(Entity::item(position, Item::new(dropped)));
    }
    debug!(character = character.get(), item = item_id.get(), "item picked up");
    world.events.push(Event::ItemPickedUp {
        character,
        item: item_id,
    });
}
