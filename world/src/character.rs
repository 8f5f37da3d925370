//! Player and monster state: health, equipment and waypoint following.

use std::time::Duration;

use catacomb_core::{Category, EntityId, Faction};
use glam::Vec2;
use tracing::debug;

use crate::{
    entity::{Behavior, Body, Contact, Effect, Entity},
    props::{Bullet, Decoration, Item, ItemKind},
};

/// Distance under which a waypoint counts as reached regardless of speed.
const ARRIVAL_DISTANCE: f32 = 4.0;

const BULLET_RADIUS: f32 = 3.0;
const CORPSE_RADIUS: f32 = 12.0;

/// Hit points clamped to `0..=max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Health {
    current: u32,
    max: u32,
}

impl Health {
    /// Creates full health.
    #[must_use]
    pub const fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Upper bound of the hit points.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Reports whether no hit points remain.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.current == 0
    }

    fn damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    fn heal(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.max);
    }
}

/// Ranged weapon with a magazine and a fire rate.
#[derive(Clone, Debug, PartialEq)]
pub struct Weapon {
    name: String,
    damage: u32,
    fire_interval: Duration,
    reload_time: Duration,
    magazine: u32,
    ammo: u32,
    bullet_speed: f32,
    range: f32,
    cooldown: Duration,
}

impl Weapon {
    /// Creates a loaded weapon.
    ///
    /// Reloading takes one second unless overridden with [`Weapon::with_reload_time`].
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        damage: u32,
        fire_interval: Duration,
        magazine: u32,
        bullet_speed: f32,
        range: f32,
    ) -> Self {
        let magazine = magazine.max(1);
        Self {
            name: name.into(),
            damage,
            fire_interval,
            reload_time: Duration::from_secs(1),
            magazine,
            ammo: magazine,
            bullet_speed,
            range,
            cooldown: Duration::ZERO,
        }
    }

    /// Returns the weapon with a custom reload duration.
    #[must_use]
    pub fn with_reload_time(mut self, reload_time: Duration) -> Self {
        self.reload_time = reload_time;
        self
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Damage dealt per bullet.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Bullets left in the magazine.
    #[must_use]
    pub const fn ammo(&self) -> u32 {
        self.ammo
    }

    /// Magazine capacity.
    #[must_use]
    pub const fn magazine(&self) -> u32 {
        self.magazine
    }

    /// Bullet speed in pixels per second.
    #[must_use]
    pub const fn bullet_speed(&self) -> f32 {
        self.bullet_speed
    }

    /// Distance a bullet travels before vanishing.
    #[must_use]
    pub const fn range(&self) -> f32 {
        self.range
    }

    /// Reports whether the trigger can be pulled now.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.cooldown.is_zero() && self.ammo > 0
    }

    fn tick(&mut self, elapsed: Duration) {
        if self.cooldown.is_zero() {
            return;
        }
        self.cooldown = self.cooldown.saturating_sub(elapsed);
        if self.cooldown.is_zero() && self.ammo == 0 {
            self.ammo = self.magazine;
        }
    }

    fn trigger(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.ammo -= 1;
        self.cooldown = if self.ammo == 0 {
            self.reload_time
        } else {
            self.fire_interval
        };
        true
    }
}

/// Consumable ability that restores health and then recharges.
#[derive(Clone, Debug, PartialEq)]
pub struct Gadget {
    name: String,
    heal: u32,
    cooldown: Duration,
    remaining: Duration,
}

impl Gadget {
    /// Creates a charged gadget.
    #[must_use]
    pub fn new(name: impl Into<String>, heal: u32, cooldown: Duration) -> Self {
        Self {
            name: name.into(),
            heal,
            cooldown,
            remaining: Duration::ZERO,
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hit points restored per use.
    #[must_use]
    pub const fn heal(&self) -> u32 {
        self.heal
    }

    /// Reports whether the gadget has recharged.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.remaining.is_zero()
    }

    fn tick(&mut self, elapsed: Duration) {
        self.remaining = self.remaining.saturating_sub(elapsed);
    }
}

/// Player or monster driven by waypoints and commands.
#[derive(Clone, Debug, PartialEq)]
pub struct Character {
    texture: String,
    faction: Faction,
    health: Health,
    speed: f32,
    waypoints: Vec<Vec2>,
    weapon: Option<Weapon>,
    gadget: Option<Gadget>,
    dead: bool,
}

impl Character {
    /// Creates an unarmed character at full health.
    #[must_use]
    pub fn new(faction: Faction, max_health: u32, speed: f32) -> Self {
        Self {
            texture: String::new(),
            faction,
            health: Health::full(max_health),
            speed,
            waypoints: Vec::new(),
            weapon: None,
            gadget: None,
            dead: false,
        }
    }

    /// Returns the character with a texture name for presentation layers.
    #[must_use]
    pub fn with_texture(mut self, texture: impl Into<String>) -> Self {
        self.texture = texture.into();
        self
    }

    /// Returns the character holding `weapon`.
    #[must_use]
    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = Some(weapon);
        self
    }

    /// Returns the character carrying `gadget`.
    #[must_use]
    pub fn with_gadget(mut self, gadget: Gadget) -> Self {
        self.gadget = Some(gadget);
        self
    }

    /// Texture name used by presentation layers.
    #[must_use]
    pub fn texture(&self) -> &str {
        &self.texture
    }

    /// Side the character fights for.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.faction
    }

    /// Reports whether `other` is an enemy of this character.
    #[must_use]
    pub fn is_hostile_to(&self, other: &Character) -> bool {
        self.faction.is_hostile_to(other.faction)
    }

    /// Current hit points.
    #[must_use]
    pub const fn health(&self) -> Health {
        self.health
    }

    /// Walking speed in pixels per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Reports whether the character has died.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.dead
    }

    /// Remaining waypoints; the last element is visited next.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Replaces the followed path. The last element is visited first.
    pub fn set_waypoints(&mut self, waypoints: Vec<Vec2>) {
        self.waypoints = waypoints;
    }

    /// Equipped weapon.
    #[must_use]
    pub fn weapon(&self) -> Option<&Weapon> {
        self.weapon.as_ref()
    }

    /// Equipped gadget.
    #[must_use]
    pub fn gadget(&self) -> Option<&Gadget> {
        self.gadget.as_ref()
    }

    /// Equips the pickup and returns whatever occupied the same slot.
    pub fn equip(&mut self, item: ItemKind) -> Option<ItemKind> {
        match item {
            ItemKind::Weapon(weapon) => self.weapon.replace(weapon).map(ItemKind::Weapon),
            ItemKind::Gadget(gadget) => self.gadget.replace(gadget).map(ItemKind::Gadget),
        }
    }

    /// Fires the weapon toward `target`, returning the bullet to insert.
    ///
    /// `owner` is the world identifier of this character so the bullet ignores its shooter.
    pub fn fire(
        &mut self,
        owner: EntityId,
        body: &mut Body,
        target: Vec2,
    ) -> Option<Entity> {
        if self.dead {
            return None;
        }
        let direction = (target - body.position()).normalize_or_zero();
        if direction == Vec2::ZERO {
            return None;
        }
        let weapon = self.weapon.as_mut()?;
        if !weapon.trigger() {
            return None;
        }
        body.set_rotation(direction.y.atan2(direction.x));
        Some(Entity::bullet(
            body.position(),
            direction * weapon.bullet_speed(),
            BULLET_RADIUS,
            Bullet::new(owner, weapon.damage(), weapon.range()),
        ))
    }

    /// Activates the gadget, restoring health. Returns `false` while recharging.
    pub fn use_gadget(&mut self) -> bool {
        if self.dead {
            return false;
        }
        let Some(gadget) = self.gadget.as_mut() else {
            return false;
        };
        if !gadget.is_ready() {
            return false;
        }
        gadget.remaining = gadget.cooldown;
        self.health.heal(gadget.heal);
        true
    }

    fn follow_waypoints(&mut self, body: &mut Body, elapsed: Duration) {
        if self.waypoints.is_empty() {
            return;
        }
        let threshold = (self.speed * elapsed.as_secs_f32()).max(ARRIVAL_DISTANCE);
        while let Some(&next) = self.waypoints.last() {
            if body.position().distance(next) > threshold {
                break;
            }
            let _ = self.waypoints.pop();
        }
        match self.waypoints.last() {
            Some(&next) => {
                let direction = (next - body.position()).normalize_or_zero();
                body.set_velocity(direction * self.speed);
                body.set_rotation(direction.y.atan2(direction.x));
            }
            None => body.set_velocity(Vec2::ZERO),
        }
    }
}

impl Behavior for Character {
    fn on_think(&mut self, body: &mut Body, elapsed: Duration, _effects: &mut Vec<Effect>) {
        if let Some(weapon) = self.weapon.as_mut() {
            weapon.tick(elapsed);
        }
        if let Some(gadget) = self.gadget.as_mut() {
            gadget.tick(elapsed);
        }
        self.follow_waypoints(body, elapsed);
    }

    fn on_collide(&mut self, body: &mut Body, contact: &Contact, _effects: &mut Vec<Effect>) {
        if contact
            .category
            .intersects(Category::WORLD | Category::ACTOR)
        {
            body.cancel_step();
        }
    }

    fn on_damage(&mut self, body: &mut Body, amount: u32, effects: &mut Vec<Effect>) {
        if self.dead {
            return;
        }
        self.health.damage(amount);
        if !self.health.is_depleted() {
            return;
        }
        self.dead = true;
        self.waypoints.clear();
        body.set_velocity(Vec2::ZERO);
        body.mark_for_deletion();
        debug!(faction = ?self.faction, position = ?body.position(), "character died");

        effects.push(Effect::Died {
            faction: self.faction,
        });
        effects.push(Effect::Spawn(Entity::decoration(
            body.position(),
            CORPSE_RADIUS,
            Decoration::new(format!("{}_corpse", self.texture)),
        )));
        if let Some(weapon) = self.weapon.take() {
            effects.push(Effect::Spawn(Entity::item(
                body.position(),
                Item::new(ItemKind::Weapon(weapon)),
            )));
        }
    }
}
