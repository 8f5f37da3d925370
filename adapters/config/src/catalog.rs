//! Typed views over the actor, weapon and gadget tables.

use std::time::Duration;

use catacomb_core::Faction;
use catacomb_world::{Character, Gadget, Weapon};
use serde::Deserialize;
use tracing::warn;

use crate::ConfigStore;

/// Settings of one `[weapons.<name>]` table.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    /// Hit points removed per bullet.
    pub damage: u32,
    /// Milliseconds between shots.
    pub fire_interval: u64,
    /// Shots per magazine.
    pub magazine: u32,
    /// Bullet speed in pixels per second.
    pub bullet_speed: f32,
    /// Distance a bullet travels before vanishing.
    pub range: f32,
    /// Milliseconds needed to refill an empty magazine.
    pub reload: u64,
}

impl WeaponConfig {
    /// Builds a loaded weapon called `name`.
    #[must_use]
    pub fn build(&self, name: &str) -> Weapon {
        Weapon::new(
            name,
            self.damage,
            Duration::from_millis(self.fire_interval),
            self.magazine,
            self.bullet_speed,
            self.range,
        )
        .with_reload_time(Duration::from_millis(self.reload))
    }
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            damage: 20,
            fire_interval: 300,
            magazine: 12,
            bullet_speed: 600.0,
            range: 400.0,
            reload: 1000,
        }
    }
}

/// Settings of one `[gadgets.<name>]` table.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GadgetConfig {
    /// Hit points restored per use.
    pub heal: u32,
    /// Milliseconds before the gadget can be used again.
    pub cooldown: u64,
}

impl GadgetConfig {
    /// Builds a charged gadget called `name`.
    #[must_use]
    pub fn build(&self, name: &str) -> Gadget {
        Gadget::new(name, self.heal, Duration::from_millis(self.cooldown))
    }
}

impl Default for GadgetConfig {
    fn default() -> Self {
        Self {
            heal: 25,
            cooldown: 5000,
        }
    }
}

/// Settings of an actor table such as `[player]` or `[monster]`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    /// Collision radius in pixels.
    pub size: f32,
    /// Walking speed in pixels per second.
    pub speed: f32,
    /// Maximum hit points.
    pub health: u32,
    /// Side the actor fights for.
    pub faction: Faction,
    /// Texture name for presentation layers.
    pub texture: String,
    /// Name of the weapon table the actor starts with.
    pub weapon: Option<String>,
    /// Name of the gadget table the actor starts with.
    pub gadget: Option<String>,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            size: 10.0,
            speed: 120.0,
            health: 100,
            faction: Faction::Monster,
            texture: String::from("monster"),
            weapon: None,
            gadget: None,
        }
    }
}

impl ConfigStore {
    /// Actor table stored under `key`.
    #[must_use]
    pub fn actor(&self, key: &str) -> ActorConfig {
        self.section(key)
    }

    /// Weapon described by `[weapons.<name>]`, or `None` when no such table exists.
    #[must_use]
    pub fn weapon(&self, name: &str) -> Option<Weapon> {
        let key = format!("weapons.{name}");
        self.contains(&key)
            .then(|| self.section::<WeaponConfig>(&key).build(name))
    }

    /// Gadget described by `[gadgets.<name>]`, or `None` when no such table exists.
    #[must_use]
    pub fn gadget(&self, name: &str) -> Option<Gadget> {
        let key = format!("gadgets.{name}");
        self.contains(&key)
            .then(|| self.section::<GadgetConfig>(&key).build(name))
    }

    /// Character state for `actor`, equipped with the weapon and gadget it names.
    #[must_use]
    pub fn character(&self, actor: &ActorConfig) -> Character {
        let mut character = Character::new(actor.faction, actor.health, actor.speed)
            .with_texture(actor.texture.as_str());
        if let Some(name) = &actor.weapon {
            match self.weapon(name) {
                Some(weapon) => character = character.with_weapon(weapon),
                None => warn!(weapon = %name, "unknown weapon, actor starts unarmed"),
            }
        }
        if let Some(name) = &actor.gadget {
            match self.gadget(name) {
                Some(gadget) => character = character.with_gadget(gadget),
                None => warn!(gadget = %name, "unknown gadget, actor starts without one"),
            }
        }
        character
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_tables_fill_missing_keys_with_defaults() {
        let store = ConfigStore::from_toml_str(
            "[player]\nfaction = \"player\"\nspeed = 150\nweapon = \"pistol\"\n",
        )
        .expect("valid toml");
        let player = store.actor("player");
        assert_eq!(player.faction, Faction::Player);
        assert_eq!(player.speed, 150.0);
        assert_eq!(player.size, 10.0);
        assert_eq!(player.health, 100);
        assert_eq!(player.weapon.as_deref(), Some("pistol"));

        assert_eq!(store.actor("monster"), ActorConfig::default());
    }

    #[test]
    fn weapons_are_built_from_their_table() {
        let store = ConfigStore::from_toml_str(
            "[weapons.shotgun]\ndamage = 45\nfire_interval = 900\nmagazine = 2\n",
        )
        .expect("valid toml");
        let shotgun = store.weapon("shotgun").expect("shotgun is configured");
        assert_eq!(shotgun.name(), "shotgun");
        assert_eq!(shotgun.damage(), 45);
        assert_eq!(shotgun.magazine(), 2);
        assert_eq!(shotgun.range(), WeaponConfig::default().range);
        assert!(store.weapon("rifle").is_none());
    }

    #[test]
    fn characters_skip_unknown_equipment() {
        let store = ConfigStore::from_toml_str(
            "[gadgets.medkit]\nheal = 40\n[monster]\nweapon = \"claws\"\ngadget = \"medkit\"\n",
        )
        .expect("valid toml");
        let character = store.character(&store.actor("monster"));
        assert!(character.weapon().is_none());
        assert_eq!(character.gadget().map(Gadget::heal), Some(40));
        assert_eq!(character.texture(), "monster");
    }
}
