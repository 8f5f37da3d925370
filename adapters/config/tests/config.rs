use std::{fs, process, time::Duration};

use catacomb_config::{ConfigStore, ResourceCache, Texture, PLACEHOLDER_COLOR};
use catacomb_core::Faction;
use catacomb_system_generation::GenerationConfig;

const DOCUMENT: &str = r#"
[generation]
generate_area_size = 8
room_size_value = 30

[player]
faction = "player"
texture = "hero"
health = 120
weapon = "pistol"
gadget = "medkit"

[monster]
texture = "ghoul"
speed = "fast"
weapon = "claws"

[weapons.pistol]
damage = 15
fire_interval = 250
magazine = 8

[weapons.claws]
damage = 10
range = 24

[gadgets.medkit]
heal = 30
cooldown = 8000

[hunting]
repath_interval = 750
"#;

#[test]
fn a_session_document_round_trips_through_a_file() {
    let path = std::env::temp_dir().join(format!("catacomb-config-{}.toml", process::id()));
    fs::write(&path, DOCUMENT).expect("temp file is writable");
    let loaded = ConfigStore::load(&path);
    let _ = fs::remove_file(&path);
    let store = loaded.expect("document parses");

    let generation: GenerationConfig = store.section("generation");
    assert_eq!(generation.generate_area_size, 8);
    assert_eq!(generation.room_size_value, 30.0);
    assert_eq!(
        generation.generate_area_range,
        GenerationConfig::default().generate_area_range
    );

    let player = store.character(&store.actor("player"));
    assert_eq!(player.faction(), Faction::Player);
    assert_eq!(player.health().max(), 120);
    assert_eq!(player.texture(), "hero");
    let pistol = player.weapon().expect("pistol equipped");
    assert_eq!((pistol.damage(), pistol.magazine()), (15, 8));
    assert!(player.gadget().is_some());

    let repath = Duration::from_millis(store.get_or("hunting.repath_interval", 500u64));
    assert_eq!(repath, Duration::from_millis(750));
}

#[test]
fn a_mistyped_field_discards_only_its_table() {
    let store = ConfigStore::from_toml_str(DOCUMENT).expect("document parses");
    let monster = store.actor("monster");
    assert_eq!(monster.texture, "monster", "the whole table falls back");
    assert_eq!(store.get_or("monster.texture", String::new()), "ghoul");
    assert_eq!(store.get_or("monster.speed", 120.0f32), 120.0);
}

#[test]
fn textures_for_configured_actors_resolve_or_fall_back() {
    let store = ConfigStore::from_toml_str(DOCUMENT).expect("document parses");
    let mut textures = ResourceCache::new(|name: &str| {
        if name == "hero" {
            Ok(Texture::solid(32, 32, [0, 255, 0, 255]))
        } else {
            anyhow::bail!("no texture named {name}")
        }
    });

    let hero = store.get_or("player.texture", String::new());
    let ghoul = store.get_or("monster.texture", String::new());
    assert_eq!(textures.get(&hero).width(), 32);
    assert_eq!(textures.get(&ghoul).pixel(3, 3), Some(PLACEHOLDER_COLOR));
    assert_eq!(textures.failures(), 1);
}
