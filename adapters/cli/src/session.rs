//! Headless game loop wiring generation, AI and the world together.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use catacomb_config::{ActorConfig, ConfigStore, ResourceCache, Texture, WeaponConfig};
use catacomb_core::{
    CellCoord, Command, EntityId, Event, Faction, OccluderSet, TILE_SIZE, VISION_DISTANCE,
};
use catacomb_system_generation::{Canvas, GenerationConfig, Generator};
use catacomb_system_hunting::{Hunting, DEFAULT_REPATH_INTERVAL};
use catacomb_system_pathfinding::AreaGraph;
use catacomb_world::{self as world, Character, Entity, Gadget, Item, ItemKind, World};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

const WANDER_TIMEOUT: Duration = Duration::from_secs(4);

/// Counters describing a finished or running session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Report {
    pub(crate) ticks: u32,
    pub(crate) chunks: usize,
    pub(crate) spawned: usize,
    pub(crate) shots: usize,
    pub(crate) kills: usize,
    pub(crate) pickups: usize,
    pub(crate) gadgets: usize,
    pub(crate) textures: usize,
    pub(crate) placeholders: usize,
    pub(crate) player_alive: bool,
}

impl Report {
    fn record(&mut self, event: &Event, player: EntityId) {
        match event {
            Event::CharacterDied {
                character, faction, ..
            } => {
                if *character == player {
                    self.player_alive = false;
                    info!(tick = self.ticks, "player died");
                } else if *faction == Faction::Monster {
                    self.kills += 1;
                }
            }
            Event::ProjectileFired { .. } => self.shots += 1,
            Event::ItemPickedUp { .. } => self.pickups += 1,
            Event::GadgetUsed { .. } => self.gadgets += 1,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ticks, {} chunks, {} monsters spawned, {} killed, {} shots, {} pickups, \
             {} gadget uses, {} textures ({} placeholders), player {}",
            self.ticks,
            self.chunks,
            self.spawned,
            self.kills,
            self.shots,
            self.pickups,
            self.gadgets,
            self.textures,
            self.placeholders,
            if self.player_alive { "alive" } else { "dead" },
        )
    }
}

/// A running simulation driven by an autopiloted player.
pub(crate) struct Session {
    store: ConfigStore,
    world: World,
    graph: AreaGraph,
    lighting: OccluderSet,
    generator: Generator,
    hunting: Hunting,
    textures: ResourceCache<Texture>,
    rng: ChaCha8Rng,
    player: EntityId,
    tick: Duration,
    wandering: Duration,
    commands: Vec<Command>,
    events: Vec<Event>,
    report: Report,
}

impl Session {
    /// Generates the area around the origin and places the player on its closest floor.
    pub(crate) fn new(store: ConfigStore, seed: Option<u64>, tick: Duration, assets: PathBuf) -> Self {
        let config: GenerationConfig = store.section("generation");
        let (mut generator, rng) = match seed {
            Some(seed) => (Generator::new(config, seed), ChaCha8Rng::seed_from_u64(seed)),
            None => (Generator::from_entropy(config), ChaCha8Rng::from_entropy()),
        };
        let repath = store.get_or(
            "hunting.repath_interval",
            DEFAULT_REPATH_INTERVAL.as_millis() as u64,
        );

        let mut world = World::new();
        let mut graph = AreaGraph::new();
        let mut lighting = OccluderSet::new();
        let spawns = generator.generate_current_area_if_needed(
            CellCoord::ORIGIN.center(),
            &mut Canvas {
                world: &mut world,
                graph: &mut graph,
                lighting: &mut lighting,
            },
        );

        let mut actor = store.actor("player");
        actor.faction = Faction::Player;
        if !store.contains("player.texture") {
            actor.texture = String::from("player");
        }
        let character = armed(&store, &actor, "pistol");
        let position = generator.get_player_spawn();
        let player = world.insert_character(Entity::character(position, actor.size, character));
        info!(x = position.x, y = position.y, "player spawned");

        let mut session = Self {
            store,
            world,
            graph,
            lighting,
            generator,
            hunting: Hunting::new(Duration::from_millis(repath)),
            textures: ResourceCache::new(move |name: &str| load_texture(&assets, name)),
            rng,
            player,
            tick,
            wandering: Duration::ZERO,
            commands: Vec::new(),
            events: Vec::new(),
            report: Report {
                player_alive: true,
                ..Report::default()
            },
        };
        let _ = session.textures.get(&actor.texture);
        for spawn in spawns {
            session.spawn_monster(spawn);
        }
        session.report.chunks = session.generator.generated_chunks().len();
        session
    }

    /// Advances up to `ticks` ticks, stopping early when the player dies.
    pub(crate) fn run(&mut self, ticks: u32) -> Report {
        for _ in 0..ticks {
            if !self.tick() {
                break;
            }
        }
        self.report.textures = self.textures.len();
        self.report.placeholders = self.textures.failures();
        self.report.clone()
    }

    fn tick(&mut self) -> bool {
        let Some(position) = self.player_position() else {
            return false;
        };

        let spawns = self.generator.generate_current_area_if_needed(
            position,
            &mut Canvas {
                world: &mut self.world,
                graph: &mut self.graph,
                lighting: &mut self.lighting,
            },
        );
        for spawn in spawns {
            self.spawn_monster(spawn);
        }

        self.world.think(self.tick);
        self.hunting
            .handle(&self.world, &self.graph, self.tick, &mut self.commands);
        self.steer_player();
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
        self.world.step(self.tick);
        self.events.extend(self.world.drain_events());
        for event in self.events.drain(..) {
            self.report.record(&event, self.player);
        }

        self.report.ticks += 1;
        self.report.chunks = self.generator.generated_chunks().len();
        if self.report.ticks % 60 == 0 {
            debug!(
                tick = self.report.ticks,
                entities = self.world.len(),
                areas = self.graph.len(),
                occluders = self.lighting.len(),
                "session progress"
            );
        }
        self.report.player_alive
    }

    fn player_position(&self) -> Option<Vec2> {
        self.world
            .character(self.player)
            .filter(|(_, state)| !state.is_dead())
            .map(|(body, _)| body.position())
    }

    fn spawn_monster(&mut self, position: Vec2) {
        let actor = self.store.actor("monster");
        let character = armed(&self.store, &actor, "claws");
        let _ = self.textures.get(character.texture());
        let id = self
            .world
            .insert_character(Entity::character(position, actor.size, character));
        self.report.spawned += 1;
        debug!(monster = id.get(), x = position.x, y = position.y, "monster spawned");
    }

    fn steer_player(&mut self) {
        let player = self.player;
        let Some((body, state)) = self.world.character(player) else {
            return;
        };
        if state.is_dead() {
            return;
        }
        let position = body.position();

        let wanted = self
            .world
            .closest_item(position)
            .and_then(|item| self.world.entity(item))
            .and_then(|entity| entity.role.as_item())
            .is_some_and(|item| wants(state, item));
        if wanted {
            self.commands.push(Command::PickUpItem { character: player });
        }

        let health = state.health();
        if health.current() * 2 < health.max() && state.gadget().is_some_and(Gadget::is_ready) {
            self.commands.push(Command::UseGadget { character: player });
        }

        let target = state
            .weapon()
            .filter(|weapon| weapon.is_ready())
            .and_then(|weapon| visible_hostile(&self.world, player, position, weapon.range()));
        if let Some(target) = target {
            self.commands.push(Command::FireWeapon {
                character: player,
                target,
            });
        }

        self.wandering += self.tick;
        if !state.waypoints().is_empty() && self.wandering < WANDER_TIMEOUT {
            return;
        }
        if self.graph.is_empty() {
            return;
        }
        let index = self.rng.gen_range(0..self.graph.len());
        let Some((_, area)) = self.graph.areas().nth(index) else {
            return;
        };
        let waypoints = self
            .graph
            .get_path(position, area.center(), body.shape().bounding_radius());
        if !waypoints.is_empty() {
            self.wandering = Duration::ZERO;
            self.commands.push(Command::SetWaypoints {
                character: player,
                waypoints,
            });
        }
    }
}

fn armed(store: &ConfigStore, actor: &ActorConfig, fallback: &str) -> Character {
    let character = store.character(actor);
    if actor.weapon.is_some() {
        return character;
    }
    character.with_weapon(WeaponConfig::default().build(fallback))
}

fn wants(state: &Character, item: &Item) -> bool {
    match item.kind() {
        ItemKind::Weapon(weapon) => state
            .weapon()
            .map_or(true, |held| weapon.damage() > held.damage()),
        ItemKind::Gadget(_) => state.gadget().is_none(),
    }
}

fn visible_hostile(world: &World, player: EntityId, position: Vec2, range: f32) -> Option<Vec2> {
    let (_, state) = world.character(player)?;
    world
        .characters_except(player, VISION_DISTANCE.min(range))
        .into_iter()
        .filter_map(|id| world.character(id))
        .filter(|(_, other)| state.is_hostile_to(other))
        .map(|(body, _)| body.position())
        .filter(|at| world.raycast(position, *at))
        .min_by(|a, b| a.distance(position).total_cmp(&b.distance(position)))
}

fn load_texture(assets: &Path, name: &str) -> anyhow::Result<Texture> {
    let path = assets.join(format!("{name}.rgba"));
    let bytes = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let side = TILE_SIZE as u32;
    Ok(Texture::from_rgba(side, side, bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(seed: u64) -> Session {
        Session::new(
            ConfigStore::new(),
            Some(seed),
            Duration::from_millis(16),
            PathBuf::from("no-such-assets"),
        )
    }

    #[test]
    fn player_starts_on_generated_floor() {
        let session = session(3);
        let position = session.player_position().expect("player is alive");
        assert_eq!(
            session.generator.tile_kind(CellCoord::containing(position)),
            Some(catacomb_core::TileKind::Floor)
        );
        assert!(session.report.chunks > 0);
        assert!(session.graph.area_at(position).is_some());
    }

    #[test]
    fn seeded_sessions_replay_identically() {
        let first = session(11).run(240);
        let second = session(11).run(240);
        assert_eq!(first, second, "replay diverged between runs");
        assert!(first.ticks > 0);
    }

    #[test]
    fn missing_textures_become_placeholders() {
        let report = session(5).run(1);
        assert!(report.textures >= 1);
        assert_eq!(report.textures, report.placeholders);
    }

    #[test]
    fn report_summarises_counters() {
        let report = Report {
            ticks: 10,
            kills: 2,
            player_alive: true,
            ..Report::default()
        };
        let line = report.to_string();
        assert!(line.starts_with("10 ticks"));
        assert!(line.contains("2 killed"));
        assert!(line.ends_with("player alive"));
    }
}
