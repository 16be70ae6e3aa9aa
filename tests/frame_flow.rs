//! Whole-frame pipeline driven with plain values, no Bevy app.

use std::path::Path;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use dungeon_combat::combat::{
    load_weapon_definitions, CombatConfig, CombatManager, Projectile, ProjectileOwner,
    ProjectileVariant, RangedProfile, Weapon, WeaponDefinition,
};
use dungeon_combat::core::{Feedback, SoundCue};
use dungeon_combat::physics::ActorId;
use dungeon_combat::npc::{load_npc_definitions, AiKind, Npc, NpcDefinition};
use dungeon_combat::player::Player;
use dungeon_combat::world::{load_room_definitions, CollisionWorld, TileGrid};

const DT: f32 = 1.0 / 60.0;

struct Scene {
    world: CollisionWorld,
    manager: CombatManager,
    player: Player,
    npcs: Vec<Npc>,
    rng: StdRng,
}

impl Scene {
    fn new(player: Player, npcs: Vec<Npc>) -> Self {
        let mut world = CollisionWorld::new(32.0);
        world.build_from_tiles(&TileGrid::from_rows(
            &[
                "############",
                "#..........#",
                "#..........#",
                "#..........#",
                "#..........#",
                "############",
            ],
            |c| c == '#',
        ));

        let mut manager = CombatManager::new(CombatConfig::default());
        manager.set_world_bounds(world.play_area());

        let mut player = player;
        player.actor = world.register_player(&player);
        let mut npcs = npcs;
        for npc in npcs.iter_mut() {
            npc.actor = world.register_npc(npc);
        }

        Self {
            world,
            manager,
            player,
            npcs,
            rng: StdRng::seed_from_u64(11),
        }
    }

    /// Physics, contacts, actors, resolve, feedback.
    fn frame(&mut self) -> Vec<Feedback> {
        let contacts = self.world.step(DT);
        {
            let mut npcs: Vec<&mut Npc> = self.npcs.iter_mut().collect();
            self.manager.dispatch_contacts(
                &contacts,
                &mut self.world,
                &mut npcs,
                Some(&mut self.player),
            );
        }

        let obstacles = self.world.nearby_obstacles(self.player.visual_center());
        if let Some(shot) = self.player.update(DT, &obstacles, &mut self.manager) {
            self.manager.spawn_projectile(shot, &mut self.world);
        }
        self.world.update_player_position(&self.player);

        let target = (!self.player.is_defeated()).then(|| self.player.visual_center());
        for npc in self.npcs.iter_mut() {
            let obstacles = self.world.nearby_obstacles(npc.center());
            if let Some(shot) = npc.update(DT, target, &obstacles, &mut self.rng) {
                self.manager.spawn_projectile(shot, &mut self.world);
            }
            self.world.update_npc_position(npc);
        }

        {
            let mut npcs: Vec<&mut Npc> = self.npcs.iter_mut().collect();
            self.manager
                .update(DT, &mut self.world, &mut npcs, Some(&mut self.player));
        }

        let world = &mut self.world;
        self.npcs.retain(|npc| {
            if !npc.health.is_ready_to_remove() {
                return true;
            }
            if let Some(id) = npc.actor {
                world.unregister(id);
            }
            false
        });

        self.manager.take_feedback()
    }
}

fn statue(max_health: f32, weapon: WeaponDefinition, position: Vec2) -> Npc {
    let definition = NpcDefinition {
        name: "Statue".to_string(),
        max_health,
        speed: 0.0,
        chase_speed: 0.0,
        ai: AiKind::Wander,
        attack_range: 40.0,
        attack_cooldown: 0.6,
        ..Default::default()
    };
    Npc::from_definition("statue", &definition, Weapon::from_definition(&weapon), position)
}

fn crossbow() -> WeaponDefinition {
    WeaponDefinition {
        name: "Crossbow".to_string(),
        damage: 3.0,
        length: 16.0,
        ranged: Some(RangedProfile {
            variant: ProjectileVariant::Arrow,
            speed: 220.0,
            damage_scale: 1.0,
        }),
        ..Default::default()
    }
}

#[test]
fn arrow_crosses_the_room_and_wounds_an_npc() {
    let player = Player::new(Vec2::new(64.0, 64.0), Weapon::from_definition(&crossbow()));
    // Feet box of the NPC straddles the arrow's flight line at y = 80.
    let npc = statue(6.0, WeaponDefinition::default(), Vec2::new(224.0, 52.0));
    let mut scene = Scene::new(player, vec![npc]);

    scene.player.intent.fire = true;
    let mut feedback = Vec::new();
    for _ in 0..90 {
        feedback.extend(scene.frame());
    }

    assert_eq!(scene.npcs.len(), 1);
    assert!(scene.npcs[0].health.current() < 6.0);
    assert!(feedback
        .iter()
        .any(|f| matches!(f, Feedback::DamageNumber { .. })));
    assert!(scene.manager.projectiles().is_empty());
}

#[test]
fn stationary_swordsman_wears_the_player_down() {
    let sword = WeaponDefinition {
        name: "Long Sword".to_string(),
        damage: 4.0,
        length: 30.0,
        ..Default::default()
    };
    let player = Player::new(Vec2::new(96.0, 64.0), Weapon::from_definition(&crossbow()));
    let npc = statue(50.0, sword, Vec2::new(116.0, 64.0));
    let mut scene = Scene::new(player, vec![npc]);

    let mut feedback = Vec::new();
    for _ in 0..600 {
        feedback.extend(scene.frame());
        if scene.player.is_defeated() {
            break;
        }
    }

    assert!(scene.player.is_defeated());
    assert_eq!(scene.player.health, 0.0);
    let defeats = feedback
        .iter()
        .filter(|f| matches!(f, Feedback::PlayerDefeated))
        .count();
    assert_eq!(defeats, 1);
}

#[test]
fn npc_fireball_on_a_wall_spares_the_npc_beside_it() {
    let player = Player::new(Vec2::new(300.0, 100.0), Weapon::from_definition(&crossbow()));
    // Feet box centered at (56, 66), one tile below the top wall.
    let bystander = statue(1.0, WeaponDefinition::default(), Vec2::new(40.0, 40.0));
    let mut scene = Scene::new(player, vec![bystander]);

    let fireball = Projectile::new(
        Vec2::new(72.0, 70.0),
        Vec2::new(0.0, -200.0),
        6.0,
        ProjectileOwner::Npc(ActorId(1000)),
        ProjectileVariant::Fireball,
    );
    assert!(scene.manager.spawn_projectile(fireball, &mut scene.world).is_some());

    let mut feedback = Vec::new();
    for _ in 0..60 {
        feedback.extend(scene.frame());
    }

    assert!(feedback
        .iter()
        .any(|f| matches!(f, Feedback::Explosion { .. })));
    assert!(scene.manager.projectiles().is_empty());
    assert_eq!(scene.npcs.len(), 1);
    assert_eq!(scene.npcs[0].health.current(), 1.0);
    assert_eq!(scene.manager.score(), 0);
    assert_eq!(scene.player.weapon.experience(), 0);
    assert!(!feedback.iter().any(|f| matches!(f, Feedback::Score { .. })));
}

#[test]
fn bullet_ricochets_off_one_wall_and_breaks_on_the_next() {
    let player = Player::new(Vec2::new(300.0, 100.0), Weapon::from_definition(&crossbow()));
    let mut scene = Scene::new(player, Vec::new());

    let bullet = Projectile::new(
        Vec2::new(200.0, 90.0),
        Vec2::new(0.0, -200.0),
        2.0,
        ProjectileOwner::Player,
        ProjectileVariant::Bullet,
    );
    assert!(scene.manager.spawn_projectile(bullet, &mut scene.world).is_some());

    let mut feedback = Vec::new();
    let mut bounced = false;
    for _ in 0..240 {
        feedback.extend(scene.frame());
        if let Some(bullet) = scene.manager.projectiles().first() {
            if bullet.has_ricocheted {
                bounced = true;
                assert!(bullet.velocity.y > 0.0, "bullet should head back down");
            }
        }
    }

    assert!(bounced);
    let ricochets = feedback
        .iter()
        .filter(|f| matches!(f, Feedback::Sound(SoundCue::Ricochet)))
        .count();
    assert_eq!(ricochets, 1);
    assert!(scene.manager.projectiles().is_empty());
    assert!(feedback
        .iter()
        .any(|f| matches!(f, Feedback::ProjectileMiss { .. })));
}

#[test]
fn bundled_data_is_consistent() {
    let rooms = load_room_definitions(Path::new("assets/data/rooms"));
    let npcs = load_npc_definitions(Path::new("assets/data/npcs"));
    let weapons = load_weapon_definitions(Path::new("assets/data/weapons"));

    let crypt = rooms.get("crypt").expect("crypt room");
    assert!(!crypt.npc_spawns().is_empty());
    for spawn in crypt.npc_spawns() {
        assert!(
            npcs.get(&spawn.npc_type).is_ok(),
            "unknown npc {}",
            spawn.npc_type
        );
    }
    for definition in npcs.definitions.values() {
        assert!(
            weapons.get(&definition.weapon).is_ok(),
            "unknown weapon {}",
            definition.weapon
        );
    }
}
