//! Combat manager - the per-frame arbiter of damage.
//!
//! Owns every projectile in flight plus the global cooldowns. It never
//! draws or plays anything; effects are queued as [`Feedback`] and drained
//! by the plugin layer.

use bevy::prelude::*;

use super::components::{
    CombatConfig, Explosion, PendingHit, Projectile, ProjectileOwner, WallResponse,
};
use super::geometry::{polygons_intersect, rect_polygon};
use crate::core::{Feedback, SoundCue};
use crate::npc::{DamageOutcome, Npc};
use crate::physics::{ActorId, ActorKind, CollisionActor, ContactEvent};
use crate::player::Player;
use crate::world::CollisionWorld;

#[derive(Resource, Debug)]
pub struct CombatManager {
    config: CombatConfig,
    attack_cooldown_timer: f32,
    player_immunity_timer: f32,
    projectiles: Vec<Projectile>,
    world_bounds: Rect,
    pending_explosions: Vec<Explosion>,
    pending_weapon_xp: u32,
    score: u32,
    feedback: Vec<Feedback>,
}

impl FromWorld for CombatManager {
    fn from_world(world: &mut World) -> Self {
        let config = world
            .get_resource::<CombatConfig>()
            .cloned()
            .unwrap_or_default();
        Self::new(config)
    }
}

impl CombatManager {
    pub fn new(config: CombatConfig) -> Self {
        Self {
            config,
            attack_cooldown_timer: 0.0,
            player_immunity_timer: 0.0,
            projectiles: Vec::new(),
            world_bounds: Rect::default(),
            pending_explosions: Vec::new(),
            pending_weapon_xp: 0,
            score: 0,
            feedback: Vec::new(),
        }
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn set_world_bounds(&mut self, bounds: Rect) {
        self.world_bounds = bounds;
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn projectile(&self, id: ActorId) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.actor == Some(id))
    }

    pub fn pending_explosions(&self) -> &[Explosion] {
        &self.pending_explosions
    }

    // --- cooldown ---

    pub fn can_attack(&self) -> bool {
        self.attack_cooldown_timer <= 0.0
    }

    pub fn start_cooldown(&mut self) {
        self.attack_cooldown_timer = self.config.attack_cooldown;
    }

    pub fn is_player_immune(&self) -> bool {
        self.player_immunity_timer > 0.0
    }

    pub fn push_feedback(&mut self, feedback: Feedback) {
        self.feedback.push(feedback);
    }

    /// Drain queued feedback, oldest first.
    pub fn take_feedback(&mut self) -> Vec<Feedback> {
        std::mem::take(&mut self.feedback)
    }

    /// Register a projectile with the collision world and start tracking it.
    pub fn spawn_projectile(
        &mut self,
        mut projectile: Projectile,
        world: &mut CollisionWorld,
    ) -> Option<ActorId> {
        let id = world.register_projectile(&projectile)?;
        projectile.actor = Some(id);
        self.projectiles.push(projectile);
        Some(id)
    }

    // --- damage ---

    /// Damage the player unless still immune. Returns true if damage landed.
    pub fn try_damage_player(&mut self, player: &mut Player, damage: f32) -> bool {
        if self.is_player_immune() || player.is_defeated() {
            return false;
        }
        self.player_immunity_timer = self.config.player_immunity;

        let defeated = player.apply_damage(damage);
        self.feedback.push(Feedback::DamageNumber {
            position: player.visual_center(),
            amount: damage,
        });
        self.feedback.push(Feedback::Sound(SoundCue::PlayerHurt));
        if defeated {
            info!("Player defeated");
            self.feedback.push(Feedback::PlayerDefeated);
        }
        true
    }

    /// Damage an NPC and push it back. Returns true if this hit defeated it.
    ///
    /// A hit during the NPC's own hit cooldown does nothing at all.
    pub fn handle_npc_hit(&mut self, npc: &mut Npc, damage: f32, knockback: Vec2) -> bool {
        let outcome = npc.health.take_damage(damage, self.config.stun_duration);
        if outcome == DamageOutcome::Ignored {
            return false;
        }

        npc.movement
            .apply_knockback(knockback, self.config.knockback_duration);
        self.feedback.push(Feedback::DamageNumber {
            position: npc.center(),
            amount: damage,
        });

        if outcome == DamageOutcome::Defeated {
            info!("{} defeated", npc.npc_type);
            self.score += npc.score_value;
            self.pending_weapon_xp += self.config.weapon_xp_per_kill;
            self.feedback.push(Feedback::Sound(SoundCue::NpcDefeated));
            self.feedback.push(Feedback::Score {
                points: npc.score_value,
            });
            return true;
        }

        self.feedback.push(Feedback::Sound(SoundCue::NpcHurt));
        false
    }

    // --- projectile responses ---

    /// Player projectile meets a live NPC.
    pub fn handle_projectile_npc_collision(&mut self, projectile: &mut Projectile, npc: &mut Npc) {
        if !projectile.is_owned_by_player() || !npc.is_alive() || !projectile.can_collide {
            return;
        }
        let Some(npc_id) = npc.actor else {
            return;
        };
        projectile.mark_resolved(npc_id);

        let knockback = (npc.bounds().center() - projectile.position).normalize_or_zero()
            * self.config.projectile_knockback;
        self.handle_npc_hit(npc, projectile.damage, knockback);

        if projectile.variant.wall_response() == WallResponse::Explode {
            self.queue_explosion(projectile, Some(npc_id));
        }
        if !projectile.variant.is_penetrating() {
            projectile.deactivate();
        }
    }

    /// NPC projectile meets the player.
    pub fn handle_projectile_player_collision(
        &mut self,
        projectile: &mut Projectile,
        player: &mut Player,
    ) {
        if projectile.is_owned_by_player() || player.is_defeated() || !projectile.can_collide {
            return;
        }
        if let Some(id) = player.actor {
            projectile.mark_resolved(id);
        }

        if player.is_blocking {
            self.feedback.push(Feedback::Blocked {
                position: projectile.position,
            });
            self.feedback.push(Feedback::Sound(SoundCue::Blocked));
            projectile.deactivate();
            return;
        }

        self.try_damage_player(player, projectile.damage);
        if projectile.variant.wall_response() == WallResponse::Explode {
            self.queue_explosion(projectile, player.actor);
        }
        if !projectile.variant.is_penetrating() {
            projectile.deactivate();
        }
    }

    /// Projectile meets a wall or chest.
    pub fn handle_projectile_wall_collision(
        &mut self,
        projectile: &mut Projectile,
        wall: ActorId,
        penetration: Vec2,
    ) {
        if !projectile.can_collide {
            return;
        }
        projectile.mark_resolved(wall);

        match projectile.variant.wall_response() {
            WallResponse::Ricochet if !projectile.has_ricocheted => {
                let reflected = match penetration.try_normalize() {
                    Some(normal) => projectile.velocity.reject_from_normalized(normal)
                        - projectile.velocity.project_onto_normalized(normal),
                    None => -projectile.velocity,
                };
                projectile.velocity = reflected * self.config.ricochet_retention;
                projectile.has_ricocheted = true;
                self.feedback.push(Feedback::Sound(SoundCue::Ricochet));
            }
            WallResponse::Explode => {
                self.queue_explosion(projectile, None);
                projectile.deactivate();
            }
            WallResponse::Ricochet | WallResponse::Destroy => projectile.deactivate(),
        }
    }

    fn queue_explosion(&mut self, projectile: &Projectile, spared: Option<ActorId>) {
        self.pending_explosions.push(Explosion {
            position: projectile.position,
            radius: self.config.explosion_radius,
            damage: projectile.damage * self.config.explosion_damage_factor,
            owner: projectile.owner,
            spared,
        });
    }

    // --- contact dispatch ---

    /// Deliver this step's contacts to every actor's hook, then resolve the
    /// hits the projectiles queued.
    ///
    /// NPCs and the player first take the positions the solver settled them
    /// at, so bodies pushed apart stay apart.
    pub fn dispatch_contacts(
        &mut self,
        contacts: &[ContactEvent],
        world: &mut CollisionWorld,
        npcs: &mut [&mut Npc],
        mut player: Option<&mut Player>,
    ) {
        settle_actors(world, npcs, player.as_deref_mut());

        for contact in contacts {
            let partner = contact.partner();
            match contact.actor_kind {
                ActorKind::Wall | ActorKind::Chest => world.deliver_scenery_contact(contact),
                ActorKind::Projectile => {
                    if let Some(projectile) = self
                        .projectiles
                        .iter_mut()
                        .find(|p| p.actor == Some(contact.actor))
                    {
                        projectile.on_collision(partner, contact.penetration);
                    }
                }
                ActorKind::Npc => {
                    if let Some(npc) = npcs.iter_mut().find(|n| n.actor == Some(contact.actor)) {
                        npc.on_collision(partner, contact.penetration);
                    }
                }
                ActorKind::Player => {
                    if let Some(player) = player.as_deref_mut() {
                        if player.actor == Some(contact.actor) {
                            player.on_collision(partner, contact.penetration);
                        }
                    }
                }
            }
        }

        self.resolve_projectile_hits(world, npcs, player);
    }

    /// Apply the responses for every queued projectile hit, then retire
    /// projectiles that stopped.
    pub fn resolve_projectile_hits(
        &mut self,
        world: &mut CollisionWorld,
        npcs: &mut [&mut Npc],
        mut player: Option<&mut Player>,
    ) {
        let mut projectiles = std::mem::take(&mut self.projectiles);

        for projectile in projectiles.iter_mut() {
            for PendingHit {
                partner,
                penetration,
            } in projectile.take_pending_hits()
            {
                if !projectile.can_collide {
                    break;
                }
                match partner.kind {
                    ActorKind::Npc => {
                        if let Some(npc) = npcs.iter_mut().find(|n| n.actor == Some(partner.id)) {
                            self.handle_projectile_npc_collision(projectile, npc);
                        }
                    }
                    ActorKind::Player => {
                        if let Some(player) = player.as_deref_mut() {
                            self.handle_projectile_player_collision(projectile, player);
                        }
                    }
                    ActorKind::Wall | ActorKind::Chest => {
                        self.handle_projectile_wall_collision(projectile, partner.id, penetration);
                    }
                    ActorKind::Projectile => {}
                }
            }
        }

        // Anything spawned while resolving goes after the existing ones.
        projectiles.append(&mut self.projectiles);
        self.projectiles = projectiles;
        self.retire_projectiles(world);
    }

    /// Unregister every projectile that is inactive or out of bounds.
    fn retire_projectiles(&mut self, world: &mut CollisionWorld) {
        let bounds = self.world_bounds;
        let (kept, retired): (Vec<Projectile>, Vec<Projectile>) =
            std::mem::take(&mut self.projectiles)
                .into_iter()
                .partition(|p| p.is_active && (bounds.is_empty() || bounds.contains(p.position)));
        self.projectiles = kept;

        for projectile in retired {
            if let Some(id) = projectile.actor {
                world.unregister(id);
            }
            // Still active here means it flew out of the room untouched.
            if projectile.is_active {
                self.feedback.push(Feedback::Sound(SoundCue::ProjectileMiss));
            }
            self.feedback.push(Feedback::ProjectileMiss {
                position: projectile.position,
                variant: projectile.variant,
            });
        }
    }

    // --- per frame ---

    /// One combat tick. Runs after actors have moved and swung, so every
    /// hit polygon is current.
    pub fn update(
        &mut self,
        dt: f32,
        world: &mut CollisionWorld,
        npcs: &mut [&mut Npc],
        mut player: Option<&mut Player>,
    ) {
        // Timers may dip below zero; `<= 0` means ready.
        self.attack_cooldown_timer -= dt;
        self.player_immunity_timer -= dt;

        for projectile in self.projectiles.iter_mut().filter(|p| p.is_active) {
            projectile.advance(dt);
            world.update_projectile_position(projectile);
        }
        self.retire_projectiles(world);

        self.apply_explosions(npcs, player.as_deref_mut());

        if let Some(player) = player.as_deref_mut() {
            self.resolve_npc_melee(npcs, player);
            self.resolve_player_melee(npcs, player);

            if self.pending_weapon_xp > 0 {
                let amount = std::mem::take(&mut self.pending_weapon_xp);
                let leveled_up = player.weapon.gain_experience(amount);
                if leveled_up {
                    info!("{} reached level {}", player.weapon.name, player.weapon.level());
                }
                self.feedback
                    .push(Feedback::WeaponExperience { amount, leveled_up });
            }
        }
    }

    fn apply_explosions(&mut self, npcs: &mut [&mut Npc], mut player: Option<&mut Player>) {
        for explosion in std::mem::take(&mut self.pending_explosions) {
            self.feedback.push(Feedback::Explosion {
                position: explosion.position,
                radius: explosion.radius,
            });
            self.feedback.push(Feedback::Sound(SoundCue::Explosion));

            match explosion.owner {
                ProjectileOwner::Player => self.explode_on_npcs(&explosion, npcs),
                ProjectileOwner::Npc(_) => {
                    if let Some(player) = player.as_deref_mut() {
                        self.explode_on_player(&explosion, player);
                    }
                }
            }
        }
    }

    fn explode_on_npcs(&mut self, explosion: &Explosion, npcs: &mut [&mut Npc]) {
        for npc in npcs.iter_mut() {
            if !npc.is_alive() || (npc.actor.is_some() && npc.actor == explosion.spared) {
                continue;
            }
            let offset = npc.bounds().center() - explosion.position;
            if offset.length() > explosion.radius {
                continue;
            }
            let knockback = offset.normalize_or_zero() * self.config.projectile_knockback;
            self.handle_npc_hit(npc, explosion.damage, knockback);
        }
    }

    fn explode_on_player(&mut self, explosion: &Explosion, player: &mut Player) {
        if player.actor.is_some() && player.actor == explosion.spared {
            return;
        }
        if player.bounds().center().distance(explosion.position) > explosion.radius {
            return;
        }
        if player.is_blocking {
            self.feedback.push(Feedback::Blocked {
                position: explosion.position,
            });
            return;
        }
        self.try_damage_player(player, explosion.damage);
    }

    /// NPC swings against the player, once per swing.
    fn resolve_npc_melee(&mut self, npcs: &mut [&mut Npc], player: &mut Player) {
        let target = rect_polygon(player.bounds());
        for npc in npcs.iter_mut() {
            if !npc.is_alive() || !npc.combat.check_player_hit(&npc.weapon) {
                continue;
            }
            if polygons_intersect(npc.weapon.hit_polygon(), &target) {
                npc.combat.register_hit();
                self.try_damage_player(player, npc.weapon.damage());
            }
        }
    }

    /// The player's swing against every live NPC.
    fn resolve_player_melee(&mut self, npcs: &mut [&mut Npc], player: &mut Player) {
        if !player.weapon.is_slashing() || player.is_defeated() {
            return;
        }
        let origin = player.visual_center();
        for npc in npcs.iter_mut() {
            let Some(id) = npc.actor else {
                continue;
            };
            if !npc.is_alive() {
                continue;
            }
            let target = rect_polygon(npc.bounds());
            if !polygons_intersect(player.weapon.hit_polygon(), &target) {
                continue;
            }
            if !player.weapon.mark_struck(id) {
                continue;
            }
            let knockback =
                (npc.bounds().center() - origin).normalize_or_zero() * self.config.melee_knockback;
            self.handle_npc_hit(npc, player.weapon.damage(), knockback);
        }
    }

    /// Forget everything tied to the current room.
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }
}

/// Copy solver positions back onto the moving actors.
fn settle_actors(world: &CollisionWorld, npcs: &mut [&mut Npc], player: Option<&mut Player>) {
    for npc in npcs.iter_mut() {
        if let Some(position) = npc
            .actor
            .and_then(|id| world.settled_position(id, &npc.hitbox))
        {
            npc.position = position;
        }
    }
    if let Some(player) = player {
        if let Some(position) = player
            .actor
            .and_then(|id| world.settled_position(id, &player.hitbox))
        {
            player.position = position;
        }
    }
}
