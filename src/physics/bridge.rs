//! Physics bridge - owns the solver and the actor <-> body registry.
//!
//! Contact delivery is two-phase. [`PhysicsBridge::step`] holds `&mut self`
//! for the whole solver step and only returns the collected
//! [`ContactEvent`]s afterwards, so no collision hook can add or remove
//! bodies while the solver is mid-step.

use std::collections::HashMap;

use bevy::prelude::*;

use super::actor::{ActorId, ActorKind, CollisionActor, ContactPartner};
use super::backend::{BodyDesc, BodyHandle, PhysicsBackend, RapierBackend, RawContact};
use super::registry::ActorRegistry;
use super::units::{to_meters, to_pixels};
use crate::core::CombatError;

/// Contact as seen from one actor of a pair.
///
/// Every overlapping pair yields two events, one per direction, with the
/// penetration vector negated for the second.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ContactEvent {
    pub actor: ActorId,
    pub actor_kind: ActorKind,
    pub other: ActorId,
    pub other_kind: ActorKind,
    /// Display-space penetration of `actor` into `other`.
    pub penetration: Vec2,
}

impl ContactEvent {
    pub fn partner(&self) -> ContactPartner {
        ContactPartner {
            id: self.other,
            kind: self.other_kind,
        }
    }
}

/// What the bridge remembers about a registered actor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorRecord {
    pub id: ActorId,
    pub kind: ActorKind,
    /// Display-space bounds, synced from the body after every step.
    pub bounds: Rect,
}

/// One simulation instance plus the bookkeeping that ties it to gameplay.
pub struct PhysicsBridge<B: PhysicsBackend = RapierBackend> {
    backend: B,
    registry: ActorRegistry<BodyHandle>,
    records: HashMap<ActorId, ActorRecord>,
    next_id: u32,
    raw_contacts: Vec<RawContact>,
}

impl Default for PhysicsBridge<RapierBackend> {
    fn default() -> Self {
        Self::new(RapierBackend::new())
    }
}

impl<B: PhysicsBackend> PhysicsBridge<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            registry: ActorRegistry::new(),
            records: HashMap::new(),
            next_id: 0,
            raw_contacts: Vec::new(),
        }
    }

    /// Create a body for an actor.
    ///
    /// Zero-area bounds create nothing and return `None`, as does a body
    /// handle the registry refuses to link.
    pub fn add_actor(&mut self, actor: &dyn CollisionActor) -> Option<ActorId> {
        match self.try_add_actor(actor) {
            Ok(id) => Some(id),
            Err(err) => {
                warn!("Skipping {:?} registration: {}", actor.kind(), err);
                None
            }
        }
    }

    fn try_add_actor(&mut self, actor: &dyn CollisionActor) -> Result<ActorId, CombatError> {
        let bounds = actor.calculate_initial_bounds();
        let size = bounds.size();
        if size.x <= 0.0 || size.y <= 0.0 {
            return Err(CombatError::PhysicsBodyCreationFailure {
                width: size.x,
                height: size.y,
            });
        }

        let kind = actor.kind();
        let body = self.backend.add_body(&BodyDesc {
            center: to_meters(bounds.center()),
            half_extents: to_meters(bounds.half_size()),
            class: kind.kinematic_class(),
        });

        let id = ActorId(self.next_id);
        self.next_id += 1;

        // Both maps and the record move together.
        if !self.registry.insert(id, body) {
            self.backend.remove_body(body);
            return Err(CombatError::BodyAlreadyLinked(id));
        }
        self.records.insert(id, ActorRecord { id, kind, bounds });
        Ok(id)
    }

    /// Destroy an actor's body. Unknown actors are ignored.
    pub fn remove_actor(&mut self, id: ActorId) -> bool {
        let Some(body) = self.registry.remove_actor(id) else {
            debug!("{}", CombatError::StaleActorReference(id));
            return false;
        };
        self.records.remove(&id);
        self.backend.remove_body(body);
        true
    }

    /// Move an actor so its bounds start at `top_left`.
    pub fn update_actor_position(&mut self, id: ActorId, top_left: Vec2) -> bool {
        let (Some(body), Some(record)) = (self.registry.body_of(id), self.records.get_mut(&id))
        else {
            return false;
        };
        let size = record.bounds.size();
        record.bounds = Rect::from_corners(top_left, top_left + size);
        self.backend
            .set_body_position(body, to_meters(record.bounds.center()));
        true
    }

    /// Advance the simulation, sync bounds back from the bodies, and return
    /// the contacts of this step in both directions.
    pub fn step(&mut self, dt: f32) -> Vec<ContactEvent> {
        let mut raw = std::mem::take(&mut self.raw_contacts);
        raw.clear();
        self.backend.step(dt, &mut raw);

        for (id, record) in self.records.iter_mut() {
            let Some(center) = self
                .registry
                .body_of(*id)
                .and_then(|body| self.backend.body_position(body))
            else {
                continue;
            };
            record.bounds = Rect::from_center_size(to_pixels(center), record.bounds.size());
        }

        let mut events = Vec::with_capacity(raw.len() * 2);
        for contact in &raw {
            let (Some(a), Some(b)) = (
                self.registry.actor_of(contact.body_a),
                self.registry.actor_of(contact.body_b),
            ) else {
                continue;
            };
            let (Some(record_a), Some(record_b)) = (self.records.get(&a), self.records.get(&b))
            else {
                continue;
            };
            let penetration = to_pixels(contact.penetration);
            events.push(ContactEvent {
                actor: a,
                actor_kind: record_a.kind,
                other: b,
                other_kind: record_b.kind,
                penetration,
            });
            events.push(ContactEvent {
                actor: b,
                actor_kind: record_b.kind,
                other: a,
                other_kind: record_a.kind,
                penetration: -penetration,
            });
        }
        events.sort_by_key(|e| (e.actor, e.other));

        self.raw_contacts = raw;
        events
    }

    /// Actors whose bounds overlap `region`, in id order.
    pub fn query_aabb(&self, region: Rect) -> Vec<ActorId> {
        let mut hits: Vec<ActorId> = self
            .records
            .values()
            .filter(|record| !record.bounds.intersect(region).is_empty())
            .map(|record| record.id)
            .collect();
        hits.sort();
        hits
    }

    pub fn record(&self, id: ActorId) -> Option<&ActorRecord> {
        self.records.get(&id)
    }

    pub fn body_of(&self, id: ActorId) -> Option<BodyHandle> {
        self.registry.body_of(id)
    }

    pub fn actor_of(&self, body: BodyHandle) -> Option<ActorId> {
        self.registry.actor_of(body)
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.registry.contains(id)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn registry(&self) -> &ActorRegistry<BodyHandle> {
        &self.registry
    }

    /// Drop every actor and body. Ids are not reused.
    pub fn clear(&mut self) {
        self.registry.clear();
        self.records.clear();
        self.backend.clear();
    }
}
