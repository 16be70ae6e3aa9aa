//! Bidirectional actor <-> body registry.
//!
//! Both maps are only ever changed together, so they stay mutual inverses.

use std::collections::HashMap;
use std::hash::Hash;

use super::actor::ActorId;

/// Owned pair of inverse maps between actors and solver bodies.
#[derive(Debug, Clone)]
pub struct ActorRegistry<H> {
    actor_to_body: HashMap<ActorId, H>,
    body_to_actor: HashMap<H, ActorId>,
}

impl<H> Default for ActorRegistry<H> {
    fn default() -> Self {
        Self {
            actor_to_body: HashMap::new(),
            body_to_actor: HashMap::new(),
        }
    }
}

impl<H: Copy + Eq + Hash> ActorRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link an actor and a body. Refused if either side is already linked.
    pub fn insert(&mut self, actor: ActorId, body: H) -> bool {
        if self.actor_to_body.contains_key(&actor) || self.body_to_actor.contains_key(&body) {
            return false;
        }
        self.actor_to_body.insert(actor, body);
        self.body_to_actor.insert(body, actor);
        true
    }

    /// Unlink an actor, returning the body it owned.
    pub fn remove_actor(&mut self, actor: ActorId) -> Option<H> {
        let body = self.actor_to_body.remove(&actor)?;
        self.body_to_actor.remove(&body);
        Some(body)
    }

    pub fn body_of(&self, actor: ActorId) -> Option<H> {
        self.actor_to_body.get(&actor).copied()
    }

    pub fn actor_of(&self, body: H) -> Option<ActorId> {
        self.body_to_actor.get(&body).copied()
    }

    pub fn contains(&self, actor: ActorId) -> bool {
        self.actor_to_body.contains_key(&actor)
    }

    pub fn len(&self) -> usize {
        self.actor_to_body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actor_to_body.is_empty()
    }

    pub fn actors(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.actor_to_body.keys().copied()
    }

    pub fn clear(&mut self) {
        self.actor_to_body.clear();
        self.body_to_actor.clear();
    }

    /// True when every actor's body maps back to that actor and the sides
    /// have equal size.
    pub fn is_consistent(&self) -> bool {
        self.actor_to_body.len() == self.body_to_actor.len()
            && self
                .actor_to_body
                .iter()
                .all(|(actor, body)| self.body_to_actor.get(body) == Some(actor))
    }
}
