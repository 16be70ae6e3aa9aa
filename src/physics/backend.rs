//! Solver boundary.
//!
//! [`PhysicsBackend`] is the only surface the bridge talks to. Everything it
//! exchanges is in simulation meters and uses crate-owned handle types, so a
//! different solver can be dropped in without touching gameplay code.

use bevy::log::debug;
use bevy::math::Vec2;
use bevy_rapier2d::rapier::prelude::*;

use super::actor::KinematicClass;

/// Opaque handle to a solver body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl BodyHandle {
    pub const fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

/// Description of a box body to create, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub center: Vec2,
    pub half_extents: Vec2,
    pub class: KinematicClass,
}

/// One overlapping pair found during a step.
///
/// `penetration` points from `body_a` into `body_b`, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawContact {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub penetration: Vec2,
}

/// Narrow interface over a rigid-body solver.
pub trait PhysicsBackend {
    fn add_body(&mut self, desc: &BodyDesc) -> BodyHandle;

    /// Returns false if the body did not exist.
    fn remove_body(&mut self, handle: BodyHandle) -> bool;

    /// Move a body's center. Kinematic bodies get there during the next step.
    fn set_body_position(&mut self, handle: BodyHandle, center: Vec2);

    fn body_position(&self, handle: BodyHandle) -> Option<Vec2>;

    /// Advance the simulation and append every penetrating pair to `contacts`.
    fn step(&mut self, dt: f32, contacts: &mut Vec<RawContact>);

    /// Drop every body.
    fn clear(&mut self);
}

/// Rapier-backed solver for a top-down world (no gravity, no rotation).
pub struct RapierBackend {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_params: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl Default for RapierBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RapierBackend {
    pub fn new() -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![0.0, 0.0],
            integration_params: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    fn to_rapier(handle: BodyHandle) -> RigidBodyHandle {
        RigidBodyHandle::from_raw_parts(handle.index, handle.generation)
    }

    fn from_rapier(handle: RigidBodyHandle) -> BodyHandle {
        let (index, generation) = handle.into_raw_parts();
        BodyHandle::from_raw_parts(index, generation)
    }

    fn body_of_collider(&self, collider: ColliderHandle) -> Option<RigidBodyHandle> {
        self.collider_set.get(collider).and_then(|c| c.parent())
    }
}

impl PhysicsBackend for RapierBackend {
    fn add_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let translation = vector![desc.center.x, desc.center.y];
        let body = match desc.class {
            KinematicClass::Static => RigidBodyBuilder::fixed().translation(translation),
            KinematicClass::Kinematic => {
                RigidBodyBuilder::kinematic_position_based().translation(translation)
            }
            KinematicClass::Dynamic => RigidBodyBuilder::dynamic()
                .translation(translation)
                .lock_rotations()
                .linear_damping(8.0),
        }
        .build();

        let handle = self.rigid_body_set.insert(body);

        // Projectiles are kinematic and still have to report wall contacts.
        let collider = ColliderBuilder::cuboid(desc.half_extents.x, desc.half_extents.y)
            .active_collision_types(
                ActiveCollisionTypes::default() | ActiveCollisionTypes::KINEMATIC_FIXED,
            )
            .friction(0.0)
            .build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);

        Self::from_rapier(handle)
    }

    fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.rigid_body_set
            .remove(
                Self::to_rapier(handle),
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .is_some()
    }

    fn set_body_position(&mut self, handle: BodyHandle, center: Vec2) {
        let Some(body) = self.rigid_body_set.get_mut(Self::to_rapier(handle)) else {
            return;
        };
        let translation = vector![center.x, center.y];
        if body.is_kinematic() {
            body.set_next_kinematic_translation(translation);
        } else {
            body.set_translation(translation, true);
            body.set_linvel(vector![0.0, 0.0], true);
        }
    }

    fn body_position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.rigid_body_set
            .get(Self::to_rapier(handle))
            .map(|body| Vec2::new(body.translation().x, body.translation().y))
    }

    fn step(&mut self, dt: f32, contacts: &mut Vec<RawContact>) {
        if dt <= 0.0 {
            return;
        }
        self.integration_params.dt = dt;

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );

        // The step is over; only now read back what overlapped.
        for pair in self.narrow_phase.contact_pairs() {
            let mut deepest: Option<(Real, Vector<Real>)> = None;
            for manifold in &pair.manifolds {
                for point in &manifold.points {
                    if point.dist < 0.0 && deepest.map_or(true, |(dist, _)| point.dist < dist) {
                        deepest = Some((point.dist, manifold.data.normal));
                    }
                }
            }
            let Some((dist, normal)) = deepest else {
                continue;
            };

            let (Some(body_a), Some(body_b)) = (
                self.body_of_collider(pair.collider1),
                self.body_of_collider(pair.collider2),
            ) else {
                continue;
            };

            contacts.push(RawContact {
                body_a: Self::from_rapier(body_a),
                body_b: Self::from_rapier(body_b),
                penetration: Vec2::new(normal.x, normal.y) * -dist,
            });
        }
    }

    fn clear(&mut self) {
        debug!("Clearing {} physics bodies", self.rigid_body_set.len());
        *self = Self::new();
    }
}
