//! Rapier2D adapter specialized to the billiard table.
//!
//! Owns the full simulation: walls along the table quadrilateral, the
//! ball registry, fixed-timestep stepping, shot injection, and the
//! graduated braking that stands in for felt friction. All positions
//! at this layer are screen-space pixels.

use glam::Vec2;
use rapier2d::prelude::*;
use std::sync::Mutex;

use crate::config::Tuning;
use crate::table::perspective::TableGeometry;
use crate::table::rack::BallId;

// ---------------------------------------------------------------------------
// Conversion helpers (private) — glam ↔ nalgebra
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A contact between two balls, resolved to stable ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BallContact {
    pub a: BallId,
    pub b: BallId,
    /// `true` when the contact just started, `false` when it ended.
    pub started: bool,
}

impl BallContact {
    /// The non-cue side of a cue contact, if this contact involves the
    /// cue ball at all.
    pub fn cue_strike_target(&self) -> Option<BallId> {
        match (self.a.is_cue(), self.b.is_cue()) {
            (true, false) => Some(self.b),
            (false, true) => Some(self.a),
            _ => None,
        }
    }
}

struct BallBody {
    id: BallId,
    body: RigidBodyHandle,
    is_cue: bool,
}

// ---------------------------------------------------------------------------
// Event collector
// ---------------------------------------------------------------------------

struct DirectEventCollector {
    collisions: Mutex<Vec<CollisionEvent>>,
}

impl DirectEventCollector {
    fn new() -> Self {
        Self {
            collisions: Mutex::new(Vec::new()),
        }
    }

    fn drain_collisions(&self) -> Vec<CollisionEvent> {
        std::mem::take(&mut *self.collisions.lock().unwrap())
    }
}

impl EventHandler for DirectEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.collisions.lock().unwrap().push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
        // Not used; the trait requires this.
    }
}

// ---------------------------------------------------------------------------
// TableWorld
// ---------------------------------------------------------------------------

/// Wraps all Rapier2D boilerplate for one billiard table.
pub struct TableWorld {
    gravity: nalgebra::Vector2<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    event_collector: DirectEventCollector,
    geometry: TableGeometry,
    tuning: Tuning,
    walls: Vec<RigidBodyHandle>,
    balls: Vec<BallBody>,
}

impl TableWorld {
    /// Create a world with walls along the table edges. Gravity is
    /// zero: the view is top-down, so nothing pulls along the screen
    /// plane.
    pub fn new(geometry: TableGeometry, tuning: Tuning) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = tuning.fixed_dt;
        let mut world = Self {
            gravity: vec2_to_na(Vec2::ZERO),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            event_collector: DirectEventCollector::new(),
            geometry,
            tuning,
            walls: Vec::new(),
            balls: Vec::new(),
        };
        world.create_walls();
        world
    }

    /// Four static segment colliders along the quadrilateral rails.
    fn create_walls(&mut self) {
        for (a, b) in self.geometry.edges() {
            let rb = RigidBodyBuilder::fixed().build();
            let handle = self.bodies.insert(rb);
            let collider = ColliderBuilder::segment(
                nalgebra::Point2::new(a.x, a.y),
                nalgebra::Point2::new(b.x, b.y),
            )
            .restitution(self.tuning.wall_elasticity)
            .friction(self.tuning.wall_friction)
            .build();
            self.colliders
                .insert_with_parent(collider, handle, &mut self.bodies);
            self.walls.push(handle);
        }
    }

    /// Create a dynamic ball body. At most one body may exist per id;
    /// a duplicate request is ignored.
    pub fn create_ball(&mut self, position: Vec2, id: BallId, is_cue: bool) {
        if self.contains(id) {
            log::warn!("ball {} already exists, ignoring duplicate", id.0);
            return;
        }
        let radius = self.tuning.ball_radius;
        let density = self.tuning.ball_mass / (std::f32::consts::PI * radius * radius);
        let rb = RigidBodyBuilder::dynamic()
            .translation(vec2_to_na(position))
            .ccd_enabled(true)
            .user_data(id.0 as u128)
            .build();
        let body = self.bodies.insert(rb);
        let collider = ColliderBuilder::ball(radius)
            .restitution(self.tuning.ball_elasticity)
            .friction(self.tuning.ball_friction)
            .density(density)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        self.colliders
            .insert_with_parent(collider, body, &mut self.bodies);
        self.balls.push(BallBody { id, body, is_cue });
    }

    /// Remove a ball permanently. Removing the cue ball is refused
    /// (it only ever gets repositioned) and removing a ball that is
    /// already gone is a no-op.
    pub fn remove_ball(&mut self, id: BallId) {
        if id.is_cue() {
            log::warn!("refusing to remove the cue ball");
            return;
        }
        let Some(index) = self.balls.iter().position(|b| b.id == id) else {
            return;
        };
        let ball = self.balls.swap_remove(index);
        self.bodies.remove(
            ball.body,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Remove every ball, cue included, and rebuild the walls. Used by
    /// the full session reset before re-racking.
    pub fn clear(&mut self) {
        for ball in std::mem::take(&mut self.balls) {
            self.bodies.remove(
                ball.body,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }
        for wall in std::mem::take(&mut self.walls) {
            self.bodies.remove(
                wall,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }
        self.create_walls();
    }

    /// Step the simulation by the fixed timestep and append resolved
    /// ball-to-ball contact events to the provided Vec.
    pub fn step_into(&mut self, contacts: &mut Vec<BallContact>) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.event_collector,
        );

        for event in self.event_collector.drain_collisions() {
            let (h1, h2, started) = match event {
                CollisionEvent::Started(h1, h2, _) => (h1, h2, true),
                CollisionEvent::Stopped(h1, h2, _) => (h1, h2, false),
            };
            // Wall contacts resolve to None on one side and are dropped.
            if let (Some(a), Some(b)) = (self.collider_to_ball(h1), self.collider_to_ball(h2)) {
                contacts.push(BallContact { a, b, started });
            }
        }
    }

    /// Turn an aim into motion: linear velocity along the unit
    /// direction scaled by power, plus spin proportional to power.
    pub(crate) fn apply_shot(&mut self, id: BallId, direction: Vec2, power: f32) {
        let Some(handle) = self.ball_handle(id) else {
            return;
        };
        if let Some(rb) = self.bodies.get_mut(handle) {
            let velocity = direction * power * self.tuning.velocity_scale;
            rb.set_linvel(vec2_to_na(velocity), true);
            rb.set_angvel(power * self.tuning.spin_scale, true);
            log::info!(
                "shot: ball {} dir=({:.2},{:.2}) power={:.2} speed={:.1}",
                id.0,
                direction.x,
                direction.y,
                power,
                velocity.length()
            );
        }
    }

    /// True when any ball's linear speed exceeds the configured motion
    /// threshold.
    pub fn any_ball_moving(&self) -> bool {
        self.any_ball_moving_above(self.tuning.motion_threshold)
    }

    pub fn any_ball_moving_above(&self, threshold: f32) -> bool {
        self.balls.iter().any(|ball| {
            self.bodies
                .get(ball.body)
                .map(|rb| rb.linvel().norm() > threshold)
                .unwrap_or(false)
        })
    }

    /// Graduated braking, applied once per frame after stepping.
    ///
    /// While an aim phase is active every ball gets the strong settle
    /// factor so the table comes to rest quickly. Otherwise fast balls
    /// get a mild factor and slow ones a stronger factor. In both
    /// modes, speeds at or below the stop cutoff are zeroed outright
    /// so residue never keeps the motion gate closed.
    pub fn damp_velocities(&mut self, aim_active: bool) {
        let t = &self.tuning;
        for ball in &self.balls {
            if let Some(rb) = self.bodies.get_mut(ball.body) {
                let speed = rb.linvel().norm();
                if speed <= f32::EPSILON {
                    continue;
                }
                if speed <= t.stop_speed {
                    rb.set_linvel(nalgebra::Vector2::zeros(), false);
                    rb.set_angvel(0.0, false);
                    continue;
                }
                let factor = if aim_active {
                    t.aim_settle_damping
                } else if speed > t.fast_speed {
                    t.damp_fast
                } else {
                    t.damp_slow
                };
                let linvel = *rb.linvel() * factor;
                let angvel = rb.angvel() * factor;
                rb.set_linvel(linvel, true);
                rb.set_angvel(angvel, true);
            }
        }
    }

    /// One-off velocity multiplier on every ball (aim-start and
    /// direction-freeze pulses).
    pub fn damp_pulse(&mut self, factor: f32) {
        for ball in &self.balls {
            if let Some(rb) = self.bodies.get_mut(ball.body) {
                let linvel = *rb.linvel() * factor;
                let angvel = rb.angvel() * factor;
                rb.set_linvel(linvel, true);
                rb.set_angvel(angvel, true);
            }
        }
    }

    /// Teleport the cue ball and kill its motion (pocket re-entry).
    pub fn reposition_cue(&mut self, position: Vec2) {
        let Some(handle) = self.ball_handle(BallId::CUE) else {
            return;
        };
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.set_translation(vec2_to_na(position), true);
            rb.set_linvel(nalgebra::Vector2::zeros(), true);
            rb.set_angvel(0.0, true);
        }
    }

    pub fn ball_position(&self, id: BallId) -> Option<Vec2> {
        let handle = self.ball_handle(id)?;
        self.bodies
            .get(handle)
            .map(|rb| na_to_vec2(rb.translation()))
    }

    pub fn ball_velocity(&self, id: BallId) -> Option<Vec2> {
        let handle = self.ball_handle(id)?;
        self.bodies.get(handle).map(|rb| na_to_vec2(rb.linvel()))
    }

    pub fn ball_angular_velocity(&self, id: BallId) -> Option<f32> {
        let handle = self.ball_handle(id)?;
        self.bodies.get(handle).map(|rb| rb.angvel())
    }

    /// Cue ball position, or the screen origin if the cue is somehow
    /// missing (it never is after setup).
    pub fn cue_position(&self) -> Vec2 {
        self.balls
            .iter()
            .find(|b| b.is_cue)
            .and_then(|b| self.bodies.get(b.body))
            .map(|rb| na_to_vec2(rb.translation()))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn contains(&self, id: BallId) -> bool {
        self.balls.iter().any(|b| b.id == id)
    }

    /// Ids of every ball currently on the table, cue included.
    pub fn ball_ids(&self) -> Vec<BallId> {
        self.balls.iter().map(|b| b.id).collect()
    }

    pub fn ball_count(&self) -> usize {
        self.balls.len()
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    // -- private helpers --

    fn ball_handle(&self, id: BallId) -> Option<RigidBodyHandle> {
        self.balls.iter().find(|b| b.id == id).map(|b| b.body)
    }

    fn collider_to_ball(&self, collider_handle: ColliderHandle) -> Option<BallId> {
        let collider = self.colliders.get(collider_handle)?;
        let body_handle = collider.parent()?;
        let body = self.bodies.get(body_handle)?;
        let id = BallId(body.user_data as u8);
        // Walls carry user_data 0 but are fixed bodies; only accept
        // handles that are actually in the registry.
        self.balls
            .iter()
            .find(|b| b.body == body_handle && b.id == id)
            .map(|b| b.id)
    }
}
