use glam::Vec2;

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::api::{CollisionEvents, PositionSource, TriggerEvents};
use crate::body::RigidBody;
use crate::events::{PairKey, PairPhase, PairTracker};
use crate::narrowphase::{self, EPS_SQ, Sat};
use crate::types::*;

/// Persistent physics world: registries of bodies and colliders, and the
/// fixed-step pipeline that advances them.
///
/// The host drives the world by calling [`step`](Self::step) once per fixed
/// tick; registration and configuration changes are valid any time between
/// steps. One step runs, strictly in order: force reset, gravity, velocity
/// integration, SAT detection, contact resolution, position integration,
/// pair-set rollover, and Enter/Stay/Exit listener dispatch.
pub struct PhysicsWorld {
    pub cfg: WorldConfig,

    bodies: HashMap<BodyId, RigidBody>,
    colliders: HashMap<ColliderId, Collider>,
    next_body_id: u32,
    next_collider_id: u32,

    collision_listeners: HashMap<ColliderId, Vec<Box<dyn CollisionEvents>>>,
    trigger_listeners: HashMap<ColliderId, Vec<Box<dyn TriggerEvents>>>,

    tracker: PairTracker,
    manifolds: Vec<Manifold>,
    prev_manifolds: Vec<Manifold>,

    // Uniform broadphase grid: cell coord -> colliders whose AABB covers it.
    // Rebuilt every step.
    grid: HashMap<(i32, i32), Vec<ColliderId>>,
}

impl PhysicsWorld {
    pub fn new(cfg: WorldConfig) -> Self {
        Self {
            cfg,
            bodies: HashMap::new(),
            colliders: HashMap::new(),
            next_body_id: 0,
            next_collider_id: 0,
            collision_listeners: HashMap::new(),
            trigger_listeners: HashMap::new(),
            tracker: PairTracker::new(),
            manifolds: Vec::new(),
            prev_manifolds: Vec::new(),
            grid: HashMap::new(),
        }
    }

    // --- Registration ------------------------------------------------------

    /// Register a body and return its handle. Handles are never reused.
    pub fn add_body(&mut self, body: RigidBody) -> BodyId {
        let id = BodyId(self.next_body_id);
        self.next_body_id += 1;
        self.bodies.insert(id, body);
        debug!(id = id.0, "body registered");
        id
    }

    /// Unregister a body. Unknown or already-removed handles are a no-op.
    pub fn remove_body(&mut self, id: BodyId) {
        if self.bodies.remove(&id).is_some() {
            debug!(id = id.0, "body unregistered");
        }
    }

    /// Register a collider and return its handle. Handles are never reused.
    pub fn add_collider(&mut self, collider: Collider) -> ColliderId {
        let id = ColliderId(self.next_collider_id);
        self.next_collider_id += 1;
        self.colliders.insert(id, collider);
        debug!(id = id.0, "collider registered");
        id
    }

    /// Unregister a collider and drop its listeners. Unknown or
    /// already-removed handles are a no-op.
    pub fn remove_collider(&mut self, id: ColliderId) {
        if self.colliders.remove(&id).is_some() {
            self.collision_listeners.remove(&id);
            self.trigger_listeners.remove(&id);
            debug!(id = id.0, "collider unregistered");
        }
    }

    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(&id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(&id)
    }

    pub fn collider(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.get(&id)
    }

    pub fn collider_mut(&mut self, id: ColliderId) -> Option<&mut Collider> {
        self.colliders.get_mut(&id)
    }

    /// Attach a collision listener to a collider. A collider may hold any
    /// number of listeners; colliders with none are silently skipped.
    pub fn add_collision_listener(&mut self, id: ColliderId, listener: Box<dyn CollisionEvents>) {
        self.collision_listeners.entry(id).or_default().push(listener);
    }

    /// Attach a trigger listener to a collider.
    pub fn add_trigger_listener(&mut self, id: ColliderId, listener: Box<dyn TriggerEvents>) {
        self.trigger_listeners.entry(id).or_default().push(listener);
    }

    // --- Fixed-step pipeline -----------------------------------------------

    /// Advance the simulation by `dt`. Invoked once per fixed tick by the
    /// host; runs to completion and never fails, even with nothing
    /// registered.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        if self.bodies.is_empty() && self.colliders.is_empty() {
            return;
        }

        // 1) start-of-step force reset
        for body in self.bodies.values_mut() {
            body.clear_forces();
        }

        // 2) global uniform gravity as a force
        let gravity = self.cfg.gravity;
        for body in self.bodies.values_mut() {
            if !body.is_static() {
                let f = gravity * body.mass();
                body.add_force(f);
            }
        }

        // 3) integrate velocities
        for body in self.bodies.values_mut() {
            body.integrate_velocity(dt);
        }

        // 4-5) SAT detection, marked against last step's manifolds
        self.detect();

        // 6) resolve solid contacts: correction, normal impulse, friction
        self.resolve();

        // 7) integrate positions
        for body in self.bodies.values_mut() {
            body.integrate_position(dt);
        }

        // 8) roll the pair identity sets
        let keys: Vec<PairKey> = self
            .manifolds
            .iter()
            .map(|m| PairKey::new(m.collider_a, m.collider_b))
            .collect();
        self.tracker.roll(keys);

        trace!(manifolds = self.manifolds.len(), "step advanced");

        // 9-10) notify listeners: Enter/Stay from current manifolds, Exit
        // from last step's cached manifolds
        self.dispatch_enter_stay();
        self.dispatch_exit();

        // 11) keep this step's manifolds as next step's Exit data
        self.prev_manifolds = std::mem::take(&mut self.manifolds);
    }

    /// Narrowphase over grid-binned candidates. Fills `self.manifolds` with
    /// one manifold per overlapping unordered pair.
    fn detect(&mut self) {
        self.grid.clear();
        let cs = self.cfg.cell_size.max(1e-5);
        for (&id, col) in &self.colliders {
            let center = world_center(&self.bodies, col);
            let (min, max) = narrowphase::shape_aabb(center, &col.shape);
            let ix0 = (min.x / cs).floor() as i32;
            let iy0 = (min.y / cs).floor() as i32;
            let ix1 = (max.x / cs).floor() as i32;
            let iy1 = (max.y / cs).floor() as i32;
            for iy in iy0..=iy1 {
                for ix in ix0..=ix1 {
                    self.grid.entry((ix, iy)).or_default().push(id);
                }
            }
        }

        // Candidate pairs from the grid, deduplicated across cells and
        // sorted so a step is reproducible regardless of registry hash order.
        let mut seen: HashSet<(ColliderId, ColliderId)> = HashSet::new();
        let mut candidates: Vec<(ColliderId, ColliderId)> = Vec::new();
        for ids in self.grid.values() {
            for i in 0..ids.len() {
                for j in (i + 1)..ids.len() {
                    let pair = if ids[i] < ids[j] {
                        (ids[i], ids[j])
                    } else {
                        (ids[j], ids[i])
                    };
                    if seen.insert(pair) {
                        candidates.push(pair);
                    }
                }
            }
        }
        candidates.sort_unstable();

        let mut manifolds = Vec::new();
        for (a_id, b_id) in candidates {
            let (Some(a), Some(b)) = (self.colliders.get(&a_id), self.colliders.get(&b_id))
            else {
                continue;
            };
            // Two solid colliders with no dynamics on either side have
            // nothing to resolve or report against.
            let live_a = body_of(&self.bodies, a.body).is_some();
            let live_b = body_of(&self.bodies, b.body).is_some();
            if !a.is_trigger && !b.is_trigger && !live_a && !live_b {
                continue;
            }
            let center_a = world_center(&self.bodies, a);
            let center_b = world_center(&self.bodies, b);
            let Some(hit) = Sat::test(center_a, &a.shape, center_b, &b.shape) else {
                continue;
            };
            let key = PairKey::new(a_id, b_id);
            let half = hit.normal * (hit.depth * 0.5);
            manifolds.push(Manifold {
                collider_a: a_id,
                collider_b: b_id,
                body_a: a.body,
                body_b: b.body,
                mtv_a: -half,
                mtv_b: half,
                point: hit.point,
                normal: hit.normal,
                trigger: a.is_trigger || b.is_trigger,
                was_overlapping: self
                    .prev_manifolds
                    .iter()
                    .any(|m| PairKey::new(m.collider_a, m.collider_b) == key),
            });
        }
        self.manifolds = manifolds;
    }

    /// Positional correction plus normal and friction impulses for every
    /// solid manifold. Trigger manifolds never mutate dynamics.
    fn resolve(&mut self) {
        let slop = self.cfg.penetration_slop;
        let percent = self.cfg.correction_percent.clamp(0.0, 1.0);

        for m in &self.manifolds {
            if m.trigger {
                continue;
            }

            let inv_a = body_of(&self.bodies, m.body_a).map_or(0.0, |b| b.inv_mass());
            let inv_b = body_of(&self.bodies, m.body_b).map_or(0.0, |b| b.inv_mass());
            let inv_sum = inv_a + inv_b;
            if inv_sum <= 0.0 {
                continue;
            }

            let mtv = m.mtv_b - m.mtv_a;
            let penetration = mtv.length();
            let normal = if mtv.length_squared() > EPS_SQ {
                mtv / penetration
            } else if m.normal.length_squared() > EPS_SQ {
                m.normal.normalize()
            } else {
                // No usable direction: excluded from impulses, and skipping
                // correction keeps NaNs out.
                continue;
            };

            // Baumgarte positional correction: partial, leaves the slop.
            if penetration > slop {
                let magnitude = (penetration - slop).max(0.0) / inv_sum * percent;
                let correction = normal * magnitude;
                if let Some(body) = body_of_mut(&mut self.bodies, m.body_a) {
                    if !body.is_static() {
                        let p = body.world_position();
                        body.set_world_position(p - correction * inv_a);
                    }
                }
                if let Some(body) = body_of_mut(&mut self.bodies, m.body_b) {
                    if !body.is_static() {
                        let p = body.world_position();
                        body.set_world_position(p + correction * inv_b);
                    }
                }
            }

            // Normal impulse with restitution.
            let vel_a = body_of(&self.bodies, m.body_a).map_or(Vec2::ZERO, |b| b.velocity);
            let vel_b = body_of(&self.bodies, m.body_b).map_or(Vec2::ZERO, |b| b.velocity);
            let rel = vel_b - vel_a;
            let vel_along_normal = rel.dot(normal);
            if vel_along_normal > 0.0 {
                // Already separating.
                continue;
            }

            let mut e = 0.0f32;
            if let Some(b) = body_of(&self.bodies, m.body_a) {
                e = e.max(b.restitution);
            }
            if let Some(b) = body_of(&self.bodies, m.body_b) {
                e = e.max(b.restitution);
            }
            let j = -(1.0 + e) * vel_along_normal / inv_sum;
            let impulse = normal * j;
            if let Some(body) = body_of_mut(&mut self.bodies, m.body_a) {
                body.velocity -= impulse * inv_a;
            }
            if let Some(body) = body_of_mut(&mut self.bodies, m.body_b) {
                body.velocity += impulse * inv_b;
            }

            // Coulomb friction from post-impulse velocities.
            let vel_a = body_of(&self.bodies, m.body_a).map_or(Vec2::ZERO, |b| b.velocity);
            let vel_b = body_of(&self.bodies, m.body_b).map_or(Vec2::ZERO, |b| b.velocity);
            let rel = vel_b - vel_a;
            let tangent = rel - normal * rel.dot(normal);
            if tangent.length_squared() <= EPS_SQ {
                continue;
            }
            let tangent = tangent.normalize();
            let jt = -rel.dot(tangent) / inv_sum;

            let mut mu = 0.0f32;
            if let Some(b) = body_of(&self.bodies, m.body_a) {
                mu = mu.max(b.friction);
            }
            if let Some(b) = body_of(&self.bodies, m.body_b) {
                mu = mu.max(b.friction);
            }
            let jt = jt.clamp(-j * mu, j * mu);
            let friction_impulse = tangent * jt;
            if let Some(body) = body_of_mut(&mut self.bodies, m.body_a) {
                body.velocity -= friction_impulse * inv_a;
            }
            if let Some(body) = body_of_mut(&mut self.bodies, m.body_b) {
                body.velocity += friction_impulse * inv_b;
            }
        }
    }

    fn dispatch_enter_stay(&mut self) {
        for m in &self.manifolds {
            let key = PairKey::new(m.collider_a, m.collider_b);
            let phase = self.tracker.phase(key);
            debug_assert_eq!(m.was_overlapping, phase == PairPhase::Staying);
            let view_a = m.view_for_a();
            let view_b = m.view_for_b();
            if m.trigger {
                notify_trigger(&mut self.trigger_listeners, m.collider_a, phase, &view_a);
                notify_trigger(&mut self.trigger_listeners, m.collider_b, phase, &view_b);
            } else {
                notify_collision(&mut self.collision_listeners, m.collider_a, phase, &view_a);
                notify_collision(&mut self.collision_listeners, m.collider_b, phase, &view_b);
            }
        }
    }

    /// Exit for every pair that overlapped last step but not this one,
    /// reported with the last known manifold data.
    fn dispatch_exit(&mut self) {
        let exited: Vec<PairKey> = self.tracker.exited().collect();
        if !exited.is_empty() {
            trace!(pairs = exited.len(), "overlaps ended");
        }
        for key in exited {
            let Some(m) = self
                .prev_manifolds
                .iter()
                .find(|m| PairKey::new(m.collider_a, m.collider_b) == key)
            else {
                continue;
            };
            let view_a = m.view_for_a();
            let view_b = m.view_for_b();
            if m.trigger {
                notify_trigger(
                    &mut self.trigger_listeners,
                    m.collider_a,
                    PairPhase::Exited,
                    &view_a,
                );
                notify_trigger(
                    &mut self.trigger_listeners,
                    m.collider_b,
                    PairPhase::Exited,
                    &view_b,
                );
            } else {
                notify_collision(
                    &mut self.collision_listeners,
                    m.collider_a,
                    PairPhase::Exited,
                    &view_a,
                );
                notify_collision(
                    &mut self.collision_listeners,
                    m.collider_b,
                    PairPhase::Exited,
                    &view_b,
                );
            }
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

/// World-space center of a collider: the owning body's position plus the
/// collider offset, or the collider's own position when no live body backs
/// it.
fn world_center(bodies: &HashMap<BodyId, RigidBody>, col: &Collider) -> Vec2 {
    match col.body.and_then(|id| bodies.get(&id)) {
        Some(body) => body.world_position() + col.position,
        None => col.position,
    }
}

fn body_of(bodies: &HashMap<BodyId, RigidBody>, id: Option<BodyId>) -> Option<&RigidBody> {
    id.and_then(|id| bodies.get(&id))
}

fn body_of_mut(
    bodies: &mut HashMap<BodyId, RigidBody>,
    id: Option<BodyId>,
) -> Option<&mut RigidBody> {
    id.and_then(|id| bodies.get_mut(&id))
}

fn notify_collision(
    listeners: &mut HashMap<ColliderId, Vec<Box<dyn CollisionEvents>>>,
    id: ColliderId,
    phase: PairPhase,
    contact: &ContactView,
) {
    let Some(list) = listeners.get_mut(&id) else {
        return;
    };
    for listener in list {
        match phase {
            PairPhase::Entered => listener.on_collision_enter(contact),
            PairPhase::Staying => listener.on_collision_stay(contact),
            PairPhase::Exited => listener.on_collision_exit(contact),
        }
    }
}

fn notify_trigger(
    listeners: &mut HashMap<ColliderId, Vec<Box<dyn TriggerEvents>>>,
    id: ColliderId,
    phase: PairPhase,
    contact: &ContactView,
) {
    let Some(list) = listeners.get_mut(&id) else {
        return;
    };
    for listener in list {
        match phase {
            PairPhase::Entered => listener.on_trigger_enter(contact),
            PairPhase::Staying => listener.on_trigger_stay(contact),
            PairPhase::Exited => listener.on_trigger_exit(contact),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const EPSILON: f32 = 1e-4;

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    enum Ev {
        Enter,
        Stay,
        Exit,
    }

    type Log = Rc<RefCell<Vec<(Ev, ColliderId)>>>;

    /// Records every notification it receives together with the other
    /// collider's id. Clones share the same log.
    #[derive(Clone, Default)]
    struct Recorder {
        log: Log,
    }

    impl CollisionEvents for Recorder {
        fn on_collision_enter(&mut self, c: &ContactView) {
            self.log.borrow_mut().push((Ev::Enter, c.other_collider));
        }
        fn on_collision_stay(&mut self, c: &ContactView) {
            self.log.borrow_mut().push((Ev::Stay, c.other_collider));
        }
        fn on_collision_exit(&mut self, c: &ContactView) {
            self.log.borrow_mut().push((Ev::Exit, c.other_collider));
        }
    }

    impl TriggerEvents for Recorder {
        fn on_trigger_enter(&mut self, c: &ContactView) {
            self.log.borrow_mut().push((Ev::Enter, c.other_collider));
        }
        fn on_trigger_stay(&mut self, c: &ContactView) {
            self.log.borrow_mut().push((Ev::Stay, c.other_collider));
        }
        fn on_trigger_exit(&mut self, c: &ContactView) {
            self.log.borrow_mut().push((Ev::Exit, c.other_collider));
        }
    }

    fn world_no_gravity() -> PhysicsWorld {
        PhysicsWorld::new(WorldConfig {
            gravity: Vec2::ZERO,
            ..WorldConfig::default()
        })
    }

    fn events(log: &Log) -> Vec<Ev> {
        log.borrow().iter().map(|(e, _)| *e).collect()
    }

    #[test]
    fn test_empty_world_step_returns_immediately() {
        let mut world = PhysicsWorld::default();
        world.step(1.0 / 60.0);
    }

    #[test]
    fn test_step_applies_gravity() {
        let mut world = PhysicsWorld::default();
        let id = world.add_body(RigidBody::new(2.0));
        world.step(0.1);

        let body = world.body(id).unwrap();
        assert!((body.velocity.y - -0.981).abs() < EPSILON);
        assert!((body.position.y - -0.0981).abs() < EPSILON);
        assert!(body.velocity.x.abs() < EPSILON);
    }

    #[test]
    fn test_static_bodies_are_invariant() {
        let mut world = PhysicsWorld::default();
        let floor = world.add_body(RigidBody::new_static().with_position(Vec2::new(0.0, -1.0)));
        world.add_collider(Collider::attached(Shape::circle(1.0), floor));

        let ball = world.add_body(
            RigidBody::new(1.0)
                .with_position(Vec2::new(0.0, 0.5))
                .with_restitution(0.5),
        );
        world.add_collider(Collider::attached(Shape::circle(0.5), ball));

        // The ball lands and pushes into the floor over many steps.
        for _ in 0..30 {
            world.step(1.0 / 60.0);
        }
        let floor = world.body(floor).unwrap();
        assert_eq!(floor.position, Vec2::new(0.0, -1.0));
        assert_eq!(floor.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_registration_is_idempotent() {
        let mut world = PhysicsWorld::default();
        let a = world.add_body(RigidBody::new(1.0));
        let b = world.add_body(RigidBody::new(1.0));
        assert_ne!(a, b);

        world.remove_body(a);
        world.remove_body(a);
        world.remove_body(BodyId(999));

        let c = world.add_collider(Collider::fixed(Shape::circle(1.0), Vec2::ZERO));
        world.remove_collider(c);
        world.remove_collider(c);
        world.remove_collider(ColliderId(999));

        assert!(world.body(a).is_none());
        assert!(world.body(b).is_some());
        assert!(world.collider(c).is_none());
    }

    #[test]
    fn test_elastic_head_on_swaps_velocities() {
        let mut world = world_no_gravity();
        let a = world.add_body(
            RigidBody::new(1.0)
                .with_position(Vec2::new(-0.45, 0.0))
                .with_restitution(1.0),
        );
        let b = world.add_body(
            RigidBody::new(1.0)
                .with_position(Vec2::new(0.45, 0.0))
                .with_restitution(1.0),
        );
        world.body_mut(a).unwrap().velocity = Vec2::new(5.0, 0.0);
        world.body_mut(b).unwrap().velocity = Vec2::new(-5.0, 0.0);
        world.add_collider(Collider::attached(Shape::circle(0.5), a));
        world.add_collider(Collider::attached(Shape::circle(0.5), b));

        world.step(1.0 / 60.0);

        let va = world.body(a).unwrap().velocity;
        let vb = world.body(b).unwrap().velocity;
        assert!((va.x - -5.0).abs() < EPSILON, "va = {va:?}");
        assert!((vb.x - 5.0).abs() < EPSILON, "vb = {vb:?}");
        assert!(va.y.abs() < EPSILON);
        assert!(vb.y.abs() < EPSILON);
    }

    #[test]
    fn test_wall_bounce_reflects_velocity() {
        let mut world = world_no_gravity();
        let ball = world.add_body(
            RigidBody::new(1.0)
                .with_position(Vec2::new(-0.45, 0.0))
                .with_restitution(1.0),
        );
        world.body_mut(ball).unwrap().velocity = Vec2::new(5.0, 0.0);
        let wall = world.add_body(RigidBody::new_static().with_position(Vec2::new(0.45, 0.0)));
        world.add_collider(Collider::attached(Shape::circle(0.5), ball));
        world.add_collider(Collider::attached(Shape::circle(0.5), wall));

        world.step(1.0 / 60.0);

        let vb = world.body(ball).unwrap().velocity;
        assert!((vb.x - -5.0).abs() < EPSILON, "ball velocity {vb:?}");
        assert_eq!(world.body(wall).unwrap().velocity, Vec2::ZERO);
    }

    #[test]
    fn test_inelastic_head_on_shares_velocity() {
        let mut world = world_no_gravity();
        let a = world.add_body(RigidBody::new(1.0).with_position(Vec2::new(-0.45, 0.0)));
        let b = world.add_body(RigidBody::new(1.0).with_position(Vec2::new(0.45, 0.0)));
        world.body_mut(a).unwrap().velocity = Vec2::new(5.0, 0.0);
        world.body_mut(b).unwrap().velocity = Vec2::new(-5.0, 0.0);
        world.add_collider(Collider::attached(Shape::circle(0.5), a));
        world.add_collider(Collider::attached(Shape::circle(0.5), b));

        world.step(1.0 / 60.0);

        // Equal masses, restitution 0: combined momentum is zero, so both
        // end at rest along the normal.
        let va = world.body(a).unwrap().velocity;
        let vb = world.body(b).unwrap().velocity;
        assert!(va.x.abs() < EPSILON, "va = {va:?}");
        assert!(vb.x.abs() < EPSILON, "vb = {vb:?}");
    }

    #[test]
    fn test_friction_clamps_to_coulomb_cone() {
        // Fast slide: |jt| would be 4, the cone caps it at mu * j = 1.
        let mut world = world_no_gravity();
        let a = world.add_body(
            RigidBody::new(1.0)
                .with_position(Vec2::new(0.0, 0.45))
                .with_friction(0.5),
        );
        world.body_mut(a).unwrap().velocity = Vec2::new(4.0, -2.0);
        world.add_collider(Collider::attached(Shape::circle(0.5), a));
        world.add_collider(Collider::fixed(Shape::circle(0.5), Vec2::new(0.0, -0.45)));

        world.step(1.0 / 60.0);
        let v = world.body(a).unwrap().velocity;
        assert!((v.x - 3.0).abs() < EPSILON, "clamped slide {v:?}");
        assert!(v.y.abs() < EPSILON);

        // Slow slide: |jt| stays inside the cone and kills all tangential
        // velocity.
        let mut world = world_no_gravity();
        let a = world.add_body(
            RigidBody::new(1.0)
                .with_position(Vec2::new(0.0, 0.45))
                .with_friction(0.5),
        );
        world.body_mut(a).unwrap().velocity = Vec2::new(0.4, -2.0);
        world.add_collider(Collider::attached(Shape::circle(0.5), a));
        world.add_collider(Collider::fixed(Shape::circle(0.5), Vec2::new(0.0, -0.45)));

        world.step(1.0 / 60.0);
        let v = world.body(a).unwrap().velocity;
        assert!(v.x.abs() < EPSILON, "unclamped slide {v:?}");
        assert!(v.y.abs() < EPSILON);
    }

    #[test]
    fn test_positional_correction_respects_slop() {
        // Penetration below the slop: positions stay put.
        let mut world = world_no_gravity();
        let a = world.add_body(RigidBody::new(1.0).with_position(Vec2::new(-0.4975, 0.0)));
        let b = world.add_body(RigidBody::new(1.0).with_position(Vec2::new(0.4975, 0.0)));
        world.add_collider(Collider::attached(Shape::circle(0.5), a));
        world.add_collider(Collider::attached(Shape::circle(0.5), b));

        world.step(1.0 / 60.0);
        assert!((world.body(a).unwrap().position.x - -0.4975).abs() < 1e-6);
        assert!((world.body(b).unwrap().position.x - 0.4975).abs() < 1e-6);
    }

    #[test]
    fn test_positional_correction_grows_with_penetration() {
        let displacement_for = |offset: f32| {
            let mut world = world_no_gravity();
            let a = world.add_body(RigidBody::new(1.0).with_position(Vec2::new(-offset, 0.0)));
            let b = world.add_body(RigidBody::new(1.0).with_position(Vec2::new(offset, 0.0)));
            world.add_collider(Collider::attached(Shape::circle(0.5), a));
            world.add_collider(Collider::attached(Shape::circle(0.5), b));
            world.step(1.0 / 60.0);
            -(world.body(a).unwrap().position.x + offset)
        };

        // Overlap 0.1 vs 0.2: the deeper pair moves strictly farther.
        let shallow = displacement_for(0.45);
        let deep = displacement_for(0.4);
        assert!(shallow > 0.0, "shallow displacement {shallow}");
        assert!(deep > shallow, "deep {deep} vs shallow {shallow}");
    }

    #[test]
    fn test_trigger_lifecycle_cadence_and_non_interference() {
        let mut world = world_no_gravity();
        let zone = world.add_collider(Collider::fixed(Shape::circle(0.5), Vec2::ZERO).trigger());
        let body = world.add_body(RigidBody::new(1.0).with_position(Vec2::new(-1.2, 0.0)));
        world.body_mut(body).unwrap().velocity = Vec2::new(1.0, 0.0);
        world.add_collider(Collider::attached(Shape::circle(0.5), body));

        let recorder = Recorder::default();
        let log = recorder.log.clone();
        world.add_trigger_listener(zone, Box::new(recorder));

        // x: -1.2 (miss), -0.2 (enter), 0.8 (stay), 1.8 (exit), 2.8 (quiet)
        for _ in 0..5 {
            world.step(1.0);
        }

        assert_eq!(events(&log), vec![Ev::Enter, Ev::Stay, Ev::Exit]);
        // The trigger never disturbed the dynamics.
        let b = world.body(body).unwrap();
        assert_eq!(b.velocity, Vec2::new(1.0, 0.0));
        assert!((b.position.x - 3.8).abs() < EPSILON);
    }

    #[test]
    fn test_reoverlap_restarts_at_enter() {
        let mut world = world_no_gravity();
        let zone = world.add_collider(Collider::fixed(Shape::circle(0.5), Vec2::ZERO).trigger());
        let body = world.add_body(RigidBody::new(1.0).with_position(Vec2::new(-1.2, 0.0)));
        world.body_mut(body).unwrap().velocity = Vec2::new(1.0, 0.0);
        world.add_collider(Collider::attached(Shape::circle(0.5), body));

        let recorder = Recorder::default();
        let log = recorder.log.clone();
        world.add_trigger_listener(zone, Box::new(recorder));

        for _ in 0..5 {
            world.step(1.0);
        }
        assert_eq!(events(&log), vec![Ev::Enter, Ev::Stay, Ev::Exit]);

        // Teleport back into the zone: a fresh Enter, not a Stay.
        world.body_mut(body).unwrap().position = Vec2::new(-0.2, 0.0);
        world.body_mut(body).unwrap().velocity = Vec2::ZERO;
        world.step(1.0);
        assert_eq!(
            events(&log),
            vec![Ev::Enter, Ev::Stay, Ev::Exit, Ev::Enter]
        );
    }

    #[test]
    fn test_collision_events_fire_on_both_sides() {
        let mut world = world_no_gravity();
        let a = world.add_body(
            RigidBody::new(1.0)
                .with_position(Vec2::new(-0.45, 0.0))
                .with_restitution(1.0),
        );
        let b = world.add_body(
            RigidBody::new(1.0)
                .with_position(Vec2::new(0.45, 0.0))
                .with_restitution(1.0),
        );
        world.body_mut(a).unwrap().velocity = Vec2::new(5.0, 0.0);
        world.body_mut(b).unwrap().velocity = Vec2::new(-5.0, 0.0);
        let ca = world.add_collider(Collider::attached(Shape::circle(0.5), a));
        let cb = world.add_collider(Collider::attached(Shape::circle(0.5), b));

        let rec_a = Recorder::default();
        let rec_b = Recorder::default();
        let log_a = rec_a.log.clone();
        let log_b = rec_b.log.clone();
        world.add_collision_listener(ca, Box::new(rec_a));
        world.add_collision_listener(cb, Box::new(rec_b));

        // Step 1: contact + bounce. Step 2: separated, exit reported from
        // the cached manifold.
        world.step(1.0 / 60.0);
        world.step(1.0 / 60.0);

        assert_eq!(
            log_a.borrow().as_slice(),
            &[(Ev::Enter, cb), (Ev::Exit, cb)]
        );
        assert_eq!(
            log_b.borrow().as_slice(),
            &[(Ev::Enter, ca), (Ev::Exit, ca)]
        );
    }

    #[test]
    fn test_body_less_solid_collider_acts_as_wall() {
        let mut world = world_no_gravity();
        let ball = world.add_body(
            RigidBody::new(1.0)
                .with_position(Vec2::new(-0.45, 0.0))
                .with_restitution(1.0),
        );
        world.body_mut(ball).unwrap().velocity = Vec2::new(5.0, 0.0);
        world.add_collider(Collider::attached(Shape::circle(0.5), ball));
        world.add_collider(Collider::fixed(Shape::circle(0.5), Vec2::new(0.45, 0.0)));

        world.step(1.0 / 60.0);
        let v = world.body(ball).unwrap().velocity;
        assert!((v.x - -5.0).abs() < EPSILON, "ball velocity {v:?}");
    }

    #[test]
    fn test_solid_pair_without_bodies_is_excluded() {
        let mut world = world_no_gravity();
        let a = world.add_collider(Collider::fixed(Shape::circle(1.0), Vec2::ZERO));
        let b = world.add_collider(Collider::fixed(Shape::circle(1.0), Vec2::new(0.5, 0.0)));

        let recorder = Recorder::default();
        let log = recorder.log.clone();
        world.add_collision_listener(a, Box::new(recorder.clone()));
        world.add_collision_listener(b, Box::new(recorder));

        world.step(1.0 / 60.0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_static_pair_with_bodies_still_reports_events() {
        let mut world = world_no_gravity();
        let a = world.add_body(RigidBody::new_static());
        let b = world.add_body(RigidBody::new_static().with_position(Vec2::new(0.5, 0.0)));
        let ca = world.add_collider(Collider::attached(Shape::circle(0.5), a));
        world.add_collider(Collider::attached(Shape::circle(0.5), b));

        let recorder = Recorder::default();
        let log = recorder.log.clone();
        world.add_collision_listener(ca, Box::new(recorder));

        world.step(1.0 / 60.0);
        assert_eq!(events(&log), vec![Ev::Enter]);
        // Resolution skipped: zero combined inverse mass.
        assert_eq!(world.body(a).unwrap().position, Vec2::ZERO);
        assert_eq!(world.body(b).unwrap().position, Vec2::new(0.5, 0.0));
    }

    #[test]
    fn test_removed_collider_still_produces_exit_for_partner() {
        let mut world = world_no_gravity();
        let zone = world.add_collider(Collider::fixed(Shape::circle(0.5), Vec2::ZERO).trigger());
        let body = world.add_body(RigidBody::new(1.0).with_position(Vec2::new(0.2, 0.0)));
        let probe = world.add_collider(Collider::attached(Shape::circle(0.5), body));

        let rec_zone = Recorder::default();
        let rec_probe = Recorder::default();
        let log_zone = rec_zone.log.clone();
        let log_probe = rec_probe.log.clone();
        world.add_trigger_listener(zone, Box::new(rec_zone));
        world.add_trigger_listener(probe, Box::new(rec_probe));

        world.step(1.0 / 60.0);
        assert_eq!(events(&log_zone), vec![Ev::Enter]);

        // The probe disappears between steps; the zone still hears the Exit,
        // while the probe's own listeners are gone with it.
        world.remove_collider(probe);
        world.step(1.0 / 60.0);
        assert_eq!(events(&log_zone), vec![Ev::Enter, Ev::Exit]);
        assert_eq!(events(&log_probe), vec![Ev::Enter]);
    }

    #[test]
    fn test_gravity_configurable_between_steps() {
        let mut world = world_no_gravity();
        let id = world.add_body(RigidBody::new(1.0));
        world.step(0.1);
        assert_eq!(world.body(id).unwrap().velocity, Vec2::ZERO);

        world.cfg.gravity = Vec2::new(0.0, -10.0);
        world.step(0.1);
        assert!((world.body(id).unwrap().velocity.y - -1.0).abs() < EPSILON);
    }

    #[test]
    fn test_polygon_floor_supports_falling_box() {
        let mut world = PhysicsWorld::default();
        world.add_collider(Collider::fixed(
            Shape::rect(Vec2::new(5.0, 0.5)),
            Vec2::new(0.0, -0.5),
        ));
        let crate_body = world.add_body(RigidBody::new(1.0).with_position(Vec2::new(0.0, 0.6)));
        world.add_collider(Collider::attached(Shape::rect(Vec2::splat(0.5)), crate_body));

        for _ in 0..120 {
            world.step(1.0 / 60.0);
        }
        let body = world.body(crate_body).unwrap();
        // Settled on the floor (top of floor at y=0, so the box center rests
        // near 0.5) instead of tunneling through.
        assert!(body.position.y > 0.3, "box fell through: {:?}", body.position);
        assert!(body.velocity.length() < 0.5, "still moving: {:?}", body.velocity);
    }
}
