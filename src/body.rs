use glam::Vec2;

use crate::api::PositionSource;

/// Per-body dynamics state and integrator.
///
/// Mass 0 means static: the body is never integrated and never receives
/// impulses or positional correction.
#[derive(Clone, Debug, PartialEq)]
pub struct RigidBody {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Force accumulated since the start of the current step.
    pub force: Vec2,
    /// Bounciness in [0, 1]; contact pairs combine with `max`.
    pub restitution: f32,
    /// Coulomb friction coefficient in [0, 1]; contact pairs combine with `max`.
    pub friction: f32,
    mass: f32,
    inv_mass: f32,
}

impl RigidBody {
    /// Dynamic body of the given mass. Mass <= 0 produces a static body.
    pub fn new(mass: f32) -> Self {
        let (mass, inv_mass) = if mass > 0.0 { (mass, 1.0 / mass) } else { (0.0, 0.0) };
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            restitution: 0.0,
            friction: 0.0,
            mass,
            inv_mass,
        }
    }

    /// Static body (infinite mass).
    pub fn new_static() -> Self {
        Self::new(0.0)
    }

    /// Builder: set restitution, clamped to [0, 1].
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution.clamp(0.0, 1.0);
        self
    }

    /// Builder: set friction, clamped to [0, 1].
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction.clamp(0.0, 1.0);
        self
    }

    /// Builder: set the initial world position.
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    /// Reconfigure the mass, recomputing the cached inverse. Configuration
    /// only; never call mid-step.
    pub fn set_mass(&mut self, mass: f32) {
        if mass > 0.0 {
            self.mass = mass;
            self.inv_mass = 1.0 / mass;
        } else {
            self.mass = 0.0;
            self.inv_mass = 0.0;
        }
    }

    /// Accumulate a force for this step. Accumulating onto a static body is
    /// harmless: the integrator ignores it.
    pub fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Reset the force accumulator. Called once at the start of every step,
    /// before gravity is applied.
    pub fn clear_forces(&mut self) {
        self.force = Vec2::ZERO;
    }

    /// Semi-implicit Euler: velocity picks up this step's forces before the
    /// position integrates. No-op for static bodies.
    pub fn integrate_velocity(&mut self, dt: f32) {
        if self.is_static() {
            return;
        }
        self.velocity += self.force * self.inv_mass * dt;
    }

    /// Advance the position by the (already updated) velocity. No-op for
    /// static bodies.
    pub fn integrate_position(&mut self, dt: f32) {
        if self.is_static() {
            return;
        }
        self.position += self.velocity * dt;
    }
}

impl PositionSource for RigidBody {
    fn world_position(&self) -> Vec2 {
        self.position
    }

    fn set_world_position(&mut self, p: Vec2) {
        self.position = p;
    }
}
