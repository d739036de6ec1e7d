use glam::Vec2;

use crate::types::ContactView;

/// Capability contracts consumed at the host boundary.
///
/// The world only ever talks to bodies and listeners through these traits, so
/// a host scene graph can stand in for the default storage without the solver
/// knowing.

// --- Position ownership ------------------------------------------------

/// Read/write access to a body's world position.
///
/// `RigidBody` backs this with its own field; a host that owns transforms can
/// mirror the same contract. The solver assumes nothing beyond a 2D vector.
pub trait PositionSource {
    fn world_position(&self) -> Vec2;
    fn set_world_position(&mut self, p: Vec2);
}

// --- Contact listeners -------------------------------------------------

/// Listener for solid (non-trigger) contact lifecycle events.
///
/// Every method defaults to a no-op so implementors subscribe only to the
/// transitions they care about.
pub trait CollisionEvents {
    fn on_collision_enter(&mut self, _contact: &ContactView) {}
    fn on_collision_stay(&mut self, _contact: &ContactView) {}
    fn on_collision_exit(&mut self, _contact: &ContactView) {}
}

/// Listener for trigger overlap lifecycle events.
///
/// Cadence is identical to [`CollisionEvents`]; only the listener category
/// differs, and trigger pairs never disturb body dynamics.
pub trait TriggerEvents {
    fn on_trigger_enter(&mut self, _contact: &ContactView) {}
    fn on_trigger_stay(&mut self, _contact: &ContactView) {}
    fn on_trigger_exit(&mut self, _contact: &ContactView) {}
}
