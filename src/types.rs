use glam::Vec2;

/// Stable handle for a rigid body registered with the world.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(pub u32);

/// Stable handle for a collider registered with the world.
///
/// Handles are allocated by the world and never reused, so they stay valid as
/// unordered-pair identity across steps even after the collider is removed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColliderId(pub u32);

/// Supported convex collider shapes.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Centered circle.
    Circle { radius: f32 },
    /// Convex polygon, counter-clockwise vertices in local space.
    Polygon { vertices: Vec<Vec2> },
}

impl Shape {
    /// Convenience constructor.
    pub fn circle(radius: f32) -> Self {
        Self::Circle { radius }
    }

    /// Convenience: centered axis-aligned box (half extents along X/Y).
    pub fn rect(half_extents: Vec2) -> Self {
        let h = half_extents;
        Self::Polygon {
            vertices: vec![
                Vec2::new(-h.x, -h.y),
                Vec2::new(h.x, -h.y),
                Vec2::new(h.x, h.y),
                Vec2::new(-h.x, h.y),
            ],
        }
    }
}

/// A convex collision shape attached (optionally) to a dynamics body.
#[derive(Clone, Debug)]
pub struct Collider {
    pub shape: Shape,
    /// World position for a body-less collider; local offset from the owning
    /// body's position otherwise.
    pub position: Vec2,
    /// Triggers detect overlap and raise events but are never resolved.
    pub is_trigger: bool,
    /// Owning dynamics body, fixed for the collider's lifetime. `None` makes
    /// the collider an immovable static participant.
    pub body: Option<BodyId>,
}

impl Collider {
    /// Body-less collider at a fixed world position (static geometry or sensor).
    pub fn fixed(shape: Shape, position: Vec2) -> Self {
        Self {
            shape,
            position,
            is_trigger: false,
            body: None,
        }
    }

    /// Collider attached to a body, centered on the body's position.
    pub fn attached(shape: Shape, body: BodyId) -> Self {
        Self {
            shape,
            position: Vec2::ZERO,
            is_trigger: false,
            body: Some(body),
        }
    }

    /// Mark this collider as a trigger.
    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }
}

/// Contact data for one overlapping pair in one step.
///
/// Rebuilt every step; kept around only one extra step so Exit notifications
/// can report the last known contact.
#[derive(Clone, Debug)]
pub struct Manifold {
    pub collider_a: ColliderId,
    pub collider_b: ColliderId,
    pub body_a: Option<BodyId>,
    pub body_b: Option<BodyId>,
    /// Minimum translation pushing A away from B. `mtv_a == -mtv_b`; each
    /// carries half the penetration depth so `|mtv_b - mtv_a|` recovers it.
    pub mtv_a: Vec2,
    /// Minimum translation pushing B away from A.
    pub mtv_b: Vec2,
    /// Representative contact point (approximate for polygon pairs).
    pub point: Vec2,
    /// Unit contact normal oriented from A toward B. A's side sees the
    /// negation, B's side sees this vector.
    pub normal: Vec2,
    /// Whether either collider was a trigger at detection time. Captured on
    /// the manifold so Exit dispatch still classifies correctly after a
    /// collider is removed.
    pub trigger: bool,
    /// Whether this unordered pair also overlapped in the previous step.
    pub was_overlapping: bool,
}

impl Manifold {
    /// Notification snapshot for collider A's listeners.
    pub fn view_for_a(&self) -> ContactView {
        ContactView {
            other_collider: self.collider_b,
            other_body: self.body_b,
            point: self.point,
            normal: -self.normal,
            mtv: self.mtv_a,
        }
    }

    /// Notification snapshot for collider B's listeners.
    pub fn view_for_b(&self) -> ContactView {
        ContactView {
            other_collider: self.collider_a,
            other_body: self.body_a,
            point: self.point,
            normal: self.normal,
            mtv: self.mtv_b,
        }
    }
}

/// Per-listener snapshot of one side of a contact. Immutable once built.
#[derive(Copy, Clone, Debug)]
pub struct ContactView {
    pub other_collider: ColliderId,
    pub other_body: Option<BodyId>,
    pub point: Vec2,
    /// Contact normal as seen from the receiving side (points at the receiver).
    pub normal: Vec2,
    /// Minimum translation pushing the receiver away from the other collider.
    pub mtv: Vec2,
}

/// World-level configuration. All fields are host-mutable between steps.
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Global gravity, applied as a force (`f += g * m`) to every dynamic body.
    pub gravity: Vec2,
    /// Fraction of the remaining penetration corrected per step, in [0, 1].
    pub correction_percent: f32,
    /// Penetration at or below this depth is left uncorrected.
    pub penetration_slop: f32,
    /// Broadphase grid cell size in world units.
    pub cell_size: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.81),
            correction_percent: 0.8,
            penetration_slop: 0.01,
            cell_size: 1.0,
        }
    }
}
