//! nudge: impulse-based 2D rigid-body physics (persistent world, SAT narrowphase, contact events)

pub mod api;
pub mod body;
pub mod events;
pub mod narrowphase;
pub mod types;
pub mod world;

pub use crate::api::{CollisionEvents, PositionSource, TriggerEvents};
pub use crate::body::RigidBody;
pub use crate::events::{PairKey, PairPhase, PairTracker};
pub use crate::types::*;
pub use crate::world::PhysicsWorld;
