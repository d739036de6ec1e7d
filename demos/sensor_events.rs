use std::collections::HashMap;

use glam::Vec2;
use nudge::{
    Collider, ColliderId, ContactView, PhysicsWorld, RigidBody, Shape, TriggerEvents, WorldConfig,
};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();
}

/// Reacts to goal-zone overlaps, but only for colliders carrying the target
/// tag.
struct TagFilter {
    target: &'static str,
    tags: HashMap<ColliderId, &'static str>,
}

impl TagFilter {
    fn matches(&self, contact: &ContactView) -> bool {
        self.tags.get(&contact.other_collider).copied() == Some(self.target)
    }
}

impl TriggerEvents for TagFilter {
    fn on_trigger_enter(&mut self, contact: &ContactView) {
        if self.matches(contact) {
            println!(
                "{} entered the goal at ({:.2}, {:.2})",
                self.target, contact.point.x, contact.point.y
            );
        }
    }

    fn on_trigger_stay(&mut self, contact: &ContactView) {
        if self.matches(contact) {
            println!("{} still in the goal", self.target);
        }
    }

    fn on_trigger_exit(&mut self, contact: &ContactView) {
        if self.matches(contact) {
            println!("{} left the goal", self.target);
        }
    }
}

fn main() {
    init_tracing();

    let mut world = PhysicsWorld::new(WorldConfig {
        gravity: Vec2::ZERO,
        ..WorldConfig::default()
    });

    let goal = world.add_collider(
        Collider::fixed(Shape::rect(Vec2::new(0.5, 2.0)), Vec2::new(4.0, 0.0)).trigger(),
    );

    let ball = world.add_body(RigidBody::new(1.0).with_position(Vec2::new(-2.0, 0.0)));
    world.body_mut(ball).unwrap().velocity = Vec2::new(3.0, 0.0);
    let ball_col = world.add_collider(Collider::attached(Shape::circle(0.3), ball));

    let mut tags = HashMap::new();
    tags.insert(ball_col, "ball");
    world.add_trigger_listener(
        goal,
        Box::new(TagFilter {
            target: "ball",
            tags,
        }),
    );

    let dt = 1.0 / 60.0;
    for _ in 0..240 {
        world.step(dt);
    }
}
