use glam::Vec2;
use nudge::{Collider, PhysicsWorld, RigidBody, Shape, WorldConfig};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();
}

fn main() {
    init_tracing();

    let mut world = PhysicsWorld::new(WorldConfig::default());
    world.add_collider(Collider::fixed(
        Shape::rect(Vec2::new(10.0, 0.5)),
        Vec2::new(0.0, -0.5),
    ));
    let ball = world.add_body(
        RigidBody::new(1.0)
            .with_position(Vec2::new(0.0, 4.0))
            .with_restitution(0.8),
    );
    world.add_collider(Collider::attached(Shape::circle(0.5), ball));

    let dt = 1.0 / 60.0;
    for frame in 0..240 {
        world.step(dt);
        if frame % 12 == 0 {
            let b = world.body(ball).unwrap();
            println!(
                "t={:5.2}s pos=({:6.3},{:6.3}) vel=({:6.3},{:6.3})",
                frame as f32 * dt,
                b.position.x,
                b.position.y,
                b.velocity.x,
                b.velocity.y
            );
        }
    }
}
