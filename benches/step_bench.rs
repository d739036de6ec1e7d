use criterion::{Criterion, black_box, criterion_group, criterion_main};
use glam::Vec2;
use nudge::{Collider, PhysicsWorld, RigidBody, Shape, WorldConfig};

// Settle a vertical stack of circles onto a static floor.
fn run_circle_stack(num_circles: usize) {
    let mut world = PhysicsWorld::new(WorldConfig {
        cell_size: 2.0,
        ..WorldConfig::default()
    });

    world.add_collider(Collider::fixed(
        Shape::rect(Vec2::new(20.0, 0.5)),
        Vec2::new(0.0, -0.5),
    ));

    let radius = 0.5;
    for i in 0..num_circles {
        let y = radius + i as f32 * (radius * 2.1);
        let body = world.add_body(
            RigidBody::new(1.0)
                .with_position(Vec2::new(0.0, y))
                .with_friction(0.2),
        );
        world.add_collider(Collider::attached(Shape::circle(radius), body));
    }

    let dt = 1.0 / 60.0;
    for _ in 0..30 {
        world.step(black_box(dt));
    }
}

fn stack_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("circle_stack");
    for &n in &[8usize, 32, 64] {
        group.bench_function(format!("settle_{n}"), |b| b.iter(|| run_circle_stack(n)));
    }
    group.finish();
}

criterion_group!(benches, stack_benchmarks);
criterion_main!(benches);
