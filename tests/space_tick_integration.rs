//! Backend step integration tests: contact detection, observers, accumulator,
//! and action/undo through the `Space`.

use bevy_ecs::prelude::*;
use fastrand::Rng;
use glam::Vec2;

use grana_relax::components::mapposition::MapPosition;
use grana_relax::components::polygoncollider::{ConvexShape, PolygonCollider};
use grana_relax::components::rotation::Rotation;
use grana_relax::components::structure::{
    ACTION_MOVE, ACTION_ROTATE, ActionKind, ActionParams, Structure,
};
use grana_relax::events::contact::{ContactEvent, observe_contact};
use grana_relax::resources::overlapaccumulator::OverlapAccumulator;
use grana_relax::resources::worldtime::WorldTime;
use grana_relax::space::Space;
use grana_relax::systems::collision::contact_detector;
use grana_relax::systems::time::update_world_time;

const EPSILON: f32 = 1e-4;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn square_at(space: &mut Space, x: f32, y: f32, side: f32) -> Entity {
    space.spawn_structure(
        Structure::new("C2S2M2", Vec2::new(x, y), 0.0),
        0.0,
        PolygonCollider::rectangle(side, side),
    )
}

fn tick_contact_detector(world: &mut World) {
    let mut schedule = Schedule::default();
    schedule.add_systems(contact_detector);
    schedule.run(world);
}

// =============================================================================
// Raw world: detector + observer
// =============================================================================

#[test]
fn contact_detector_triggers_one_event_per_shape_pair() {
    let mut world = World::new();
    world.insert_resource(OverlapAccumulator::default());

    let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    world.add_observer(move |trigger: On<ContactEvent>| {
        seen_clone.lock().unwrap().push(trigger.event().distance);
    });
    world.add_observer(observe_contact);
    world.flush();

    // Two-shape body overlapping a single square with both shapes.
    let twin = PolygonCollider::new(vec![
        ConvexShape::from_points(&[
            Vec2::new(-5.0, 0.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 5.0),
            Vec2::new(-5.0, 5.0),
        ])
        .unwrap(),
        ConvexShape::from_points(&[
            Vec2::new(-5.0, -5.0),
            Vec2::new(0.0, -5.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(-5.0, 0.0),
        ])
        .unwrap(),
    ]);
    world.spawn((MapPosition::new(0.0, 0.0), Rotation::default(), twin));
    world.spawn((
        MapPosition::new(4.0, 0.0),
        Rotation::default(),
        PolygonCollider::rectangle(10.0, 10.0),
    ));

    tick_contact_detector(&mut world);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|d| approx_eq(*d, -1.0)));

    let acc = world.resource::<OverlapAccumulator>();
    assert_eq!(acc.event_count, 2);
    assert!(approx_eq(acc.overlap_depth, 2.0));
}

#[test]
fn update_world_time_counts_steps() {
    let mut world = World::new();
    world.insert_resource(WorldTime::default());
    update_world_time(&mut world, 0.1);
    update_world_time(&mut world, 0.1);
    let wt = world.resource::<WorldTime>();
    assert_eq!(wt.step_count, 2);
    assert!(approx_eq(wt.elapsed, 0.2));
    assert!(approx_eq(wt.delta, 0.1));
}

// =============================================================================
// Space
// =============================================================================

#[test]
fn space_step_accumulates_penetration() {
    let mut space = Space::new();
    square_at(&mut space, 0.0, 0.0, 10.0);
    square_at(&mut space, 8.0, 0.0, 10.0);
    square_at(&mut space, 100.0, 0.0, 10.0);

    space.step(0.1);
    assert_eq!(space.accumulator().event_count, 1);
    assert!(approx_eq(space.accumulator().overlap_depth, 2.0));

    // A second step without reset adds the same contact again.
    space.step(0.1);
    assert!(approx_eq(space.accumulator().overlap_depth, 4.0));
    assert_eq!(space.time().step_count, 2);
}

#[test]
fn space_measure_reads_then_resets() {
    let mut space = Space::new();
    square_at(&mut space, 0.0, 0.0, 10.0);
    square_at(&mut space, 7.0, 0.0, 10.0);

    assert!(approx_eq(space.measure(0.1), 3.0));
    assert_eq!(space.accumulator().event_count, 0);
    assert!(approx_eq(space.accumulator().overlap_depth, 0.0));
    assert!(approx_eq(space.measure(0.1), 3.0));
    assert_eq!(space.accumulator().lifetime_event_count, 2);
}

#[test]
fn separated_structures_report_no_overlap() {
    let mut space = Space::new();
    square_at(&mut space, 0.0, 0.0, 10.0);
    square_at(&mut space, 10.5, 0.0, 10.0);
    assert!(approx_eq(space.measure(0.1), 0.0));
}

#[test]
fn total_area_covers_every_shape() {
    let mut space = Space::new();
    square_at(&mut space, 0.0, 0.0, 2.0);
    square_at(&mut space, 50.0, 0.0, 3.0);
    assert!(approx_eq(space.total_area(), 13.0));
}

#[test]
fn act_and_undo_through_space_restore_pose() {
    let mut space = Space::new();
    let e = square_at(&mut space, 20.0, 30.0, 4.0);
    let params = ActionParams::default();
    let mut rng = Rng::with_seed(42);

    for code in [ACTION_MOVE, ACTION_ROTATE, ACTION_MOVE, ACTION_ROTATE] {
        let pose = (space.position(e), space.angle(e));
        let applied = space.act(e, code, &params, &mut rng);
        assert!(applied.is_some());
        assert!(space.undo(e));
        assert_eq!((space.position(e), space.angle(e)), pose);
    }
}

#[test]
fn act_on_non_structure_is_noop() {
    let mut space = Space::new();
    let obstacle = space
        .world_mut()
        .spawn((
            MapPosition::new(0.0, 0.0),
            Rotation::default(),
            PolygonCollider::rectangle(1.0, 1.0),
        ))
        .id();
    let mut rng = Rng::with_seed(1);
    assert_eq!(space.act(obstacle, ACTION_MOVE, &ActionParams::default(), &mut rng), None);
    assert!(!space.undo(obstacle));
    assert_eq!(space.position(obstacle), Some(Vec2::ZERO));
    assert!(space.structures().is_empty());
}

#[test]
fn unknown_action_code_changes_nothing() {
    let mut space = Space::new();
    let e = square_at(&mut space, 1.0, 1.0, 1.0);
    let mut rng = Rng::with_seed(1);
    assert_eq!(space.act(e, 0, &ActionParams::default(), &mut rng), None);
    assert_eq!(space.position(e), Some(Vec2::new(1.0, 1.0)));
    assert_eq!(space.angle(e), Some(0.0));
}

#[test]
fn moving_apart_reduces_measured_overlap() {
    let mut space = Space::new();
    let a = square_at(&mut space, 0.0, 0.0, 10.0);
    square_at(&mut space, 9.5, 0.0, 10.0);
    let before = space.measure(0.1);

    let params = ActionParams {
        tether_radius: 5.0,
        move_step: 0.4,
        rotate_degrees: 0.0,
    };
    let mut rng = Rng::with_seed(8);
    // Only keep steps that go left.
    for _ in 0..200 {
        let x = space.position(a).unwrap().x;
        let applied = space.act(a, ACTION_MOVE, &params, &mut rng);
        assert_eq!(applied, Some(ActionKind::Move));
        if space.position(a).unwrap().x > x {
            space.undo(a);
        }
    }
    assert!(space.position(a).unwrap().x < -0.5);
    assert!(space.measure(0.1) < before);
}
