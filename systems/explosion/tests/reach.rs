use glam::Vec3;
use grid_tactics_collision::BoxWorld;
use grid_tactics_core::{Aabb, GridLayout, GridPosition, LayerMask};
use grid_tactics_system_explosion::{ExplosionSettings, ExplosionSolver};

fn layout(size: u32) -> GridLayout {
    GridLayout::new(size, size, 1, 1.0, 3.0).expect("valid layout")
}

/// Solid block filling the cell at `(x, z)` on floor 0.
fn block_at(geometry: &mut BoxWorld, x: i32, z: i32) {
    let center = Vec3::new(x as f32, 1.0, z as f32);
    let _ = geometry.add(
        Aabb::from_center_half_extents(center, Vec3::new(0.5, 1.0, 0.5)),
        LayerMask::OBSTACLES,
    );
}

fn relative(origin: GridPosition, dx: i32, dz: i32) -> GridPosition {
    origin.offset(dx, dz)
}

#[test]
fn wall_to_the_east_stops_pressure_at_its_face() {
    let layout = layout(5);
    let origin = GridPosition::new(2, 2, 0);
    let mut geometry = BoxWorld::new();
    block_at(&mut geometry, 4, 2);

    let reach = ExplosionSolver::default().compute_reach(&layout, &geometry, origin, 2);

    assert!(reach.contains(&origin));
    assert!(reach.contains(&relative(origin, 1, 0)));
    assert!(reach.contains(&relative(origin, -2, 0)));
    assert!(reach.contains(&relative(origin, 0, 2)));
    assert!(reach.contains(&relative(origin, 0, -2)));
    assert!(!reach.contains(&relative(origin, 2, 0)));
    assert_eq!(reach.len(), 12);
}

#[test]
fn open_field_reach_is_a_disc() {
    let layout = layout(9);
    let origin = GridPosition::new(4, 4, 0);

    let reach = ExplosionSolver::default().compute_reach(&layout, &BoxWorld::new(), origin, 2);

    assert_eq!(reach.len(), 13);
    assert!(!reach.contains(&relative(origin, 2, 1)));
    assert!(!reach.contains(&relative(origin, 2, 2)));
    assert!(reach.contains(&relative(origin, 1, 1)));
}

#[test]
fn blocked_direction_stays_closed_for_farther_rings() {
    let layout = layout(9);
    let origin = GridPosition::new(1, 4, 0);
    let mut geometry = BoxWorld::new();
    block_at(&mut geometry, 3, 4);

    let reach = ExplosionSolver::default().compute_reach(&layout, &geometry, origin, 6);

    assert!(reach.contains(&GridPosition::new(2, 4, 0)));
    for x in 3..=7 {
        assert!(!reach.contains(&GridPosition::new(x, 4, 0)), "x = {x}");
    }
    assert!(reach.contains(&GridPosition::new(4, 7, 0)));
}

#[test]
fn larger_radius_never_loses_open_cells() {
    let layout = layout(11);
    let origin = GridPosition::new(5, 5, 0);
    let mut geometry = BoxWorld::new();
    block_at(&mut geometry, 7, 5);
    block_at(&mut geometry, 5, 3);
    let mut solver = ExplosionSolver::default();

    let mut previous = solver.compute_reach(&layout, &geometry, origin, 1);
    for radius in 2..=5 {
        let current = solver.compute_reach(&layout, &geometry, origin, radius);
        assert!(
            previous.is_subset(&current),
            "radius {radius} dropped cells"
        );
        previous = current;
    }
}

#[test]
fn invalid_origin_reaches_nothing() {
    let reach = ExplosionSolver::new(ExplosionSettings::default()).compute_reach(
        &layout(4),
        &BoxWorld::new(),
        GridPosition::new(9, 9, 0),
        3,
    );
    assert!(reach.is_empty());
}

#[test]
fn other_layers_do_not_stop_pressure() {
    let layout = layout(5);
    let origin = GridPosition::new(2, 2, 0);
    let mut geometry = BoxWorld::new();
    let _ = geometry.add(
        Aabb::from_center_half_extents(Vec3::new(3.0, 1.0, 2.0), Vec3::new(0.5, 1.0, 0.5)),
        LayerMask::COVER,
    );

    let reach = ExplosionSolver::default().compute_reach(&layout, &geometry, origin, 2);
    assert!(reach.contains(&relative(origin, 2, 0)));
}
