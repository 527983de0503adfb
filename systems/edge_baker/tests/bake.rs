use glam::Vec3;
use grid_tactics_collision::BoxWorld;
use grid_tactics_core::{
    Aabb, BakeRegion, ColliderId, Command, CoverKind, Direction, GridLayout, GridPosition,
    LayerMask,
};
use grid_tactics_system_edge_baker::EdgeBaker;
use grid_tactics_world::{self as world, query, World};

fn apply_all(world: &mut World, commands: Vec<Command>) {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
}

/// 6x6 single-floor courtyard with unit cells centred on integer coordinates.
fn courtyard() -> (World, BoxWorld, ColliderId) {
    let world = World::new(GridLayout::new(6, 6, 1, 1.0, 3.0).expect("layout"));
    let mut geometry = BoxWorld::new();
    // Thin wall on the border between x = 2 and x = 3 for rows 0..=2.
    let wall = geometry.add(
        Aabb::new(Vec3::new(2.45, 0.0, -0.5), Vec3::new(2.55, 2.5, 2.5)),
        LayerMask::EDGE_BLOCKERS,
    );
    // Crate filling cell (1, 4).
    let _ = geometry.add(
        Aabb::new(Vec3::new(0.5, 0.0, 3.5), Vec3::new(1.5, 1.0, 4.5)),
        LayerMask::COVER.union(LayerMask::OBSTACLES),
    );
    // Pillar filling cell (4, 4).
    let _ = geometry.add(
        Aabb::new(Vec3::new(3.5, 0.0, 3.5), Vec3::new(4.5, 2.5, 4.5)),
        LayerMask::COVER.union(LayerMask::OBSTACLES),
    );
    (world, geometry, wall)
}

fn bake(world: &mut World, geometry: &BoxWorld, baker: &EdgeBaker) {
    let mut commands = Vec::new();
    baker.bake_walkability(query::nodes(world), geometry, &mut commands);
    apply_all(world, commands);

    let mut commands = Vec::new();
    baker.bake_all(query::nodes(world), geometry, &mut commands);
    apply_all(world, commands);
}

fn assert_walls_symmetric(world: &World) {
    let layout = *query::layout(world);
    let nodes = query::nodes(world);
    for cell in layout.positions() {
        for direction in Direction::ALL {
            if let Some(neighbor) = layout.neighbor(cell, direction) {
                assert_eq!(
                    nodes.has_wall(cell, direction),
                    nodes.has_wall(neighbor, direction.opposite()),
                    "asymmetric wall between {cell:?} and {neighbor:?}"
                );
            }
        }
    }
}

#[test]
fn walls_are_baked_on_both_sides() {
    let (mut world, geometry, _) = courtyard();
    bake(&mut world, &geometry, &EdgeBaker::default());

    let nodes = query::nodes(&world);
    for z in 0..=2 {
        assert!(nodes.has_wall(GridPosition::new(2, z, 0), Direction::East));
        assert!(nodes.has_wall(GridPosition::new(3, z, 0), Direction::West));
    }
    assert!(!nodes.has_wall(GridPosition::new(2, 3, 0), Direction::East));
    assert_walls_symmetric(&world);
}

#[test]
fn obstacles_become_unwalkable() {
    let (mut world, geometry, _) = courtyard();
    bake(&mut world, &geometry, &EdgeBaker::default());

    let nodes = query::nodes(&world);
    assert!(!nodes.is_walkable(GridPosition::new(1, 4, 0)));
    assert!(!nodes.is_walkable(GridPosition::new(4, 4, 0)));
    assert!(nodes.is_walkable(GridPosition::new(2, 4, 0)));
}

#[test]
fn sunken_and_storey_spanning_obstacles_block_their_cells() {
    let mut world = World::new(GridLayout::new(3, 3, 2, 1.0, 3.0).expect("layout"));
    let mut geometry = BoxWorld::new();
    // Crate sunk half a unit into the floor of (1, 1).
    let _ = geometry.add(
        Aabb::new(Vec3::new(0.5, -0.5, 0.5), Vec3::new(1.5, 1.5, 1.5)),
        LayerMask::OBSTACLES,
    );
    // Column rising from the ground floor through the storey above (2, 0).
    let _ = geometry.add(
        Aabb::new(Vec3::new(1.5, 0.0, -0.5), Vec3::new(2.5, 4.0, 0.5)),
        LayerMask::OBSTACLES,
    );
    // Ground slab whose top is flush with the floor.
    let _ = geometry.add(
        Aabb::new(Vec3::new(-0.5, -1.0, -0.5), Vec3::new(2.5, 0.0, 2.5)),
        LayerMask::OBSTACLES,
    );

    let mut commands = Vec::new();
    EdgeBaker::default().bake_walkability(query::nodes(&world), &geometry, &mut commands);
    apply_all(&mut world, commands);

    let nodes = query::nodes(&world);
    assert!(!nodes.is_walkable(GridPosition::new(1, 1, 0)));
    assert!(!nodes.is_walkable(GridPosition::new(2, 0, 0)));
    assert!(!nodes.is_walkable(GridPosition::new(2, 0, 1)));
    assert!(nodes.is_walkable(GridPosition::new(0, 0, 0)));
    assert!(nodes.is_walkable(GridPosition::new(1, 1, 1)));
}

#[test]
fn walkability_bake_is_incremental() {
    let (mut world, geometry, _) = courtyard();
    let baker = EdgeBaker::default();
    bake(&mut world, &geometry, &baker);

    let mut commands = Vec::new();
    baker.bake_walkability(query::nodes(&world), &geometry, &mut commands);
    assert!(commands.is_empty());
}

#[test]
fn cover_is_classified_per_cell_side() {
    let (mut world, geometry, _) = courtyard();
    bake(&mut world, &geometry, &EdgeBaker::default());

    let nodes = query::nodes(&world);
    assert_eq!(
        nodes.cover(GridPosition::new(0, 4, 0), Direction::East),
        CoverKind::Low
    );
    assert_eq!(
        nodes.cover(GridPosition::new(1, 3, 0), Direction::North),
        CoverKind::Low
    );
    assert_eq!(
        nodes.cover(GridPosition::new(3, 4, 0), Direction::East),
        CoverKind::High
    );
    assert_eq!(
        nodes.cover(GridPosition::new(1, 4, 0), Direction::West),
        CoverKind::None,
        "unwalkable cells record no cover"
    );
    assert_eq!(
        nodes.cover(GridPosition::new(0, 0, 0), Direction::North),
        CoverKind::None
    );
}

#[test]
fn local_rebake_restores_symmetry_after_wall_removal() {
    let (mut world, mut geometry, wall) = courtyard();
    let baker = EdgeBaker::default();
    bake(&mut world, &geometry, &baker);

    assert!(geometry.remove(wall).is_some());

    let center = GridPosition::new(3, 1, 0);
    let mut commands = Vec::new();
    baker.rebake_around(query::nodes(&world), &geometry, center, 0, &mut commands);
    assert_eq!(
        commands.first(),
        Some(&Command::ClearEdges {
            region: BakeRegion::Around { center, radius: 0 }
        })
    );
    apply_all(&mut world, commands);

    let nodes = query::nodes(&world);
    assert!(!nodes.has_wall(GridPosition::new(2, 1, 0), Direction::East));
    assert!(!nodes.has_wall(center, Direction::West));
    assert!(nodes.has_wall(GridPosition::new(2, 0, 0), Direction::East));
    assert!(nodes.has_wall(GridPosition::new(2, 2, 0), Direction::East));
    assert_walls_symmetric(&world);
}

#[test]
fn rebake_only_touches_the_region() {
    let (mut world, geometry, _) = courtyard();
    let baker = EdgeBaker::default();
    bake(&mut world, &geometry, &baker);

    let region = BakeRegion::Around {
        center: GridPosition::new(1, 1, 0),
        radius: 1,
    };
    let mut commands = Vec::new();
    baker.rebake_around(
        query::nodes(&world),
        &geometry,
        GridPosition::new(1, 1, 0),
        1,
        &mut commands,
    );

    for command in &commands {
        match command {
            Command::MarkWall { cell, .. } | Command::MarkCover { cell, .. } => {
                assert!(region.contains(*cell), "{command:?} escapes the region");
            }
            Command::ClearEdges { .. } => {}
            other => panic!("unexpected command {other:?}"),
        }
    }

    apply_all(&mut world, commands);
    assert!(query::nodes(&world).has_wall(GridPosition::new(2, 1, 0), Direction::East));
    assert_walls_symmetric(&world);
}
