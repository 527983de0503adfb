//! TOML scenario files describing a battlefield to query.

use std::{fs, io, path::Path};

use glam::Vec3;
use grid_tactics_collision::BoxWorld;
use grid_tactics_core::{Aabb, Command, Event, GridError, GridLayout, GridPosition, LayerMask, UnitId};
use grid_tactics_system_edge_baker::{EdgeBakeSettings, EdgeBaker};
use grid_tactics_system_explosion::ExplosionSettings;
use grid_tactics_system_grenade_arc::{ArcConfig, ArcSettings};
use grid_tactics_system_visibility::RaySampling;
use grid_tactics_world::{self as world, query, World};
use serde::Deserialize;
use tracing::info;

/// Battlefield description loaded from disk.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    grid: GridSection,
    #[serde(default)]
    boxes: Vec<BoxSection>,
    #[serde(default)]
    units: Vec<UnitSection>,
    #[serde(default)]
    tall_blockers: Vec<TallBlockerSection>,
    #[serde(default)]
    pub(crate) edge_bake: EdgeBakeSettings,
    #[serde(default)]
    pub(crate) sampling: RaySampling,
    #[serde(default)]
    pub(crate) explosion: ExplosionSettings,
    /// Arc tuning; throws fall back to the built-in curve when absent.
    pub(crate) arc: Option<ArcConfig>,
    #[serde(default)]
    pub(crate) arc_settings: ArcSettings,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GridSection {
    width: u32,
    height: u32,
    #[serde(default = "one")]
    floors: u32,
    #[serde(default = "unit_length")]
    cell_size: f32,
    #[serde(default = "storey")]
    floor_height: f32,
    #[serde(default)]
    origin: [f32; 3],
}

fn one() -> u32 {
    1
}

fn unit_length() -> f32 {
    1.0
}

fn storey() -> f32 {
    3.0
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BoxSection {
    min: [f32; 3],
    max: [f32; 3],
    layers: Vec<Layer>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Layer {
    EdgeBlockers,
    Cover,
    LineOfSightBlockers,
    Obstacles,
    Ceiling,
    ArcBlockers,
}

impl Layer {
    fn mask(self) -> LayerMask {
        match self {
            Self::EdgeBlockers => LayerMask::EDGE_BLOCKERS,
            Self::Cover => LayerMask::COVER,
            Self::LineOfSightBlockers => LayerMask::LINE_OF_SIGHT_BLOCKERS,
            Self::Obstacles => LayerMask::OBSTACLES,
            Self::Ceiling => LayerMask::CEILING,
            Self::ArcBlockers => LayerMask::ARC_BLOCKERS,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnitSection {
    id: u32,
    cell: [i32; 3],
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TallBlockerSection {
    tiles: Vec<[i32; 3]>,
}

/// World state and geometry built from a scenario.
#[derive(Debug)]
pub(crate) struct Battlefield {
    pub(crate) world: World,
    pub(crate) geometry: BoxWorld,
}

/// Errors raised while loading or building a scenario.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ScenarioError {
    /// The scenario file could not be read.
    #[error("could not read scenario: {0}")]
    Read(#[from] io::Error),
    /// The scenario file is not valid TOML or has the wrong shape.
    #[error("could not parse scenario: {0}")]
    Parse(#[from] toml::de::Error),
    /// The grid section describes an invalid layout.
    #[error("invalid grid: {0}")]
    Grid(GridError),
    /// Units or tall blockers could not be placed.
    #[error("scenario rejected by the world: {0}")]
    Rejected(GridError),
}

impl Scenario {
    /// Reads and parses the scenario stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parses a scenario from TOML text.
    pub(crate) fn parse(text: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(text)?)
    }

    /// Builds the world, bakes walkability and edges, then places units and tall blockers.
    pub(crate) fn build(&self) -> Result<Battlefield, ScenarioError> {
        let grid = self.grid;
        let layout = GridLayout::new(
            grid.width,
            grid.height,
            grid.floors,
            grid.cell_size,
            grid.floor_height,
        )
        .map_err(ScenarioError::Grid)?
        .with_origin(Vec3::from_array(grid.origin));

        let mut geometry = BoxWorld::new();
        for section in &self.boxes {
            let layers = section
                .layers
                .iter()
                .fold(LayerMask::NONE, |mask, layer| mask.union(layer.mask()));
            let _ = geometry.add(
                Aabb::new(Vec3::from_array(section.min), Vec3::from_array(section.max)),
                layers,
            );
        }

        let mut world = World::new(layout);
        let baker = EdgeBaker::new(self.edge_bake);

        let mut commands = Vec::new();
        baker.bake_walkability(query::nodes(&world), &geometry, &mut commands);
        apply_all(&mut world, commands)?;

        let mut commands = Vec::new();
        baker.bake_all(query::nodes(&world), &geometry, &mut commands);
        apply_all(&mut world, commands)?;

        let mut commands = Vec::new();
        for unit in &self.units {
            commands.push(Command::PlaceOccupant {
                unit: UnitId::new(unit.id),
                cell: cell(unit.cell),
            });
        }
        for blocker in &self.tall_blockers {
            commands.push(Command::RegisterTallBlocker {
                tiles: blocker.tiles.iter().copied().map(cell).collect(),
            });
        }
        apply_all(&mut world, commands)?;

        info!(
            colliders = geometry.len(),
            units = self.units.len(),
            "scenario built"
        );
        Ok(Battlefield { world, geometry })
    }
}

fn cell([x, z, floor]: [i32; 3]) -> GridPosition {
    GridPosition::new(x, z, floor)
}

fn apply_all(world: &mut World, commands: Vec<Command>) -> Result<(), ScenarioError> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    match events.into_iter().find_map(|event| match event {
        Event::CommandRejected { reason } => Some(reason),
        _ => None,
    }) {
        Some(reason) => Err(ScenarioError::Rejected(reason)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_tactics_core::Direction;

    const ALLEY: &str = r#"
        [grid]
        width = 5
        height = 3

        [[boxes]]
        min = [1.45, 0.0, -0.5]
        max = [1.55, 2.5, 1.5]
        layers = ["edge_blockers", "line_of_sight_blockers"]

        [[boxes]]
        min = [3.5, 0.0, 1.5]
        max = [4.5, 1.0, 2.5]
        layers = ["obstacles", "cover"]

        [[units]]
        id = 7
        cell = [0, 0, 0]

        [[tall_blockers]]
        tiles = [[2, 2, 0]]

        [arc]
        max_throw_distance = 8.0
    "#;

    #[test]
    fn builds_baked_world_from_toml() {
        let scenario = Scenario::parse(ALLEY).expect("scenario parses");
        let battlefield = scenario.build().expect("scenario builds");
        let world = &battlefield.world;
        let nodes = query::nodes(world);

        assert_eq!(query::layout(world).width(), 5);
        assert_eq!(battlefield.geometry.len(), 2);
        assert!(nodes.has_wall(GridPosition::new(1, 0, 0), Direction::East));
        assert!(nodes.has_wall(GridPosition::new(2, 1, 0), Direction::West));
        assert!(!nodes.has_wall(GridPosition::new(1, 2, 0), Direction::East));
        assert!(!nodes.is_walkable(GridPosition::new(4, 2, 0)));
        assert_eq!(
            query::unit_cell(world, UnitId::new(7)),
            Some(GridPosition::new(0, 0, 0))
        );
        assert!(query::tall_blockers(world).is_blocked(GridPosition::new(2, 2, 0)));
        assert_eq!(
            scenario.arc.map(|arc| arc.max_throw_distance),
            Some(8.0)
        );
    }

    #[test]
    fn missing_sections_use_defaults() {
        let scenario = Scenario::parse("[grid]\nwidth = 2\nheight = 2\n").expect("parses");

        assert!(scenario.arc.is_none());
        assert_eq!(scenario.sampling, RaySampling::default());
        assert_eq!(scenario.arc_settings, ArcSettings::default());
    }

    #[test]
    fn unknown_layers_fail_to_parse() {
        let text = "[grid]\nwidth = 2\nheight = 2\n\n[[boxes]]\nmin = [0.0, 0.0, 0.0]\nmax = [1.0, 1.0, 1.0]\nlayers = [\"lava\"]\n";
        assert!(matches!(Scenario::parse(text), Err(ScenarioError::Parse(_))));
    }

    #[test]
    fn units_outside_the_grid_are_rejected() {
        let text = "[grid]\nwidth = 2\nheight = 2\n\n[[units]]\nid = 1\ncell = [5, 5, 0]\n";
        let scenario = Scenario::parse(text).expect("parses");

        assert!(matches!(
            scenario.build(),
            Err(ScenarioError::Rejected(GridError::OutOfBounds { .. }))
        ));
    }

    #[test]
    fn zero_sized_grids_are_rejected() {
        let scenario = Scenario::parse("[grid]\nwidth = 0\nheight = 2\n").expect("parses");
        assert!(matches!(scenario.build(), Err(ScenarioError::Grid(_))));
    }
}
