#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that loads a scenario and runs spatial queries against it.

mod scenario;

use std::{collections::BTreeSet, path::PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use glam::Vec3;
use grid_tactics_core::GridPosition;
use grid_tactics_system_explosion::ExplosionSolver;
use grid_tactics_system_grenade_arc::{plan_throw, LandingSurface, ThrowPlan};
use grid_tactics_system_pathfinding::Pathfinder;
use grid_tactics_system_visibility::{sample_line_of_sight, GridSight, RayVisibility};
use grid_tactics_world::query;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::scenario::{Battlefield, Scenario};

/// Runs tactical grid queries against a TOML scenario and prints JSON.
#[derive(Debug, Parser)]
#[command(name = "grid-tactics", version, about)]
struct Cli {
    /// Scenario file describing the grid and its geometry.
    #[arg(short, long)]
    scenario: PathBuf,
    /// Raise log verbosity; repeat for more detail.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    query: Query,
}

#[derive(Debug, Subcommand)]
enum Query {
    /// Cheapest route between two cells.
    Path {
        /// Start cell as `x,z` or `x,z,floor`.
        #[arg(value_parser = parse_cell)]
        from: GridPosition,
        /// Destination cell.
        #[arg(value_parser = parse_cell)]
        to: GridPosition,
    },
    /// Grid and ray-sampled sight between two cells.
    Los {
        /// Observer cell.
        #[arg(value_parser = parse_cell)]
        from: GridPosition,
        /// Target cell.
        #[arg(value_parser = parse_cell)]
        to: GridPosition,
        /// Treat occupied cells as opaque.
        #[arg(long)]
        occlude_units: bool,
    },
    /// Every cell visible from an origin.
    Visible {
        /// Observer cell.
        #[arg(value_parser = parse_cell)]
        from: GridPosition,
        /// Sight range in tiles.
        #[arg(long, default_value_t = 10)]
        range: u32,
        /// Treat occupied cells as opaque.
        #[arg(long)]
        occlude_units: bool,
    },
    /// Cells reached by an explosion.
    Reach {
        /// Blast origin.
        #[arg(value_parser = parse_cell)]
        origin: GridPosition,
        /// Blast radius in tiles.
        #[arg(long)]
        radius: u32,
    },
    /// Validates a grenade throw between two cells.
    Throw {
        /// Thrower cell.
        #[arg(value_parser = parse_cell)]
        from: GridPosition,
        /// Target cell.
        #[arg(value_parser = parse_cell)]
        to: GridPosition,
        /// Release height above the thrower's floor.
        #[arg(long, default_value_t = 1.5)]
        hand_height: f32,
        /// Landing height above the target's floor.
        #[arg(long, default_value_t = 0.0)]
        target_height: f32,
        /// Aim at the top of an obstacle rather than open floor.
        #[arg(long)]
        obstacle: bool,
    },
}

#[derive(Debug, Serialize)]
struct PathReport {
    found: bool,
    cost: Option<u32>,
    cells: Vec<GridPosition>,
}

#[derive(Debug, Serialize)]
struct SightReport {
    grid: bool,
    rays: RayVisibility,
    exposure: f32,
}

#[derive(Debug, Serialize)]
struct CellsReport {
    count: usize,
    cells: BTreeSet<GridPosition>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum ThrowReport {
    Accepted(ThrowPlan),
    Rejected { reason: String },
}

/// Entry point for the grid tactics command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let scenario = Scenario::load(&cli.scenario)
        .with_context(|| format!("failed to load {}", cli.scenario.display()))?;
    let battlefield = scenario.build().context("failed to build scenario")?;

    let report = run(&scenario, &battlefield, &cli.query)?;
    println!("{report}");
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(scenario: &Scenario, battlefield: &Battlefield, request: &Query) -> Result<String> {
    let world = &battlefield.world;
    let geometry = &battlefield.geometry;
    let layout = query::layout(world);

    let json = match *request {
        Query::Path { from, to } => {
            let path = Pathfinder::new().find_path(query::nodes(world), from, to);
            to_json(&PathReport {
                found: path.is_some(),
                cost: path.as_ref().map(|path| path.cost),
                cells: path.map(|path| path.cells).unwrap_or_default(),
            })?
        }
        Query::Los {
            from,
            to,
            occlude_units,
        } => {
            let sight = grid_sight(battlefield);
            let rays = sample_line_of_sight(geometry, layout, from, to, &scenario.sampling);
            to_json(&SightReport {
                grid: sight.has_line_of_sight(from, to, occlude_units),
                rays,
                exposure: rays.exposure(),
            })?
        }
        Query::Visible {
            from,
            range,
            occlude_units,
        } => {
            let cells = grid_sight(battlefield).visible_tiles(from, range, occlude_units);
            to_json(&CellsReport {
                count: cells.len(),
                cells,
            })?
        }
        Query::Reach { origin, radius } => {
            let mut solver = ExplosionSolver::new(scenario.explosion);
            let cells = solver.compute_reach(layout, geometry, origin, radius);
            to_json(&CellsReport {
                count: cells.len(),
                cells,
            })?
        }
        Query::Throw {
            from,
            to,
            hand_height,
            target_height,
            obstacle,
        } => {
            let start = layout.world_position(from) + Vec3::Y * hand_height;
            let end = layout.world_position(to) + Vec3::Y * target_height;
            let landing = if obstacle {
                LandingSurface::Obstacle
            } else {
                LandingSurface::Ground
            };
            let report = match plan_throw(
                start,
                end,
                landing,
                scenario.arc.as_ref(),
                geometry,
                &scenario.arc_settings,
            ) {
                Ok(plan) => ThrowReport::Accepted(plan),
                Err(rejection) => ThrowReport::Rejected {
                    reason: rejection.to_string(),
                },
            };
            to_json(&report)?
        }
    };
    Ok(json)
}

fn grid_sight(battlefield: &Battlefield) -> GridSight<'_> {
    let world = &battlefield.world;
    GridSight::new(
        query::nodes(world),
        query::occupancy(world),
        query::tall_blockers(world),
    )
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to encode report")
}

/// Parses `x,z` or `x,z,floor` into a grid position.
fn parse_cell(value: &str) -> Result<GridPosition, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| format!("invalid cell '{value}': {error}"))?;
    match parts[..] {
        [x, z] => Ok(GridPosition::new(x, z, 0)),
        [x, z, floor] => Ok(GridPosition::new(x, z, floor)),
        _ => Err(format!("invalid cell '{value}': expected x,z or x,z,floor")),
    }
}
