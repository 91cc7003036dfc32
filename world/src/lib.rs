#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Castle Defence.
//!
//! The world owns the map, the wall tiles, the structures built inside
//! enclosures and the cached enclosure result. Every wall mutation runs the
//! full place/remove, solve and reconcile cycle inside a single [`apply`]
//! call, so callers never observe an enclosed set that disagrees with the
//! walls or the built structures.

mod structures;
mod walls;

use std::collections::BTreeSet;

use castle_defence_core::{
    BuildOption, Command, Economy, EnclosureStats, Event, Gold, HexCoord, HexGrid, PlayMode,
    CASTLE_CELL, WELCOME_BANNER,
};
use castle_defence_system_enclosure::EnclosureSolver;
use tracing::{debug, info, warn};

use structures::BuildRegistry;
use walls::WallGraph;

pub use walls::PlacedTile;

const DEFAULT_GRID_RADIUS: u32 = 6;

/// Represents the authoritative Castle Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: HexGrid,
    walls: WallGraph,
    structures: BuildRegistry,
    build_options: Vec<BuildOption>,
    solver: EnclosureSolver,
    enclosed: BTreeSet<HexCoord>,
    stats: EnclosureStats,
    solved_hash: u64,
    play_mode: PlayMode,
}

impl World {
    /// Creates a world on a default hexagonal map with the default build
    /// catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(HexGrid::hexagon(DEFAULT_GRID_RADIUS), default_build_options())
    }

    /// Creates a world on the provided map with the provided build catalogue.
    #[must_use]
    pub fn with_options(grid: HexGrid, build_options: Vec<BuildOption>) -> Self {
        let mut world = Self {
            banner: WELCOME_BANNER,
            grid,
            walls: WallGraph::default(),
            structures: BuildRegistry::default(),
            build_options,
            solver: EnclosureSolver::new(),
            enclosed: BTreeSet::new(),
            stats: EnclosureStats::default(),
            solved_hash: 0,
            play_mode: PlayMode::default(),
        };
        world.solve_enclosure();
        world
    }

    fn solve_enclosure(&mut self) {
        let walls = &self.walls;
        self.stats = self.solver.solve(
            &self.grid,
            CASTLE_CELL,
            |cell| walls.mask_at(cell),
            &mut self.enclosed,
        );
        self.solved_hash = walls.state_hash();
    }

    /// Recomputes the enclosure and reconciles structures against it.
    ///
    /// Unless `force` is set the solve is skipped when the wall state hash
    /// matches the last solved state.
    fn refresh_enclosure(&mut self, force: bool, out_events: &mut Vec<Event>) {
        if !force && self.walls.state_hash() == self.solved_hash {
            debug!("wall state unchanged, keeping cached enclosure");
            return;
        }

        self.solve_enclosure();
        info!(
            enclosed = self.stats.enclosed_count,
            walls = self.stats.wall_count,
            gaps = self.stats.open_gap_count,
            "enclosure recomputed"
        );
        if self.stats.open_gap_count > 0 {
            for gap in self.solver.open_gaps() {
                debug!(cell = %gap.cell, neighbor = %gap.neighbor(), "unsealed wall edge");
            }
        }
        out_events.push(Event::EnclosureUpdated { stats: self.stats });

        for (cell, option) in self.structures.reconcile(&self.enclosed) {
            warn!(%cell, option = option.get(), "structure lost its enclosure");
            out_events.push(Event::StructureInvalidated { cell, option });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// `economy` pays for construction; it is only charged by successful
/// [`Command::Build`] requests.
pub fn apply<E>(world: &mut World, command: Command, economy: &mut E, out_events: &mut Vec<Event>)
where
    E: Economy + ?Sized,
{
    match command {
        Command::PlaceWall {
            cell,
            kind,
            rotation,
            allow_replace,
        } => match world
            .walls
            .try_place(&world.grid, cell, kind, rotation, allow_replace)
        {
            Ok(previous) => {
                let mask = kind.mask(rotation);
                info!(%cell, ?kind, rotation = rotation.steps(), "wall placed");
                out_events.push(Event::WallPlaced {
                    cell,
                    kind,
                    rotation,
                    mask,
                    replaced: previous.is_some(),
                });
                world.refresh_enclosure(true, out_events);
            }
            Err(reason) => {
                debug!(%cell, ?kind, %reason, "wall placement rejected");
                out_events.push(Event::WallPlacementRejected {
                    cell,
                    kind,
                    rotation,
                    reason,
                });
            }
        },
        Command::RemoveWall { cell } => match world.walls.remove(cell) {
            Ok(tile) => {
                info!(%cell, kind = ?tile.kind(), "wall removed");
                out_events.push(Event::WallRemoved {
                    cell,
                    kind: tile.kind(),
                });
                world.refresh_enclosure(true, out_events);
            }
            Err(reason) => {
                debug!(%cell, %reason, "wall removal rejected");
                out_events.push(Event::WallRemovalRejected { cell, reason });
            }
        },
        Command::RecomputeEnclosure => world.refresh_enclosure(false, out_events),
        Command::Build { cell, option } => {
            match world.structures.try_build(
                cell,
                option,
                &world.enclosed,
                &world.build_options,
                economy,
            ) {
                Ok(cost) => {
                    info!(%cell, option = option.get(), %cost, "structure built");
                    out_events.push(Event::StructureBuilt { cell, option, cost });
                }
                Err(reason) => {
                    debug!(%cell, option = option.get(), %reason, "build rejected");
                    out_events.push(Event::BuildRejected {
                        cell,
                        option,
                        reason,
                    });
                }
            }
        }
        Command::Demolish { cell } => match world.structures.demolish(cell) {
            Ok(option) => {
                info!(%cell, option = option.get(), "structure demolished");
                out_events.push(Event::StructureDemolished { cell, option });
            }
            Err(reason) => {
                debug!(%cell, %reason, "demolition rejected");
                out_events.push(Event::DemolitionRejected { cell, reason });
            }
        },
        Command::SetPlayMode { mode } => {
            if world.play_mode != mode {
                world.play_mode = mode;
                info!(?mode, "play mode changed");
                out_events.push(Event::PlayModeChanged { mode });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{PlacedTile, World};
    use castle_defence_core::{
        BuildOption, BuildOptionId, EnclosureStats, HexCoord, HexGrid, PlayMode,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the map.
    #[must_use]
    pub fn grid(world: &World) -> &HexGrid {
        &world.grid
    }

    /// Reports whether a wall tile occupies the cell. The castle cell is not
    /// a wall tile.
    #[must_use]
    pub fn is_occupied(world: &World, cell: HexCoord) -> bool {
        world.walls.is_occupied(cell)
    }

    /// Wall tile occupying the cell, if any.
    #[must_use]
    pub fn wall_at(world: &World, cell: HexCoord) -> Option<PlacedTile> {
        world.walls.tile_at(cell).copied()
    }

    /// Snapshot of every wall tile in coordinate order.
    #[must_use]
    pub fn walls(world: &World) -> Vec<(HexCoord, PlacedTile)> {
        world
            .walls
            .iter()
            .map(|(cell, tile)| (cell, *tile))
            .collect()
    }

    /// Number of wall tiles on the map.
    #[must_use]
    pub fn wall_count(world: &World) -> usize {
        world.walls.len()
    }

    /// Reports whether the cell belongs to the last computed enclosed set.
    #[must_use]
    pub fn is_enclosed(world: &World, cell: HexCoord) -> bool {
        world.enclosed.contains(&cell)
    }

    /// Snapshot of the enclosed cells in coordinate order.
    #[must_use]
    pub fn enclosed_cells(world: &World) -> Vec<HexCoord> {
        world.enclosed.iter().copied().collect()
    }

    /// Statistics produced by the last enclosure computation.
    #[must_use]
    pub fn enclosure_stats(world: &World) -> EnclosureStats {
        world.stats
    }

    /// Content hash of the wall state the enclosure was last solved for.
    #[must_use]
    pub fn state_hash(world: &World) -> u64 {
        world.solved_hash
    }

    /// Snapshot of built structures in coordinate order.
    #[must_use]
    pub fn built(world: &World) -> Vec<(HexCoord, BuildOptionId)> {
        world.structures.iter().collect()
    }

    /// Structure standing on the cell, if any.
    #[must_use]
    pub fn structure_at(world: &World, cell: HexCoord) -> Option<BuildOptionId> {
        world.structures.option_at(cell)
    }

    /// Build catalogue in identifier order.
    #[must_use]
    pub fn build_options(world: &World) -> &[BuildOption] {
        &world.build_options
    }

    /// Catalogue entry for the provided identifier.
    #[must_use]
    pub fn build_option(world: &World, option: BuildOptionId) -> Option<&BuildOption> {
        usize::try_from(option.get())
            .ok()
            .and_then(|index| world.build_options.get(index))
    }

    /// Currently active play mode.
    #[must_use]
    pub fn play_mode(world: &World) -> PlayMode {
        world.play_mode
    }
}

fn default_build_options() -> Vec<BuildOption> {
    vec![
        BuildOption::new("archer tower", Gold::new(50)),
        BuildOption::new("barracks", Gold::new(80)),
        BuildOption::new("granary", Gold::new(30)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use castle_defence_core::{BuildOptionId, Purse, Rotation, TileKind};

    #[test]
    fn new_world_starts_in_build_mode_without_enclosure() {
        let world = World::new();
        assert_eq!(query::play_mode(&world), PlayMode::Build);
        assert!(query::enclosed_cells(&world).is_empty());
        assert_eq!(query::enclosure_stats(&world), EnclosureStats::default());
        assert_eq!(query::build_options(&world).len(), 3);
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
    }

    #[test]
    fn placing_a_wall_emits_placement_and_enclosure_events() {
        let mut world = World::new();
        let mut purse = Purse::default();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlaceWall {
                cell: HexCoord::new(1, 0),
                kind: TileKind::Split,
                rotation: Rotation::new(1),
                allow_replace: false,
            },
            &mut purse,
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::WallPlaced {
                    cell: HexCoord::new(1, 0),
                    kind: TileKind::Split,
                    rotation: Rotation::new(1),
                    mask: TileKind::Split.mask(Rotation::new(1)),
                    replaced: false,
                },
                Event::EnclosureUpdated {
                    stats: EnclosureStats {
                        enclosed_count: 0,
                        wall_count: 1,
                        open_gap_count: 0,
                    },
                },
            ]
        );
        assert_eq!(query::wall_count(&world), 1);
    }

    #[test]
    fn rejected_placement_leaves_state_untouched() {
        let mut world = World::new();
        let mut purse = Purse::default();
        let mut events = Vec::new();
        let hash_before = query::state_hash(&world);

        apply(
            &mut world,
            Command::PlaceWall {
                cell: HexCoord::new(4, -2),
                kind: TileKind::Straight,
                rotation: Rotation::IDENTITY,
                allow_replace: false,
            },
            &mut purse,
            &mut events,
        );

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            Event::WallPlacementRejected {
                reason: castle_defence_core::PlacementError::NoConnection,
                ..
            }
        ));
        assert_eq!(query::state_hash(&world), hash_before);
        assert!(query::walls(&world).is_empty());
    }

    #[test]
    fn play_mode_change_is_reported_once() {
        let mut world = World::new();
        let mut purse = Purse::default();
        let mut events = Vec::new();

        for _ in 0..2 {
            apply(
                &mut world,
                Command::SetPlayMode {
                    mode: PlayMode::Combat,
                },
                &mut purse,
                &mut events,
            );
        }

        assert_eq!(
            events,
            vec![Event::PlayModeChanged {
                mode: PlayMode::Combat
            }]
        );
    }

    #[test]
    fn unknown_option_lookup_returns_none() {
        let world = World::new();
        assert!(query::build_option(&world, BuildOptionId::new(99)).is_none());
        assert_eq!(
            query::build_option(&world, BuildOptionId::new(0)).map(BuildOption::cost),
            Some(Gold::new(50))
        );
    }
}
