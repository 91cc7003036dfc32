use std::collections::{BTreeSet, HashMap};

use castle_defence_core::{
    EnclosureStats, HexCoord, HexDirection, HexGrid, Rotation, TileKind, WallMask, CASTLE_CELL,
};
use castle_defence_system_enclosure::EnclosureSolver;
use proptest::prelude::*;

/// Sealed ring of six tiles around `center`: tile `i` sits in direction `i`
/// and carries segments towards tiles `i + 1` and `i - 1`.
fn sealed_ring(center: HexCoord) -> HashMap<HexCoord, WallMask> {
    HexDirection::ALL
        .into_iter()
        .map(|direction| {
            let rotation = Rotation::new(direction.index() as i32 + 2);
            (
                center.neighbor(direction),
                TileKind::StrongCurve.mask(rotation),
            )
        })
        .collect()
}

fn solve(
    grid: &HexGrid,
    walls: &HashMap<HexCoord, WallMask>,
) -> (BTreeSet<HexCoord>, EnclosureStats) {
    let mut solver = EnclosureSolver::new();
    let mut enclosed = BTreeSet::new();
    let stats = solver.solve(
        grid,
        CASTLE_CELL,
        |cell| walls.get(&cell).copied(),
        &mut enclosed,
    );
    (enclosed, stats)
}

#[test]
fn sealed_ring_encloses_its_center() {
    let grid = HexGrid::hexagon(5);
    let center = HexCoord::new(2, 0);
    let walls = sealed_ring(center);

    let (enclosed, stats) = solve(&grid, &walls);

    assert_eq!(enclosed, BTreeSet::from([center]));
    assert_eq!(
        stats,
        EnclosureStats {
            enclosed_count: 1,
            wall_count: 6,
            open_gap_count: 0,
        }
    );
}

#[test]
fn single_unsealed_edge_leaks_through_the_diagonal() {
    let grid = HexGrid::hexagon(5);
    let center = HexCoord::new(2, 0);
    let mut walls = sealed_ring(center);
    // The east tile keeps its segment towards the north-east tile but drops
    // the one facing the south-east tile.
    let _ = walls.insert(
        center.neighbor(HexDirection::East),
        TileKind::SmallCurve.mask(Rotation::new(1)),
    );

    let (enclosed, stats) = solve(&grid, &walls);

    assert!(
        !enclosed.contains(&center),
        "the center touches the outside through the gap's vertex"
    );
    assert_eq!(stats.open_gap_count, 1);
    assert_eq!(stats.wall_count, 6);
}

#[test]
fn castle_edges_are_always_sealed() {
    let grid = HexGrid::hexagon(5);
    let center = HexCoord::new(1, 0);
    let mut walls = sealed_ring(center);
    let _ = walls.remove(&CASTLE_CELL);
    // Both ring tiles touching the castle keep only their segment towards
    // the next ring tile, so neither points back at the castle.
    let east_only = WallMask::from_directions([HexDirection::East]);
    let _ = walls.insert(HexCoord::new(1, -1), east_only);
    let _ = walls.insert(HexCoord::new(0, 1), east_only);

    let (enclosed, stats) = solve(&grid, &walls);

    assert!(enclosed.contains(&center));
    assert_eq!(stats.open_gap_count, 0);
    assert_eq!(stats.wall_count, 5);
}

#[test]
fn missing_ring_tile_opens_the_interior() {
    let grid = HexGrid::hexagon(5);
    let center = HexCoord::new(2, 0);
    let mut walls = sealed_ring(center);
    let _ = walls.remove(&center.neighbor(HexDirection::East));

    let (enclosed, stats) = solve(&grid, &walls);

    assert!(enclosed.is_empty());
    assert_eq!(stats.wall_count, 5);
    assert_eq!(stats.open_gap_count, 0);
}

#[test]
fn double_ring_encloses_every_inner_cell() {
    let grid = HexGrid::hexagon(6);
    let center = HexCoord::new(-3, 0);
    // Outer ring at distance two, each tile sealed towards its ring
    // neighbours; the inner cells stay empty.
    let ring: Vec<HexCoord> = grid
        .iter()
        .filter(|cell| cell.distance(center) == 2)
        .collect();
    let walls: HashMap<HexCoord, WallMask> = ring
        .iter()
        .map(|cell| {
            let mask = WallMask::from_directions(
                HexDirection::ALL
                    .into_iter()
                    .filter(|direction| ring.contains(&cell.neighbor(*direction))),
            );
            (*cell, mask)
        })
        .collect();

    let (enclosed, stats) = solve(&grid, &walls);

    let inner: BTreeSet<HexCoord> = grid
        .iter()
        .filter(|cell| cell.distance(center) < 2)
        .collect();
    assert_eq!(enclosed, inner);
    assert_eq!(stats.enclosed_count, 7);
    assert_eq!(stats.wall_count, 12);
    assert_eq!(stats.open_gap_count, 0);
}

#[test]
fn solving_twice_yields_identical_results() {
    let grid = HexGrid::hexagon(5);
    let walls = sealed_ring(HexCoord::new(-2, 1));
    let mut solver = EnclosureSolver::new();
    let mut first = BTreeSet::new();
    let mut second = BTreeSet::new();

    let first_stats = solver.solve(
        &grid,
        CASTLE_CELL,
        |cell| walls.get(&cell).copied(),
        &mut first,
    );
    let second_stats = solver.solve(
        &grid,
        CASTLE_CELL,
        |cell| walls.get(&cell).copied(),
        &mut second,
    );

    assert_eq!(first, second);
    assert_eq!(first_stats, second_stats);
}

proptest! {
    #[test]
    fn enclosed_cells_are_never_blocked(
        placements in proptest::collection::vec((-4i32..=4, -4i32..=4, 0u8..64), 0..40)
    ) {
        let grid = HexGrid::hexagon(4);
        let walls: HashMap<HexCoord, WallMask> = placements
            .into_iter()
            .map(|(q, r, bits)| (HexCoord::new(q, r), WallMask::from_bits(bits)))
            .filter(|(cell, _)| grid.contains(*cell) && *cell != CASTLE_CELL)
            .collect();

        let (enclosed, stats) = solve(&grid, &walls);

        prop_assert_eq!(stats.enclosed_count as usize, enclosed.len());
        prop_assert_eq!(stats.wall_count as usize, walls.len());
        for cell in &enclosed {
            prop_assert!(grid.contains(*cell));
            prop_assert!(*cell != CASTLE_CELL);
            prop_assert!(!walls.contains_key(cell));
            prop_assert!(!grid.is_border(*cell));
        }
    }
}
