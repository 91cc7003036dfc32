#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that classifies map cells as enclosed or reachable from outside.
//!
//! Walls block movement through cells, but two blocked neighbours only seal
//! the edge between them when both carry a segment on that edge. An unsealed
//! edge is a gap: the two empty cells flanking it touch through the shared
//! vertices and are treated as mutually reachable even though they are not
//! axial neighbours. The castle seals every edge it shares with a wall.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use castle_defence_core::{EnclosureStats, HexCoord, HexDirection, HexGrid, WallMask};

/// Edge between two blocked cells that carries no shared wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OpenGap {
    /// Cell on one side of the edge.
    pub cell: HexCoord,
    /// Direction from `cell` towards the blocked cell on the other side.
    pub direction: HexDirection,
}

impl OpenGap {
    /// Blocked cell on the far side of the edge.
    #[must_use]
    pub const fn neighbor(&self) -> HexCoord {
        self.cell.neighbor(self.direction)
    }
}

/// Flood-fill solver that reuses scratch buffers between runs.
#[derive(Debug, Default)]
pub struct EnclosureSolver {
    masks: HashMap<HexCoord, WallMask>,
    links: HashMap<HexCoord, Vec<HexCoord>>,
    extra_seeds: Vec<HexCoord>,
    visited: HashSet<HexCoord>,
    queue: VecDeque<HexCoord>,
    gaps: Vec<OpenGap>,
}

impl EnclosureSolver {
    /// Creates a solver with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the enclosed set for the provided map.
    ///
    /// `wall_at` should mirror the world's wall lookup and return the mask of
    /// the tile occupying a cell, if any. `out` is cleared and then filled
    /// with every cell of `grid` that is neither blocked nor reachable from
    /// the map border.
    pub fn solve<F>(
        &mut self,
        grid: &HexGrid,
        castle: HexCoord,
        mut wall_at: F,
        out: &mut BTreeSet<HexCoord>,
    ) -> EnclosureStats
    where
        F: FnMut(HexCoord) -> Option<WallMask>,
    {
        out.clear();
        self.prepare_masks(grid, castle, &mut wall_at);
        self.collect_gaps(grid, castle);
        self.flood_from_outside(grid, castle);

        for cell in grid.iter() {
            if !self.is_blocked(cell, castle) && !self.visited.contains(&cell) {
                let _ = out.insert(cell);
            }
        }

        EnclosureStats {
            enclosed_count: saturating_count(out.len()),
            wall_count: saturating_count(self.masks.len()),
            open_gap_count: saturating_count(self.gaps.len()),
        }
    }

    /// Gaps discovered by the most recent [`EnclosureSolver::solve`] call.
    #[must_use]
    pub fn open_gaps(&self) -> &[OpenGap] {
        &self.gaps
    }

    fn prepare_masks<F>(&mut self, grid: &HexGrid, castle: HexCoord, wall_at: &mut F)
    where
        F: FnMut(HexCoord) -> Option<WallMask>,
    {
        self.masks.clear();
        for cell in grid.iter() {
            if cell == castle {
                continue;
            }
            if let Some(mask) = wall_at(cell) {
                let _ = self.masks.insert(cell, mask);
            }
        }
    }

    fn collect_gaps(&mut self, grid: &HexGrid, castle: HexCoord) {
        self.links.clear();
        self.extra_seeds.clear();
        self.gaps.clear();

        let mut walls: Vec<(HexCoord, WallMask)> =
            self.masks.iter().map(|(cell, mask)| (*cell, *mask)).collect();
        walls.sort_by_key(|(cell, _)| *cell);

        for (cell, mask) in walls {
            // The first three directions visit every unordered pair once.
            for direction in &HexDirection::ALL[..3] {
                let direction = *direction;
                let neighbor = cell.neighbor(direction);
                if neighbor == castle {
                    continue;
                }
                let Some(neighbor_mask) = self.masks.get(&neighbor).copied() else {
                    continue;
                };
                if mask.has(direction) && neighbor_mask.has(direction.opposite()) {
                    continue;
                }

                self.gaps.push(OpenGap { cell, direction });
                self.link_flanks(grid, castle, cell, direction);
            }
        }
    }

    fn link_flanks(
        &mut self,
        grid: &HexGrid,
        castle: HexCoord,
        cell: HexCoord,
        direction: HexDirection,
    ) {
        let left = cell.neighbor(direction.counter_clockwise());
        let right = cell.neighbor(direction.clockwise());
        let left_on_map = grid.contains(left);
        let right_on_map = grid.contains(right);
        let left_open = left_on_map && !self.is_blocked(left, castle);
        let right_open = right_on_map && !self.is_blocked(right, castle);

        if left_open && right_open {
            self.links.entry(left).or_default().push(right);
            self.links.entry(right).or_default().push(left);
        } else if left_open && !right_on_map {
            self.extra_seeds.push(left);
        } else if right_open && !left_on_map {
            self.extra_seeds.push(right);
        }
    }

    fn flood_from_outside(&mut self, grid: &HexGrid, castle: HexCoord) {
        self.visited.clear();
        self.queue.clear();

        for cell in grid.iter() {
            if grid.is_border(cell) && !self.is_blocked(cell, castle) && self.visited.insert(cell)
            {
                self.queue.push_back(cell);
            }
        }
        for seed in &self.extra_seeds {
            if self.visited.insert(*seed) {
                self.queue.push_back(*seed);
            }
        }

        while let Some(cell) = self.queue.pop_front() {
            for neighbor in cell.neighbors() {
                if !grid.contains(neighbor) || self.is_blocked(neighbor, castle) {
                    continue;
                }
                if self.visited.insert(neighbor) {
                    self.queue.push_back(neighbor);
                }
            }

            if let Some(linked) = self.links.get(&cell) {
                for neighbor in linked {
                    if self.visited.insert(*neighbor) {
                        self.queue.push_back(*neighbor);
                    }
                }
            }
        }
    }

    fn is_blocked(&self, cell: HexCoord, castle: HexCoord) -> bool {
        cell == castle || self.masks.contains_key(&cell)
    }
}

fn saturating_count(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
