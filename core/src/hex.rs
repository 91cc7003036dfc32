//! Axial hex coordinates and the set of cells that make up a map.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Location of a single hex cell expressed in axial `(q, r)` coordinates.
///
/// The implicit third cube axis is `s = -q - r`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct HexCoord {
    q: i32,
    r: i32,
}

impl HexCoord {
    /// Origin of the coordinate system.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Creates a new axial coordinate.
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// First axial component.
    #[must_use]
    pub const fn q(&self) -> i32 {
        self.q
    }

    /// Second axial component.
    #[must_use]
    pub const fn r(&self) -> i32 {
        self.r
    }

    /// Implicit cube component `s = -q - r`.
    #[must_use]
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Cell one step away in the provided direction.
    #[must_use]
    pub const fn neighbor(self, direction: HexDirection) -> Self {
        let (dq, dr) = direction.offset();
        Self::new(self.q + dq, self.r + dr)
    }

    /// All six neighbouring cells in [`HexDirection::ALL`] order.
    #[must_use]
    pub fn neighbors(self) -> [Self; 6] {
        HexDirection::ALL.map(|direction| self.neighbor(direction))
    }

    /// Number of steps separating two cells.
    ///
    /// Computed through the cube representation as
    /// `(|dq| + |dq + dr| + |dr|) / 2`.
    #[must_use]
    pub fn distance(self, other: Self) -> u32 {
        let dq = i64::from(self.q) - i64::from(other.q);
        let dr = i64::from(self.r) - i64::from(other.r);
        let steps = (dq.unsigned_abs() + (dq + dr).unsigned_abs() + dr.unsigned_abs()) / 2;
        u32::try_from(steps).unwrap_or(u32::MAX)
    }

    /// Direction leading from `self` to `other` when the two cells are adjacent.
    #[must_use]
    pub fn direction_to(self, other: Self) -> Option<HexDirection> {
        HexDirection::ALL
            .into_iter()
            .find(|direction| self.neighbor(*direction) == other)
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// One of the six edges of a hex cell.
///
/// Indices run counter-clockwise starting from east, so the direction at
/// index `d + 1` is the counter-clockwise neighbour of the direction at `d`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HexDirection {
    /// Offset `(1, 0)`.
    East,
    /// Offset `(1, -1)`.
    NorthEast,
    /// Offset `(0, -1)`.
    NorthWest,
    /// Offset `(-1, 0)`.
    West,
    /// Offset `(-1, 1)`.
    SouthWest,
    /// Offset `(0, 1)`.
    SouthEast,
}

impl HexDirection {
    /// Every direction in index order.
    pub const ALL: [Self; 6] = [
        Self::East,
        Self::NorthEast,
        Self::NorthWest,
        Self::West,
        Self::SouthWest,
        Self::SouthEast,
    ];

    /// Resolves the direction stored at `index`, wrapping modulo six.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 6]
    }

    /// Position of the direction within [`HexDirection::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::East => 0,
            Self::NorthEast => 1,
            Self::NorthWest => 2,
            Self::West => 3,
            Self::SouthWest => 4,
            Self::SouthEast => 5,
        }
    }

    /// Axial offset travelled when stepping in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::East => (1, 0),
            Self::NorthEast => (1, -1),
            Self::NorthWest => (0, -1),
            Self::West => (-1, 0),
            Self::SouthWest => (-1, 1),
            Self::SouthEast => (0, 1),
        }
    }

    /// Direction pointing the other way, `(d + 3) mod 6`.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// Next direction counter-clockwise, `(d + 1) mod 6`.
    #[must_use]
    pub const fn counter_clockwise(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Next direction clockwise, `(d + 5) mod 6`.
    #[must_use]
    pub const fn clockwise(self) -> Self {
        Self::from_index(self.index() + 5)
    }
}

/// Set of cells that exist on the current map.
///
/// Membership is produced by map generation; the grid only answers
/// addressing questions about it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HexGrid {
    cells: BTreeSet<HexCoord>,
}

impl HexGrid {
    /// Builds a grid from an arbitrary collection of cells.
    #[must_use]
    pub fn from_cells(cells: impl IntoIterator<Item = HexCoord>) -> Self {
        Self {
            cells: cells.into_iter().collect(),
        }
    }

    /// Builds a hexagon-shaped grid containing every cell within `radius`
    /// steps of the origin.
    #[must_use]
    pub fn hexagon(radius: u32) -> Self {
        let radius = i32::try_from(radius).unwrap_or(i32::MAX);
        let mut cells = BTreeSet::new();
        for q in -radius..=radius {
            let r_min = (-radius).max(-q - radius);
            let r_max = radius.min(-q + radius);
            for r in r_min..=r_max {
                let _ = cells.insert(HexCoord::new(q, r));
            }
        }
        Self { cells }
    }

    /// Reports whether the cell belongs to the map.
    #[must_use]
    pub fn contains(&self, cell: HexCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Number of cells on the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the map has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterates over the map's cells in ascending coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = HexCoord> + '_ {
        self.cells.iter().copied()
    }

    /// Neighbours of `cell` in [`HexDirection::ALL`] order, regardless of
    /// whether they belong to the map.
    #[must_use]
    pub fn neighbors(&self, cell: HexCoord) -> [HexCoord; 6] {
        cell.neighbors()
    }

    /// Step distance between two cells.
    #[must_use]
    pub fn distance(&self, from: HexCoord, to: HexCoord) -> u32 {
        from.distance(to)
    }

    /// Reports whether `cell` touches the outside of the map, meaning at least
    /// one of its neighbours is not part of the grid.
    #[must_use]
    pub fn is_border(&self, cell: HexCoord) -> bool {
        cell.neighbors()
            .into_iter()
            .any(|neighbor| !self.contains(neighbor))
    }
}
