//! Authoritative wall tile storage and placement rules.

use std::collections::BTreeMap;

use castle_defence_core::{
    HexCoord, HexGrid, PlacementError, RemovalError, Rotation, TileKind, WallMask, CASTLE_CELL,
};
use sha2::{Digest, Sha256};

/// Wall tile stored on a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedTile {
    kind: TileKind,
    rotation: Rotation,
    mask: WallMask,
}

impl PlacedTile {
    fn new(kind: TileKind, rotation: Rotation) -> Self {
        Self {
            kind,
            rotation,
            mask: kind.mask(rotation),
        }
    }

    /// Shape of the tile.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    /// Rotation applied to the tile's base mask.
    #[must_use]
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Segment layout produced by the kind and rotation.
    #[must_use]
    pub const fn mask(&self) -> WallMask {
        self.mask
    }
}

/// Per-cell wall masks keyed by coordinate.
///
/// Removing a tile never cascades: neighbours that lose their only connection
/// stay where they are.
#[derive(Debug, Default)]
pub(crate) struct WallGraph {
    tiles: BTreeMap<HexCoord, PlacedTile>,
}

impl WallGraph {
    /// Places a tile, returning the tile it replaced, if any.
    ///
    /// Nothing is mutated when the placement is rejected.
    pub(crate) fn try_place(
        &mut self,
        grid: &HexGrid,
        cell: HexCoord,
        kind: TileKind,
        rotation: Rotation,
        allow_replace: bool,
    ) -> Result<Option<PlacedTile>, PlacementError> {
        if !grid.contains(cell) {
            return Err(PlacementError::InvalidCoordinate);
        }
        if cell == CASTLE_CELL || (!allow_replace && self.is_occupied(cell)) {
            return Err(PlacementError::Occupied);
        }

        let tile = PlacedTile::new(kind, rotation);
        if !self.has_any_connection(cell, tile.mask) {
            return Err(PlacementError::NoConnection);
        }

        Ok(self.tiles.insert(cell, tile))
    }

    /// Removes the tile occupying `cell`.
    pub(crate) fn remove(&mut self, cell: HexCoord) -> Result<PlacedTile, RemovalError> {
        self.tiles.remove(&cell).ok_or(RemovalError::MissingWall)
    }

    pub(crate) fn is_occupied(&self, cell: HexCoord) -> bool {
        self.tiles.contains_key(&cell)
    }

    pub(crate) fn tile_at(&self, cell: HexCoord) -> Option<&PlacedTile> {
        self.tiles.get(&cell)
    }

    pub(crate) fn mask_at(&self, cell: HexCoord) -> Option<WallMask> {
        self.tiles.get(&cell).map(PlacedTile::mask)
    }

    pub(crate) fn len(&self) -> usize {
        self.tiles.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (HexCoord, &PlacedTile)> {
        self.tiles.iter().map(|(cell, tile)| (*cell, tile))
    }

    pub(crate) fn has_any_connection(&self, cell: HexCoord, mask: WallMask) -> bool {
        castle_defence_core::has_any_connection(cell, mask, |neighbor| self.mask_at(neighbor))
    }

    /// Content hash over every `(cell, mask)` pair in coordinate order.
    ///
    /// Used to skip redundant enclosure solves; collisions only cost a missed
    /// refresh on explicit recompute requests.
    pub(crate) fn state_hash(&self) -> u64 {
        let mut hasher = Sha256::new();
        for (cell, tile) in &self.tiles {
            hasher.update(cell.q().to_le_bytes());
            hasher.update(cell.r().to_le_bytes());
            hasher.update([tile.mask.bits()]);
        }
        let digest = hasher.finalize();
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(prefix)
    }
}
