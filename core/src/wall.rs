//! Wall segment masks and the tile kinds that produce them.

use serde::{Deserialize, Serialize};

use crate::{HexCoord, HexDirection, CASTLE_CELL};

const MASK_BITS: u32 = 6;
const MASK_LIMIT: u8 = 0b11_1111;

/// Six-bit set describing which edges of a hex cell carry a wall segment.
///
/// Bit `d` corresponds to [`HexDirection::from_index`]`(d)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WallMask(u8);

impl WallMask {
    /// Mask without any wall segment.
    pub const EMPTY: Self = Self(0);

    /// Creates a mask from raw bits, discarding anything above bit five.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & MASK_LIMIT)
    }

    /// Creates a mask containing exactly the provided directions.
    #[must_use]
    pub fn from_directions(directions: impl IntoIterator<Item = HexDirection>) -> Self {
        directions
            .into_iter()
            .fold(Self::EMPTY, |mask, direction| mask.with(direction))
    }

    /// Raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Reports whether a wall segment occupies the provided edge.
    #[must_use]
    pub const fn has(self, direction: HexDirection) -> bool {
        self.0 & (1 << direction.index()) != 0
    }

    /// Returns a copy of the mask with the provided edge set.
    #[must_use]
    pub const fn with(self, direction: HexDirection) -> Self {
        Self(self.0 | (1 << direction.index()))
    }

    /// Number of wall segments in the mask.
    #[must_use]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Reports whether the mask carries no segment.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Rotates the mask counter-clockwise by the provided number of steps, so
    /// bit `d` moves to bit `(d + steps) mod 6`.
    #[must_use]
    pub const fn rotated(self, rotation: Rotation) -> Self {
        let steps = rotation.steps() as u32;
        if steps == 0 {
            return self;
        }
        let bits = self.0 as u32;
        let rotated = (bits << steps) | (bits >> (MASK_BITS - steps));
        Self::from_bits(rotated as u8)
    }

    /// Directions carrying a wall segment, in index order.
    pub fn directions(self) -> impl Iterator<Item = HexDirection> {
        HexDirection::ALL
            .into_iter()
            .filter(move |direction| self.has(*direction))
    }
}

/// Number of rotation steps applied to a tile, normalised into `[0, 6)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rotation(u8);

impl Rotation {
    /// Rotation that leaves a mask unchanged.
    pub const IDENTITY: Self = Self(0);

    /// Creates a rotation from any signed step count.
    #[must_use]
    pub const fn new(steps: i32) -> Self {
        Self(steps.rem_euclid(6) as u8)
    }

    /// Normalised step count in `[0, 6)`.
    #[must_use]
    pub const fn steps(self) -> u8 {
        self.0
    }

    /// Rotation one step further counter-clockwise.
    #[must_use]
    pub const fn counter_clockwise(self) -> Self {
        Self::new(self.0 as i32 + 1)
    }

    /// Rotation one step further clockwise.
    #[must_use]
    pub const fn clockwise(self) -> Self {
        Self::new(self.0 as i32 - 1)
    }

    /// Rotation that undoes this one.
    #[must_use]
    pub const fn inverse(self) -> Self {
        Self::new(6 - self.0 as i32)
    }
}

/// Wall tile shapes available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    /// Two opposite segments.
    Straight,
    /// Two adjacent segments.
    SmallCurve,
    /// Two segments one edge apart.
    StrongCurve,
    /// Three segments spaced evenly around the cell.
    Split,
}

impl TileKind {
    /// Every tile kind in selection order.
    pub const ALL: [Self; 4] = [
        Self::Straight,
        Self::SmallCurve,
        Self::StrongCurve,
        Self::Split,
    ];

    /// Unrotated segment layout of the tile.
    #[must_use]
    pub const fn base_mask(self) -> WallMask {
        match self {
            Self::Straight => WallMask::from_bits(0b00_1001),
            Self::SmallCurve => WallMask::from_bits(0b00_0011),
            Self::StrongCurve => WallMask::from_bits(0b00_0101),
            Self::Split => WallMask::from_bits(0b01_0101),
        }
    }

    /// Segment layout of the tile after applying `rotation`.
    #[must_use]
    pub const fn mask(self, rotation: Rotation) -> WallMask {
        self.base_mask().rotated(rotation)
    }

    /// Next kind in selection order, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|kind| *kind == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

/// Reports whether any segment of `mask`, placed on `cell`, meets the castle or
/// a reciprocal segment of a neighbouring tile.
///
/// `mask_at` should return the mask of the tile occupying a cell, if any.
pub fn has_any_connection<F>(cell: HexCoord, mask: WallMask, mut mask_at: F) -> bool
where
    F: FnMut(HexCoord) -> Option<WallMask>,
{
    mask.directions().any(|direction| {
        let neighbor = cell.neighbor(direction);
        neighbor == CASTLE_CELL
            || mask_at(neighbor).is_some_and(|other| other.has(direction.opposite()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn base_masks_have_expected_segment_counts() {
        assert_eq!(TileKind::Straight.base_mask().count(), 2);
        assert_eq!(TileKind::SmallCurve.base_mask().count(), 2);
        assert_eq!(TileKind::StrongCurve.base_mask().count(), 2);
        assert_eq!(TileKind::Split.base_mask().count(), 3);
    }

    #[test]
    fn straight_tile_spans_opposite_edges() {
        let mask = TileKind::Straight.base_mask();
        assert!(mask.has(HexDirection::East));
        assert!(mask.has(HexDirection::East.opposite()));
    }

    #[test]
    fn rotation_moves_bits_counter_clockwise() {
        let mask = TileKind::SmallCurve.mask(Rotation::new(5));
        assert_eq!(
            mask,
            WallMask::from_directions([HexDirection::SouthEast, HexDirection::East])
        );
    }

    #[test]
    fn rotation_normalises_signed_steps() {
        assert_eq!(Rotation::new(-1).steps(), 5);
        assert_eq!(Rotation::new(13).steps(), 1);
        assert_eq!(Rotation::new(6), Rotation::IDENTITY);
        assert_eq!(Rotation::IDENTITY.clockwise().steps(), 5);
    }

    #[test]
    fn from_bits_discards_high_bits() {
        assert_eq!(WallMask::from_bits(0b1100_0001).bits(), 0b1);
    }

    #[test]
    fn next_kind_cycles_through_every_kind() {
        let mut kind = TileKind::Straight;
        for _ in 0..TileKind::ALL.len() {
            kind = kind.next();
        }
        assert_eq!(kind, TileKind::Straight);
    }

    #[test]
    fn segment_facing_castle_connects() {
        let cell = HexCoord::new(1, 0);
        let facing = WallMask::from_directions([HexDirection::West]);
        let away = WallMask::from_directions([HexDirection::East]);
        assert!(has_any_connection(cell, facing, |_| None));
        assert!(!has_any_connection(cell, away, |_| None));
    }

    #[test]
    fn connection_needs_reciprocal_segment() {
        let cell = HexCoord::new(3, 0);
        let mask = WallMask::from_directions([HexDirection::East]);
        let reciprocal = WallMask::from_directions([HexDirection::West]);
        let unrelated = WallMask::from_directions([HexDirection::NorthWest]);
        assert!(has_any_connection(cell, mask, |_| Some(reciprocal)));
        assert!(!has_any_connection(cell, mask, |_| Some(unrelated)));
    }

    proptest! {
        #[test]
        fn rotation_round_trips(bits in 0u8..64, steps in 0i32..6) {
            let mask = WallMask::from_bits(bits);
            let rotation = Rotation::new(steps);
            prop_assert_eq!(mask.rotated(rotation).rotated(Rotation::new(6 - steps)), mask);
            prop_assert_eq!(mask.rotated(rotation).rotated(rotation.inverse()), mask);
            prop_assert_eq!(mask.rotated(rotation).count(), mask.count());
        }
    }
}
