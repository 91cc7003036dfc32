#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Castle Defence build phase.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Hex addressing and wall masks live here as
//! well so every crate agrees on directions and bit layouts.

mod hex;
mod wall;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use hex::{HexCoord, HexDirection, HexGrid};
pub use wall::{has_any_connection, Rotation, TileKind, WallMask};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Castle Defence.";

/// Cell permanently occupied by the castle.
///
/// The castle blocks movement like a wall and every wall segment pointing at
/// it counts as connected.
pub const CASTLE_CELL: HexCoord = HexCoord::ORIGIN;

/// Describes the active gameplay phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    /// Planning phase where walls and structures are placed.
    #[default]
    Build,
    /// Defence phase where enemy waves attack the castle.
    Combat,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests placement of a wall tile.
    PlaceWall {
        /// Cell that should receive the tile.
        cell: HexCoord,
        /// Shape of the tile.
        kind: TileKind,
        /// Rotation applied to the tile's base mask.
        rotation: Rotation,
        /// Whether an existing tile on the cell may be overwritten.
        allow_replace: bool,
    },
    /// Requests removal of the wall tile occupying a cell.
    RemoveWall {
        /// Cell whose tile should be removed.
        cell: HexCoord,
    },
    /// Requests an enclosure refresh, skipped when the wall state is unchanged.
    RecomputeEnclosure,
    /// Requests construction of a structure inside an enclosed cell.
    Build {
        /// Cell that should host the structure.
        cell: HexCoord,
        /// Catalogue entry describing the structure.
        option: BuildOptionId,
    },
    /// Requests demolition of a previously built structure.
    Demolish {
        /// Cell hosting the structure.
        cell: HexCoord,
    },
    /// Requests that the world transition to the provided play mode.
    SetPlayMode {
        /// Mode the world should activate.
        mode: PlayMode,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a wall tile was placed.
    WallPlaced {
        /// Cell that received the tile.
        cell: HexCoord,
        /// Shape of the placed tile.
        kind: TileKind,
        /// Rotation applied to the tile.
        rotation: Rotation,
        /// Resulting segment layout.
        mask: WallMask,
        /// Indicates whether a previous tile was overwritten.
        replaced: bool,
    },
    /// Reports that a wall placement request was rejected.
    WallPlacementRejected {
        /// Cell provided in the request.
        cell: HexCoord,
        /// Shape provided in the request.
        kind: TileKind,
        /// Rotation provided in the request.
        rotation: Rotation,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a wall tile was removed.
    WallRemoved {
        /// Cell that held the tile.
        cell: HexCoord,
        /// Shape of the removed tile.
        kind: TileKind,
    },
    /// Reports that a wall removal request was rejected.
    WallRemovalRejected {
        /// Cell provided in the request.
        cell: HexCoord,
        /// Specific reason the removal failed.
        reason: RemovalError,
    },
    /// Announces freshly computed enclosure statistics.
    EnclosureUpdated {
        /// Summary of the new enclosure state.
        stats: EnclosureStats,
    },
    /// Confirms that a structure was built.
    StructureBuilt {
        /// Cell hosting the structure.
        cell: HexCoord,
        /// Catalogue entry that was built.
        option: BuildOptionId,
        /// Amount deducted from the economy.
        cost: Gold,
    },
    /// Reports that a build request was rejected.
    BuildRejected {
        /// Cell provided in the request.
        cell: HexCoord,
        /// Catalogue entry provided in the request.
        option: BuildOptionId,
        /// Specific reason the build failed.
        reason: BuildError,
    },
    /// Announces that a structure was dropped because its cell is no longer
    /// enclosed. No gold is refunded.
    StructureInvalidated {
        /// Cell that hosted the structure.
        cell: HexCoord,
        /// Catalogue entry that was lost.
        option: BuildOptionId,
    },
    /// Confirms that a structure was demolished on request.
    StructureDemolished {
        /// Cell that hosted the structure.
        cell: HexCoord,
        /// Catalogue entry that was demolished.
        option: BuildOptionId,
    },
    /// Reports that a demolition request was rejected.
    DemolitionRejected {
        /// Cell provided in the request.
        cell: HexCoord,
        /// Specific reason the demolition failed.
        reason: RemovalError,
    },
    /// Announces that the simulation entered a new play mode.
    PlayModeChanged {
        /// Mode that became active after processing commands.
        mode: PlayMode,
    },
}

/// Amount of the in-game currency.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Gold(u32);

impl Gold {
    /// Zero gold.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw amount.
    #[must_use]
    pub const fn new(amount: u32) -> Self {
        Self(amount)
    }

    /// Raw amount.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Adds two amounts, clamping at the numeric limit.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts `other`, returning `None` when the balance would go negative.
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(amount) => Some(Self(amount)),
            None => None,
        }
    }
}

impl std::fmt::Display for Gold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}g", self.0)
    }
}

/// External resource pool that pays for construction.
///
/// The world only ever calls [`Economy::try_spend`] and never assumes it
/// succeeds.
pub trait Economy {
    /// Attempts to deduct `amount`, returning `false` without side effects when
    /// funds are insufficient.
    fn try_spend(&mut self, amount: Gold) -> bool;

    /// Credits `amount`.
    fn add(&mut self, amount: Gold);

    /// Funds currently available.
    fn balance(&self) -> Gold;
}

/// In-memory [`Economy`] holding a single balance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purse {
    balance: Gold,
}

impl Purse {
    /// Creates a purse holding `balance`.
    #[must_use]
    pub const fn new(balance: Gold) -> Self {
        Self { balance }
    }
}

impl Economy for Purse {
    fn try_spend(&mut self, amount: Gold) -> bool {
        match self.balance.checked_sub(amount) {
            Some(remaining) => {
                self.balance = remaining;
                true
            }
            None => false,
        }
    }

    fn add(&mut self, amount: Gold) {
        self.balance = self.balance.saturating_add(amount);
    }

    fn balance(&self) -> Gold {
        self.balance
    }
}

/// Index into the build-option catalogue.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BuildOptionId(u32);

impl BuildOptionId {
    /// Creates a new option identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Structure that may be built inside an enclosed cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOption {
    name: String,
    cost: Gold,
}

impl BuildOption {
    /// Creates a catalogue entry.
    #[must_use]
    pub fn new(name: impl Into<String>, cost: Gold) -> Self {
        Self {
            name: name.into(),
            cost,
        }
    }

    /// Human readable label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Price charged when the structure is built.
    #[must_use]
    pub const fn cost(&self) -> Gold {
        self.cost
    }
}

/// Summary produced by every enclosure computation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnclosureStats {
    /// Number of empty cells unreachable from the outside.
    pub enclosed_count: u32,
    /// Number of placed wall tiles.
    pub wall_count: u32,
    /// Number of adjacent blocked pairs whose shared edge carries no wall.
    pub open_gap_count: u32,
}

/// Reasons a wall placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The requested cell is not part of the map.
    #[error("cell is outside the map")]
    InvalidCoordinate,
    /// The cell already holds a tile and replacement was not allowed, or the
    /// cell belongs to the castle.
    #[error("cell is already occupied")]
    Occupied,
    /// None of the tile's segments meets a reciprocal segment or the castle.
    #[error("tile does not connect to any wall or to the castle")]
    NoConnection,
}

/// Reasons a removal or demolition request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum RemovalError {
    /// No wall tile occupies the cell.
    #[error("no wall occupies the cell")]
    MissingWall,
    /// No structure was built on the cell.
    #[error("no structure occupies the cell")]
    MissingStructure,
}

/// Reasons a build request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum BuildError {
    /// The cell is not part of the current enclosed set.
    #[error("cell is not enclosed")]
    NotEnclosed,
    /// A structure already stands on the cell.
    #[error("cell already hosts a structure")]
    AlreadyBuilt,
    /// The option identifier does not exist in the catalogue.
    #[error("unknown build option")]
    UnknownOption,
    /// The economy refused to pay the option's cost.
    #[error("insufficient funds")]
    InsufficientFunds,
}
