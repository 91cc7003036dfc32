//! Authoritative record of structures built inside enclosed cells.

use std::collections::{BTreeMap, BTreeSet};

use castle_defence_core::{
    BuildError, BuildOption, BuildOptionId, Economy, Gold, HexCoord, RemovalError,
};

/// Registry that maps enclosed cells to the structure built on them.
///
/// Every key belongs to the enclosed set the registry was last reconciled
/// against.
#[derive(Debug, Default)]
pub(crate) struct BuildRegistry {
    entries: BTreeMap<HexCoord, BuildOptionId>,
}

impl BuildRegistry {
    /// Records a structure after charging its cost to `economy`.
    ///
    /// Checks run in a fixed order and nothing is charged or recorded when
    /// any of them fails.
    pub(crate) fn try_build<E>(
        &mut self,
        cell: HexCoord,
        option: BuildOptionId,
        enclosed: &BTreeSet<HexCoord>,
        catalogue: &[BuildOption],
        economy: &mut E,
    ) -> Result<Gold, BuildError>
    where
        E: Economy + ?Sized,
    {
        if !enclosed.contains(&cell) {
            return Err(BuildError::NotEnclosed);
        }
        if self.entries.contains_key(&cell) {
            return Err(BuildError::AlreadyBuilt);
        }
        let cost = usize::try_from(option.get())
            .ok()
            .and_then(|index| catalogue.get(index))
            .map(BuildOption::cost)
            .ok_or(BuildError::UnknownOption)?;
        if !economy.try_spend(cost) {
            return Err(BuildError::InsufficientFunds);
        }

        let _ = self.entries.insert(cell, option);
        Ok(cost)
    }

    /// Drops every entry whose cell is no longer enclosed and returns them in
    /// coordinate order. Nothing is refunded.
    pub(crate) fn reconcile(
        &mut self,
        enclosed: &BTreeSet<HexCoord>,
    ) -> Vec<(HexCoord, BuildOptionId)> {
        let mut invalidated = Vec::new();
        self.entries.retain(|cell, option| {
            let keep = enclosed.contains(cell);
            if !keep {
                invalidated.push((*cell, *option));
            }
            keep
        });
        invalidated
    }

    /// Removes the structure standing on `cell`.
    pub(crate) fn demolish(&mut self, cell: HexCoord) -> Result<BuildOptionId, RemovalError> {
        self.entries
            .remove(&cell)
            .ok_or(RemovalError::MissingStructure)
    }

    pub(crate) fn option_at(&self, cell: HexCoord) -> Option<BuildOptionId> {
        self.entries.get(&cell).copied()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (HexCoord, BuildOptionId)> + '_ {
        self.entries.iter().map(|(cell, option)| (*cell, *option))
    }
}
