#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure build-phase system responsible for emitting wall and structure commands.

use castle_defence_core::{
    has_any_connection, BuildOptionId, Command, Event, HexCoord, PlayMode, Rotation, TileKind,
    WallMask, CASTLE_CELL,
};

/// Declarative preview describing the wall tile that would land on a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementPreview {
    /// Cell the preview refers to.
    pub cell: HexCoord,
    /// Shape of the selected tile.
    pub kind: TileKind,
    /// Rotation of the selected tile.
    pub rotation: Rotation,
    /// Segment layout the tile would produce.
    pub mask: WallMask,
    /// Indicates whether a tile already occupies the cell.
    pub occupied: bool,
    /// Indicates whether the tile would meet the castle or a reciprocal
    /// segment.
    pub connects: bool,
}

impl PlacementPreview {
    /// Reports whether the world would accept the placement, given whether
    /// replacement of an existing tile is allowed.
    ///
    /// The castle cell is never placeable.
    #[must_use]
    pub fn placeable(&self, allow_replace: bool) -> bool {
        self.cell != CASTLE_CELL && self.connects && (allow_replace || !self.occupied)
    }
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuilderInput {
    /// Cell currently hovered by the cursor.
    pub cursor_cell: Option<HexCoord>,
    /// Indicates whether the player confirmed a wall placement on this frame.
    pub place_action: bool,
    /// Indicates whether the placement may overwrite an existing tile.
    pub replace_modifier: bool,
    /// Indicates whether the player requested wall removal on this frame.
    pub remove_action: bool,
    /// Indicates whether the player requested construction on this frame.
    pub build_action: bool,
    /// Indicates whether the selected tile should turn one step clockwise.
    pub rotate_clockwise: bool,
    /// Indicates whether the selected tile should turn one step
    /// counter-clockwise.
    pub rotate_counter_clockwise: bool,
    /// Indicates whether the next tile kind should be selected.
    pub cycle_tile: bool,
    /// Indicates whether the next build option should be selected.
    pub cycle_option: bool,
}

/// Build-phase system that translates selections and input into commands.
#[derive(Debug, Clone)]
pub struct Builder {
    play_mode: PlayMode,
    kind: TileKind,
    rotation: Rotation,
    option: BuildOptionId,
    option_count: u32,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Builder {
    /// Creates a builder that cycles through `option_count` build options.
    #[must_use]
    pub const fn new(option_count: u32) -> Self {
        Self {
            play_mode: PlayMode::Build,
            kind: TileKind::Straight,
            rotation: Rotation::IDENTITY,
            option: BuildOptionId::new(0),
            option_count,
        }
    }

    /// Tile kind currently selected.
    #[must_use]
    pub const fn selected_kind(&self) -> TileKind {
        self.kind
    }

    /// Rotation currently selected.
    #[must_use]
    pub const fn selected_rotation(&self) -> Rotation {
        self.rotation
    }

    /// Build option currently selected.
    #[must_use]
    pub const fn selected_option(&self) -> BuildOptionId {
        self.option
    }

    /// Previews the selected tile on `cell`.
    ///
    /// The `mask_at` closure should mirror the world's wall lookup.
    pub fn preview<F>(&self, cell: HexCoord, mut mask_at: F) -> PlacementPreview
    where
        F: FnMut(HexCoord) -> Option<WallMask>,
    {
        let mask = self.kind.mask(self.rotation);
        let occupied = cell == CASTLE_CELL || mask_at(cell).is_some();
        PlacementPreview {
            cell,
            kind: self.kind,
            rotation: self.rotation,
            mask,
            occupied,
            connects: has_any_connection(cell, mask, &mut mask_at),
        }
    }

    /// Consumes world events and adapter-derived input to emit build commands.
    ///
    /// Selections only change while the world is in build mode, and nothing is
    /// emitted outside it.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        input: BuilderInput,
        mut mask_at: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(HexCoord) -> Option<WallMask>,
    {
        for event in events {
            if let Event::PlayModeChanged { mode } = event {
                self.play_mode = *mode;
            }
        }

        if self.play_mode != PlayMode::Build {
            return;
        }

        self.update_selection(input);

        let Some(cell) = input.cursor_cell else {
            return;
        };

        if input.place_action {
            let preview = self.preview(cell, &mut mask_at);
            if preview.placeable(input.replace_modifier) {
                out.push(Command::PlaceWall {
                    cell,
                    kind: preview.kind,
                    rotation: preview.rotation,
                    allow_replace: input.replace_modifier,
                });
            }
        }

        if input.remove_action && mask_at(cell).is_some() {
            out.push(Command::RemoveWall { cell });
        }

        if input.build_action {
            out.push(Command::Build {
                cell,
                option: self.option,
            });
        }
    }

    fn update_selection(&mut self, input: BuilderInput) {
        if input.rotate_clockwise {
            self.rotation = self.rotation.clockwise();
        }
        if input.rotate_counter_clockwise {
            self.rotation = self.rotation.counter_clockwise();
        }
        if input.cycle_tile {
            self.kind = self.kind.next();
        }
        if input.cycle_option && self.option_count > 0 {
            self.option = BuildOptionId::new((self.option.get() + 1) % self.option_count);
        }
    }
}
