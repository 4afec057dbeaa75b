use crate::*;
pub use random::*;

mod random;

/// Produces the mine layout of a game once the first revealed cell is known.
pub trait MinefieldGenerator {
    fn generate(&mut self, config: GameConfig, start: Coord2) -> Result<MineLayout>;
}

/// Number of cells in the edge-clipped 3×3 block around `start` that must stay free of mines.
pub fn exclusion_zone_size(size: Coord2, start: Coord2) -> CellCount {
    NeighborIter::new(start, size).count() as CellCount + 1
}

/// Hands out a layout decided in advance, used to replay a known board.
///
/// The layout is refused for any start cell with a mine in its 3×3 block.
#[derive(Clone, Debug, PartialEq)]
pub struct PresetGenerator {
    layout: MineLayout,
}

impl PresetGenerator {
    pub fn new(layout: MineLayout) -> Self {
        Self { layout }
    }
}

impl MinefieldGenerator for PresetGenerator {
    fn generate(&mut self, config: GameConfig, start: Coord2) -> Result<MineLayout> {
        if self.layout.game_config() != config {
            return Err(GameError::InvalidBoardShape);
        }
        self.layout.validate_coords(start)?;
        if self.layout.iter_mines().any(|mine| is_within_one(mine, start)) {
            return Err(GameError::MineNearStart);
        }
        Ok(self.layout.clone())
    }
}
