use alloc::string::String;
use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// How a single cell should be drawn.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    #[default]
    Hidden,
    Flagged,
    /// Revealed safe cell with its adjacency count, 0 is drawn blank
    Number(u8),
    /// Unflagged mine uncovered when the game is lost
    Mine,
    /// The mine whose reveal lost the game
    Exploded,
    /// Flag placed on a cell without a mine, shown once the game is lost
    IncorrectFlag,
}

/// Status shown on the reset button.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Face {
    Smile,
    Cool,
    Dead,
}

impl From<Phase> for Face {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Fresh | Phase::Active => Face::Smile,
            Phase::Won => Face::Cool,
            Phase::Lost => Face::Dead,
        }
    }
}

/// End-of-game signal sent with the update of the action that ended it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameSignal {
    Victory,
    Defeat,
}

impl GameSignal {
    pub const fn from_phase(phase: Phase) -> Option<Self> {
        match phase {
            Phase::Won => Some(Self::Victory),
            Phase::Lost => Some(Self::Defeat),
            Phase::Fresh | Phase::Active => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellUpdate {
    pub coords: Coord2,
    pub view: CellView,
}

/// Everything needed to draw the whole game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub cells: Array2<CellView>,
    pub mines_left: isize,
    pub elapsed_secs: u16,
    pub face: Face,
}

impl Frame {
    pub fn size(&self) -> Coord2 {
        array_size(&self.cells)
    }

    pub fn cell_at(&self, coords: Coord2) -> CellView {
        self.cells[coords.to_nd_index()]
    }
}

pub fn render_cell(engine: &PlayEngine, coords: Coord2) -> CellView {
    let cell = engine.cell_at(coords);

    if matches!(engine.phase(), Phase::Lost) {
        match (cell, engine.has_mine_at(coords)) {
            (EngineCell::Hidden, true) => return CellView::Mine,
            (EngineCell::Flagged, false) => return CellView::IncorrectFlag,
            _ => {}
        }
    }

    match cell {
        EngineCell::Hidden => CellView::Hidden,
        EngineCell::Flagged => CellView::Flagged,
        EngineCell::Revealed(count) => CellView::Number(count),
        EngineCell::Exploded => CellView::Exploded,
    }
}

pub fn render_board(engine: &PlayEngine) -> Array2<CellView> {
    let mut cells = Array2::default(engine.size().to_nd_index());
    for coords in iter_coords(engine.size()) {
        cells[coords.to_nd_index()] = render_cell(engine, coords);
    }
    cells
}

/// Cells whose view differs between two renders of the same board, in row-major order.
pub fn diff_boards(before: &Array2<CellView>, after: &Array2<CellView>) -> Vec<CellUpdate> {
    iter_coords(array_size(after))
        .filter_map(|coords| {
            let view = after[coords.to_nd_index()];
            (before.get(coords.to_nd_index()) != Some(&view)).then_some(CellUpdate { coords, view })
        })
        .collect()
}

/// Three-digit counter text, clamped to `000..=999`.
pub fn format_counter(num: isize) -> String {
    alloc::format!("{:03}", num.clamp(0, 999))
}
