use alloc::collections::{BTreeSet, VecDeque};
use core::num::Saturating;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Fresh -> Active, when the mines are placed
/// - Active -> Won
/// - Active -> Lost
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No mines placed yet, nothing revealed
    #[default]
    Fresh,
    Active,
    Won,
    Lost,
}

impl Phase {
    pub const fn is_fresh(self) -> bool {
        matches!(self, Self::Fresh)
    }

    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Player board of one game: reveal and flag state on top of a lazily placed mine layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayEngine {
    config: GameConfig,
    mine_layout: Option<MineLayout>,
    board: Array2<EngineCell>,
    revealed_count: Saturating<CellCount>,
    flagged_count: Saturating<CellCount>,
    phase: Phase,
    triggered_mine: Option<Coord2>,
}

impl PlayEngine {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            mine_layout: None,
            board: Array2::default(config.size.to_nd_index()),
            revealed_count: Saturating(0),
            flagged_count: Saturating(0),
            phase: Phase::default(),
            triggered_mine: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_finished()
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn mine_layout(&self) -> Option<&MineLayout> {
        self.mine_layout.as_ref()
    }

    /// Safe cells revealed so far, the exploded mine is not counted.
    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count.0
    }

    /// Mine budget: total mines minus placed flags, negative when over-flagged, 0 once won.
    pub fn mines_left(&self) -> isize {
        if matches!(self.phase, Phase::Won) {
            return 0;
        }
        (self.config.mines as isize) - (self.flagged_count.0 as isize)
    }

    pub fn cell_at(&self, coords: Coord2) -> EngineCell {
        self.board[coords.to_nd_index()]
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn has_mine_at(&self, coords: Coord2) -> bool {
        self.mine_layout
            .as_ref()
            .is_some_and(|layout| layout.contains_mine(coords))
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (rows, cols) = self.config.size;
        if coords.0 < rows && coords.1 < cols {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn can_chord_reveal_at(&self, coords: Coord2) -> bool {
        if !self.phase.is_active() {
            return false;
        }

        match self.board[coords.to_nd_index()] {
            EngineCell::Revealed(count) => {
                count > 0 && count == self.count_flagged_neighbors(coords)
            }
            _ => false,
        }
    }

    /// Installs the mine layout and starts the game, only allowed once.
    pub fn place_mines(&mut self, mine_layout: MineLayout) -> Result<()> {
        if !self.phase.is_fresh() || self.mine_layout.is_some() {
            return Err(GameError::MinesAlreadyPlaced);
        }
        if mine_layout.game_config() != self.config {
            return Err(GameError::InvalidBoardShape);
        }

        log::debug!(
            "Mines placed: {:?}",
            mine_layout.iter_mines().collect::<alloc::vec::Vec<_>>()
        );
        self.mine_layout = Some(mine_layout);
        self.phase = Phase::Active;
        Ok(())
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        use EngineCell::*;
        use MarkOutcome::*;

        let coords = self.validate_coords(coords)?;
        self.check_not_finished()?;

        Ok(match self.board[coords.to_nd_index()] {
            Hidden => {
                self.board[coords.to_nd_index()] = Flagged;
                self.flagged_count += 1;
                Changed
            }
            Flagged => {
                self.board[coords.to_nd_index()] = Hidden;
                self.flagged_count -= 1;
                Changed
            }
            Revealed(_) | Exploded => NoChange,
        })
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;
        self.check_not_finished()?;

        if matches!(self.board[coords.to_nd_index()], EngineCell::Hidden) {
            self.check_mines_placed()?;
            Ok(self.reveal_single_cell(coords))
        } else {
            Ok(RevealOutcome::NoChange)
        }
    }

    /// Reveals every hidden neighbor of a numbered cell whose flag count is satisfied.
    pub fn chord_reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;
        self.check_not_finished()?;

        if !self.can_chord_reveal_at(coords) {
            return Ok(RevealOutcome::NoChange);
        }

        let mut outcome = RevealOutcome::NoChange;
        for neighbor_coords in self.mine_layout_iter_neighbors(coords) {
            outcome = outcome | self.reveal_single_cell(neighbor_coords);
            if outcome == RevealOutcome::HitMine {
                break;
            }
        }
        Ok(outcome)
    }

    fn reveal_single_cell(&mut self, coords: Coord2) -> RevealOutcome {
        if self.phase.is_finished() {
            return RevealOutcome::NoChange;
        }
        let Some(mine_layout) = self.mine_layout.as_ref() else {
            return RevealOutcome::NoChange;
        };
        let cell_state = self.board[coords.to_nd_index()];

        match (cell_state, mine_layout.cell_value(coords)) {
            (EngineCell::Hidden, CellValue::Mine) => {
                log::debug!("Mine hit at {:?}", coords);
                self.board[coords.to_nd_index()] = EngineCell::Exploded;
                self.triggered_mine = Some(coords);
                self.end_game(false);
                RevealOutcome::HitMine
            }
            (EngineCell::Hidden, CellValue::Count(adjacent_mines)) => {
                self.board[coords.to_nd_index()] = EngineCell::Revealed(adjacent_mines);
                self.revealed_count += 1;

                if adjacent_mines == 0 {
                    self.flood_from(coords);
                }

                if self.revealed_count == Saturating(self.config.safe_cell_count()) {
                    self.end_game(true);
                    RevealOutcome::Won
                } else {
                    RevealOutcome::Revealed
                }
            }
            _ => RevealOutcome::NoChange,
        }
    }

    /// Opens the connected zero region around `coords` and its numbered border, never touching flagged cells.
    fn flood_from(&mut self, coords: Coord2) {
        let Some(mine_layout) = self.mine_layout.as_ref() else {
            return;
        };

        let mut visited = BTreeSet::from([coords]);
        let mut to_visit: VecDeque<_> = mine_layout
            .iter_neighbors(coords)
            .filter(|&pos| matches!(self.board[pos.to_nd_index()], EngineCell::Hidden))
            .collect();
        log::trace!(
            "Starting flood-fill from {:?}, initial neighbors: {:?}",
            coords,
            to_visit
        );

        while let Some(visit_coords) = to_visit.pop_front() {
            if !visited.insert(visit_coords) {
                continue;
            }

            if !matches!(self.board[visit_coords.to_nd_index()], EngineCell::Hidden) {
                continue;
            }

            // zero cells never border a mine, so the flood only ever opens safe cells
            let visit_adjacent_mines = mine_layout.adjacent_mine_count(visit_coords);
            self.board[visit_coords.to_nd_index()] = EngineCell::Revealed(visit_adjacent_mines);
            self.revealed_count += 1;
            log::trace!(
                "Flood revealed {:?}, adjacent mines: {}",
                visit_coords,
                visit_adjacent_mines
            );

            if visit_adjacent_mines == 0 {
                to_visit.extend(
                    mine_layout
                        .iter_neighbors(visit_coords)
                        .filter(|&pos| matches!(self.board[pos.to_nd_index()], EngineCell::Hidden))
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }
    }

    fn end_game(&mut self, won: bool) {
        if self.phase.is_finished() {
            return;
        }

        self.phase = if won { Phase::Won } else { Phase::Lost };
        log::debug!("Game ended: {:?}", self.phase);

        if won {
            self.triggered_mine = None;
            self.flag_remaining_mines();
        }
    }

    fn flag_remaining_mines(&mut self) {
        let Some(mine_layout) = self.mine_layout.as_ref() else {
            return;
        };
        for coords in mine_layout.iter_mines() {
            let cell = &mut self.board[coords.to_nd_index()];
            if matches!(cell, EngineCell::Hidden) {
                *cell = EngineCell::Flagged;
                self.flagged_count += 1;
            }
        }
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.mine_layout_iter_neighbors(coords)
            .filter(|&pos| self.board[pos.to_nd_index()].is_flagged())
            .count() as u8
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.phase.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }

    fn check_mines_placed(&self) -> Result<()> {
        if self.mine_layout.is_some() {
            Ok(())
        } else {
            Err(GameError::MinesNotPlaced)
        }
    }

    fn mine_layout_iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.config.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(target_arch = "wasm32")]
    use wasm_bindgen_test::wasm_bindgen_test as test;

    fn engine(size: Coord2, mines: &[Coord2]) -> PlayEngine {
        let layout = MineLayout::from_mine_coords(size, mines).unwrap();
        let mut engine = PlayEngine::new(layout.game_config());
        engine.place_mines(layout).unwrap();
        engine
    }

    fn revealed_cells(engine: &PlayEngine) -> usize {
        iter_coords(engine.size())
            .filter(|&pos| engine.cell_at(pos).is_revealed())
            .count()
    }

    #[test]
    fn reveal_requires_placed_mines() {
        let mut engine = PlayEngine::new(GameConfig::CLASSIC);

        assert_eq!(engine.phase(), Phase::Fresh);
        assert_eq!(engine.reveal((0, 0)), Err(GameError::MinesNotPlaced));
    }

    #[test]
    fn mines_are_placed_only_once() {
        let layout = MineLayout::from_mine_coords((2, 2), &[(0, 0)]).unwrap();
        let mut engine = PlayEngine::new(layout.game_config());

        engine.place_mines(layout.clone()).unwrap();

        assert_eq!(engine.phase(), Phase::Active);
        assert_eq!(engine.place_mines(layout), Err(GameError::MinesAlreadyPlaced));
    }

    #[test]
    fn place_mines_rejects_other_config() {
        let layout = MineLayout::from_mine_coords((2, 2), &[(0, 0)]).unwrap();
        let mut engine = PlayEngine::new(GameConfig::CLASSIC);

        assert_eq!(engine.place_mines(layout), Err(GameError::InvalidBoardShape));
        assert_eq!(engine.phase(), Phase::Fresh);
    }

    #[test]
    fn reveal_hits_mine_and_sets_triggered_cell() {
        let mut engine = engine((2, 2), &[(0, 0)]);

        let outcome = engine.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::HitMine);
        assert_eq!(engine.phase(), Phase::Lost);
        assert_eq!(engine.triggered_mine(), Some((0, 0)));
        assert_eq!(engine.cell_at((0, 0)), EngineCell::Exploded);
        assert!(engine.cell_at((0, 0)).is_revealed());
        assert_eq!(engine.revealed_count(), 0);
        assert_eq!(engine.reveal((1, 1)), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn reveal_numbered_cell_stays_a_leaf() {
        let mut engine = engine((3, 3), &[(0, 0)]);

        assert_eq!(engine.reveal((1, 1)).unwrap(), RevealOutcome::Revealed);
        assert_eq!(engine.cell_at((1, 1)), EngineCell::Revealed(1));
        assert_eq!(engine.revealed_count(), 1);
    }

    #[test]
    fn reveal_flood_fill_opens_zero_region() {
        let mut engine = engine((3, 3), &[(2, 2)]);

        let outcome = engine.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(engine.cell_at((0, 0)), EngineCell::Revealed(0));
        assert_eq!(engine.cell_at((1, 1)), EngineCell::Revealed(1));
        assert_eq!(engine.cell_at((2, 2)), EngineCell::Flagged);
    }

    #[test]
    fn flood_stops_at_numbered_border() {
        // column 3 is a wall of mines, columns 0..=1 are zeros, column 2 is the numbered border
        let mines = [(0, 3), (1, 3), (2, 3), (3, 3)];
        let mut engine = engine((4, 5), &mines);

        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::Revealed);

        for row in 0..4 {
            assert_eq!(engine.cell_at((row, 0)), EngineCell::Revealed(0));
            assert_eq!(engine.cell_at((row, 1)), EngineCell::Revealed(0));
            assert!(matches!(engine.cell_at((row, 2)), EngineCell::Revealed(n) if n > 0));
            assert_eq!(engine.cell_at((row, 4)), EngineCell::Hidden);
        }
        assert_eq!(usize::from(engine.revealed_count()), revealed_cells(&engine));
        assert_eq!(engine.revealed_count(), 12);
    }

    #[test]
    fn flood_skips_flagged_cells() {
        let mut engine = engine((3, 3), &[(2, 2)]);

        engine.toggle_flag((0, 2)).unwrap();
        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::Revealed);

        assert_eq!(engine.cell_at((0, 2)), EngineCell::Flagged);
        assert_eq!(engine.cell_at((0, 1)), EngineCell::Revealed(0));
        assert_eq!(engine.revealed_count(), 7);
    }

    #[test]
    fn reveal_on_flagged_or_revealed_cell_is_no_change() {
        let mut engine = engine((3, 3), &[(0, 0)]);

        engine.toggle_flag((0, 0)).unwrap();
        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::NoChange);
        engine.reveal((1, 1)).unwrap();
        assert_eq!(engine.reveal((1, 1)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(engine.reveal((5, 5)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn chord_reveal_uses_flagged_neighbors() {
        let mines = &[(0, 1), (2, 1)];
        let mut engine = engine((3, 3), mines);

        engine.reveal((1, 1)).unwrap();
        engine.toggle_flag((0, 1)).unwrap();
        engine.toggle_flag((2, 1)).unwrap();

        let outcome = engine.chord_reveal((1, 1)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(engine.cell_at((1, 0)), EngineCell::Revealed(2));
        assert_eq!(engine.cell_at((1, 2)), EngineCell::Revealed(2));
    }

    #[test]
    fn chord_reveal_with_mismatched_flags_is_no_change() {
        let mines = &[(0, 1), (2, 1)];
        let mut engine = engine((3, 3), mines);

        engine.reveal((1, 1)).unwrap();
        engine.toggle_flag((0, 1)).unwrap();

        assert_eq!(engine.chord_reveal((1, 1)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(engine.revealed_count(), 1);
    }

    #[test]
    fn chord_reveal_on_wrong_flag_hits_mine_and_halts() {
        let mines = &[(0, 1)];
        let mut engine = engine((3, 3), mines);

        engine.reveal((1, 1)).unwrap();
        engine.toggle_flag((0, 0)).unwrap();

        assert_eq!(engine.chord_reveal((1, 1)).unwrap(), RevealOutcome::HitMine);
        assert_eq!(engine.phase(), Phase::Lost);
        assert_eq!(engine.triggered_mine(), Some((0, 1)));
        assert_eq!(engine.cell_at((0, 1)), EngineCell::Exploded);
        // (0, 2) comes after the mine in neighbor order
        assert_eq!(engine.cell_at((0, 2)), EngineCell::Hidden);
    }

    #[test]
    fn toggle_flag_twice_restores_budget() {
        let mut engine = engine((3, 3), &[(0, 0)]);

        assert_eq!(engine.toggle_flag((2, 2)).unwrap(), MarkOutcome::Changed);
        assert_eq!(engine.mines_left(), 0);
        assert_eq!(engine.toggle_flag((2, 2)).unwrap(), MarkOutcome::Changed);
        assert_eq!(engine.mines_left(), 1);
        assert_eq!(engine.cell_at((2, 2)), EngineCell::Hidden);
    }

    #[test]
    fn budget_goes_negative_when_over_flagged() {
        let mut engine = engine((3, 3), &[(0, 0)]);

        engine.toggle_flag((2, 2)).unwrap();
        engine.toggle_flag((2, 1)).unwrap();

        assert_eq!(engine.mines_left(), -1);
    }

    #[test]
    fn flagging_is_allowed_before_mines_are_placed() {
        let mut engine = PlayEngine::new(GameConfig::CLASSIC);

        assert_eq!(engine.toggle_flag((3, 3)).unwrap(), MarkOutcome::Changed);
        assert_eq!(engine.mines_left(), 9);
    }

    #[test]
    fn win_is_independent_of_reveal_order() {
        let mines = [(0, 0), (2, 2)];
        let order_a = [(0, 1), (0, 2), (1, 0), (1, 1), (1, 2), (2, 0), (2, 1)];
        let mut order_b = order_a;
        order_b.reverse();

        for order in [order_a, order_b] {
            let mut engine = engine((3, 3), &mines);
            for coords in order {
                // floods may finish the board before the list runs out
                if engine.is_finished() {
                    break;
                }
                engine.reveal(coords).unwrap();
            }

            assert_eq!(engine.phase(), Phase::Won);
            assert_eq!(engine.revealed_count(), 7);
            assert_eq!(engine.mines_left(), 0);
            assert_eq!(engine.cell_at((0, 0)), EngineCell::Flagged);
            assert_eq!(engine.cell_at((2, 2)), EngineCell::Flagged);
        }
    }

    #[test]
    fn flags_are_rejected_after_loss() {
        let mut engine = engine((2, 2), &[(0, 0)]);

        engine.reveal((0, 0)).unwrap();

        assert_eq!(engine.toggle_flag((1, 1)), Err(GameError::AlreadyEnded));
        assert_eq!(engine.mines_left(), 1);
    }
}
