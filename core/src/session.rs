use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Result of a primary action: the cells that changed plus the global status after it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionUpdate {
    pub cells: Vec<CellUpdate>,
    pub mines_left: isize,
    pub signal: Option<GameSignal>,
}

impl ActionUpdate {
    pub fn has_update(&self) -> bool {
        !self.cells.is_empty() || self.signal.is_some()
    }
}

/// Result of a secondary action: the toggled cell, if any, and the mine budget.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlagUpdate {
    pub cell: Option<CellUpdate>,
    pub mines_left: isize,
}

impl FlagUpdate {
    pub fn has_update(&self) -> bool {
        self.cell.is_some()
    }
}

/// One game from reset to reset, owned by whatever drives the input events.
///
/// Mines are placed by `G` on the first primary action, the clock is fed by `T` while the game is in progress. Every
/// input is answered synchronously, invalid input is absorbed as an empty update.
#[derive(Clone, Debug)]
pub struct Session<G, T> {
    config: GameConfig,
    generator: G,
    engine: PlayEngine,
    clock: GameClock<T>,
}

impl<G: MinefieldGenerator, T: Ticker> Session<G, T> {
    pub fn new(config: GameConfig, generator: G, ticker: T) -> Self {
        Self {
            config,
            generator,
            engine: PlayEngine::new(config),
            clock: GameClock::new(ticker),
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn phase(&self) -> Phase {
        self.engine.phase()
    }

    pub fn engine(&self) -> &PlayEngine {
        &self.engine
    }

    pub fn clock(&self) -> &GameClock<T> {
        &self.clock
    }

    pub fn elapsed_secs(&self) -> u16 {
        self.clock.elapsed_secs()
    }

    pub fn mines_left(&self) -> isize {
        self.engine.mines_left()
    }

    pub fn is_chordable(&self, coords: Coord2) -> bool {
        self.engine.validate_coords(coords).is_ok() && self.engine.can_chord_reveal_at(coords)
    }

    /// Full render of the current state.
    pub fn frame(&self) -> Frame {
        Frame {
            cells: render_board(&self.engine),
            mines_left: self.engine.mines_left(),
            elapsed_secs: self.clock.elapsed_secs(),
            face: self.engine.phase().into(),
        }
    }

    /// Throws the current game away and starts over with an empty board.
    pub fn on_reset(&mut self) -> Frame {
        log::debug!("reset from {:?}", self.engine.phase());
        self.clock.reset();
        self.engine = PlayEngine::new(self.config);
        self.frame()
    }

    pub fn on_primary_action(&mut self, coords: Coord2) -> ActionUpdate {
        let before = render_board(&self.engine);
        let previous_phase = self.engine.phase();

        match self.primary_action(coords) {
            Ok(outcome) => log::debug!("primary action at {:?}: {:?}", coords, outcome),
            Err(err) => log::debug!("primary action at {:?} ignored: {}", coords, err),
        }

        let phase = self.engine.phase();
        if phase.is_finished() {
            self.clock.stop();
        }

        ActionUpdate {
            cells: diff_boards(&before, &render_board(&self.engine)),
            mines_left: self.engine.mines_left(),
            signal: if phase != previous_phase {
                GameSignal::from_phase(phase)
            } else {
                None
            },
        }
    }

    pub fn on_secondary_action(&mut self, coords: Coord2) -> FlagUpdate {
        let cell = match self.engine.toggle_flag(coords) {
            Ok(outcome) => outcome.has_update().then(|| CellUpdate {
                coords,
                view: render_cell(&self.engine, coords),
            }),
            Err(err) => {
                log::debug!("secondary action at {:?} ignored: {}", coords, err);
                None
            }
        };

        FlagUpdate {
            cell,
            mines_left: self.engine.mines_left(),
        }
    }

    /// One second passed, returns the elapsed time to display.
    pub fn on_tick(&mut self) -> u16 {
        self.clock.tick()
    }

    fn primary_action(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.engine.validate_coords(coords)?;

        match self.engine.cell_at(coords) {
            EngineCell::Flagged => Ok(RevealOutcome::NoChange),
            EngineCell::Revealed(_) | EngineCell::Exploded => self.engine.chord_reveal(coords),
            EngineCell::Hidden => {
                if self.engine.phase().is_fresh() {
                    let mine_layout = self.generator.generate(self.config, coords)?;
                    self.engine.place_mines(mine_layout)?;
                    self.clock.start();
                }
                self.engine.reveal(coords)
            }
        }
    }
}
