use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Too many mines")]
    TooManyMines,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Mines were already placed for this game")]
    MinesAlreadyPlaced,
    #[error("Mines have not been placed yet")]
    MinesNotPlaced,
    #[error("Mine layout is not clear around the first revealed cell")]
    MineNearStart,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = core::result::Result<T, GameError>;
