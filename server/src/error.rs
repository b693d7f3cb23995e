use thiserror::Error;

/// Every way a move can be rejected. All variants are recoverable: they are
/// reported to the issuing client and leave the game state untouched.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("invalid input is not a number")]
    NotANumber,
    #[error("not enough arguments provided")]
    TooFewArguments,
    #[error("invalid piece selection")]
    PieceSelection,
    #[error("invalid set selection")]
    SetSelection,
    #[error("index must be >= {0} and < {1}")]
    OutOfBounds(usize, usize),
    #[error("piece is invalid")]
    InvalidPiece,
    #[error("set is invalid")]
    InvalidSet,
    #[error("not enough pieces to create set")]
    TooFewPieces,
    #[error("piece cannot be inserted into set")]
    CannotInsert,
    #[error("board is invalid")]
    InvalidBoard,
    #[error("first meld must be worth at least 30 points and contain no joker")]
    FirstMeld,
}
