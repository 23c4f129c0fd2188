/// Load-time failures. Play itself has no error class: rejected moves and
/// moves after the game ended are ordinary no-op results.

use thiserror::Error;

/// Raised when a layout cannot produce a playable level.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LevelFormatError {
    #[error("layout has no rows or an empty first row")]
    Empty,
    #[error("row {row} has length {found}, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
    #[error("unknown tile {ch:?} at ({x}, {y})")]
    UnknownTile { x: usize, y: usize, ch: char },
    #[error("layout has no agent start 'P'")]
    MissingAgent,
    #[error("layout has no exit 'E'")]
    MissingExit,
    #[error("catalog has no playable levels")]
    NoLevels,
}
