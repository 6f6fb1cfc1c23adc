/// Error types.
///
/// Only programming-level and I/O failures are errors. A crowded scramble
/// and a click outside the play phase are handled silently where they occur.

use std::io;

use thiserror::Error;

use crate::sim::round::Phase;

#[derive(Debug, Error)]
pub enum GameError {
    /// Round size outside the playable range.
    #[error("round size {size} is outside {min}..={max}")]
    InvalidSize { size: usize, min: usize, max: usize },

    /// A round operation was invoked out of sequence.
    #[error("cannot move from {from:?} to {to:?}")]
    PhaseOrder { from: Phase, to: Phase },

    /// Terminal setup, drawing or event polling failed.
    #[error("terminal I/O failed: {0}")]
    Terminal(#[from] io::Error),
}

pub type GameResult<T> = Result<T, GameError>;
