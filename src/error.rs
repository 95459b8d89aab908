//! Error type shared by the generation pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    /// Constraint propagation left a landmass cell with no candidates.
    #[error("landmass synthesis hit a contradiction at cell ({x}, {y})")]
    Contradiction { x: usize, y: usize },

    /// Landmass synthesis did not settle within its iteration budget.
    #[error("landmass synthesis did not finish within {0} iterations")]
    IterationBudget(usize),

    /// Grid growth only accepts square inputs.
    #[error("grid growth needs a square grid, got {width}x{height}")]
    NonSquareGrid { width: usize, height: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}
