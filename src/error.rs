use crate::compound::Compound;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StrategyError>;

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("invalid compound name: {0}")]
    InvalidCompound(String),

    #[error("unknown compound: {0}")]
    UnknownCompound(String),

    #[error("compound {0} supplied more than once")]
    DuplicateCompound(Compound),

    #[error("no tyre models supplied")]
    EmptyFleet,

    #[error("race length must be at least one lap")]
    InvalidRaceLength,

    #[error("pit loss must be a finite, non-negative time (got {0})")]
    InvalidPitLoss(f64),

    #[error("{compound} tyre law is not usable: {reason}")]
    InvalidLaw { compound: Compound, reason: String },

    #[error("{compound} lap table covers {covered} laps but the race needs {required}")]
    InsufficientCoverage {
        compound: Compound,
        covered: usize,
        required: usize,
    },

    #[error("not enough laps to fit {compound}: {found} samples, need {needed}")]
    InsufficientData {
        compound: Compound,
        found: usize,
        needed: usize,
    },

    #[error("no starting compound gives a strategy that uses two compounds")]
    NoFeasibleStrategy,

    #[error("regression failed for {compound}: {reason}")]
    Fit { compound: Compound, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
