// Error types shared by the loader, the query engine and the trainer.
use thiserror::Error;

/// Failures while reading the fighter statistics file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column `{0}` is missing from the header")]
    MissingColumn(&'static str),
}

/// Conditions the search box must report back to the user.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Enter a search query")]
    EmptyQuery,
}

/// Anything that stops a training run from producing an accuracy.
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("test fraction must lie strictly between 0 and 1, got {0}")]
    InvalidFraction(f64),

    #[error("the forest needs at least one tree")]
    NoTrees,

    #[error("no rows to train on")]
    EmptyDataset,

    #[error("{features} feature rows but {targets} targets")]
    LengthMismatch { features: usize, targets: usize },

    #[error("too few rows to split: {train} for training, {test} held out")]
    EmptySplit { train: usize, test: usize },

    #[error("target has {0} distinct class(es), need at least 2")]
    SingleClass(usize),

    #[error("model fit failed: {0}")]
    Fit(#[from] linfa::Error),
}
