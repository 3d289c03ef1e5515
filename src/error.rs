use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TdError {
    #[error("fit expects exactly one transition, got {0}")]
    DatasetSize(usize),
    #[error("the ensemble must have exactly {expected} models, got {found}")]
    EnsembleSize { expected: usize, found: usize },
    #[error("exactly one of the beta or delta parameters is needed")]
    ContinuationRate,
    #[error("{0} is not supported")]
    Unsupported(&'static str),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("{kind} index {index} out of range for size {size}")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        size: usize,
    },
    #[error("expected a {expected} observation")]
    ObservationKind { expected: &'static str },
    #[error("feature vector has length {found}, expected {expected}")]
    FeatureShape { expected: usize, found: usize },
    #[error("this parameter needs a target value")]
    MissingTarget,
    #[error("invalid sampling distribution: {0}")]
    Distribution(String),
}

pub type Result<T> = std::result::Result<T, TdError>;
