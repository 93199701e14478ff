use thiserror::Error;

#[derive(Error, Debug)]
pub enum LifeError {
    #[error("Invalid grid dimensions {width}x{height}: both sides must be positive")]
    InvalidDimension { width: i64, height: i64 },

    #[error("Malformed wire grid: {0}")]
    Deserialization(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Compute executor unavailable: {0}")]
    ExecutorUnavailable(String),

    #[error("Failed to initialize compute executor: {0}")]
    ExecutorInit(String),

    #[error("Compute executor failed: {message}")]
    ExecutorRuntime {
        message: String,
        stack: Option<String>,
    },

    #[error("Calculation already in progress")]
    CalculationInProgress,

    #[error("Calculation cancelled")]
    CalculationCancelled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type LifeResult<T> = Result<T, LifeError>;
