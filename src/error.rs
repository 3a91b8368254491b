use thiserror::Error;

/// Every failure the harness can surface.
///
/// None of these are retried: loading errors abort before the first epoch,
/// `ShapeMismatch` aborts the run mid-training. A missing observer is not an
/// error at all (training simply continues headless).
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The input file could not be turned into images of the expected shape.
    #[error("malformed dataset: {0}")]
    DataFormat(String),

    /// A configuration value is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A batch or gradient does not fit the model it is fed to.
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl HarnessError {
    pub fn shape_mismatch(expected: impl ToString, actual: impl ToString) -> Self {
        HarnessError::ShapeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
