use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("similarity index holds no vectors")]
    EmptyIndex,

    #[error("fusion weight must lie within [0, 1], got {alpha}")]
    InvalidWeight { alpha: f64 },

    #[error("candidate count must be at least 1")]
    InvalidK,

    #[error("{collaborator} collaborator failed: {reason}")]
    Collaborator {
        collaborator: &'static str,
        reason: String,
    },
}

impl EngineError {
    pub fn collaborator(collaborator: &'static str, reason: impl Into<String>) -> Self {
        Self::Collaborator {
            collaborator,
            reason: reason.into(),
        }
    }
}
