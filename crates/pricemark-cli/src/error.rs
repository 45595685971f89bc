use thiserror::Error;

use pricemark_core::{
    ConfigError, EvaluationError, NoteStoreError, ParseError, RouteFailure, ValidationError,
    WorkflowError,
};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid label: {0}")]
    Label(#[from] ParseError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error(transparent)]
    Quote(RouteFailure),

    #[error(transparent)]
    Store(#[from] NoteStoreError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Config(_) | Self::Label(_) | Self::Evaluation(_) => 2,
            Self::Quote(_) => 3,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
            Self::Store(_) => 11,
        }
    }
}

impl From<WorkflowError> for CliError {
    fn from(error: WorkflowError) -> Self {
        match error {
            WorkflowError::Label(error) => Self::Label(error),
            WorkflowError::Symbol(error) => Self::Validation(error),
            WorkflowError::Quote(failure) => Self::Quote(failure),
            WorkflowError::Evaluation(error) => Self::Evaluation(error),
            WorkflowError::Store(error) => Self::Store(error),
        }
    }
}
