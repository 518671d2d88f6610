use crate::core::schema::Violation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Model unavailable: {reason}")]
    ModelUnavailable { reason: String },

    #[error("Model refused to answer: {reason}")]
    ModelRefused { reason: String },

    #[error("Model rate limit exceeded")]
    RateLimited,

    #[error("Model output is not valid JSON: {error}")]
    MalformedOutput { raw: String, error: String },

    #[error("Model output failed schema validation ({} violations)", .violations.len())]
    InvalidSchema {
        raw: String,
        violations: Vec<Violation>,
    },

    #[error("Generation failed after correction attempt: {0}")]
    GenerationFailed(#[source] Box<GenError>),

    #[error("Missing configuration: {field}")]
    MissingConfig { field: String },

    #[error("Invalid configuration value for {field}: '{value}' ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl GenError {
    /// True when the caller may succeed by retrying later without changing
    /// the request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenError::ModelUnavailable { .. } | GenError::RateLimited
        )
    }

    /// Caller-facing summary. Never includes prompt content or raw model
    /// output.
    pub fn user_message(&self) -> &'static str {
        match self {
            GenError::InvalidInput { .. } => "Check the images and language of your request",
            GenError::MissingConfig { .. } | GenError::InvalidConfigValue { .. } => {
                "Check the service configuration"
            }
            GenError::ModelUnavailable { .. } | GenError::RateLimited => {
                "The model is temporarily unavailable, try again later"
            }
            GenError::ModelRefused { .. }
            | GenError::MalformedOutput { .. }
            | GenError::InvalidSchema { .. }
            | GenError::GenerationFailed(_) => {
                "The service could not produce a valid listing for these images"
            }
            GenError::IoError(_) | GenError::SerializationError(_) => {
                "An internal error occurred, try again later"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, GenError>;
