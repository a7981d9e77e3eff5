use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    GenerationFailure(String),
    #[error("service returned no text")]
    EmptyResponse,
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("no image part in response")]
    NoImageProduced,
    #[error("no response within {0:?}")]
    Timeout(Duration),
}

impl GenerationError {
    /// Stable machine-readable name for API consumers.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::GenerationFailure(_) => "generation_failure",
            GenerationError::EmptyResponse => "empty_response",
            GenerationError::MalformedResponse(_) => "malformed_response",
            GenerationError::NoImageProduced => "no_image_produced",
            GenerationError::Timeout(_) => "timeout",
        }
    }
}
