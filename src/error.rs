//! Error types for plan acquisition and exercise swaps

use thiserror::Error;

/// Failure talking to the AI collaborator
#[derive(Debug, Error)]
pub enum AiError {
    #[error("API key not found. Set {0} (or API_KEY) and try again")]
    MissingApiKey(&'static str),

    /// Built with `without_url`, the request URL is never shown
    #[error("request to the AI service failed: {0}")]
    Network(reqwest::Error),

    #[error("AI service error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("AI service returned an empty response")]
    EmptyResponse,

    #[error("malformed AI response: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for AiError {
    fn from(err: serde_json::Error) -> Self {
        AiError::Malformed(err.to_string())
    }
}

/// No plan could be made available
#[derive(Debug, Error)]
#[error("could not build a workout plan: {0}")]
pub struct AcquisitionError(#[from] pub AiError);

/// A single exercise swap failed; the rest of the plan is unaffected
#[derive(Debug, Error)]
pub enum SwapError {
    #[error("no plan loaded")]
    NoPlan,

    #[error("no exercise {exercise} on day {day}")]
    OutOfRange { day: usize, exercise: usize },

    #[error("exercise is already being swapped")]
    InFlight,

    #[error("exercise is no longer in the plan")]
    Stale,

    #[error("could not replace the exercise: {0}")]
    Remote(#[from] AiError),
}
