use thiserror::Error;

/// Error taxonomy for event lifecycle operations.
///
/// `Validation` and `Permission` are deterministic outcomes of the caller's
/// input; `NotFound` deliberately does not distinguish "never existed" from
/// "already deleted"; `Upstream` wraps store or provider failures whose raw
/// detail is logged but never shown to end users.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("invalid event input: {0}")]
    Validation(String),
    #[error("event not found")]
    NotFound,
    #[error("only the event creator may delete it")]
    Permission,
    #[error("upstream call failed: {0}")]
    Upstream(String),
}

impl EventError {
    pub fn upstream(error: impl std::fmt::Display) -> Self {
        Self::Upstream(error.to_string())
    }
}
