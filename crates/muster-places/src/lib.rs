//! Place-suggestion adapter for Muster.
//!
//! Wraps the Google Places "text search" endpoint behind a narrow
//! `PlaceSuggester` seam: given an area name, return a ranked list of up to
//! five place names and addresses. Pure lookup, no side effects.

use async_trait::async_trait;
use thiserror::Error;

mod google_places;
mod http_helpers;

pub use google_places::GooglePlacesClient;

/// Number of ranked suggestions surfaced to the invoker.
pub const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceSuggestion {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("places provider returned non-success status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("invalid places response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
/// Trait contract for place lookup providers.
pub trait PlaceSuggester: Send + Sync {
    /// Returns at most [`MAX_SUGGESTIONS`] places in the provider's ranked
    /// order for `area`.
    async fn suggest(&self, area: &str) -> Result<Vec<PlaceSuggestion>, PlacesError>;
}
