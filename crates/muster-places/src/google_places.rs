//! Google Places v1 text-search client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::http_helpers::{
    is_retryable_status, is_retryable_transport_error, parse_retry_after, retry_delay,
    truncate_for_error,
};
use crate::{PlaceSuggester, PlaceSuggestion, PlacesError, MAX_SUGGESTIONS};

const PLACES_FIELD_MASK: &str = "places.displayName,places.formattedAddress";

#[derive(Debug, Deserialize)]
struct SearchTextResponse {
    #[serde(default)]
    places: Vec<PlacePayload>,
}

#[derive(Debug, Deserialize)]
struct PlacePayload {
    #[serde(rename = "displayName")]
    display_name: Option<DisplayName>,
    #[serde(rename = "formattedAddress", default)]
    formatted_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DisplayName {
    #[serde(default)]
    text: String,
}

/// HTTP client for the Places `places:searchText` endpoint with a hard
/// request timeout and bounded retry honoring `Retry-After`.
#[derive(Clone)]
pub struct GooglePlacesClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    retry_max_attempts: usize,
    retry_base_delay_ms: u64,
}

impl GooglePlacesClient {
    pub fn new(
        api_base: String,
        api_key: String,
        request_timeout_ms: u64,
        retry_max_attempts: usize,
        retry_base_delay_ms: u64,
    ) -> Result<Self, PlacesError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            retry_max_attempts: retry_max_attempts.max(1),
            retry_base_delay_ms: retry_base_delay_ms.max(1),
        })
    }

    async fn search_text(&self, query: &str) -> Result<SearchTextResponse, PlacesError> {
        let payload = json!({
            "textQuery": query,
            "pageSize": MAX_SUGGESTIONS,
        });
        let mut attempt = 0_usize;
        loop {
            attempt = attempt.saturating_add(1);
            let response = self
                .http
                .post(format!("{}/places:searchText", self.api_base))
                .header("X-Goog-Api-Key", &self.api_key)
                .header("X-Goog-FieldMask", PLACES_FIELD_MASK)
                .json(&payload)
                .send()
                .await;
            match response {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json::<SearchTextResponse>().await.map_err(|error| {
                            PlacesError::InvalidResponse(error.to_string())
                        });
                    }

                    let retry_after = parse_retry_after(response.headers());
                    let body = response.text().await.unwrap_or_default();
                    if attempt < self.retry_max_attempts && is_retryable_status(status.as_u16()) {
                        tokio::time::sleep(retry_delay(
                            self.retry_base_delay_ms,
                            attempt,
                            retry_after,
                        ))
                        .await;
                        continue;
                    }
                    return Err(PlacesError::HttpStatus {
                        status: status.as_u16(),
                        body: truncate_for_error(&body, 800),
                    });
                }
                Err(error) => {
                    if attempt < self.retry_max_attempts && is_retryable_transport_error(&error) {
                        tokio::time::sleep(retry_delay(self.retry_base_delay_ms, attempt, None))
                            .await;
                        continue;
                    }
                    return Err(PlacesError::Http(error));
                }
            }
        }
    }
}

#[async_trait]
impl PlaceSuggester for GooglePlacesClient {
    async fn suggest(&self, area: &str) -> Result<Vec<PlaceSuggestion>, PlacesError> {
        let response = self.search_text(&format!("places in {area}")).await?;
        Ok(response
            .places
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|place| PlaceSuggestion {
                name: place
                    .display_name
                    .map(|name| name.text)
                    .unwrap_or_default(),
                address: place.formatted_address.unwrap_or_default(),
            })
            .collect())
    }
}
