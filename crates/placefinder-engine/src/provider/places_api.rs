//! HTTP adapter for a Google-Places-style `nearbysearch/json` endpoint.
//!
//! The upstream reports failures in a `"status"` field of a 200 response;
//! `ZERO_RESULTS` is a normal empty answer, any other non-`OK` status is
//! surfaced as [`ProviderError::Upstream`].

use std::time::Duration;

use async_trait::async_trait;
use placefinder_core::{CategoryTag, Language};
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{SearchProvider, SearchRecord};
use crate::error::ProviderError;
use crate::geo::Coordinate;
use crate::types::{ProviderKind, SortMode};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place/";
const NEARBY_SEARCH_PATH: &str = "nearbysearch/json";

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    place_id: String,
    #[serde(default)]
    name: String,
    geometry: Option<Geometry>,
    rating: Option<f64>,
    vicinity: Option<String>,
    formatted_address: Option<String>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct Photo {
    photo_reference: String,
}

/// Client for the place-search API.
///
/// Use [`PlacesApiClient::new`] for production or
/// [`PlacesApiClient::with_base_url`] to point at a mock server in tests.
pub struct PlacesApiClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl PlacesApiClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: &str, timeout_ms: u64) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, timeout_ms, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the HTTP client cannot be built or
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_ms: u64,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .connect_timeout(Duration::from_millis(timeout_ms.min(10_000)))
            .user_agent("placefinder/0.1 (venue-search)")
            .build()
            .map_err(http_error)?;

        // Exactly one trailing slash so joining the endpoint path appends
        // rather than replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ProviderError::Http {
            provider: ProviderKind::Search,
            message: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    fn build_url(
        &self,
        origin: Coordinate,
        category: CategoryTag,
        radius_meters: u32,
        sort_hint: SortMode,
        language: Language,
    ) -> Result<Url, ProviderError> {
        let mut url = self
            .base_url
            .join(NEARBY_SEARCH_PATH)
            .map_err(|e| ProviderError::Http {
                provider: ProviderKind::Search,
                message: format!("invalid endpoint URL: {e}"),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("location", &format!("{},{}", origin.lat(), origin.lng()));
            pairs.append_pair("radius", &radius_meters.to_string());
            if let Some(primary) = category.search_types().first() {
                pairs.append_pair("type", primary);
            }
            pairs.append_pair("language", language.code());
            if sort_hint == SortMode::Rating {
                pairs.append_pair("rankby", "prominence");
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    async fn request(&self, url: Url) -> Result<NearbySearchResponse, ProviderError> {
        let response = self.client.get(url).send().await.map_err(http_error)?;
        let response = response.error_for_status().map_err(http_error)?;
        let body = response.text().await.map_err(http_error)?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Decode {
            provider: ProviderKind::Search,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl SearchProvider for PlacesApiClient {
    async fn query(
        &self,
        origin: Coordinate,
        category: CategoryTag,
        radius_meters: u32,
        sort_hint: SortMode,
        language: Language,
    ) -> Result<Vec<SearchRecord>, ProviderError> {
        let url = self.build_url(origin, category, radius_meters, sort_hint, language)?;
        let envelope = self.request(url).await?;

        match envelope.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Ok(Vec::new()),
            other => {
                return Err(ProviderError::Upstream {
                    provider: ProviderKind::Search,
                    status: other.to_string(),
                    message: envelope
                        .error_message
                        .unwrap_or_else(|| "no error message".to_string()),
                })
            }
        }

        let total = envelope.results.len();
        let records: Vec<SearchRecord> = envelope
            .results
            .into_iter()
            .filter(|place| matches_category(&place.types, category))
            .map(into_record)
            .collect();

        tracing::debug!(
            category = %category,
            radius_meters,
            returned = total,
            kept = records.len(),
            "place search query"
        );
        Ok(records)
    }
}

/// Results that declare types must share at least one with the category.
fn matches_category(types: &[String], category: CategoryTag) -> bool {
    types.is_empty()
        || types
            .iter()
            .any(|t| category.search_types().contains(&t.as_str()))
}

fn into_record(place: PlaceResult) -> SearchRecord {
    let location = place
        .geometry
        .and_then(|g| Coordinate::new(g.location.lat, g.location.lng).ok());
    SearchRecord {
        id: place.place_id,
        name: place.name,
        location,
        rating: place.rating,
        address: place
            .vicinity
            .or(place.formatted_address)
            .unwrap_or_default(),
        types: place.types,
        photos: place
            .photos
            .into_iter()
            .map(|p| p.photo_reference)
            .collect(),
    }
}

fn http_error(e: reqwest::Error) -> ProviderError {
    ProviderError::Http {
        provider: ProviderKind::Search,
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> PlacesApiClient {
        PlacesApiClient::with_base_url("test-key", 2_000, base_url)
            .expect("client construction should not fail")
    }

    fn origin() -> Coordinate {
        Coordinate::new(10.4236, -75.5378).unwrap()
    }

    #[test]
    fn build_url_for_proximity_search() {
        let client = test_client("https://maps.example.com/api/place");
        let url = client
            .build_url(
                origin(),
                CategoryTag::Restaurant,
                1_600,
                SortMode::Proximity,
                Language::Es,
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://maps.example.com/api/place/nearbysearch/json?location=10.4236%2C-75.5378&radius=1600&type=restaurant&language=es&key=test-key"
        );
    }

    #[test]
    fn build_url_adds_prominence_for_rating_sort() {
        let client = test_client("https://maps.example.com/api/place/");
        let url = client
            .build_url(origin(), CategoryTag::Museum, 5_000, SortMode::Rating, Language::En)
            .unwrap();
        assert!(url.as_str().contains("type=museum"), "{url}");
        assert!(url.as_str().contains("language=en"), "{url}");
        assert!(url.as_str().contains("rankby=prominence"), "{url}");
    }

    #[test]
    fn category_filter_accepts_untyped_and_compatible_results() {
        assert!(matches_category(&[], CategoryTag::Bar));
        assert!(matches_category(
            &["night_club".to_string(), "point_of_interest".to_string()],
            CategoryTag::Bar
        ));
        assert!(!matches_category(
            &["lodging".to_string()],
            CategoryTag::Restaurant
        ));
    }

    #[test]
    fn record_prefers_vicinity_and_drops_bad_geometry() {
        let place: PlaceResult = serde_json::from_value(serde_json::json!({
            "place_id": "abc",
            "name": "La Cevichería",
            "geometry": { "location": { "lat": 123.0, "lng": -75.55 } },
            "vicinity": "Calle Stuart 7-14",
            "formatted_address": "Calle Stuart 7-14, Cartagena, Colombia",
            "photos": [{ "photo_reference": "ph-1" }]
        }))
        .unwrap();
        let record = into_record(place);
        assert_eq!(record.address, "Calle Stuart 7-14");
        assert!(record.location.is_none());
        assert_eq!(record.photos, vec!["ph-1".to_string()]);
    }
}
