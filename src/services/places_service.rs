//! Place Catalog Service
//!
//! Fetches candidate places for a destination from the Google Places APIs:
//! geocode the destination, run a Nearby Search per catalog type for broad
//! coverage, then Text Search "top X in <destination>" queries so the iconic
//! stops show up even when Nearby Search buries them. Results are deduplicated
//! by place id before they reach the itinerary engine.
//!
//! A failed fetch degrades to an empty list; the engine reports that as
//! "no places found" rather than crashing the request.

use std::{env, time::Duration};

use serde::{Deserialize, Serialize};

use crate::models::itinerary::CategorySelection;
use crate::models::place::{Coordinates, Place};
use crate::services::itinerary_engine::dedup_places;

const GEOCODE_API: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const PLACES_API: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";
const TEXT_API: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";
const AUTOCOMPLETE_API: &str = "https://maps.googleapis.com/maps/api/place/autocomplete/json";
const PHOTO_API: &str = "https://maps.googleapis.com/maps/api/place/photo";

const REQUEST_TIMEOUT_SECS: u64 = 10;
const SEARCH_RADIUS_METERS: u32 = 5000;
const MAX_RESULT_PAGES: usize = 3;
// Nearby Search page tokens take a moment to become valid upstream
const PAGE_TOKEN_DELAY: Duration = Duration::from_millis(1500);

/// Catalog-side category map. Broader than the engine's scheduling taxonomy:
/// the fetch casts a wide net (bars, bakeries, shopping), the engine decides
/// what is actually schedulable.
const CATALOG_CATEGORY_MAP: &[(&str, &[&str])] = &[
    ("restaurant", &["restaurant", "cafe", "bar", "bakery"]),
    ("museum", &["museum", "art_gallery"]),
    ("sightseeing", &["tourist_attraction"]),
    ("park", &["park"]),
    (
        "shopping",
        &[
            "shopping_mall",
            "store",
            "clothing_store",
            "jewelry_store",
            "shoe_store",
            "book_store",
        ],
    ),
];

/// Text Search queries for must-sees, keyed by user-facing category.
const MUST_SEE_QUERIES: &[(&str, &str)] = &[
    ("museum", "top museums in"),
    ("sightseeing", "top attractions in"),
    ("restaurant", "best restaurants in"),
    ("park", "best parks in"),
];

#[derive(Debug, Serialize, Deserialize)]
pub struct CityPrediction {
    pub description: String,
    pub place_id: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    location: Coordinates,
}

#[derive(Debug, Deserialize)]
struct PlaceSearchResponse {
    #[serde(default)]
    results: Vec<PlaceResult>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    place_id: Option<String>,
    name: Option<String>,
    geometry: Option<PlaceGeometry>,
    rating: Option<f64>,
    user_ratings_total: Option<u32>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    photos: Vec<PhotoRef>,
}

#[derive(Debug, Deserialize)]
struct PlaceGeometry {
    location: Coordinates,
}

#[derive(Debug, Deserialize)]
struct PhotoRef {
    photo_reference: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    status: String,
    #[serde(default)]
    predictions: Vec<AutocompletePrediction>,
}

#[derive(Debug, Deserialize)]
struct AutocompletePrediction {
    description: Option<String>,
    place_id: Option<String>,
}

#[derive(Clone)]
pub struct PlacesService {
    http_client: reqwest::Client,
    api_key: String,
}

impl PlacesService {
    pub fn new(api_key: String) -> Result<Self, Box<dyn std::error::Error>> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http_client,
            api_key,
        })
    }

    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let api_key = env::var("GOOGLE_MAPS_API_KEY")
            .map_err(|_| "GOOGLE_MAPS_API_KEY environment variable not set")?;
        Self::new(api_key)
    }

    /// Get candidate places for a destination. Any upstream failure is logged
    /// and reported as an empty list.
    pub async fn places_for_destination(
        &self,
        destination: &str,
        selection: &CategorySelection,
    ) -> Vec<Place> {
        match self.fetch_places(destination, selection).await {
            Ok(places) => places,
            Err(err) => {
                eprintln!("Place catalog fetch failed for '{}': {}", destination, err);
                Vec::new()
            }
        }
    }

    async fn fetch_places(
        &self,
        destination: &str,
        selection: &CategorySelection,
    ) -> Result<Vec<Place>, Box<dyn std::error::Error>> {
        let Some(center) = self.geocode(destination).await? else {
            return Ok(Vec::new());
        };

        let mut places = Vec::new();

        for place_type in catalog_types(selection) {
            self.nearby_search(center, place_type, &mut places).await?;
        }

        for (_, query_prefix) in must_see_queries(selection) {
            self.text_search_must_see(destination, query_prefix, &mut places)
                .await?;
        }

        Ok(dedup_places(places))
    }

    /// City-name suggestions for the search form.
    pub async fn autocomplete_cities(
        &self,
        input: &str,
    ) -> Result<Vec<CityPrediction>, Box<dyn std::error::Error>> {
        let response: AutocompleteResponse = self
            .http_client
            .get(AUTOCOMPLETE_API)
            .query(&[
                ("input", input),
                ("types", "(cities)"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        if response.status != "OK" {
            return Err(format!("Autocomplete error: {}", response.status).into());
        }

        Ok(response
            .predictions
            .into_iter()
            .filter_map(|p| {
                Some(CityPrediction {
                    description: p.description?,
                    place_id: p.place_id?,
                })
            })
            .collect())
    }

    async fn geocode(
        &self,
        destination: &str,
    ) -> Result<Option<Coordinates>, Box<dyn std::error::Error>> {
        let response: GeocodeResponse = self
            .http_client
            .get(GEOCODE_API)
            .query(&[("address", destination), ("key", self.api_key.as_str())])
            .send()
            .await?
            .json()
            .await?;

        Ok(response
            .results
            .into_iter()
            .next()
            .map(|r| r.geometry.location))
    }

    /// Nearby Search for one catalog type, following page tokens for broad
    /// coverage.
    async fn nearby_search(
        &self,
        center: Coordinates,
        place_type: &str,
        out: &mut Vec<Place>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut page_token: Option<String> = None;

        for page in 0..MAX_RESULT_PAGES {
            let mut params = vec![
                ("location", format!("{},{}", center.lat, center.lng)),
                ("radius", SEARCH_RADIUS_METERS.to_string()),
                ("type", place_type.to_string()),
                ("key", self.api_key.clone()),
            ];
            if let Some(token) = &page_token {
                params.push(("pagetoken", token.clone()));
            }

            let response: PlaceSearchResponse = self
                .http_client
                .get(PLACES_API)
                .query(&params)
                .send()
                .await?
                .json()
                .await?;

            out.extend(
                response
                    .results
                    .into_iter()
                    .filter_map(|r| self.into_place(r, false)),
            );

            match response.next_page_token {
                Some(token) if page + 1 < MAX_RESULT_PAGES => {
                    tokio::time::sleep(PAGE_TOKEN_DELAY).await;
                    page_token = Some(token);
                }
                _ => break,
            }
        }

        Ok(())
    }

    /// Text Search for one must-see query; results are flagged must-see at
    /// fetch time so the iconic stops survive scoring.
    async fn text_search_must_see(
        &self,
        destination: &str,
        query_prefix: &str,
        out: &mut Vec<Place>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let query = format!("{} {}", query_prefix, destination);

        let response: PlaceSearchResponse = self
            .http_client
            .get(TEXT_API)
            .query(&[("query", query.as_str()), ("key", self.api_key.as_str())])
            .send()
            .await?
            .json()
            .await?;

        out.extend(
            response
                .results
                .into_iter()
                .filter_map(|r| self.into_place(r, true)),
        );

        Ok(())
    }

    fn into_place(&self, result: PlaceResult, must_see: bool) -> Option<Place> {
        let place_id = result.place_id?;
        let location = result.geometry?.location;
        let photo = result
            .photos
            .first()
            .and_then(|p| p.photo_reference.as_deref())
            .map(|r| self.photo_url(r));

        Some(Place {
            place_id,
            name: result.name.unwrap_or_default(),
            location,
            rating: result.rating,
            user_ratings_total: result.user_ratings_total,
            types: result.types,
            photo,
            must_see,
        })
    }

    /// The photo URL carries the API key, so it is resolved here rather than
    /// in the engine.
    fn photo_url(&self, reference: &str) -> String {
        format!(
            "{}?maxwidth=400&photoreference={}&key={}",
            PHOTO_API, reference, self.api_key
        )
    }
}

fn catalog_types(selection: &CategorySelection) -> Vec<&'static str> {
    match selection {
        CategorySelection::All => CATALOG_CATEGORY_MAP
            .iter()
            .flat_map(|(_, tags)| tags.iter().copied())
            .collect(),
        CategorySelection::Selected(categories) => categories
            .iter()
            .filter_map(|c| {
                CATALOG_CATEGORY_MAP
                    .iter()
                    .find(|(name, _)| *name == c.as_str())
            })
            .flat_map(|(_, tags)| tags.iter().copied())
            .collect(),
    }
}

fn must_see_queries(selection: &CategorySelection) -> Vec<(&'static str, &'static str)> {
    match selection {
        CategorySelection::All => MUST_SEE_QUERIES.to_vec(),
        CategorySelection::Selected(categories) => categories
            .iter()
            .filter_map(|c| {
                MUST_SEE_QUERIES
                    .iter()
                    .find(|(name, _)| *name == c.as_str())
                    .copied()
            })
            .collect(),
    }
}
