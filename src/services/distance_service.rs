//! Distance Service with Google Maps API Integration
//!
//! Provides inter-stop travel times for the itinerary engine using the Google
//! Distance Matrix API.
//!
//! ## Setup
//! 1. Get a Google Maps API key from Google Cloud Console
//! 2. Enable the Distance Matrix API
//! 3. Set the environment variable: `GOOGLE_MAPS_API_KEY=your_api_key_here`
//!
//! The service imposes its own request timeout; when a lookup fails or times
//! out, the engine substitutes a fixed fallback so a slow or broken upstream
//! never aborts itinerary construction.

use std::{env, time::Duration};

use serde::Deserialize;

use crate::models::place::{Coordinates, Place};

const DISTANCE_MATRIX_API: &str = "https://maps.googleapis.com/maps/api/distancematrix/json";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy)]
pub enum TravelMode {
    Driving,
    Walking,
    Transit,
    Bicycling,
}

impl TravelMode {
    fn as_str(&self) -> &str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Transit => "transit",
            TravelMode::Bicycling => "bicycling",
        }
    }
}

/// Travel-time lookup seam between the engine and the upstream provider.
///
/// Implementations report minutes between two places for a travel mode, or an
/// error the engine converts into its fixed fallback.
#[allow(async_fn_in_trait)]
pub trait TravelTimeLookup {
    async fn travel_minutes(
        &self,
        from: &Place,
        to: &Place,
        mode: TravelMode,
    ) -> Result<u32, Box<dyn std::error::Error>>;
}

#[derive(Debug, Deserialize)]
struct GoogleMapsResponse {
    status: String,
    rows: Vec<GoogleMapsRow>,
}

#[derive(Debug, Deserialize)]
struct GoogleMapsRow {
    elements: Vec<GoogleMapsElement>,
}

#[derive(Debug, Deserialize)]
struct GoogleMapsElement {
    status: String,
    duration: Option<GoogleMapsDuration>,
}

#[derive(Debug, Deserialize)]
struct GoogleMapsDuration {
    value: u32, // seconds
}

#[derive(Clone)]
pub struct DistanceService {
    http_client: reqwest::Client,
    api_key: String,
}

impl DistanceService {
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

    /// Fetch a single origin/destination duration from the Distance Matrix API.
    async fn fetch_duration_minutes(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
        mode: TravelMode,
    ) -> Result<u32, Box<dyn std::error::Error>> {
        let url = format!(
            "{}?origins={},{}&destinations={},{}&mode={}&key={}",
            DISTANCE_MATRIX_API,
            origin.lat,
            origin.lng,
            destination.lat,
            destination.lng,
            mode.as_str(),
            self.api_key
        );

        let response = self.http_client.get(&url).send().await?;
        let google_response: GoogleMapsResponse = response.json().await?;

        if google_response.status != "OK" {
            return Err(format!("Google Maps API error: {}", google_response.status).into());
        }

        let element = google_response
            .rows
            .first()
            .and_then(|row| row.elements.first())
            .ok_or("No distance data returned from Google Maps")?;

        if element.status != "OK" {
            return Err(format!("Google Maps element error: {}", element.status).into());
        }

        let duration = element.duration.as_ref().ok_or("Duration not available")?;

        // Round up so a 30-second hop still counts as a minute
        Ok(duration.value.div_ceil(60))
    }
}

impl TravelTimeLookup for DistanceService {
    async fn travel_minutes(
        &self,
        from: &Place,
        to: &Place,
        mode: TravelMode,
    ) -> Result<u32, Box<dyn std::error::Error>> {
        self.fetch_duration_minutes(&from.location, &to.location, mode)
            .await
    }
}
