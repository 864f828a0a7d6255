use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use crate::models::itinerary::CategorySelection;
use crate::services::distance_service::DistanceService;
use crate::services::itinerary_engine::{ItineraryEngine, PlanError};
use crate::services::places_service::PlacesService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryRequest {
    pub destination: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

/*
    /api/itinerary
*/
pub async fn create_itinerary(
    body: web::Json<ItineraryRequest>,
    places: web::Data<PlacesService>,
    engine: web::Data<ItineraryEngine<DistanceService>>,
) -> impl Responder {
    let request = body.into_inner();

    let (destination, start_raw, end_raw) = match (
        request.destination.as_deref(),
        request.start_date.as_deref(),
        request.end_date.as_deref(),
    ) {
        (Some(destination), Some(start), Some(end)) if !destination.trim().is_empty() => {
            (destination, start, end)
        }
        _ => {
            return HttpResponse::BadRequest()
                .json(json!({ "error": "destination, startDate and endDate required" }))
        }
    };

    let start = match NaiveDate::parse_from_str(start_raw, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => {
            return HttpResponse::BadRequest()
                .json(json!({ "error": "startDate must be a valid YYYY-MM-DD date" }))
        }
    };
    let end = match NaiveDate::parse_from_str(end_raw, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => {
            return HttpResponse::BadRequest()
                .json(json!({ "error": "endDate must be a valid YYYY-MM-DD date" }))
        }
    };
    if end < start {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "endDate must not be before startDate" }));
    }

    let selection = CategorySelection::from_request(request.categories);
    let raw_places = places.places_for_destination(destination, &selection).await;

    match engine.plan(start, end, &selection, raw_places).await {
        Ok(itinerary) => HttpResponse::Ok().json(itinerary),
        Err(err @ PlanError::NoPlacesFound) => {
            HttpResponse::BadRequest().json(json!({ "error": err.to_string() }))
        }
        Err(PlanError::Validation(msg)) => HttpResponse::BadRequest().json(json!({ "error": msg })),
    }
}
