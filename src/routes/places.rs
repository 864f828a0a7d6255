use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::models::itinerary::CategorySelection;
use crate::services::places_service::PlacesService;

#[derive(serde::Deserialize)]
pub struct QueryParams {
    destination: Option<String>,
}

/*
    /api/places
*/
pub async fn get_places(
    places: web::Data<PlacesService>,
    params: web::Query<QueryParams>,
) -> impl Responder {
    let destination = match params.destination.as_deref() {
        Some(destination) if !destination.trim().is_empty() => destination,
        _ => {
            return HttpResponse::BadRequest().json(json!({ "error": "Destination is required" }))
        }
    };

    let results = places
        .places_for_destination(destination, &CategorySelection::All)
        .await;

    HttpResponse::Ok().json(json!({ "places": results }))
}
