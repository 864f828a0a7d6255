use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::services::places_service::PlacesService;

#[derive(serde::Deserialize)]
pub struct QueryParams {
    input: Option<String>,
}

/*
    /api/autocomplete
*/
pub async fn autocomplete_cities(
    places: web::Data<PlacesService>,
    params: web::Query<QueryParams>,
) -> impl Responder {
    let input = match params.input.as_deref() {
        Some(input) if !input.trim().is_empty() => input,
        _ => return HttpResponse::BadRequest().json(json!({ "error": "Input is required" })),
    };

    match places.autocomplete_cities(input).await {
        Ok(predictions) => HttpResponse::Ok().json(json!({ "predictions": predictions })),
        Err(err) => {
            eprintln!("Autocomplete error: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to fetch autocomplete suggestions" }))
        }
    }
}
