use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use tripweaver_api::routes;
use tripweaver_api::services::distance_service::DistanceService;
use tripweaver_api::services::itinerary_engine::ItineraryEngine;
use tripweaver_api::services::places_service::PlacesService;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 5000;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);

    let places_service =
        PlacesService::from_env().expect("GOOGLE_MAPS_API_KEY must be set for the place catalog");

    // The itinerary engine tolerates a missing distance service: every travel
    // leg then gets the fixed fallback estimate.
    let distance_service = match DistanceService::from_env() {
        Ok(service) => {
            println!("DistanceService initialized with Google Maps API");
            Some(service)
        }
        Err(e) => {
            println!(
                "DistanceService not available: {}. Using fallback travel times.",
                e
            );
            None
        }
    };
    let engine = ItineraryEngine::new(distance_service);

    println!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .route("/health", web::get().to(|| async { "OK" }))
            .app_data(web::Data::new(places_service.clone()))
            .app_data(web::Data::new(engine.clone()))
            .service(
                web::scope("/api")
                    .route("/places", web::get().to(routes::places::get_places))
                    .route(
                        "/autocomplete",
                        web::get().to(routes::autocomplete::autocomplete_cities),
                    )
                    .route(
                        "/itinerary",
                        web::post().to(routes::itinerary::create_itinerary),
                    ),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
