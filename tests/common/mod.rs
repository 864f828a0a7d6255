use actix_web::{middleware::Logger, web, App};
use actix_cors::Cors;

use tripweaver_api::routes;
use tripweaver_api::services::distance_service::DistanceService;
use tripweaver_api::services::itinerary_engine::ItineraryEngine;
use tripweaver_api::services::places_service::PlacesService;

pub struct TestApp {
    pub places: PlacesService,
    pub engine: ItineraryEngine<DistanceService>,
}

impl TestApp {
    pub fn new() -> Self {
        // A dummy key is fine: validation-path tests never reach the upstream
        // APIs.
        let places = PlacesService::new("test-api-key".to_string()).expect("http client");
        let distance = DistanceService::new("test-api-key".to_string()).expect("http client");

        Self {
            places,
            engine: ItineraryEngine::new(Some(distance)),
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
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
            .app_data(web::Data::new(self.places.clone()))
            .app_data(web::Data::new(self.engine.clone()))
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
    }
}
