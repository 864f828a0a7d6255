pub mod distance_service;
pub mod itinerary_engine;
pub mod places_service;
