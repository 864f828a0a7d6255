pub mod autocomplete;
pub mod itinerary;
pub mod places;
