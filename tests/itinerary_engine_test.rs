//! Allocation engine tests
//!
//! Exercises the planning pipeline end to end with fixture places and stub
//! travel-time lookups, no network involved.

use chrono::NaiveDate;

use tripweaver_api::models::itinerary::{CategorySelection, Itinerary};
use tripweaver_api::models::place::{Coordinates, Place};
use tripweaver_api::services::distance_service::{TravelMode, TravelTimeLookup};
use tripweaver_api::services::itinerary_engine::{ItineraryEngine, PlanError};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Lookup that always fails, as if the distance provider were down.
struct FailingLookup;

impl TravelTimeLookup for FailingLookup {
    async fn travel_minutes(
        &self,
        _from: &Place,
        _to: &Place,
        _mode: TravelMode,
    ) -> Result<u32, Box<dyn std::error::Error>> {
        Err("distance matrix unavailable".into())
    }
}

/// Lookup that reports the same duration for every pair.
struct FixedLookup(u32);

impl TravelTimeLookup for FixedLookup {
    async fn travel_minutes(
        &self,
        _from: &Place,
        _to: &Place,
        _mode: TravelMode,
    ) -> Result<u32, Box<dyn std::error::Error>> {
        Ok(self.0)
    }
}

fn place(id: &str, rating: f64, reviews: u32, types: &[&str]) -> Place {
    Place {
        place_id: id.to_string(),
        name: format!("Place {}", id),
        location: Coordinates {
            lat: 48.85,
            lng: 2.35,
        },
        rating: Some(rating),
        user_ratings_total: Some(reviews),
        types: types.iter().map(|t| t.to_string()).collect(),
        photo: None,
        must_see: false,
    }
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn slot_ids(itinerary: &Itinerary, day: usize) -> Vec<&str> {
    itinerary.days[day]
        .activities
        .iter()
        .map(|a| a.place_id.as_str())
        .collect()
}

// ============================================================================
// Allocation
// ============================================================================

#[actix_rt::test]
async fn test_must_sees_lead_day_one_then_round_robin_fillers() {
    let engine = ItineraryEngine::new(Some(FixedLookup(10)));
    let raw = vec![
        place("m900", 4.5, 200, &["museum"]),
        place("m500", 5.0, 100, &["museum"]),
        place("m100", 2.0, 50, &["museum"]),
        place("r800", 4.0, 200, &["restaurant"]),
        place("r300", 3.0, 100, &["restaurant"]),
    ];
    let selection =
        CategorySelection::Selected(vec!["museum".to_string(), "restaurant".to_string()]);

    let itinerary = engine
        .plan(date("2025-06-01"), date("2025-06-02"), &selection, raw)
        .await
        .unwrap();

    // Day 1: top museum and top restaurant as must-sees, then fillers drawn
    // round-robin from the remaining museums and restaurant. Nothing is left
    // for day 2.
    assert_eq!(itinerary.days.len(), 1);
    assert_eq!(
        slot_ids(&itinerary, 0),
        vec!["m900", "r800", "m500", "r300", "m100"]
    );

    let day_one = &itinerary.days[0].activities;
    assert!(day_one[0].must_see);
    assert!(day_one[1].must_see);
    assert!(day_one[2..].iter().all(|a| !a.must_see));

    let labels: Vec<&str> = day_one.iter().map(|a| a.time.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "morning",
            "late morning",
            "afternoon",
            "late afternoon",
            "evening"
        ]
    );
}

#[actix_rt::test]
async fn test_pool_exhaustion_short_circuits_trailing_days() {
    let engine = ItineraryEngine::new(Some(FixedLookup(10)));
    let raw: Vec<Place> = (0..7)
        .map(|i| place(&format!("m{}", i), 4.0, 100 - i, &["museum"]))
        .collect();

    let itinerary = engine
        .plan(
            date("2025-06-01"),
            date("2025-06-03"),
            &CategorySelection::All,
            raw,
        )
        .await
        .unwrap();

    // 7 places fill day 1 (5 slots) and day 2 (2 slots); day 3 never happens.
    assert_eq!(itinerary.days.len(), 2);
    assert_eq!(itinerary.days[0].activities.len(), 5);
    assert_eq!(itinerary.days[1].activities.len(), 2);
    assert_eq!(itinerary.days[0].date, date("2025-06-01"));
    assert_eq!(itinerary.days[1].date, date("2025-06-02"));
}

#[actix_rt::test]
async fn test_no_place_repeats_across_the_trip() {
    let engine = ItineraryEngine::new(Some(FixedLookup(10)));
    let mut raw = Vec::new();
    for i in 0..8 {
        raw.push(place(&format!("m{}", i), 4.0, 200 - i, &["museum"]));
        // Every place submitted twice
        raw.push(place(&format!("m{}", i), 4.0, 200 - i, &["museum"]));
    }

    let itinerary = engine
        .plan(
            date("2025-06-01"),
            date("2025-06-04"),
            &CategorySelection::All,
            raw,
        )
        .await
        .unwrap();

    let mut seen = std::collections::HashSet::new();
    for day in &itinerary.days {
        for activity in &day.activities {
            assert!(
                seen.insert(activity.place_id.clone()),
                "place {} scheduled more than once",
                activity.place_id
            );
        }
    }
    assert_eq!(seen.len(), 8);
}

#[actix_rt::test]
async fn test_per_category_cap_bounds_the_whole_trip() {
    let engine = ItineraryEngine::new(Some(FixedLookup(10)));
    let raw: Vec<Place> = (0..25)
        .map(|i| place(&format!("m{}", i), 4.0, 500 - i, &["museum"]))
        .collect();

    let itinerary = engine
        .plan(
            date("2025-06-01"),
            date("2025-06-05"),
            &CategorySelection::All,
            raw,
        )
        .await
        .unwrap();

    let total: usize = itinerary.days.iter().map(|d| d.activities.len()).sum();
    assert_eq!(total, 10);
    assert_eq!(itinerary.days.len(), 2);
}

#[actix_rt::test]
async fn test_empty_pool_is_a_distinct_error() {
    let engine = ItineraryEngine::new(Some(FixedLookup(10)));

    let err = engine
        .plan(
            date("2025-06-01"),
            date("2025-06-02"),
            &CategorySelection::All,
            Vec::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::NoPlacesFound));

    // Places that only carry excluded or unknown tags count as empty too
    let raw = vec![
        place("h1", 4.9, 9000, &["lodging", "tourist_attraction"]),
        place("c1", 4.5, 100, &["casino"]),
    ];
    let err = engine
        .plan(
            date("2025-06-01"),
            date("2025-06-02"),
            &CategorySelection::All,
            raw,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::NoPlacesFound));
}

#[actix_rt::test]
async fn test_inverted_date_range_is_a_validation_error() {
    let engine = ItineraryEngine::new(Some(FixedLookup(10)));
    let raw = vec![place("m1", 4.0, 100, &["museum"])];

    let err = engine
        .plan(
            date("2025-06-05"),
            date("2025-06-01"),
            &CategorySelection::All,
            raw,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::Validation(_)));
}

// ============================================================================
// Travel stitching
// ============================================================================

#[actix_rt::test]
async fn test_failing_lookup_falls_back_to_fixed_minutes() {
    let engine = ItineraryEngine::new(Some(FailingLookup));
    let raw = vec![
        place("m1", 4.5, 200, &["museum"]),
        place("s1", 4.8, 500, &["tourist_attraction"]),
        place("r1", 4.2, 300, &["restaurant"]),
        place("p1", 4.0, 100, &["park"]),
    ];

    let itinerary = engine
        .plan(
            date("2025-06-01"),
            date("2025-06-01"),
            &CategorySelection::All,
            raw,
        )
        .await
        .unwrap();

    let day = &itinerary.days[0].activities;
    assert_eq!(day.len(), 4);
    for activity in &day[..day.len() - 1] {
        assert_eq!(activity.travel_minutes_to_next, 15);
    }
    assert_eq!(day.last().unwrap().travel_minutes_to_next, 0);
}

#[actix_rt::test]
async fn test_missing_distance_service_uses_fallback() {
    let engine: ItineraryEngine<FixedLookup> = ItineraryEngine::new(None);
    let raw = vec![
        place("m1", 4.5, 200, &["museum"]),
        place("r1", 4.2, 300, &["restaurant"]),
    ];

    let itinerary = engine
        .plan(
            date("2025-06-01"),
            date("2025-06-01"),
            &CategorySelection::All,
            raw,
        )
        .await
        .unwrap();

    let day = &itinerary.days[0].activities;
    assert_eq!(day[0].travel_minutes_to_next, 15);
    assert_eq!(day[1].travel_minutes_to_next, 0);
}

#[actix_rt::test]
async fn test_lookup_minutes_reach_the_slots() {
    let engine = ItineraryEngine::new(Some(FixedLookup(12)));
    let raw = vec![
        place("m1", 4.5, 200, &["museum"]),
        place("r1", 4.2, 300, &["restaurant"]),
        place("p1", 4.0, 100, &["park"]),
    ];

    let itinerary = engine
        .plan(
            date("2025-06-01"),
            date("2025-06-01"),
            &CategorySelection::All,
            raw,
        )
        .await
        .unwrap();

    let day = &itinerary.days[0].activities;
    assert_eq!(day[0].travel_minutes_to_next, 12);
    assert_eq!(day[1].travel_minutes_to_next, 12);
    assert_eq!(day[2].travel_minutes_to_next, 0);
}

#[actix_rt::test]
async fn test_single_place_single_day() {
    let engine = ItineraryEngine::new(Some(FixedLookup(10)));
    let raw = vec![place("m1", 4.5, 200, &["museum"])];

    let itinerary = engine
        .plan(
            date("2025-06-01"),
            date("2025-06-01"),
            &CategorySelection::All,
            raw,
        )
        .await
        .unwrap();

    assert_eq!(itinerary.days.len(), 1);
    let day = &itinerary.days[0].activities;
    assert_eq!(day.len(), 1);
    assert_eq!(day[0].travel_minutes_to_next, 0);
    assert_eq!(day[0].duration_minutes, 120);
    assert_eq!(day[0].time, "morning");
    assert!(day[0].must_see);
}

// ============================================================================
// Output shape
// ============================================================================

#[actix_rt::test]
async fn test_plan_is_deterministic_for_fixed_inputs() {
    let engine = ItineraryEngine::new(Some(FixedLookup(7)));
    let raw = vec![
        place("m1", 4.5, 200, &["museum"]),
        place("s1", 4.8, 500, &["tourist_attraction"]),
        place("r1", 4.2, 300, &["restaurant"]),
        place("p1", 4.0, 100, &["park"]),
        place("r2", 3.9, 80, &["cafe"]),
        place("m2", 3.7, 60, &["art_gallery"]),
    ];

    let first = engine
        .plan(
            date("2025-06-01"),
            date("2025-06-03"),
            &CategorySelection::All,
            raw.clone(),
        )
        .await
        .unwrap();
    let second = engine
        .plan(
            date("2025-06-01"),
            date("2025-06-03"),
            &CategorySelection::All,
            raw,
        )
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

#[actix_rt::test]
async fn test_wire_shape_of_a_slot() {
    let engine = ItineraryEngine::new(Some(FixedLookup(10)));
    let mut starred = place("m1", 4.5, 200, &["museum"]);
    starred.photo = Some("https://example.com/photo.jpg".to_string());
    starred.name = "Grand Museum".to_string();

    let itinerary = engine
        .plan(
            date("2025-06-01"),
            date("2025-06-01"),
            &CategorySelection::All,
            vec![starred],
        )
        .await
        .unwrap();

    let value = serde_json::to_value(&itinerary).unwrap();
    assert_eq!(value["days"][0]["date"], "2025-06-01");
    let slot = &value["days"][0]["activities"][0];
    assert_eq!(slot["name"], "Grand Museum");
    assert_eq!(slot["place_name"], "Grand Museum");
    assert_eq!(slot["place_id"], "m1");
    assert_eq!(slot["description"], "Visit Grand Museum");
    assert_eq!(slot["duration_minutes"], 120);
    assert_eq!(slot["travel_minutes_to_next"], 0);
    assert_eq!(slot["photo"], "https://example.com/photo.jpg");
    assert_eq!(slot["must_see"], true);
    let map_url = slot["map_url"].as_str().unwrap();
    assert!(map_url.contains("query_place_id=m1"));
    assert!(map_url.contains("query=Grand+Museum"));

    assert_eq!(value["tips"].as_array().unwrap().len(), 3);
}
