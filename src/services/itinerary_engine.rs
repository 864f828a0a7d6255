//! Itinerary Allocation Engine
//!
//! Turns a raw list of candidate places plus a trip date range into a
//! day-by-day activity plan. The engine is function-shaped: it receives
//! already-fetched places and a travel-time lookup collaborator, performs no
//! network calls of its own, and produces the same output for the same inputs.
//!
//! ## Allocation outline
//! - Deduplicate, filter to the requested categories, cap per category and
//!   globally.
//! - Day 1 gets the top-scoring museum, sightseeing and restaurant picks
//!   (marked must-see), then fills the remaining slots round-robin.
//! - Later days fill round-robin across categories until the pool runs out.
//! - Travel minutes between consecutive stops come from the lookup
//!   collaborator; a failed lookup falls back to a fixed estimate.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate};
use futures::future::join_all;
use thiserror::Error;

use crate::models::itinerary::{ActivitySlot, CategorySelection, DayPlan, Itinerary};
use crate::models::place::Place;
use crate::services::distance_service::{TravelMode, TravelTimeLookup};

const MAX_ACTIVITIES_PER_DAY: usize = 5;
const MAX_PLACES_PER_CATEGORY: usize = 10;
const MAX_TOTAL_PLACES: usize = 50;
const FALLBACK_TRAVEL_MINUTES: u32 = 15;

/// User-facing category -> catalog type tags.
const CATEGORY_MAP: &[(&str, &[&str])] = &[
    ("restaurant", &["restaurant", "cafe"]),
    ("museum", &["museum", "art_gallery"]),
    ("sightseeing", &["tourist_attraction"]),
    ("park", &["park"]),
];

/// Types that are never scheduled, regardless of the selected categories.
const EXCLUDED_TYPES: &[&str] = &["lodging", "hotel", "resort", "campground"];

/// Flagship categories guaranteed a day-1 slot, in this order.
const FLAGSHIP_CATEGORIES: &[&[&str]] = &[
    &["museum", "art_gallery"],
    &["tourist_attraction"],
    &["restaurant", "cafe"],
];

/// Slot labels are positional: index 0 is always "morning" no matter how many
/// stops the day ends up with.
const SLOT_LABELS: [&str; 5] = [
    "morning",
    "late morning",
    "afternoon",
    "late afternoon",
    "evening",
];

const TRIP_TIPS: &[&str] = &[
    "Book tickets early for popular attractions",
    "Check opening hours for each location",
    "Plan some buffer time for travel between locations",
];

#[derive(Debug, Error)]
pub enum PlanError {
    /// Malformed planning input; surfaced to the caller, no partial result.
    #[error("{0}")]
    Validation(String),
    /// The filtered pool came up empty for the requested categories.
    #[error("No places found for selected categories")]
    NoPlacesFound,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub max_activities_per_day: usize,
    pub max_places_per_category: usize,
    pub max_total_places: usize,
    pub fallback_travel_minutes: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_activities_per_day: MAX_ACTIVITIES_PER_DAY,
            max_places_per_category: MAX_PLACES_PER_CATEGORY,
            max_total_places: MAX_TOTAL_PLACES,
            fallback_travel_minutes: FALLBACK_TRAVEL_MINUTES,
        }
    }
}

/// Popularity score: rating x review count, missing values as 0.
///
/// No normalization, so huge review counts dominate modest ratings. That bias
/// toward well-known places over highly-rated-but-obscure ones is intended.
pub fn score_place(place: &Place) -> f64 {
    place.rating.unwrap_or(0.0) * place.user_ratings_total.unwrap_or(0) as f64
}

/// Fixed visit duration in minutes, by tag precedence (first match wins).
pub fn assign_duration(place: &Place) -> u32 {
    if place.has_type("museum") || place.has_type("art_gallery") {
        120
    } else if place.has_type("park") || place.has_type("natural_feature") {
        90
    } else if place.has_type("restaurant") || place.has_type("cafe") {
        75
    } else {
        90
    }
}

/// The first tag in the place's own tag list that the taxonomy knows about.
///
/// Attribution for multi-tagged places follows the place's tag order, not the
/// taxonomy's. A documented policy choice, kept for output compatibility.
pub fn primary_tag(place: &Place) -> Option<&str> {
    place
        .types
        .iter()
        .find(|t| CATEGORY_MAP.iter().any(|(_, tags)| tags.contains(&t.as_str())))
        .map(String::as_str)
}

fn allowed_types(selection: &CategorySelection) -> Vec<&'static str> {
    match selection {
        CategorySelection::All => CATEGORY_MAP
            .iter()
            .flat_map(|(_, tags)| tags.iter().copied())
            .collect(),
        CategorySelection::Selected(categories) => categories
            .iter()
            .filter_map(|c| CATEGORY_MAP.iter().find(|(name, _)| *name == c.as_str()))
            .flat_map(|(_, tags)| tags.iter().copied())
            .collect(),
    }
}

/// Inclusive list of calendar dates covering the trip, always at least one.
pub fn expand_trip_dates(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let day_count = (end - start).num_days().max(0) + 1;
    (0..day_count).map(|i| start + Duration::days(i)).collect()
}

/// Drops repeated place ids, keeping the first occurrence.
pub fn dedup_places(places: Vec<Place>) -> Vec<Place> {
    let mut seen = HashSet::new();
    places
        .into_iter()
        .filter(|p| seen.insert(p.place_id.clone()))
        .collect()
}

/// Keeps places matching the selected categories and none of the excluded
/// types, sorted descending by score. The sort is stable, so ties keep their
/// original relative order.
pub fn filter_by_categories(places: Vec<Place>, selection: &CategorySelection) -> Vec<Place> {
    let allowed = allowed_types(selection);
    let mut kept: Vec<Place> = places
        .into_iter()
        .filter(|p| p.types.iter().any(|t| allowed.contains(&t.as_str())))
        .filter(|p| !p.types.iter().any(|t| EXCLUDED_TYPES.contains(&t.as_str())))
        .collect();
    kept.sort_by(|a, b| {
        score_place(b)
            .partial_cmp(&score_place(a))
            .unwrap_or(Ordering::Equal)
    });
    kept
}

/// Caps how many places survive per primary tag to bound the pool size.
///
/// The input is already score-sorted, so one forward pass keeps the
/// highest-scoring places of each category. Places with no recognizable
/// primary tag are dropped.
pub fn limit_per_category(places: Vec<Place>, max_per_category: usize) -> Vec<Place> {
    let mut kept = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    for place in places {
        let Some(tag) = primary_tag(&place).map(str::to_string) else {
            continue;
        };
        let count = seen.entry(tag).or_insert(0);
        if *count < max_per_category {
            *count += 1;
            kept.push(place);
        }
    }
    kept
}

/// Pulls the single top-scoring place for each flagship category out of the
/// pool, marking it must-see. A category with no match contributes nothing.
pub fn pick_must_see(pool: &mut Vec<Place>) -> Vec<Place> {
    let mut must_see = Vec::new();
    for tags in FLAGSHIP_CATEGORIES {
        let mut best: Option<(usize, f64)> = None;
        for (idx, place) in pool.iter().enumerate() {
            if !place.has_any_type(tags) {
                continue;
            }
            let score = score_place(place);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((idx, score));
            }
        }
        if let Some((idx, _)) = best {
            let mut place = pool.remove(idx);
            place.must_see = true;
            must_see.push(place);
        }
    }
    must_see
}

/// Takes up to `count` places from the pool, round-robining across primary
/// tags for variety: one pick per non-empty category group per round, groups
/// in first-appearance order, each group sorted descending by score.
pub fn pick_mixed(pool: &mut Vec<Place>, count: usize) -> Vec<Place> {
    if count == 0 {
        return Vec::new();
    }

    let mut groups: Vec<(String, Vec<Place>)> = Vec::new();
    for place in pool.iter() {
        let Some(tag) = primary_tag(place) else {
            continue;
        };
        match groups.iter_mut().find(|(t, _)| t == tag) {
            Some((_, group)) => group.push(place.clone()),
            None => groups.push((tag.to_string(), vec![place.clone()])),
        }
    }

    for (_, group) in groups.iter_mut() {
        group.sort_by(|a, b| {
            score_place(b)
                .partial_cmp(&score_place(a))
                .unwrap_or(Ordering::Equal)
        });
    }

    let mut picked: Vec<Place> = Vec::new();
    while picked.len() < count && groups.iter().any(|(_, g)| !g.is_empty()) {
        for (_, group) in groups.iter_mut() {
            if picked.len() == count {
                break;
            }
            if !group.is_empty() {
                picked.push(group.remove(0));
            }
        }
    }

    pool.retain(|p| !picked.iter().any(|q| q.place_id == p.place_id));
    picked
}

#[derive(Clone)]
pub struct ItineraryEngine<L> {
    config: EngineConfig,
    travel: Option<L>,
}

impl<L: TravelTimeLookup> ItineraryEngine<L> {
    pub fn new(travel: Option<L>) -> Self {
        Self {
            config: EngineConfig::default(),
            travel,
        }
    }

    pub fn with_config(travel: Option<L>, config: EngineConfig) -> Self {
        Self { config, travel }
    }

    /// Builds the full itinerary from a raw place list and a trip date range.
    ///
    /// The pool of not-yet-scheduled places is owned by this single pass and
    /// shrinks as days are filled, so a place is scheduled at most once across
    /// the whole trip.
    pub async fn plan(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        selection: &CategorySelection,
        places: Vec<Place>,
    ) -> Result<Itinerary, PlanError> {
        if end < start {
            return Err(PlanError::Validation(
                "endDate must not be before startDate".to_string(),
            ));
        }
        let dates = expand_trip_dates(start, end);

        let mut pool = dedup_places(places);
        pool = filter_by_categories(pool, selection);
        pool = limit_per_category(pool, self.config.max_places_per_category);
        pool.truncate(self.config.max_total_places);

        if pool.is_empty() {
            return Err(PlanError::NoPlacesFound);
        }

        let mut days = Vec::new();

        // Day 1: must-sees first, then filler. Must-sees keep the leading
        // slots; the concatenation is not re-sorted.
        let mut day_one = pick_must_see(&mut pool);
        let open_slots = self
            .config
            .max_activities_per_day
            .saturating_sub(day_one.len());
        day_one.extend(pick_mixed(&mut pool, open_slots));
        days.push(self.make_day(day_one, dates[0]).await);

        for date in dates.iter().skip(1) {
            if pool.is_empty() {
                break;
            }
            let day_places = pick_mixed(&mut pool, self.config.max_activities_per_day);
            if day_places.is_empty() {
                break;
            }
            days.push(self.make_day(day_places, *date).await);
        }

        Ok(Itinerary {
            days,
            tips: TRIP_TIPS.iter().map(|t| (*t).to_string()).collect(),
        })
    }

    /// Materializes one day's slots, stitching in travel minutes between
    /// consecutive stops.
    async fn make_day(&self, places: Vec<Place>, date: NaiveDate) -> DayPlan {
        let travel = self.travel_minutes_between(&places).await;

        let activities = places
            .iter()
            .enumerate()
            .map(|(idx, place)| ActivitySlot {
                time: SLOT_LABELS[idx.min(SLOT_LABELS.len() - 1)].to_string(),
                name: place.name.clone(),
                place_name: place.name.clone(),
                place_id: place.place_id.clone(),
                description: format!("Visit {}", place.name),
                duration_minutes: assign_duration(place),
                travel_minutes_to_next: travel.get(idx).copied().unwrap_or(0),
                map_url: map_search_url(place),
                photo: place.photo.clone(),
                must_see: place.must_see,
            })
            .collect();

        DayPlan { date, activities }
    }

    /// Travel minutes for each consecutive pair. All pair lookups for the day
    /// are issued together and awaited as a batch; a failed lookup falls back
    /// to the fixed estimate and never aborts the plan.
    async fn travel_minutes_between(&self, places: &[Place]) -> Vec<u32> {
        if places.len() < 2 {
            return Vec::new();
        }

        let Some(travel) = &self.travel else {
            return vec![self.config.fallback_travel_minutes; places.len() - 1];
        };

        let lookups = places.windows(2).map(|pair| async move {
            travel
                .travel_minutes(&pair[0], &pair[1], TravelMode::Walking)
                .await
        });

        join_all(lookups)
            .await
            .into_iter()
            .map(|result| match result {
                Ok(minutes) => minutes,
                Err(err) => {
                    eprintln!("Travel time lookup failed: {}. Using fallback.", err);
                    self.config.fallback_travel_minutes
                }
            })
            .collect()
    }
}

fn map_search_url(place: &Place) -> String {
    let query: String = url::form_urlencoded::byte_serialize(place.name.as_bytes()).collect();
    format!(
        "https://www.google.com/maps/search/?api=1&query={}&query_place_id={}",
        query, place.place_id
    )
}
