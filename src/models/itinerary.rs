use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The categories a planning request asked for, or the "ALL" sentinel.
///
/// Never empty: an absent, empty, or "ALL"-containing list collapses to `All`,
/// which expands to the full taxonomy at filter time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategorySelection {
    All,
    Selected(Vec<String>),
}

impl CategorySelection {
    pub fn from_request(categories: Option<Vec<String>>) -> Self {
        match categories {
            Some(cats) if !cats.is_empty() && !cats.iter().any(|c| c == "ALL") => {
                CategorySelection::Selected(cats)
            }
            _ => CategorySelection::All,
        }
    }
}

/// One scheduled stop within a day, in wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySlot {
    pub time: String,
    pub name: String,
    pub place_name: String,
    pub place_id: String,
    pub description: String,
    pub duration_minutes: u32,
    pub travel_minutes_to_next: u32,
    pub map_url: String,
    pub photo: Option<String>,
    pub must_see: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub activities: Vec<ActivitySlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub days: Vec<DayPlan>,
    pub tips: Vec<String>,
}
