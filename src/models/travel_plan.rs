use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Center point the itinerary is planned around.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LocationRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Walking,
    Driving,
    Transit,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Walking => "walking",
            TravelMode::Driving => "driving",
            TravelMode::Transit => "transit",
        }
    }
}

/// Trip length, in either of the two request shapes clients send: an explicit
/// date range, or a bare day count.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum TripDuration {
    DateRange {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    Days {
        travel_days: u32,
    },
}

impl TripDuration {
    /// Number of trip days implied by the request. A date range is inclusive,
    /// so a same-day trip counts as 1. May be zero or negative for
    /// inverted ranges; the travel service rejects those.
    pub fn day_count(&self) -> i64 {
        match self {
            TripDuration::Days { travel_days } => *travel_days as i64,
            TripDuration::DateRange {
                start_date,
                end_date,
            } => (*end_date - *start_date).num_days() + 1,
        }
    }
}

/// A point of interest the user already picked before asking for a plan.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScenicSpot {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TravelPlanRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub center_location: LocationRequest,
    #[serde(flatten)]
    pub duration: TripDuration,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenic_spots: Vec<ScenicSpot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferences: Vec<String>,
    #[serde(default)]
    pub travel_mode: TravelMode,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PointOfInterest {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_duration: Option<String>,
}

/// How a day is labelled in the response: an absolute date when the request
/// carried a date range, a 1-based index when it carried a day count.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum DayLabel {
    Date { date: NaiveDate },
    Index { day: u32 },
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DailyPlan {
    #[serde(flatten)]
    pub day: DayLabel,
    pub description: String,
    pub poi_list: Vec<PointOfInterest>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TravelPlanResponse {
    pub plan_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub center_location: LocationRequest,
    #[serde(flatten)]
    pub duration: TripDuration,
    pub travel_mode: TravelMode,
    pub overview: String,
    pub daily_plans: Vec<DailyPlan>,
}
