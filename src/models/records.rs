use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A named climbable summit. Read-only here; created and edited in the
/// hosted store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub peak_id: i64,
    pub gipfel: String,
    pub gebiet: String,
    pub hoehe: f64,
    pub lat: f64,
    pub lon: f64,
}

/// A climbing path up a peak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub route_id: i64,
    pub peak_id: i64,
    pub name: String,
    pub bewertung: i64,
    pub stern: bool,
}

/// A logged climb of a route. The climber may re-rate the route and leave
/// a comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ascent {
    pub ascent_id: i64,
    pub route_id: i64,
    pub date: Option<NaiveDate>,
    pub bewertung: Option<i64>,
    pub kommentar: Option<String>,
}
