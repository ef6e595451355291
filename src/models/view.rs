use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Peak;

/// One row per peak, enriched with the facts derived from its routes and
/// their ascents (aggregate mode).
#[derive(Debug, Clone, PartialEq)]
pub struct PeakView {
    pub peak: Peak,
    pub anzahl_routen: usize,
    pub peak_has_star: bool,
    /// Best ascent rating on the peak. `None` means no ascent carries a
    /// rating; callers that need a number use [`PeakView::rating_or_zero`].
    pub max_bewertung: Option<i64>,
    pub has_done_route: bool,
    pub kommentar: String,
}

impl PeakView {
    pub fn rating_or_zero(&self) -> i64 {
        self.max_bewertung.unwrap_or(0)
    }
}

/// One row per logged climb, joined through its route to its peak
/// (expand mode).
#[derive(Debug, Clone, PartialEq)]
pub struct AscentView {
    pub ascent_id: i64,
    pub route_id: i64,
    pub peak_id: i64,
    pub route_name: String,
    pub gipfel: String,
    pub gebiet: String,
    pub hoehe: f64,
    pub lat: f64,
    pub lon: f64,
    pub anzahl_routen: usize,
    /// Climber re-rating when present, otherwise the route rating.
    pub bewertung: Option<i64>,
    pub stern: bool,
    pub kommentar: String,
    pub date: Option<NaiveDate>,
}

/// Accessors shared by the aggregate and expand views, so the filter,
/// sanitizer and marker stages run over either.
pub trait ViewRow {
    fn name(&self) -> &str;
    /// Route name for per-climb rows; empty for aggregated peak rows.
    fn route_name(&self) -> &str;
    fn gebiet(&self) -> &str;
    fn hoehe(&self) -> f64;
    fn lat(&self) -> f64;
    fn lon(&self) -> f64;
    fn rating(&self) -> Option<i64>;
    fn has_star(&self) -> bool;
    fn climbed(&self) -> bool;
    fn route_count(&self) -> usize;
    fn kommentar(&self) -> &str;
    fn date(&self) -> Option<NaiveDate>;
}

impl ViewRow for PeakView {
    fn name(&self) -> &str {
        &self.peak.gipfel
    }
    fn route_name(&self) -> &str {
        ""
    }
    fn gebiet(&self) -> &str {
        &self.peak.gebiet
    }
    fn hoehe(&self) -> f64 {
        self.peak.hoehe
    }
    fn lat(&self) -> f64 {
        self.peak.lat
    }
    fn lon(&self) -> f64 {
        self.peak.lon
    }
    fn rating(&self) -> Option<i64> {
        self.max_bewertung
    }
    fn has_star(&self) -> bool {
        self.peak_has_star
    }
    fn climbed(&self) -> bool {
        self.has_done_route
    }
    fn route_count(&self) -> usize {
        self.anzahl_routen
    }
    fn kommentar(&self) -> &str {
        &self.kommentar
    }
    fn date(&self) -> Option<NaiveDate> {
        None
    }
}

impl ViewRow for AscentView {
    fn name(&self) -> &str {
        &self.gipfel
    }
    fn route_name(&self) -> &str {
        &self.route_name
    }
    fn gebiet(&self) -> &str {
        &self.gebiet
    }
    fn hoehe(&self) -> f64 {
        self.hoehe
    }
    fn lat(&self) -> f64 {
        self.lat
    }
    fn lon(&self) -> f64 {
        self.lon
    }
    fn rating(&self) -> Option<i64> {
        self.bewertung
    }
    fn has_star(&self) -> bool {
        self.stern
    }
    fn climbed(&self) -> bool {
        true
    }
    fn route_count(&self) -> usize {
        self.anzahl_routen
    }
    fn kommentar(&self) -> &str {
        &self.kommentar
    }
    fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

/// Area selection: a concrete area name, or the "all areas" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AreaFilter {
    #[default]
    All,
    Only(String),
}

impl From<String> for AreaFilter {
    fn from(s: String) -> Self {
        if s == "All" || s.is_empty() {
            AreaFilter::All
        } else {
            AreaFilter::Only(s)
        }
    }
}

impl From<AreaFilter> for String {
    fn from(f: AreaFilter) -> String {
        match f {
            AreaFilter::All => "All".to_string(),
            AreaFilter::Only(area) => area,
        }
    }
}

impl AreaFilter {
    pub fn label(&self) -> &str {
        match self {
            AreaFilter::All => "All",
            AreaFilter::Only(area) => area,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifficultyFilter {
    #[default]
    All,
    Easy,
    Okay,
    Hard,
}

impl DifficultyFilter {
    /// Rating level this label stands for, `None` for the sentinel.
    pub fn level(&self) -> Option<i64> {
        match self {
            DifficultyFilter::All => None,
            DifficultyFilter::Easy => Some(1),
            DifficultyFilter::Okay => Some(2),
            DifficultyFilter::Hard => Some(3),
        }
    }

    pub fn cycle(&self) -> Self {
        match self {
            DifficultyFilter::All => DifficultyFilter::Easy,
            DifficultyFilter::Easy => DifficultyFilter::Okay,
            DifficultyFilter::Okay => DifficultyFilter::Hard,
            DifficultyFilter::Hard => DifficultyFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DifficultyFilter::All => "All",
            DifficultyFilter::Easy => "Easy",
            DifficultyFilter::Okay => "Okay",
            DifficultyFilter::Hard => "Hard",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StarFilter {
    #[default]
    All,
    Has,
    No,
}

impl StarFilter {
    /// Star value a row must carry, `None` for the sentinel.
    pub fn wanted(&self) -> Option<bool> {
        match self {
            StarFilter::All => None,
            StarFilter::Has => Some(true),
            StarFilter::No => Some(false),
        }
    }

    pub fn cycle(&self) -> Self {
        match self {
            StarFilter::All => StarFilter::Has,
            StarFilter::Has => StarFilter::No,
            StarFilter::No => StarFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StarFilter::All => "All",
            StarFilter::Has => "Has Star",
            StarFilter::No => "No Star",
        }
    }
}

/// The user-facing filter configuration. Absent fields deserialize to
/// their "All"/unset defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    pub area: AreaFilter,
    pub difficulty: DifficultyFilter,
    pub star: StarFilter,
    pub max_height: Option<f64>,
    pub climbed_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_options_default_from_empty_object() {
        let options: FilterOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, FilterOptions::default());
        assert_eq!(options.area, AreaFilter::All);
        assert!(!options.climbed_only);
    }

    #[test]
    fn area_filter_roundtrips_sentinel_and_name() {
        let options: FilterOptions =
            serde_json::from_str(r#"{"area": "Rathen", "difficulty": "Hard"}"#).unwrap();
        assert_eq!(options.area, AreaFilter::Only("Rathen".to_string()));
        assert_eq!(options.difficulty.level(), Some(3));

        let all: AreaFilter = serde_json::from_str(r#""All""#).unwrap();
        assert_eq!(all, AreaFilter::All);
    }

    #[test]
    fn star_filter_cycles_through_all_three_states() {
        let f = StarFilter::All;
        assert_eq!(f.cycle(), StarFilter::Has);
        assert_eq!(f.cycle().cycle(), StarFilter::No);
        assert_eq!(f.cycle().cycle().cycle(), StarFilter::All);
    }
}
