use crate::models::{FilterOptions, ViewRow};

use super::schema::ColumnPresence;
use super::JoinMode;

/// The column a predicate reads. Used to skip predicates whose backing
/// column never arrived from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Gebiet,
    Rating,
    Stern,
    Hoehe,
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Area(String),
    Difficulty(i64),
    Star(bool),
    MaxHeight(f64),
    ClimbedOnly,
}

impl Predicate {
    pub fn required_column(&self) -> Column {
        match self {
            Predicate::Area(_) => Column::Gebiet,
            Predicate::Difficulty(_) => Column::Rating,
            Predicate::Star(_) => Column::Stern,
            Predicate::MaxHeight(_) => Column::Hoehe,
            Predicate::ClimbedOnly => Column::Done,
        }
    }

    fn matches<R: ViewRow>(&self, row: &R) -> bool {
        match self {
            Predicate::Area(area) => row.gebiet() == area,
            Predicate::Difficulty(level) => row.rating() == Some(*level),
            Predicate::Star(wanted) => row.has_star() == *wanted,
            // Inclusive upper bound
            Predicate::MaxHeight(max) => row.hoehe() <= *max,
            Predicate::ClimbedOnly => row.climbed(),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Predicate::Area(_) => "area",
            Predicate::Difficulty(_) => "difficulty",
            Predicate::Star(_) => "star",
            Predicate::MaxHeight(_) => "max_height",
            Predicate::ClimbedOnly => "climbed_only",
        }
    }
}

/// Which predicate columns the current snapshot supports, resolved per
/// join mode: the rating column differs between aggregate and expand
/// views, and the climbed flag is derived so it is always available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSupport {
    gebiet: bool,
    rating: bool,
    stern: bool,
    hoehe: bool,
}

impl ColumnSupport {
    pub fn for_mode(mode: JoinMode, presence: &ColumnPresence) -> Self {
        ColumnSupport {
            gebiet: presence.gebiet,
            rating: match mode {
                JoinMode::Aggregate => presence.ascent_bewertung,
                JoinMode::Expand => presence.ascent_bewertung || presence.route_bewertung,
            },
            stern: presence.route_stern,
            hoehe: presence.hoehe,
        }
    }

    fn has(&self, column: Column) -> bool {
        match column {
            Column::Gebiet => self.gebiet,
            Column::Rating => self.rating,
            Column::Stern => self.stern,
            Column::Hoehe => self.hoehe,
            Column::Done => true,
        }
    }
}

impl FilterOptions {
    /// Compiles the user selection into the ordered predicate list.
    /// Sentinel selections ("All", unset height, climbed-only off) emit
    /// no predicate at all.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let crate::models::AreaFilter::Only(area) = &self.area {
            predicates.push(Predicate::Area(area.clone()));
        }
        if let Some(level) = self.difficulty.level() {
            predicates.push(Predicate::Difficulty(level));
        }
        if let Some(wanted) = self.star.wanted() {
            predicates.push(Predicate::Star(wanted));
        }
        if let Some(max) = self.max_height {
            predicates.push(Predicate::MaxHeight(max));
        }
        if self.climbed_only {
            predicates.push(Predicate::ClimbedOnly);
        }
        predicates
    }
}

/// Applies the predicates in order, AND-composed. A predicate whose
/// column is unsupported is skipped whole: it never removes rows and
/// never errors, so schema drift degrades to "filter does nothing".
pub fn apply<R: ViewRow>(
    mut rows: Vec<R>,
    predicates: &[Predicate],
    support: &ColumnSupport,
) -> Vec<R> {
    for predicate in predicates {
        if !support.has(predicate.required_column()) {
            tracing::warn!(
                predicate = predicate.describe(),
                "predicate skipped, backing column absent from source"
            );
            continue;
        }
        rows.retain(|row| predicate.matches(row));
        tracing::debug!(
            predicate = predicate.describe(),
            remaining = rows.len(),
            "predicate applied"
        );
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AreaFilter, DifficultyFilter, Peak, PeakView, StarFilter};

    fn view(name: &str, gebiet: &str, hoehe: f64, star: bool, done: bool) -> PeakView {
        PeakView {
            peak: Peak {
                peak_id: 1,
                gipfel: name.to_string(),
                gebiet: gebiet.to_string(),
                hoehe,
                lat: 50.9,
                lon: 14.0,
            },
            anzahl_routen: 1,
            peak_has_star: star,
            max_bewertung: Some(2),
            has_done_route: done,
            kommentar: String::new(),
        }
    }

    fn names(rows: &[PeakView]) -> Vec<&str> {
        rows.iter().map(|r| r.peak.gipfel.as_str()).collect()
    }

    fn full() -> ColumnSupport {
        ColumnSupport {
            gebiet: true,
            rating: true,
            stern: true,
            hoehe: true,
        }
    }

    #[test]
    fn sentinel_options_compile_to_no_predicates() {
        assert!(FilterOptions::default().predicates().is_empty());
    }

    #[test]
    fn predicates_and_compose() {
        let rows = vec![
            view("A", "X", 20.0, true, false),
            view("B", "X", 30.0, false, false),
            view("C", "Y", 20.0, true, false),
        ];
        let options = FilterOptions {
            area: AreaFilter::Only("X".to_string()),
            star: StarFilter::Has,
            ..FilterOptions::default()
        };
        let rows = apply(rows, &options.predicates(), &full());
        assert_eq!(names(&rows), vec!["A"]);
    }

    #[test]
    fn predicate_order_does_not_change_the_result() {
        let rows = vec![
            view("A", "X", 20.0, true, false),
            view("B", "X", 30.0, false, false),
            view("C", "Y", 20.0, true, false),
        ];
        let forward = vec![
            Predicate::Area("X".to_string()),
            Predicate::Star(true),
        ];
        let backward = vec![
            Predicate::Star(true),
            Predicate::Area("X".to_string()),
        ];
        let a = apply(rows.clone(), &forward, &full());
        let b = apply(rows, &backward, &full());
        assert_eq!(a, b);
    }

    #[test]
    fn height_bound_is_inclusive() {
        let rows = vec![view("A", "X", 30.0, false, false), view("B", "X", 31.0, false, false)];
        let options = FilterOptions {
            max_height: Some(30.0),
            ..FilterOptions::default()
        };
        let rows = apply(rows, &options.predicates(), &full());
        assert_eq!(names(&rows), vec!["A"]);
    }

    #[test]
    fn star_predicate_noops_when_stern_column_is_absent() {
        let rows = vec![
            view("A", "X", 20.0, false, false),
            view("B", "X", 30.0, false, false),
        ];
        let presence = ColumnPresence {
            gebiet: true,
            hoehe: true,
            ..ColumnPresence::default()
        };
        let support = ColumnSupport::for_mode(JoinMode::Aggregate, &presence);
        let options = FilterOptions {
            star: StarFilter::Has,
            ..FilterOptions::default()
        };
        let rows = apply(rows, &options.predicates(), &support);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn difficulty_never_matches_unrated_rows() {
        let mut unrated = view("A", "X", 20.0, false, true);
        unrated.max_bewertung = None;
        let rows = vec![unrated, view("B", "X", 30.0, false, true)];
        let options = FilterOptions {
            difficulty: DifficultyFilter::Okay,
            ..FilterOptions::default()
        };
        let rows = apply(rows, &options.predicates(), &full());
        assert_eq!(names(&rows), vec!["B"]);
    }

    #[test]
    fn climbed_only_keeps_done_rows() {
        let rows = vec![
            view("A", "X", 20.0, false, true),
            view("B", "X", 30.0, false, false),
        ];
        let options = FilterOptions {
            climbed_only: true,
            ..FilterOptions::default()
        };
        let rows = apply(rows, &options.predicates(), &full());
        assert_eq!(names(&rows), vec!["A"]);
    }

    #[test]
    fn expand_mode_rating_support_falls_back_to_route_column() {
        let presence = ColumnPresence {
            route_bewertung: true,
            ..ColumnPresence::default()
        };
        let aggregate = ColumnSupport::for_mode(JoinMode::Aggregate, &presence);
        let expand = ColumnSupport::for_mode(JoinMode::Expand, &presence);
        assert!(!aggregate.has(Column::Rating));
        assert!(expand.has(Column::Rating));
    }
}
