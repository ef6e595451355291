use std::collections::HashMap;

use crate::models::{Ascent, AscentView, Peak, PeakView, Route};

use super::aggregate::aggregate_peak;
use super::schema::Snapshot;

/// Rows silently dropped because a foreign key did not resolve. Reported
/// for diagnostics, never surfaced as an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub orphan_routes: usize,
    pub orphan_ascents: usize,
}

/// Aggregate-mode join: exactly one row per peak, in peak-table order.
/// Peaks without routes are kept with neutral derived values.
pub fn join_aggregate(snapshot: &Snapshot) -> (Vec<PeakView>, JoinStats) {
    let mut stats = JoinStats::default();

    let peak_ids: HashMap<i64, ()> = snapshot.peaks.iter().map(|p| (p.peak_id, ())).collect();

    let mut routes_by_peak: HashMap<i64, Vec<&Route>> = HashMap::new();
    let mut route_to_peak: HashMap<i64, i64> = HashMap::new();
    for route in &snapshot.routes {
        if !peak_ids.contains_key(&route.peak_id) {
            stats.orphan_routes += 1;
            continue;
        }
        routes_by_peak.entry(route.peak_id).or_default().push(route);
        route_to_peak.insert(route.route_id, route.peak_id);
    }

    // Grouped in ascent-table order so the first-comment tie-break stays
    // stable.
    let mut ascents_by_peak: HashMap<i64, Vec<&Ascent>> = HashMap::new();
    for ascent in &snapshot.ascents {
        match route_to_peak.get(&ascent.route_id) {
            Some(peak_id) => ascents_by_peak.entry(*peak_id).or_default().push(ascent),
            None => stats.orphan_ascents += 1,
        }
    }

    let views = snapshot
        .peaks
        .iter()
        .map(|peak| {
            let routes = routes_by_peak.get(&peak.peak_id).map(Vec::as_slice).unwrap_or(&[]);
            let ascents = ascents_by_peak.get(&peak.peak_id).map(Vec::as_slice).unwrap_or(&[]);
            aggregate_peak(peak, routes, ascents)
        })
        .collect();

    log_stats(&stats);
    (views, stats)
}

/// Expand-mode join: one row per ascent, left-joined through its route to
/// its peak. Ascents whose route or peak cannot be resolved are dropped;
/// filtering and map placement need both.
pub fn join_expand(snapshot: &Snapshot) -> (Vec<AscentView>, JoinStats) {
    let mut stats = JoinStats::default();

    let peaks: HashMap<i64, &Peak> =
        snapshot.peaks.iter().map(|p| (p.peak_id, p)).collect();
    let routes: HashMap<i64, &Route> =
        snapshot.routes.iter().map(|r| (r.route_id, r)).collect();

    let mut routes_per_peak: HashMap<i64, usize> = HashMap::new();
    for route in &snapshot.routes {
        if peaks.contains_key(&route.peak_id) {
            *routes_per_peak.entry(route.peak_id).or_default() += 1;
        } else {
            stats.orphan_routes += 1;
        }
    }

    let views = snapshot
        .ascents
        .iter()
        .filter_map(|ascent| {
            let Some(route) = routes.get(&ascent.route_id) else {
                stats.orphan_ascents += 1;
                return None;
            };
            let Some(peak) = peaks.get(&route.peak_id) else {
                stats.orphan_ascents += 1;
                return None;
            };
            Some(AscentView {
                ascent_id: ascent.ascent_id,
                route_id: route.route_id,
                peak_id: peak.peak_id,
                route_name: route.name.clone(),
                gipfel: peak.gipfel.clone(),
                gebiet: peak.gebiet.clone(),
                hoehe: peak.hoehe,
                lat: peak.lat,
                lon: peak.lon,
                anzahl_routen: routes_per_peak.get(&peak.peak_id).copied().unwrap_or(0),
                bewertung: ascent.bewertung.or(Some(route.bewertung)),
                stern: route.stern,
                kommentar: ascent.kommentar.clone().unwrap_or_default(),
                date: ascent.date,
            })
        })
        .collect();

    log_stats(&stats);
    (views, stats)
}

fn log_stats(stats: &JoinStats) {
    if stats.orphan_routes > 0 || stats.orphan_ascents > 0 {
        tracing::debug!(
            orphan_routes = stats.orphan_routes,
            orphan_ascents = stats.orphan_ascents,
            "unresolved foreign keys dropped during join"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ascent, Peak, Route};
    use crate::pipeline::schema::ColumnPresence;

    fn snapshot() -> Snapshot {
        Snapshot {
            peaks: vec![
                Peak {
                    peak_id: 1,
                    gipfel: "A".to_string(),
                    gebiet: "X".to_string(),
                    hoehe: 20.0,
                    lat: 50.9,
                    lon: 14.0,
                },
                Peak {
                    peak_id: 2,
                    gipfel: "B".to_string(),
                    gebiet: "Y".to_string(),
                    hoehe: 40.0,
                    lat: 50.8,
                    lon: 14.1,
                },
            ],
            routes: vec![
                Route {
                    route_id: 10,
                    peak_id: 1,
                    name: "Alter weg".to_string(),
                    bewertung: 2,
                    stern: true,
                },
                // References a peak that does not exist
                Route {
                    route_id: 11,
                    peak_id: 99,
                    name: String::new(),
                    bewertung: 1,
                    stern: false,
                },
            ],
            ascents: vec![
                Ascent {
                    ascent_id: 100,
                    route_id: 10,
                    date: None,
                    bewertung: Some(3),
                    kommentar: Some("Great climb".to_string()),
                },
                // References a route that does not exist
                Ascent {
                    ascent_id: 101,
                    route_id: 98,
                    date: None,
                    bewertung: None,
                    kommentar: None,
                },
            ],
            presence: ColumnPresence::default(),
        }
    }

    #[test]
    fn aggregate_keeps_one_row_per_peak_in_order() {
        let (views, stats) = join_aggregate(&snapshot());
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].peak.peak_id, 1);
        assert_eq!(views[1].peak.peak_id, 2);
        assert_eq!(stats.orphan_routes, 1);
        assert_eq!(stats.orphan_ascents, 1);
    }

    #[test]
    fn aggregate_retains_peaks_without_routes() {
        let (views, _) = join_aggregate(&snapshot());
        let b = &views[1];
        assert_eq!(b.anzahl_routen, 0);
        assert!(!b.peak_has_star);
        assert!(!b.has_done_route);
    }

    #[test]
    fn aggregate_is_idempotent_over_the_same_snapshot() {
        let snapshot = snapshot();
        let first = join_aggregate(&snapshot);
        let second = join_aggregate(&snapshot);
        assert_eq!(first.0, second.0);
        assert_eq!(first.1, second.1);
    }

    #[test]
    fn expand_drops_unresolved_ascents() {
        let (views, stats) = join_expand(&snapshot());
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].ascent_id, 100);
        assert_eq!(views[0].gipfel, "A");
        assert_eq!(views[0].route_name, "Alter weg");
        assert_eq!(stats.orphan_ascents, 1);
    }

    #[test]
    fn expand_prefers_ascent_rating_over_route_rating() {
        let mut snap = snapshot();
        let (views, _) = join_expand(&snap);
        assert_eq!(views[0].bewertung, Some(3));

        snap.ascents[0].bewertung = None;
        let (views, _) = join_expand(&snap);
        assert_eq!(views[0].bewertung, Some(2));
    }
}
